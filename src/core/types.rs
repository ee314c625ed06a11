use serde::Serialize;
use thiserror::Error;

/// Both products are measured at the same 10-year mark.
pub const HORIZON_MONTHS: u32 = 120;

/// Flat withholding applied to deposit interest (15.4%).
pub const WITHHOLDING_RATE: f64 = 0.154;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PayYears {
    Five,
    Seven,
}

impl PayYears {
    pub fn from_years(years: u32) -> Option<Self> {
        match years {
            5 => Some(PayYears::Five),
            7 => Some(PayYears::Seven),
            _ => None,
        }
    }

    pub fn years(self) -> u32 {
        match self {
            PayYears::Five => 5,
            PayYears::Seven => 7,
        }
    }

    pub fn months(self) -> u32 {
        self.years() * 12
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DepositPlan {
    pub monthly_amount: f64,
    /// Nominal annual rate in percent, compounded monthly.
    pub annual_rate: f64,
    pub horizon_months: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct InsurancePlan {
    pub monthly_amount: f64,
    /// Premiums stop after this many years; the refund is still taken at
    /// the 10-year mark.
    pub pay_years: PayYears,
    /// Ratio of the 10-year surrender value to total premiums, in percent.
    pub surrender_rate: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TaxPolicy {
    pub withholding_rate: f64,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            withholding_rate: WITHHOLDING_RATE,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Favored {
    Deposit,
    Insurance,
    Tie,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub after_tax_interest: f64,
    pub bonus: f64,
    /// bonus minus after-tax interest; positive favors the insurance side.
    pub delta: f64,
    pub favored: Favored,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositOutcome {
    pub principal: f64,
    pub future_value: f64,
    pub pre_tax_interest: f64,
    pub tax: f64,
    pub after_tax_interest: f64,
    pub total_received: f64,
    pub monthly_average_interest: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceOutcome {
    pub principal_paid: f64,
    pub refund: f64,
    /// refund minus premiums; negative when the surrender rate is under 100%.
    pub bonus: f64,
    pub monthly_average_bonus: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutcome {
    pub deposit: DepositOutcome,
    pub insurance: InsuranceOutcome,
    pub result: ComparisonResult,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalcError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("computation invariant violated in {context}: {value}")]
    InvariantViolation { context: &'static str, value: f64 },
}

impl CalcError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

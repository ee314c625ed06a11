use super::types::{
    CalcError, ComparisonOutcome, ComparisonResult, DepositOutcome, DepositPlan, Favored,
    HORIZON_MONTHS, InsuranceOutcome, InsurancePlan, PayYears, TaxPolicy,
};

#[derive(Debug, Clone, Copy)]
pub struct TaxSplit {
    pub tax: f64,
    pub after_tax_interest: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SurrenderValue {
    pub principal_paid: f64,
    pub refund: f64,
    pub bonus: f64,
}

/// Future-value multiplier of an ordinary annuity: deposits at period end,
/// compounding monthly until the horizon. Collapses to `months` at zero rate.
pub fn annuity_factor(annual_rate: f64, months: u32) -> f64 {
    let r = annual_rate / 100.0 / 12.0;
    if r == 0.0 {
        months as f64
    } else {
        ((1.0 + r).powi(months as i32) - 1.0) / r
    }
}

/// Future value of `monthly` deposited every month for `months` months at a
/// nominal annual rate compounded monthly.
pub fn future_value(monthly: f64, annual_rate: f64, months: u32) -> f64 {
    monthly * annuity_factor(annual_rate, months)
}

/// Splits pre-tax interest into withheld tax and the amount received.
/// Negative interest means an upstream formula produced nonsense; surface it
/// instead of clamping.
pub fn apply_tax(pre_tax_interest: f64, rate: f64) -> Result<TaxSplit, CalcError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(CalcError::invalid(
            "withholding_rate",
            "must be between 0 and 1",
        ));
    }
    if pre_tax_interest < 0.0 {
        return Err(CalcError::InvariantViolation {
            context: "pre-tax interest",
            value: pre_tax_interest,
        });
    }

    let tax = pre_tax_interest * rate;
    Ok(TaxSplit {
        tax,
        after_tax_interest: pre_tax_interest - tax,
    })
}

/// Total premiums paid over the pay period and the surrender value taken at
/// the 10-year mark. The bonus goes negative below a 100% surrender rate,
/// which is a reportable outcome rather than an error.
pub fn surrender(monthly: f64, pay_years: PayYears, surrender_rate: f64) -> SurrenderValue {
    let principal_paid = monthly * pay_years.months() as f64;
    let refund = principal_paid * (surrender_rate / 100.0);
    SurrenderValue {
        principal_paid,
        refund,
        bonus: refund - principal_paid,
    }
}

/// Verdict by the exact sign of `bonus - after_tax_interest`; no epsilon.
pub fn compare(after_tax_interest: f64, bonus: f64) -> ComparisonResult {
    let delta = bonus - after_tax_interest;
    let favored = if delta > 0.0 {
        Favored::Insurance
    } else if delta < 0.0 {
        Favored::Deposit
    } else {
        Favored::Tie
    };

    ComparisonResult {
        after_tax_interest,
        bonus,
        delta,
        favored,
    }
}

pub fn evaluate_deposit(plan: &DepositPlan, tax: TaxPolicy) -> Result<DepositOutcome, CalcError> {
    if !plan.monthly_amount.is_finite() || plan.monthly_amount < 0.0 {
        return Err(CalcError::invalid("deposit_monthly", "must be >= 0"));
    }
    if !plan.annual_rate.is_finite() || plan.annual_rate < 0.0 {
        return Err(CalcError::invalid("deposit_annual_rate", "must be >= 0"));
    }
    if plan.horizon_months == 0 {
        return Err(CalcError::invalid("horizon_months", "must be > 0"));
    }

    let future_value = future_value(plan.monthly_amount, plan.annual_rate, plan.horizon_months);
    let principal = plan.monthly_amount * plan.horizon_months as f64;
    let pre_tax_interest = future_value - principal;
    if pre_tax_interest < 0.0 {
        // Non-negative rate cannot lose money; this is a formula defect.
        return Err(CalcError::InvariantViolation {
            context: "pre-tax interest",
            value: pre_tax_interest,
        });
    }

    let split = apply_tax(pre_tax_interest, tax.withholding_rate)?;
    Ok(DepositOutcome {
        principal,
        future_value,
        pre_tax_interest,
        tax: split.tax,
        after_tax_interest: split.after_tax_interest,
        total_received: principal + split.after_tax_interest,
        monthly_average_interest: split.after_tax_interest / plan.horizon_months as f64,
    })
}

pub fn evaluate_insurance(plan: &InsurancePlan) -> Result<InsuranceOutcome, CalcError> {
    if !plan.monthly_amount.is_finite() || plan.monthly_amount < 0.0 {
        return Err(CalcError::invalid("insurance_monthly", "must be >= 0"));
    }
    if !plan.surrender_rate.is_finite() || plan.surrender_rate < 0.0 {
        return Err(CalcError::invalid("surrender_rate", "must be >= 0"));
    }

    let value = surrender(plan.monthly_amount, plan.pay_years, plan.surrender_rate);
    Ok(InsuranceOutcome {
        principal_paid: value.principal_paid,
        refund: value.refund,
        bonus: value.bonus,
        monthly_average_bonus: value.bonus / HORIZON_MONTHS as f64,
    })
}

/// One comparison run: both products normalized to the 10-year horizon, a
/// signed delta and a verdict. Pure; every call stands alone.
pub fn run_comparison(
    deposit: &DepositPlan,
    insurance: &InsurancePlan,
    tax: TaxPolicy,
) -> Result<ComparisonOutcome, CalcError> {
    let deposit_outcome = evaluate_deposit(deposit, tax)?;
    let insurance_outcome = evaluate_insurance(insurance)?;
    let result = compare(deposit_outcome.after_tax_interest, insurance_outcome.bonus);

    Ok(ComparisonOutcome {
        deposit: deposit_outcome,
        insurance: insurance_outcome,
        result,
    })
}

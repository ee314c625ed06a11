mod engine;
mod solver;
mod types;

pub use engine::{
    SurrenderValue, TaxSplit, annuity_factor, apply_tax, compare, evaluate_deposit,
    evaluate_insurance, future_value, run_comparison, surrender,
};
pub use solver::{
    InverseSolveResult, InverseTarget, solve_required_annual_rate, solve_required_monthly_deposit,
};
pub use types::{
    CalcError, ComparisonOutcome, ComparisonResult, DepositOutcome, DepositPlan, Favored,
    HORIZON_MONTHS, InsuranceOutcome, InsurancePlan, PayYears, TaxPolicy, WITHHOLDING_RATE,
};

use super::{CalcError, annuity_factor};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InverseTarget {
    RequiredMonthlyDeposit,
    RequiredAnnualRate,
}

/// Outcome of an inverse solve. `feasible` is false when the equation
/// degenerates (zero rate, zero deposit): a normal outcome the caller
/// branches on, not an error.
#[derive(Debug, Clone)]
pub struct InverseSolveResult {
    pub target: InverseTarget,
    pub solved_value: Option<f64>,
    pub feasible: bool,
    pub message: String,
}

impl InverseSolveResult {
    fn solved(target: InverseTarget, value: f64, message: &str) -> Self {
        Self {
            target,
            solved_value: Some(value),
            feasible: true,
            message: message.to_string(),
        }
    }

    fn unsolvable(target: InverseTarget, message: &str) -> Self {
        Self {
            target,
            solved_value: None,
            feasible: false,
            message: message.to_string(),
        }
    }
}

fn check_solver_inputs(target_bonus: f64, months: u32, tax_rate: f64) -> Result<(), CalcError> {
    if !target_bonus.is_finite() {
        return Err(CalcError::invalid("target_bonus", "must be finite"));
    }
    if months == 0 {
        return Err(CalcError::invalid("months", "must be > 0"));
    }
    if !(0.0..1.0).contains(&tax_rate) {
        return Err(CalcError::invalid("tax_rate", "must be >= 0 and < 1"));
    }
    Ok(())
}

/// Monthly deposit whose after-tax interest over `months` equals
/// `target_bonus`.
///
/// The after-tax annuity equation, with `factor = ((1+r)^n - 1) / r`:
///
///   after_tax = monthly * (factor - n) * (1 - tax_rate)
///
/// `factor - n` is the interest portion of the annuity multiplier, so
///
///   monthly = target_bonus / ((factor - n) * (1 - tax_rate))
///
/// At a non-positive rate the interest portion is zero and no finite
/// positive deposit yields positive interest.
pub fn solve_required_monthly_deposit(
    target_bonus: f64,
    annual_rate: f64,
    months: u32,
    tax_rate: f64,
) -> Result<InverseSolveResult, CalcError> {
    check_solver_inputs(target_bonus, months, tax_rate)?;
    if !annual_rate.is_finite() {
        return Err(CalcError::invalid("annual_rate", "must be finite"));
    }

    let target = InverseTarget::RequiredMonthlyDeposit;
    if annual_rate <= 0.0 {
        return Ok(InverseSolveResult::unsolvable(
            target,
            "No finite monthly deposit reaches the target without a positive rate.",
        ));
    }
    if target_bonus <= 0.0 {
        return Ok(InverseSolveResult::solved(
            target,
            0.0,
            "Target is already met with no deposit.",
        ));
    }

    let interest_factor = annuity_factor(annual_rate, months) - months as f64;
    let monthly = target_bonus / (interest_factor * (1.0 - tax_rate));
    Ok(InverseSolveResult::solved(
        target,
        monthly,
        "Solved required monthly deposit.",
    ))
}

/// Annual rate, in percent, whose after-tax flat yield on total principal
/// over `months` equals `target_bonus`.
///
///   after_tax = monthly * n * (rate / 100) * (1 - tax_rate)
///   rate = 100 * target_bonus / (monthly * n * (1 - tax_rate))
///
/// With `monthly <= 0` the principal is zero and the equation has no
/// finite answer.
pub fn solve_required_annual_rate(
    target_bonus: f64,
    monthly: f64,
    months: u32,
    tax_rate: f64,
) -> Result<InverseSolveResult, CalcError> {
    check_solver_inputs(target_bonus, months, tax_rate)?;
    if !monthly.is_finite() {
        return Err(CalcError::invalid("monthly", "must be finite"));
    }

    let target = InverseTarget::RequiredAnnualRate;
    if monthly <= 0.0 {
        return Ok(InverseSolveResult::unsolvable(
            target,
            "No rate can generate interest without a positive deposit.",
        ));
    }
    if target_bonus <= 0.0 {
        return Ok(InverseSolveResult::solved(
            target,
            0.0,
            "Target is already met at a zero rate.",
        ));
    }

    let principal = monthly * months as f64;
    let rate = 100.0 * target_bonus / (principal * (1.0 - tax_rate));
    Ok(InverseSolveResult::solved(
        target,
        rate,
        "Solved required annual rate.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        DepositPlan, HORIZON_MONTHS, TaxPolicy, WITHHOLDING_RATE, evaluate_deposit, future_value,
    };
    use proptest::prelude::{prop_assert, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn monthly_solver_recovers_original_deposit() {
        let plan = DepositPlan {
            monthly_amount: 100.0,
            annual_rate: 2.5,
            horizon_months: HORIZON_MONTHS,
        };
        let outcome = evaluate_deposit(&plan, TaxPolicy::default()).expect("valid plan");

        let result = solve_required_monthly_deposit(
            outcome.after_tax_interest,
            2.5,
            HORIZON_MONTHS,
            WITHHOLDING_RATE,
        )
        .expect("valid solver inputs");
        assert!(result.feasible);
        assert_close(result.solved_value.expect("value expected"), 100.0, 1e-9);
    }

    #[test]
    fn monthly_solver_matches_hand_computed_reference() {
        // Matching a 1380 bonus at 2.5% over 120 months needs ~100.8664/month.
        let result = solve_required_monthly_deposit(1_380.0, 2.5, 120, 0.154)
            .expect("valid solver inputs");
        assert_close(result.solved_value.expect("value expected"), 100.8664, 1e-4);
    }

    #[test]
    fn monthly_solver_is_unsolvable_at_zero_rate() {
        for target in [0.0, 1.0, 1_380.0, 1e9] {
            let result = solve_required_monthly_deposit(target, 0.0, 120, 0.154)
                .expect("valid solver inputs");
            assert!(!result.feasible);
            assert!(result.solved_value.is_none());
        }
    }

    #[test]
    fn monthly_solver_is_unsolvable_at_negative_rate() {
        let result =
            solve_required_monthly_deposit(1_000.0, -2.5, 120, 0.154).expect("valid solver inputs");
        assert!(!result.feasible);
    }

    #[test]
    fn monthly_solver_meets_non_positive_target_with_zero_deposit() {
        let result =
            solve_required_monthly_deposit(-500.0, 2.5, 120, 0.154).expect("valid solver inputs");
        assert!(result.feasible);
        assert_close(result.solved_value.expect("value expected"), 0.0, 0.0);
    }

    #[test]
    fn rate_solver_matches_hand_computed_reference() {
        // 1380 = 100 * 120 * (rate/100) * 0.846  =>  rate ~ 13.5934%.
        let result =
            solve_required_annual_rate(1_380.0, 100.0, 120, 0.154).expect("valid solver inputs");
        assert!(result.feasible);
        assert_close(result.solved_value.expect("value expected"), 13.5934, 1e-4);
    }

    #[test]
    fn rate_solver_round_trips_through_flat_yield() {
        let monthly = 250.0;
        let months = 120;
        let rate = 4.2;
        let target = monthly * months as f64 * (rate / 100.0) * (1.0 - 0.154);

        let result =
            solve_required_annual_rate(target, monthly, months, 0.154).expect("valid inputs");
        assert_close(result.solved_value.expect("value expected"), rate, 1e-9);
    }

    #[test]
    fn rate_solver_is_unsolvable_without_deposit() {
        for monthly in [0.0, -10.0] {
            let result = solve_required_annual_rate(1_380.0, monthly, 120, 0.154)
                .expect("valid solver inputs");
            assert!(!result.feasible);
            assert!(result.solved_value.is_none());
        }
    }

    #[test]
    fn solvers_reject_degenerate_tax_rate() {
        assert!(solve_required_monthly_deposit(100.0, 2.5, 120, 1.0).is_err());
        assert!(solve_required_annual_rate(100.0, 100.0, 120, -0.1).is_err());
        assert!(solve_required_monthly_deposit(100.0, 2.5, 0, 0.154).is_err());
    }

    proptest! {
        #[test]
        fn prop_monthly_solver_round_trips(
            monthly in 1u32..50_000,
            rate_bp in 1u32..2_000
        ) {
            let monthly = monthly as f64;
            let rate = rate_bp as f64 / 100.0;
            let interest = future_value(monthly, rate, HORIZON_MONTHS)
                - monthly * HORIZON_MONTHS as f64;
            let after_tax = interest * (1.0 - WITHHOLDING_RATE);

            let result = solve_required_monthly_deposit(
                after_tax,
                rate,
                HORIZON_MONTHS,
                WITHHOLDING_RATE,
            )
            .expect("valid solver inputs");
            prop_assert!(result.feasible);
            let solved = result.solved_value.expect("value expected");
            prop_assert!((solved - monthly).abs() <= monthly * 1e-9);
        }

        #[test]
        fn prop_rate_solver_round_trips(
            monthly in 1u32..50_000,
            rate_bp in 1u32..5_000
        ) {
            let monthly = monthly as f64;
            let rate = rate_bp as f64 / 100.0;
            let target =
                monthly * HORIZON_MONTHS as f64 * (rate / 100.0) * (1.0 - WITHHOLDING_RATE);

            let result = solve_required_annual_rate(
                target,
                monthly,
                HORIZON_MONTHS,
                WITHHOLDING_RATE,
            )
            .expect("valid solver inputs");
            prop_assert!(result.feasible);
            let solved = result.solved_value.expect("value expected");
            prop_assert!((solved - rate).abs() <= rate * 1e-9);
        }
    }
}

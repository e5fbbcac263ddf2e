//! Capped social-security contributions (NSSA).

use crate::rates::ContributionRule;
use serde::{Deserialize, Serialize};

/// Employee and employer shares of a capped contribution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Contribution {
    pub employee_portion: f64,
    pub employer_portion: f64,
    /// Earnings the contribution was levied on, at most the ceiling.
    pub insurable_base: f64,
}

/// Contributions on `gross_amount` under `rule`.
///
/// Each share is additionally held at `ceiling * rate`, so no share can
/// exceed the statutory maximum whatever the base works out to.
pub fn compute_contribution(gross_amount: f64, rule: &ContributionRule) -> Contribution {
    let ceiling = rule.monthly_ceiling.max(0.0);
    let insurable_base = gross_amount.max(0.0).min(ceiling);
    let employee_portion = (insurable_base * rule.employee_rate).min(ceiling * rule.employee_rate);
    let employer_portion = (insurable_base * rule.employer_rate).min(ceiling * rule.employer_rate);
    Contribution {
        employee_portion,
        employer_portion,
        insurable_base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NSSA: ContributionRule = ContributionRule {
        employee_rate: 0.045,
        employer_rate: 0.045,
        monthly_ceiling: 700.0,
    };

    #[test]
    fn below_ceiling_uses_full_gross() {
        let c = compute_contribution(250.0, &NSSA);
        assert_eq!(c.insurable_base, 250.0);
        assert!((c.employee_portion - 11.25).abs() < 1e-12);
        assert!((c.employer_portion - 11.25).abs() < 1e-12);
    }

    #[test]
    fn above_ceiling_is_capped() {
        let c = compute_contribution(5_000.0, &NSSA);
        assert_eq!(c.insurable_base, 700.0);
        assert_eq!(c.employee_portion, 700.0 * 0.045);
        assert_eq!(c.employer_portion, 700.0 * 0.045);
    }

    #[test]
    fn rates_are_applied_independently() {
        let rule = ContributionRule {
            employee_rate: 0.03,
            employer_rate: 0.05,
            monthly_ceiling: 1_000.0,
        };
        let c = compute_contribution(400.0, &rule);
        assert!((c.employee_portion - 12.0).abs() < 1e-12);
        assert!((c.employer_portion - 20.0).abs() < 1e-12);
    }

    #[test]
    fn zero_gross_and_zero_ceiling_contribute_nothing() {
        assert_eq!(compute_contribution(0.0, &NSSA), Contribution::default());
        let rule = ContributionRule {
            monthly_ceiling: 0.0,
            ..NSSA
        };
        assert_eq!(compute_contribution(900.0, &rule).employee_portion, 0.0);
    }

    proptest! {
        #[test]
        fn prop_portion_is_exactly_capped_above_ceiling(gross in 700.0f64..1_000_000.0) {
            let c = compute_contribution(gross, &NSSA);
            prop_assert_eq!(c.employee_portion, NSSA.monthly_ceiling * NSSA.employee_rate);
            prop_assert_eq!(c.employer_portion, NSSA.monthly_ceiling * NSSA.employer_rate);
        }
    }
}

//! Payroll computation pipeline.
//!
//! [`Payroll`] turns one employee's compensation into a
//! [`PayslipResult`].  It runs in two directions: from a known gross
//! ([`Payroll::compute_from_gross`]) and from a target net salary
//! ([`Payroll::compute_from_net`]), which searches for the matching
//! gross because bands and caps leave no closed-form inverse.

use crate::bonus::allocate_bonus;
use crate::contribution::compute_contribution;
use crate::error::{ensure_amount, EngineError};
use crate::models::{Allowances, CompensationInput, GrossUpResult, PayslipResult, SolverIteration};
use crate::rates::RateTable;
use crate::tax::compute_tax;
use std::sync::Arc;

/// Net salary within this distance of the target counts as a match.
pub const GROSS_UP_TOLERANCE: f64 = 0.01;
/// Hard cap on search rounds.
pub const GROSS_UP_MAX_ITERATIONS: u32 = 100;
/// Gross is raised by this multiple of a shortfall in net...
const UPWARD_STEP: f64 = 1.7;
/// ...and lowered by this multiple of an excess.
const DOWNWARD_STEP: f64 = 1.0;

/// The payroll pipeline bound to one rate table.
#[derive(Debug, Clone)]
pub struct Payroll {
    rates: Arc<RateTable>,
}

impl Payroll {
    /// Validate `rates` and build a pipeline over it.
    pub fn new(rates: Arc<RateTable>) -> Result<Self, EngineError> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    fn validate(&self, input: &CompensationInput) -> Result<(), EngineError> {
        ensure_amount("basic_salary", input.basic_salary)?;
        for (key, amount) in input.allowances.items() {
            ensure_amount(&format!("allowances.{key}"), amount)?;
        }
        ensure_amount("prior_ytd_bonus", input.prior_ytd_bonus)?;
        self.validate_apwc_rate(input.apwc_rate_percent)
    }

    fn validate_apwc_rate(&self, rate_percent: f64) -> Result<(), EngineError> {
        ensure_amount("apwc_rate_percent", rate_percent)?;
        let max = self.rates.apwc_max_rate_percent;
        if rate_percent > max {
            return Err(EngineError::invalid(
                "apwc_rate_percent",
                format!("must not exceed {max}%"),
            ));
        }
        Ok(())
    }

    /// Compute a payslip from known earnings.
    ///
    /// The taxable part of any bonus is charged at the top marginal rate
    /// on top of PAYE; only the exempt part is removed from the PAYE base.
    pub fn compute_from_gross(&self, input: &CompensationInput) -> Result<PayslipResult, EngineError> {
        self.validate(input)?;
        let rates = &*self.rates;

        let gross_salary = input.basic_salary + input.allowances.total();
        let bonus = allocate_bonus(
            input.allowances.bonus,
            input.prior_ytd_bonus,
            rates.bonus_threshold,
            rates.top_marginal_rate(),
        );
        let nssa = compute_contribution(gross_salary, &rates.nssa);

        let taxable_income =
            (gross_salary - nssa.employee_portion - bonus.tax_free_portion).max(0.0);
        let paye = compute_tax(taxable_income, &rates.paye_bands)?;
        let aids_levy = paye * rates.aids_levy_rate;
        let total_tax = paye + aids_levy + bonus.bonus_tax;
        let total_deductions = nssa.employee_portion + total_tax;
        let net_salary = gross_salary - total_deductions;

        let zimdef = gross_salary * rates.zimdef_rate;
        let apwc = gross_salary * input.apwc_rate_percent / 100.0;
        let total_employer_cost = gross_salary + nssa.employer_portion + zimdef + apwc;

        Ok(PayslipResult {
            basic_salary: input.basic_salary,
            allowances: input.allowances,
            gross_salary,
            bonus,
            nssa_employee: nssa.employee_portion,
            insurable_earnings: nssa.insurable_base,
            taxable_income,
            paye,
            aids_levy,
            bonus_tax: bonus.bonus_tax,
            total_tax,
            total_deductions,
            net_salary,
            nssa_employer: nssa.employer_portion,
            zimdef,
            apwc,
            apwc_rate_percent: input.apwc_rate_percent,
            total_employer_cost,
        })
    }

    /// Find the basic salary (no allowances, no bonus) that pays `target_net`.
    ///
    /// The search keeps a bracket around the answer and takes damped
    /// steps proportional to the net-salary error, falling back to
    /// bisection whenever a step would leave the bracket.  If the
    /// iteration cap is hit the closest payslip found is returned with
    /// `converged` set to false.
    pub fn compute_from_net(
        &self,
        target_net: f64,
        apwc_rate_percent: f64,
    ) -> Result<GrossUpResult, EngineError> {
        ensure_amount("target_net", target_net)?;
        self.validate_apwc_rate(apwc_rate_percent)?;

        let candidate = |gross: f64| CompensationInput {
            basic_salary: gross,
            allowances: Allowances::default(),
            apwc_rate_percent,
            prior_ytd_bonus: 0.0,
        };

        // Net never exceeds gross, so zero is always a lower bracket.
        let mut lower = 0.0_f64;
        let mut upper: Option<f64> = None;
        let mut gross_guess = target_net;
        let mut iterations = Vec::new();
        let mut best: Option<PayslipResult> = None;
        let mut converged = false;

        for iteration in 1..=GROSS_UP_MAX_ITERATIONS {
            let payslip = self.compute_from_gross(&candidate(gross_guess))?;
            let delta = payslip.net_salary - target_net;
            tracing::debug!(iteration, gross_guess, delta, "Gross-up iteration");
            iterations.push(SolverIteration {
                iteration,
                gross_guess,
                net_salary: payslip.net_salary,
                delta,
            });

            let is_better = best.map_or(true, |b| delta.abs() < (b.net_salary - target_net).abs());
            if is_better {
                best = Some(payslip);
            }
            if delta.abs() < GROSS_UP_TOLERANCE {
                converged = true;
                break;
            }

            let step = if delta < 0.0 {
                lower = gross_guess;
                -delta * UPWARD_STEP
            } else {
                upper = Some(gross_guess);
                -delta * DOWNWARD_STEP
            };
            let next = gross_guess + step;
            gross_guess = match upper {
                Some(upper) if next <= lower || next >= upper => 0.5 * (lower + upper),
                _ => next,
            };
        }

        let payslip = match best {
            Some(payslip) => payslip,
            None => self.compute_from_gross(&candidate(gross_guess))?,
        };
        let residual = payslip.net_salary - target_net;
        if !converged {
            tracing::warn!(
                target_net,
                residual,
                iterations = iterations.len(),
                "Gross-up did not converge; returning closest estimate"
            );
        }

        Ok(GrossUpResult {
            target_net,
            payslip,
            iterations,
            converged,
            residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn payroll() -> Payroll {
        Payroll::new(Arc::new(RateTable::zimbabwe_2024())).expect("valid table")
    }

    fn salary(basic_salary: f64) -> CompensationInput {
        CompensationInput {
            basic_salary,
            ..CompensationInput::default()
        }
    }

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn basic_salary_of_250_matches_hand_computation() {
        let p = payroll().compute_from_gross(&salary(250.0)).unwrap();
        // NSSA 4.5% of 250, PAYE 20% band less 20, AIDS levy 3% of PAYE.
        assert_close(p.gross_salary, 250.0, 1e-9);
        assert_close(p.nssa_employee, 11.25, 1e-9);
        assert_close(p.taxable_income, 238.75, 1e-9);
        assert_close(p.paye, 0.20 * 238.75 - 20.0, 1e-9);
        assert_close(p.aids_levy, 0.8325, 1e-9);
        assert_close(p.total_tax, 28.5825, 1e-9);
        assert_close(p.net_salary, 210.1675, 1e-9);
        assert_close(p.nssa_employer, 11.25, 1e-9);
        assert_close(p.zimdef, 2.5, 1e-9);
        assert_close(p.apwc, 0.0, 1e-9);
        assert_close(p.total_employer_cost, 263.75, 1e-9);
    }

    #[test]
    fn allowances_and_bonus_flow_into_payslip() {
        let input = CompensationInput {
            basic_salary: 1_500.0,
            allowances: Allowances {
                transport: 100.0,
                housing: 200.0,
                bonus: 300.0,
                ..Allowances::default()
            },
            apwc_rate_percent: 1.5,
            prior_ytd_bonus: 600.0,
        };
        let p = payroll().compute_from_gross(&input).unwrap();

        assert_close(p.gross_salary, 2_100.0, 1e-9);
        assert_close(p.bonus.tax_free_portion, 100.0, 1e-9);
        assert_close(p.bonus.taxable_portion, 200.0, 1e-9);
        assert_close(p.bonus_tax, 80.0, 1e-9);
        assert_close(p.bonus.new_ytd_bonus, 900.0, 1e-9);
        // NSSA capped at 700 * 4.5%.
        assert_close(p.nssa_employee, 31.5, 1e-9);
        assert_close(p.insurable_earnings, 700.0, 1e-9);
        let taxable = 2_100.0 - 31.5 - 100.0;
        assert_close(p.taxable_income, taxable, 1e-9);
        assert_close(p.paye, taxable * 0.30 - 85.0, 1e-9);
        assert_close(p.aids_levy, p.paye * 0.03, 1e-9);
        assert_close(p.net_salary, 2_100.0 - 31.5 - p.total_tax, 1e-9);
        assert_close(p.apwc, 31.5, 1e-9);
        assert_close(p.total_employer_cost, 2_100.0 + 31.5 + 21.0 + 31.5, 1e-9);
    }

    #[test]
    fn fully_exempt_bonus_owes_no_tax() {
        let input = CompensationInput {
            allowances: Allowances {
                bonus: 500.0,
                ..Allowances::default()
            },
            ..CompensationInput::default()
        };
        let p = payroll().compute_from_gross(&input).unwrap();
        assert_eq!(p.taxable_income, 0.0);
        assert_eq!(p.total_tax, 0.0);
        assert_close(p.net_salary, 500.0 - 22.5, 1e-9);
    }

    #[test]
    fn rejects_negative_fields_by_name() {
        let mut input = salary(500.0);
        input.allowances.medical = -10.0;
        let err = payroll().compute_from_gross(&input).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidInput { ref field, .. } if field == "allowances.medical"
        ));
    }

    #[test]
    fn rejects_apwc_rate_above_maximum() {
        let mut input = salary(500.0);
        input.apwc_rate_percent = 2.5;
        let err = payroll().compute_from_gross(&input).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidInput { ref field, .. } if field == "apwc_rate_percent"
        ));
        assert!(payroll().compute_from_net(500.0, 2.5).is_err());
    }

    #[test]
    fn misconfigured_table_is_refused() {
        let mut table = RateTable::zimbabwe_2024();
        table.paye_bands.pop();
        assert!(matches!(
            Payroll::new(Arc::new(table)),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn bonus_above_threshold_is_taxed_at_top_rate() {
        let input = CompensationInput {
            basic_salary: 2_000.0,
            allowances: Allowances {
                bonus: 1_000.0,
                ..Allowances::default()
            },
            ..CompensationInput::default()
        };
        let p = payroll().compute_from_gross(&input).unwrap();
        assert_close(p.bonus.taxable_portion, 300.0, 1e-9);
        assert_close(p.bonus_tax, 300.0 * 0.40, 1e-9);

        let mut table = RateTable::zimbabwe_2024();
        table.bonus_tax_rate = 0.10;
        assert!(matches!(
            Payroll::new(Arc::new(table)),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn gross_up_reports_closest_estimate_when_target_is_unreachable() {
        // A 100% top band makes net salary fall once gross passes 3000,
        // so a net of 5000 can never be paid.
        let mut table = RateTable::zimbabwe_2024();
        let top = table.paye_bands.last_mut().unwrap();
        top.rate = 1.0;
        top.subtractor = 3_000.0 - 865.0;
        table.bonus_tax_rate = 1.0;
        let payroll = Payroll::new(Arc::new(table)).unwrap();

        let r = payroll.compute_from_net(5_000.0, 0.0).unwrap();
        assert!(!r.converged);
        assert_eq!(r.iterations.len(), GROSS_UP_MAX_ITERATIONS as usize);
        assert!(r.residual < -GROSS_UP_TOLERANCE);

        let closest = r
            .iterations
            .iter()
            .min_by(|a, b| a.delta.abs().total_cmp(&b.delta.abs()))
            .unwrap();
        assert_eq!(r.payslip.gross_salary, closest.gross_guess);
        assert_eq!(r.payslip.net_salary, closest.net_salary);
        assert_eq!(r.residual, closest.delta);
    }

    #[test]
    fn gross_up_of_zero_is_zero() {
        let r = payroll().compute_from_net(0.0, 0.0).unwrap();
        assert!(r.converged);
        assert_eq!(r.payslip.gross_salary, 0.0);
        assert_eq!(r.iterations.len(), 1);
    }

    #[test]
    fn gross_up_hits_target_within_a_cent() {
        let r = payroll().compute_from_net(2_000.0, 1.0).unwrap();
        assert!(r.converged);
        assert!(r.residual.abs() < GROSS_UP_TOLERANCE);
        assert!(r.payslip.gross_salary > 2_000.0);
        assert!(r.iterations.len() <= GROSS_UP_MAX_ITERATIONS as usize);
        assert_eq!(r.payslip.apwc_rate_percent, 1.0);
    }

    #[test]
    fn gross_up_rejects_negative_target() {
        assert!(matches!(
            payroll().compute_from_net(-1.0, 0.0),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn gross_up_round_trips_across_bands() {
        let payroll = payroll();
        for gross in [50.0, 100.0, 250.0, 700.0, 999.99, 1_800.0, 2_500.0, 3_000.0, 7_500.0, 25_000.0] {
            let net = payroll.compute_from_gross(&salary(gross)).unwrap().net_salary;
            let r = payroll.compute_from_net(net, 0.0).unwrap();
            assert!(r.converged, "no convergence for gross {gross}");
            assert_close(r.payslip.gross_salary, gross, 0.05);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_gross_up_round_trip(gross in 0.0f64..50_000.0, apwc in 0.0f64..2.0) {
            let payroll = payroll();
            let mut input = salary(gross);
            input.apwc_rate_percent = apwc;
            let net = payroll.compute_from_gross(&input).unwrap().net_salary;
            let r = payroll.compute_from_net(net, apwc).unwrap();
            prop_assert!(r.converged);
            prop_assert!((r.payslip.gross_salary - gross).abs() < 0.05);
        }

        #[test]
        fn prop_net_never_exceeds_gross(gross in 0.0f64..100_000.0) {
            let p = payroll().compute_from_gross(&salary(gross)).unwrap();
            prop_assert!(p.net_salary <= p.gross_salary + 1e-9);
            prop_assert!(p.net_salary >= 0.0);
            prop_assert!(p.total_employer_cost >= p.gross_salary);
        }
    }
}

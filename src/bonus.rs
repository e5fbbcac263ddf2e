//! Year-to-date bonus exemption.
//!
//! Bonuses are exempt up to an annual threshold; everything past it is
//! taxed at a flat rate.  Whether a given payment is exempt depends on
//! how much bonus the taxpayer has already received this tax year, so
//! the running total is carried in a [`BonusTaxState`] that the caller
//! owns and feeds back in period after period.  The engine itself holds
//! no state.
//!
//! Payments for one taxpayer must be applied in order, one at a time.
//! Applying two payments against the same prior state double-counts the
//! exemption.

use serde::{Deserialize, Serialize};

/// How one bonus payment splits around the annual threshold.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BonusAllocation {
    pub tax_free_portion: f64,
    pub taxable_portion: f64,
    pub bonus_tax: f64,
    /// Cumulative bonus including this payment; persist it for the next period.
    pub new_ytd_bonus: f64,
}

/// Split `current_bonus` into exempt and taxable parts.
pub fn allocate_bonus(
    current_bonus: f64,
    prior_ytd_bonus: f64,
    threshold: f64,
    top_marginal_rate: f64,
) -> BonusAllocation {
    let current = current_bonus.max(0.0);
    let prior = prior_ytd_bonus.max(0.0);

    let tax_free_portion = if prior + current <= threshold {
        current
    } else if prior >= threshold {
        0.0
    } else {
        threshold - prior
    };
    let taxable_portion = current - tax_free_portion;

    BonusAllocation {
        tax_free_portion,
        taxable_portion,
        bonus_tax: taxable_portion * top_marginal_rate,
        new_ytd_bonus: prior + current,
    }
}

/// Cumulative bonus paid to one taxpayer in one tax year.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BonusTaxState {
    pub tax_year: i32,
    pub cumulative_bonus_ytd: f64,
}

impl BonusTaxState {
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            cumulative_bonus_ytd: 0.0,
        }
    }

    /// State after `allocation` has been paid.
    pub fn record(&self, allocation: &BonusAllocation) -> Self {
        Self {
            tax_year: self.tax_year,
            cumulative_bonus_ytd: allocation.new_ytd_bonus,
        }
    }
}

//! Processing-period marker and tax-year rollover.
//!
//! Zimbabwe's tax year runs January to December.  A payroll run is
//! processed for one [`PayrollPeriod`]; advancing past December starts
//! a new tax year, at which point each taxpayer's bonus total resets.

use crate::bonus::BonusTaxState;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// A monthly pay period.  Periods order chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayrollPeriod {
    pub tax_year: i32,
    /// Calendar month, 1 to 12.
    pub month: u32,
}

impl PayrollPeriod {
    pub fn new(tax_year: i32, month: u32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::invalid("month", "must be between 1 and 12"));
        }
        Ok(Self { tax_year, month })
    }

    /// The following month, rolling December into the next tax year.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self {
                tax_year: self.tax_year + 1,
                month: 1,
            }
        } else {
            Self {
                tax_year: self.tax_year,
                month: self.month + 1,
            }
        }
    }
}

impl BonusTaxState {
    /// The state to use when processing `period`.
    ///
    /// Within the same tax year the running total carries over; once the
    /// period moves into a later year it starts again from zero.
    pub fn for_period(&self, period: &PayrollPeriod) -> Self {
        if period.tax_year > self.tax_year {
            Self::new(period.tax_year)
        } else {
            *self
        }
    }
}

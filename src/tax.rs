//! Progressive PAYE calculation.
//!
//! The schedule is a list of [`TaxBand`]s.  Locating the band is a
//! linear scan (schedules have a handful of bands); the tax itself is
//! then a single multiply-and-subtract thanks to the band subtractor.

use crate::error::EngineError;
use crate::rates::TaxBand;

/// Find the band that contains `amount`.
pub fn find_band(amount: f64, bands: &[TaxBand]) -> Result<&TaxBand, EngineError> {
    bands.iter().find(|band| band.contains(amount)).ok_or_else(|| {
        EngineError::Configuration(format!("no PAYE band covers an amount of {amount}"))
    })
}

/// Tax due on `taxable_amount` under `bands`.
///
/// Negative or non-finite amounts owe nothing.  A non-negative amount
/// that no band covers means the schedule itself is broken and is
/// reported as a configuration error rather than as zero tax.
pub fn compute_tax(taxable_amount: f64, bands: &[TaxBand]) -> Result<f64, EngineError> {
    if !taxable_amount.is_finite() || taxable_amount <= 0.0 {
        return Ok(0.0);
    }
    let band = find_band(taxable_amount, bands)?;
    Ok((taxable_amount * band.rate - band.subtractor).max(0.0))
}

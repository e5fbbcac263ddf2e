//! Error types for the tax engine.
//!
//! Every engine operation returns [`EngineError`] on failure.  Invalid
//! input is rejected before any arithmetic runs and always names the
//! offending field, so callers can tell the user which value to fix.
//! Configuration errors indicate a malformed rate table and are never
//! expected with the built-in tables.

use thiserror::Error;

/// Failure modes of the tax engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A caller-supplied value was out of range.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A batch contained more employees than the engine accepts.
    #[error("batch of {size} employees exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// The rate table violates one of its invariants.
    #[error("rate table misconfigured: {0}")]
    Configuration(String),
}

impl EngineError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the field of an `InvalidInput` error, e.g. with the batch
    /// position of the employee it came from.  Other variants pass through.
    pub fn within(self, scope: &str) -> Self {
        match self {
            Self::InvalidInput { field, reason } => Self::InvalidInput {
                field: format!("{scope}.{field}"),
                reason,
            },
            other => other,
        }
    }
}

/// Reject negative or non-finite monetary amounts.
pub(crate) fn ensure_amount(field: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(EngineError::invalid(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(EngineError::invalid(field, "must not be negative"));
    }
    Ok(())
}

//! Error types for core computations.

use thiserror::Error;

/// Errors raised while planning a points spend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The partners together cannot cover the cost.
    #[error("insufficient points: need {required}, have {available}")]
    InsufficientPoints { required: i64, available: i64 },

    /// A spend cost must not be negative.
    #[error("invalid cost: {0}")]
    InvalidCost(i64),
}

/// A string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

//! Errors raised when text does not name a known kernel or domain value

use thiserror::Error;

/// A value outside the set a type accepts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },
}

impl CoreError {
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        CoreError::UnknownValue { kind, value: value.into() }
    }
}

//! Policy domain errors
//!
//! This module defines all error types that can occur within the
//! policy administration domain.

use thiserror::Error;

use core_kernel::TemporalError;
use crate::schedule::InvalidScheduleError;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Required field is missing
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Billing schedule value is not recognized
    #[error(transparent)]
    InvalidSchedule(#[from] InvalidScheduleError),

    /// Date arithmetic on the policy term failed
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }
}

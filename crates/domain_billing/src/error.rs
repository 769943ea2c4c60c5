//! Billing domain errors

use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::{PolicyId, PortError, TemporalError};
use domain_policy::InvalidScheduleError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Session opened for a policy that does not exist
    #[error("Policy not found: {0}")]
    PolicyNotFound(PolicyId),

    /// Policy carries a billing schedule outside the recognized set
    #[error(transparent)]
    InvalidSchedule(#[from] InvalidScheduleError),

    /// Payment could not be attributed to any contact
    #[error("No contact to attribute the payment to on policy {policy_id}; supply a contact id")]
    ContactResolution {
        policy_id: PolicyId,
    },

    /// Payment amount must be positive
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(i64),

    /// Schedule change requested outside the policy term
    #[error("Change date {as_of} is outside the policy term {term_start}..{term_end}")]
    ChangeOutsideTerm {
        as_of: NaiveDate,
        term_start: NaiveDate,
        term_end: NaiveDate,
    },

    /// Billing date arithmetic failed
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// Persistence failure, passed through unchanged
    #[error("Store error: {0}")]
    Store(PortError),
}

impl From<PortError> for BillingError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::InvalidData { ref field, ref value, .. } if field == "billing_schedule" => {
                BillingError::InvalidSchedule(InvalidScheduleError::new(value.clone()))
            }
            other => BillingError::Store(other),
        }
    }
}

impl BillingError {
    /// Returns true if the caller can fix the request and retry
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            BillingError::ContactResolution { .. }
                | BillingError::InvalidAmount(_)
                | BillingError::ChangeOutsideTerm { .. }
        )
    }
}

//! Billing schedules
//!
//! A billing schedule decides how the annual premium is split into
//! installments and how far apart those installments are billed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a billing schedule value is not one of the recognized names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid billing schedule: '{value}' (expected Annual, Two-Pay, Quarterly or Monthly)")]
pub struct InvalidScheduleError {
    /// The rejected value
    pub value: String,
}

impl InvalidScheduleError {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

/// Billing frequency of a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BillingSchedule {
    /// One installment of the full premium
    Annual,
    /// Two installments six months apart
    TwoPay,
    /// Four installments three months apart
    Quarterly,
    /// Twelve installments one month apart
    Monthly,
}

impl BillingSchedule {
    /// All recognized schedules
    pub const ALL: [BillingSchedule; 4] = [
        BillingSchedule::Annual,
        BillingSchedule::TwoPay,
        BillingSchedule::Quarterly,
        BillingSchedule::Monthly,
    ];

    /// Returns the number of installments per policy term
    pub fn installments(&self) -> u32 {
        match self {
            BillingSchedule::Annual => 1,
            BillingSchedule::TwoPay => 2,
            BillingSchedule::Quarterly => 4,
            BillingSchedule::Monthly => 12,
        }
    }

    /// Returns the spacing between bill dates in months
    ///
    /// Annual carries an interval of one month, which never comes into play
    /// for the initial schedule since there is only one installment.
    pub fn interval_months(&self) -> u32 {
        match self {
            BillingSchedule::Annual => 1,
            BillingSchedule::TwoPay => 6,
            BillingSchedule::Quarterly => 3,
            BillingSchedule::Monthly => 1,
        }
    }

    /// Returns the stored/display name of the schedule
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingSchedule::Annual => "Annual",
            BillingSchedule::TwoPay => "Two-Pay",
            BillingSchedule::Quarterly => "Quarterly",
            BillingSchedule::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for BillingSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingSchedule {
    type Err = InvalidScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Annual" => Ok(BillingSchedule::Annual),
            "Two-Pay" => Ok(BillingSchedule::TwoPay),
            "Quarterly" => Ok(BillingSchedule::Quarterly),
            "Monthly" => Ok(BillingSchedule::Monthly),
            other => Err(InvalidScheduleError::new(other)),
        }
    }
}

impl TryFrom<String> for BillingSchedule {
    type Error = InvalidScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingSchedule> for String {
    fn from(schedule: BillingSchedule) -> Self {
        schedule.as_str().to_string()
    }
}

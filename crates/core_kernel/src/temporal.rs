//! Calendar arithmetic for billing
//!
//! Billing dates are plain calendar dates. Month arithmetic follows the
//! calendar: adding a month to Jan 31 lands on the last day of February
//! rather than spilling into March.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Date out of range: {date} + {amount}")]
    OutOfRange {
        date: String,
        amount: String,
    },
}

/// Adds calendar months to a date, clamping to the end of the month
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use core_kernel::add_months;
///
/// let jan_31 = NaiveDate::from_ymd_opt(2015, 1, 31).unwrap();
/// let feb_28 = NaiveDate::from_ymd_opt(2015, 2, 28).unwrap();
/// assert_eq!(add_months(jan_31, 1).unwrap(), feb_28);
/// ```
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, TemporalError> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| TemporalError::OutOfRange {
            date: date.to_string(),
            amount: format!("{} months", months),
        })
}

/// Adds calendar days to a date
pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, TemporalError> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| TemporalError::OutOfRange {
            date: date.to_string(),
            amount: format!("{} days", days),
        })
}

/// The coverage term of a policy
///
/// Start is inclusive, end is exclusive. A standard term runs twelve
/// calendar months from the effective date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTerm {
    /// First day of coverage (inclusive)
    pub start: NaiveDate,
    /// Day coverage ends (exclusive)
    pub end: NaiveDate,
}

impl PolicyTerm {
    /// Creates a term from explicit bounds
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start >= end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates the standard one-year term starting at the effective date
    pub fn annual(effective_date: NaiveDate) -> Result<Self, TemporalError> {
        let end = add_months(effective_date, 12)?;
        Self::new(effective_date, end)
    }

    /// Returns true if the date falls inside the term
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Number of days in the term
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

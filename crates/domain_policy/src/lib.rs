//! Policy Administration Domain
//!
//! This crate holds the policy record as the accounting engine sees it:
//! premium, effective date, billing schedule, the contacts attached to it,
//! and its status.
//!
//! # Policy Lifecycle
//!
//! ```text
//! Active -> Canceled
//! ```
//!
//! A policy can change billing schedule any number of times while active.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use domain_policy::{BillingSchedule, PolicyBuilder, PolicyStatus};
//!
//! let policy = PolicyBuilder::new()
//!     .name("Policy Two")
//!     .effective_date(NaiveDate::from_ymd_opt(2015, 2, 1).unwrap())
//!     .annual_premium(1600)
//!     .billing_schedule(BillingSchedule::Quarterly)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(policy.status, PolicyStatus::Active);
//! assert_eq!(policy.billing_schedule.installments(), 4);
//! ```

pub mod aggregate;
pub mod schedule;
pub mod error;

pub use aggregate::{Policy, PolicyStatus, PolicyBuilder};
pub use schedule::{BillingSchedule, InvalidScheduleError};
pub use error::PolicyError;

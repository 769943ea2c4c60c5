//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use domain_policy::{BillingSchedule, Policy};

use crate::builders::TestPolicyBuilder;

/// Strategy for generating any billing schedule
pub fn schedule_strategy() -> impl Strategy<Value = BillingSchedule> {
    prop_oneof![
        Just(BillingSchedule::Annual),
        Just(BillingSchedule::TwoPay),
        Just(BillingSchedule::Quarterly),
        Just(BillingSchedule::Monthly),
    ]
}

/// Strategy for generating annual premiums
pub fn premium_strategy() -> impl Strategy<Value = i64> {
    0i64..1_000_000i64
}

/// Strategy for generating positive payment amounts
pub fn payment_amount_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000i64
}

/// Strategy for generating effective dates across 2015 and 2016
///
/// Covers month ends and the leap day.
pub fn effective_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..731u64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2015, 1, 1)
            .and_then(|d| d.checked_add_days(Days::new(days)))
            .unwrap()
    })
}

/// Strategy for generating an offset in days into a one-year term
pub fn term_offset_strategy() -> impl Strategy<Value = u64> {
    0u64..365u64
}

/// Strategy for generating policies without contacts
pub fn policy_strategy() -> impl Strategy<Value = Policy> {
    (effective_date_strategy(), premium_strategy(), schedule_strategy()).prop_map(
        |(effective_date, premium, schedule)| {
            TestPolicyBuilder::new()
                .with_effective_date(effective_date)
                .with_annual_premium(premium)
                .with_schedule(schedule)
                .build()
        },
    )
}

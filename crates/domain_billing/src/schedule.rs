//! Schedule Engine
//!
//! Pure computation of invoice drafts. Nothing here touches storage.
//!
//! # Splitting
//!
//! An amount split over `n` installments bills `amount / n` (integer
//! division) on every installment except the last, which absorbs the
//! remainder. The drafts of one schedule therefore always sum to exactly
//! the amount being split.

use chrono::NaiveDate;
use tracing::debug;

use core_kernel::{add_months, PolicyId, PolicyTerm, TemporalError};
use domain_policy::{BillingSchedule, Policy};

use crate::invoice::InvoiceDraft;

/// Splits an amount into `count` installments, remainder on the last one
///
/// # Example
///
/// ```rust
/// use domain_billing::split_amount;
///
/// assert_eq!(split_amount(365, 4), vec![91, 91, 91, 92]);
/// assert_eq!(split_amount(1200, 12), vec![100; 12]);
/// ```
pub fn split_amount(total: i64, count: u32) -> Vec<i64> {
    if count == 0 {
        return Vec::new();
    }

    let count_i64 = i64::from(count);
    let base = total / count_i64;
    let last = total - base * (count_i64 - 1);

    let mut amounts = vec![base; count as usize];
    if let Some(slot) = amounts.last_mut() {
        *slot = last;
    }
    amounts
}

/// Computes invoice schedules for policies
pub struct ScheduleEngine;

impl ScheduleEngine {
    /// Generates the full-term schedule for a policy
    ///
    /// Installment `i` (counting from zero) is billed `i * interval` months
    /// after the effective date.
    pub fn generate(policy: &Policy) -> Result<Vec<InvoiceDraft>, TemporalError> {
        let schedule = policy.billing_schedule;
        let drafts = Self::build(
            policy.id,
            policy.effective_date,
            schedule,
            schedule.installments(),
            policy.annual_premium,
        )?;

        debug!(
            policy_id = %policy.id,
            schedule = %schedule,
            invoices = drafts.len(),
            "Generated invoice schedule"
        );

        Ok(drafts)
    }

    /// Counts the installments of `schedule` that fall in `[from, term.end)`
    ///
    /// Bill dates step from `from` at the schedule's interval. The count
    /// never exceeds the schedule's installments per term, so switching to
    /// Annual mid-term yields a single invoice.
    pub fn remaining_installments(
        term: &PolicyTerm,
        schedule: BillingSchedule,
        from: NaiveDate,
    ) -> Result<u32, TemporalError> {
        let mut count = 0;
        while count < schedule.installments() {
            let bill_date = add_months(from, count * schedule.interval_months())?;
            if bill_date >= term.end {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    /// Spreads `amount` over the remaining installments of a new schedule
    ///
    /// Used by a mid-term schedule change. Bill dates start at `from` and
    /// stay strictly before the end of the policy term.
    pub fn reschedule(
        policy: &Policy,
        schedule: BillingSchedule,
        from: NaiveDate,
        amount: i64,
    ) -> Result<Vec<InvoiceDraft>, TemporalError> {
        let term = policy.term()?;
        let count = Self::remaining_installments(&term, schedule, from)?;
        let drafts = Self::build(policy.id, from, schedule, count, amount)?;

        debug!(
            policy_id = %policy.id,
            schedule = %schedule,
            from = %from,
            amount,
            invoices = drafts.len(),
            "Rescheduled remaining premium"
        );

        Ok(drafts)
    }

    fn build(
        policy_id: PolicyId,
        start: NaiveDate,
        schedule: BillingSchedule,
        count: u32,
        amount: i64,
    ) -> Result<Vec<InvoiceDraft>, TemporalError> {
        split_amount(amount, count)
            .into_iter()
            .zip(0u32..)
            .map(|(amount_due, index)| {
                let bill_date = add_months(start, index * schedule.interval_months())?;
                InvoiceDraft::new(policy_id, bill_date, amount_due)
            })
            .collect()
    }
}

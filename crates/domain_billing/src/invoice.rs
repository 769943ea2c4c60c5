//! Invoices
//!
//! An invoice is one installment of premium. It carries three dates: the day
//! it is billed, the day payment is due (one month later) and the day
//! non-payment makes the policy eligible for cancellation (fourteen days
//! after the due date).
//!
//! Invoices are never removed. A superseded invoice is soft-deleted and
//! drops out of every balance and cancellation computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{add_days, add_months, InvoiceId, PolicyId, TemporalError};

/// Months between the bill date and the due date
pub const DUE_AFTER_MONTHS: u32 = 1;

/// Days between the due date and the cancel date
pub const CANCEL_GRACE_DAYS: u64 = 14;

/// An invoice that has been computed but not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// Policy being billed
    pub policy_id: PolicyId,
    /// Date the installment is billed
    pub bill_date: NaiveDate,
    /// Date payment is due
    pub due_date: NaiveDate,
    /// Date after which non-payment warrants cancellation
    pub cancel_date: NaiveDate,
    /// Installment amount
    pub amount_due: i64,
}

impl InvoiceDraft {
    /// Creates a draft, deriving the due and cancel dates from the bill date
    ///
    /// # Arguments
    ///
    /// * `policy_id` - Policy being billed
    /// * `bill_date` - Date the installment is billed
    /// * `amount_due` - Installment amount
    pub fn new(policy_id: PolicyId, bill_date: NaiveDate, amount_due: i64) -> Result<Self, TemporalError> {
        let due_date = add_months(bill_date, DUE_AFTER_MONTHS)?;
        let cancel_date = add_days(due_date, CANCEL_GRACE_DAYS)?;

        Ok(Self {
            policy_id,
            bill_date,
            due_date,
            cancel_date,
            amount_due,
        })
    }
}

/// A persisted invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Policy being billed
    pub policy_id: PolicyId,
    /// Date the installment is billed
    pub bill_date: NaiveDate,
    /// Date payment is due
    pub due_date: NaiveDate,
    /// Date after which non-payment warrants cancellation
    pub cancel_date: NaiveDate,
    /// Installment amount
    pub amount_due: i64,
    /// Soft-deletion flag
    pub deleted: bool,
}

impl Invoice {
    /// Materializes a draft under the given identifier
    pub fn from_draft(id: InvoiceId, draft: InvoiceDraft) -> Self {
        Self {
            id,
            policy_id: draft.policy_id,
            bill_date: draft.bill_date,
            due_date: draft.due_date,
            cancel_date: draft.cancel_date,
            amount_due: draft.amount_due,
            deleted: false,
        }
    }

    /// Returns true unless the invoice has been soft-deleted
    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// Marks the invoice as superseded
    pub fn soft_delete(&mut self) {
        self.deleted = true;
    }
}

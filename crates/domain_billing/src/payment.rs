//! Payments
//!
//! Payments are not applied to specific invoices. They reduce the policy
//! balance as a whole from their transaction date onward.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{ContactId, PaymentId, PolicyId};

/// A payment waiting to be recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub policy_id: PolicyId,
    pub contact_id: ContactId,
    pub amount_paid: i64,
    pub transaction_date: NaiveDate,
}

/// A recorded payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Policy the payment is credited to
    pub policy_id: PolicyId,
    /// Contact who paid
    pub contact_id: ContactId,
    /// Amount paid
    pub amount_paid: i64,
    /// Date the payment takes effect
    pub transaction_date: NaiveDate,
}

impl Payment {
    /// Records a new payment under the given identifier
    pub fn from_new(id: PaymentId, payment: NewPayment) -> Self {
        Self {
            id,
            policy_id: payment.policy_id,
            contact_id: payment.contact_id,
            amount_paid: payment.amount_paid,
            transaction_date: payment.transaction_date,
        }
    }
}

//! Accounting DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ContactId, PaymentId, PolicyId};
use domain_billing::Payment;
use domain_policy::Policy;

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    /// Paying contact; the named insured when omitted
    pub contact_id: Option<ContactId>,
    /// Defaults to today
    pub transaction_date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub amount: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(min = 1, max = 255))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleChangeRequest {
    /// One of Annual, Two-Pay, Quarterly, Monthly
    pub billing_schedule: String,
    pub effective_on: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CancellationQuery {
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancellationResponse {
    pub policy_id: PolicyId,
    pub as_of: NaiveDate,
    pub pending_cancellation: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub policy_id: PolicyId,
    pub contact_id: ContactId,
    pub amount_paid: i64,
    pub transaction_date: NaiveDate,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            policy_id: payment.policy_id,
            contact_id: payment.contact_id,
            amount_paid: payment.amount_paid,
            transaction_date: payment.transaction_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyResponse {
    pub id: PolicyId,
    pub name: String,
    pub effective_date: NaiveDate,
    pub annual_premium: i64,
    pub billing_schedule: String,
    pub named_insured: Option<ContactId>,
    pub agent: Option<ContactId>,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub status_changed_on: Option<NaiveDate>,
}

impl From<Policy> for PolicyResponse {
    fn from(policy: Policy) -> Self {
        Self {
            id: policy.id,
            name: policy.name,
            effective_date: policy.effective_date,
            annual_premium: policy.annual_premium,
            billing_schedule: policy.billing_schedule.to_string(),
            named_insured: policy.named_insured,
            agent: policy.agent,
            status: policy.status.to_string(),
            cancellation_reason: policy.cancellation_reason,
            status_changed_on: policy.status_changed_on,
        }
    }
}

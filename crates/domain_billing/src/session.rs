//! Accounting Session
//!
//! A per-policy controller. Construction happens in two phases:
//!
//! 1. [`AccountingSession::load`] fetches the policy and returns a
//!    [`PendingSession`].
//! 2. [`PendingSession::ensure_invoices`] generates and persists the invoice
//!    schedule if the policy has no live invoices, returning a ready
//!    [`AccountingSession`].
//!
//! [`AccountingSession::open`] runs both. Once a session exists its policy is
//! guaranteed to have invoices.
//!
//! Every operation that takes an `as_of` date treats `None` as today.
//!
//! # Logging
//!
//! The session carries a [`tracing::Span`] and records every operation
//! under it. By default the span is `policy_accounting{policy_id}`; callers
//! can supply their own with [`PendingSession::with_span`].

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, info_span, instrument, warn, Span};

use core_kernel::{ContactId, PolicyId};
use domain_policy::{BillingSchedule, Policy};

use crate::error::BillingError;
use crate::invoice::Invoice;
use crate::payment::{NewPayment, Payment};
use crate::ports::{AccountingStore, InvoiceQuery, PaymentQuery, UnitOfWork};
use crate::schedule::ScheduleEngine;
use crate::statement::AccountStatement;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn resolve(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(today)
}

fn default_span(policy_id: PolicyId) -> Span {
    info_span!("policy_accounting", policy_id = %policy_id)
}

/// Lifecycle state of a ready session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Invoices exist and the policy is in force
    Ready,
    /// The policy has been canceled
    Canceled,
}

/// A session whose policy is loaded but whose invoices are not yet ensured
pub struct PendingSession {
    store: Arc<dyn AccountingStore>,
    policy: Policy,
    span: Span,
}

impl PendingSession {
    /// Replaces the span the session logs under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The loaded policy
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Makes sure the policy has live invoices, generating them if needed
    ///
    /// A policy whose invoices were all soft-deleted gets a fresh schedule.
    /// The generated invoices are created in one unit of work.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn ensure_invoices(self) -> Result<AccountingSession, BillingError> {
        let live = self
            .store
            .list_invoices(self.policy.id, InvoiceQuery::live())
            .await?;

        if live.is_empty() {
            let drafts = ScheduleEngine::generate(&self.policy)?;
            let created = self
                .store
                .commit(UnitOfWork::new(self.policy.id).create(drafts))
                .await?;

            info!(
                schedule = %self.policy.billing_schedule,
                invoices = created.len(),
                "Created invoice schedule"
            );
        } else {
            debug!(invoices = live.len(), "Invoices already present");
        }

        Ok(AccountingSession {
            store: self.store,
            policy: self.policy,
            span: self.span,
        })
    }
}

/// Per-policy accounting controller
pub struct AccountingSession {
    store: Arc<dyn AccountingStore>,
    policy: Policy,
    span: Span,
}

impl AccountingSession {
    /// Loads a policy for accounting
    ///
    /// # Errors
    ///
    /// Returns `PolicyNotFound` if the store has no such policy
    #[instrument(skip(store), fields(policy_id = %policy_id))]
    pub async fn load(
        store: Arc<dyn AccountingStore>,
        policy_id: PolicyId,
    ) -> Result<PendingSession, BillingError> {
        let policy = match store.find_policy(policy_id).await {
            Ok(policy) => policy,
            Err(e) if e.is_not_found() => return Err(BillingError::PolicyNotFound(policy_id)),
            Err(e) => return Err(e.into()),
        };

        Ok(PendingSession {
            store,
            policy,
            span: default_span(policy_id),
        })
    }

    /// Loads a policy and makes sure it has invoices
    pub async fn open(
        store: Arc<dyn AccountingStore>,
        policy_id: PolicyId,
    ) -> Result<Self, BillingError> {
        Self::load(store, policy_id).await?.ensure_invoices().await
    }

    /// The policy as last persisted by this session
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        if self.policy.is_canceled() {
            SessionState::Canceled
        } else {
            SessionState::Ready
        }
    }

    /// Balance as of a date
    ///
    /// Sum of live invoices billed on or before the date, minus payments made
    /// on or before it. Negative means the account is in credit.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn return_account_balance(&self, as_of: Option<NaiveDate>) -> Result<i64, BillingError> {
        let as_of = resolve(as_of);

        let billed: i64 = self
            .store
            .list_invoices(self.policy.id, InvoiceQuery::live().billed_through(as_of))
            .await?
            .iter()
            .map(|i| i.amount_due)
            .sum();
        let paid = self.paid_through(as_of).await?;

        debug!(%as_of, billed, paid, "Computed balance");
        Ok(billed - paid)
    }

    /// Records a payment
    ///
    /// Without an explicit contact the payment is attributed to the named
    /// insured. An explicit contact id is recorded as given.
    ///
    /// # Errors
    ///
    /// Returns `ContactResolution` if no contact is given and the named
    /// insured is unset or unknown to the store, and `InvalidAmount` unless
    /// the amount is positive.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn make_payment(
        &self,
        contact_id: Option<ContactId>,
        as_of: Option<NaiveDate>,
        amount: i64,
    ) -> Result<Payment, BillingError> {
        if amount <= 0 {
            return Err(BillingError::InvalidAmount(amount));
        }

        let contact_id = match contact_id {
            Some(id) => id,
            None => self.named_insured().await?,
        };

        let payment = self
            .store
            .create_payment(NewPayment {
                policy_id: self.policy.id,
                contact_id,
                amount_paid: amount,
                transaction_date: resolve(as_of),
            })
            .await?;

        info!(
            payment_id = %payment.id,
            contact_id = %payment.contact_id,
            amount = payment.amount_paid,
            transaction_date = %payment.transaction_date,
            "Recorded payment"
        );
        Ok(payment)
    }

    /// Is the policy pending cancellation for non-payment as of the date?
    pub async fn evaluate_cancellation_pending_due_to_non_pay(
        &self,
        as_of: Option<NaiveDate>,
    ) -> Result<bool, BillingError> {
        self.evaluate_cancel(Some(resolve(as_of))).await
    }

    /// Returns true if any invoice past its cancel date was left unpaid
    ///
    /// Invoices whose cancel date has passed are checked oldest first; the
    /// balance is taken at each one's cancel date and the first non-zero
    /// balance settles the answer.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn evaluate_cancel(&self, as_of: Option<NaiveDate>) -> Result<bool, BillingError> {
        let as_of = resolve(as_of);
        let lapsed = self
            .store
            .list_invoices(self.policy.id, InvoiceQuery::live().cancel_through(as_of))
            .await?;

        for invoice in &lapsed {
            let balance = self.return_account_balance(Some(invoice.cancel_date)).await?;
            if balance != 0 {
                warn!(
                    %as_of,
                    invoice_id = %invoice.id,
                    cancel_date = %invoice.cancel_date,
                    balance,
                    "Policy should be canceled for non-payment"
                );
                return Ok(true);
            }
        }

        debug!(%as_of, checked = lapsed.len(), "No cancellation warranted");
        Ok(false)
    }

    /// Cancels the policy as of today
    ///
    /// Does not check whether cancellation is warranted.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn cancel_policy(&mut self, reason: &str) -> Result<Policy, BillingError> {
        let mut updated = self.policy.clone();
        updated.cancel(reason, today());

        self.store.update_policy(&updated).await?;
        self.policy = updated;
        Ok(self.policy.clone())
    }

    /// Switches the policy to a new billing schedule from `as_of` onward
    ///
    /// Live invoices billed on or after `as_of` are soft-deleted; earlier ones
    /// stay billed. What is left of the annual premium after the larger of
    /// those kept invoices and the payments made through `as_of` is spread
    /// over the new schedule's installments from `as_of` to the end of the
    /// term. Live invoices therefore never add up to more than the premium
    /// unless payments already exceed it. The deletions, the new invoices and
    /// the policy update commit together.
    ///
    /// # Errors
    ///
    /// Returns `ChangeOutsideTerm` if `as_of` is before the effective date
    /// or on or after the end of the term
    #[instrument(parent = &self.span, skip(self))]
    pub async fn change_policy(
        &mut self,
        schedule: BillingSchedule,
        as_of: NaiveDate,
    ) -> Result<Policy, BillingError> {
        let term = self.policy.term()?;
        if !term.contains(as_of) {
            return Err(BillingError::ChangeOutsideTerm {
                as_of,
                term_start: term.start,
                term_end: term.end,
            });
        }

        let (superseded, kept): (Vec<Invoice>, Vec<Invoice>) = self
            .store
            .list_invoices(self.policy.id, InvoiceQuery::live())
            .await?
            .into_iter()
            .partition(|i| i.bill_date >= as_of);
        let already_billed: i64 = kept.iter().map(|i| i.amount_due).sum();
        let already_paid = self.paid_through(as_of).await?;
        let remaining = (self.policy.annual_premium - already_billed.max(already_paid)).max(0);

        let drafts = ScheduleEngine::reschedule(&self.policy, schedule, as_of, remaining)?;

        let mut updated = self.policy.clone();
        updated.change_schedule(schedule);

        let unit = UnitOfWork::new(self.policy.id)
            .soft_delete(superseded.iter().map(|i| i.id))
            .create(drafts)
            .update_policy(updated.clone());
        let created = self.store.commit(unit).await?;

        info!(
            %as_of,
            superseded = superseded.len(),
            created = created.len(),
            already_billed,
            already_paid,
            remaining,
            "Changed billing schedule"
        );

        self.policy = updated;
        Ok(self.policy.clone())
    }

    /// Live invoices billed on or before the date, oldest first
    pub async fn invoices(&self, as_of: Option<NaiveDate>) -> Result<Vec<Invoice>, BillingError> {
        let as_of = resolve(as_of);
        Ok(self
            .store
            .list_invoices(self.policy.id, InvoiceQuery::live().billed_through(as_of))
            .await?)
    }

    /// Invoices and balance as of a date
    #[instrument(parent = &self.span, skip(self))]
    pub async fn statement(&self, as_of: Option<NaiveDate>) -> Result<AccountStatement, BillingError> {
        let as_of = resolve(as_of);
        let invoices = self.invoices(Some(as_of)).await?;
        let balance = self.return_account_balance(Some(as_of)).await?;

        Ok(AccountStatement::new(self.policy.id, as_of, &invoices, balance))
    }

    async fn paid_through(&self, as_of: NaiveDate) -> Result<i64, BillingError> {
        Ok(self
            .store
            .list_payments(self.policy.id, PaymentQuery::through(as_of))
            .await?
            .iter()
            .map(|p| p.amount_paid)
            .sum())
    }

    async fn named_insured(&self) -> Result<ContactId, BillingError> {
        let unresolved = || BillingError::ContactResolution { policy_id: self.policy.id };

        let id = self.policy.named_insured.ok_or_else(unresolved)?;
        match self.store.find_contact(id).await {
            Ok(contact) => Ok(contact.id),
            Err(e) if e.is_not_found() => Err(unresolved()),
            Err(e) => Err(e.into()),
        }
    }
}

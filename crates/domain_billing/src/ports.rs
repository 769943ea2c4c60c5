//! Accounting storage port
//!
//! The session reads and writes policies, contacts, invoices and payments
//! through [`AccountingStore`]. Adapters live elsewhere: PostgreSQL in
//! `infra_db`, an in-memory store in [`mock`].
//!
//! # Atomicity
//!
//! Every mutating call is all-or-nothing. Mutations that touch several
//! records (invoice regeneration, schedule change) are bundled into a
//! [`UnitOfWork`] and handed to [`AccountingStore::commit`] in one call.
//!
//! ```rust,ignore
//! let unit = UnitOfWork::new(policy.id)
//!     .soft_delete(superseded.iter().map(|i| i.id))
//!     .create(drafts)
//!     .update_policy(updated);
//! store.commit(unit).await?;
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{ContactId, DomainPort, InvoiceId, PolicyId, PortError};
use domain_party::Contact;
use domain_policy::Policy;

use crate::invoice::{Invoice, InvoiceDraft};
use crate::payment::{NewPayment, Payment};

/// Filter for invoice listings
///
/// All bounds are inclusive. Soft-deleted invoices are excluded unless
/// `include_deleted` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub billed_on_or_after: Option<NaiveDate>,
    pub billed_on_or_before: Option<NaiveDate>,
    pub cancel_on_or_before: Option<NaiveDate>,
    pub include_deleted: bool,
}

impl InvoiceQuery {
    /// All live invoices
    pub fn live() -> Self {
        Self::default()
    }

    /// Restricts to invoices billed on or after the date
    pub fn billed_from(mut self, date: NaiveDate) -> Self {
        self.billed_on_or_after = Some(date);
        self
    }

    /// Restricts to invoices billed on or before the date
    pub fn billed_through(mut self, date: NaiveDate) -> Self {
        self.billed_on_or_before = Some(date);
        self
    }

    /// Restricts to invoices whose cancel date is on or before the date
    pub fn cancel_through(mut self, date: NaiveDate) -> Self {
        self.cancel_on_or_before = Some(date);
        self
    }

    /// Includes soft-deleted invoices
    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Returns true if the invoice passes the filter
    pub fn matches(&self, invoice: &Invoice) -> bool {
        (self.include_deleted || invoice.is_live())
            && self.billed_on_or_after.map_or(true, |d| invoice.bill_date >= d)
            && self.billed_on_or_before.map_or(true, |d| invoice.bill_date <= d)
            && self.cancel_on_or_before.map_or(true, |d| invoice.cancel_date <= d)
    }
}

/// Filter for payment listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentQuery {
    /// Inclusive upper bound on the transaction date
    pub on_or_before: Option<NaiveDate>,
}

impl PaymentQuery {
    /// All payments
    pub fn all() -> Self {
        Self::default()
    }

    /// Payments made on or before the date
    pub fn through(date: NaiveDate) -> Self {
        Self { on_or_before: Some(date) }
    }

    /// Returns true if the payment passes the filter
    pub fn matches(&self, payment: &Payment) -> bool {
        self.on_or_before.map_or(true, |d| payment.transaction_date <= d)
    }
}

/// A set of invoice and policy changes applied together or not at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOfWork {
    /// Policy every change belongs to
    pub policy_id: PolicyId,
    /// Invoices to soft-delete
    pub soft_delete: Vec<InvoiceId>,
    /// Invoices to create
    pub create: Vec<InvoiceDraft>,
    /// Replacement policy record
    pub policy: Option<Policy>,
}

impl UnitOfWork {
    /// Starts an empty unit of work for a policy
    pub fn new(policy_id: PolicyId) -> Self {
        Self {
            policy_id,
            soft_delete: Vec::new(),
            create: Vec::new(),
            policy: None,
        }
    }

    /// Adds invoices to soft-delete
    pub fn soft_delete(mut self, ids: impl IntoIterator<Item = InvoiceId>) -> Self {
        self.soft_delete.extend(ids);
        self
    }

    /// Adds invoices to create
    pub fn create(mut self, drafts: impl IntoIterator<Item = InvoiceDraft>) -> Self {
        self.create.extend(drafts);
        self
    }

    /// Replaces the stored policy record
    pub fn update_policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Returns true if the unit carries no changes
    pub fn is_empty(&self) -> bool {
        self.soft_delete.is_empty() && self.create.is_empty() && self.policy.is_none()
    }

    /// Checks that every change targets the unit's policy
    pub fn validate(&self) -> Result<(), PortError> {
        if self.create.iter().any(|d| d.policy_id != self.policy_id) {
            return Err(PortError::validation_field(
                "Invoice draft belongs to a different policy",
                "policy_id",
            ));
        }
        if let Some(policy) = &self.policy {
            if policy.id != self.policy_id {
                return Err(PortError::validation_field(
                    "Policy update targets a different policy",
                    "policy_id",
                ));
            }
        }
        Ok(())
    }
}

/// Persistence operations needed by the accounting session
#[async_trait]
pub trait AccountingStore: DomainPort {
    /// Loads a policy
    async fn find_policy(&self, id: PolicyId) -> Result<Policy, PortError>;

    /// Loads a contact
    async fn find_contact(&self, id: ContactId) -> Result<Contact, PortError>;

    /// Lists a policy's invoices matching the query, ordered by bill date
    async fn list_invoices(
        &self,
        policy_id: PolicyId,
        query: InvoiceQuery,
    ) -> Result<Vec<Invoice>, PortError>;

    /// Lists a policy's payments matching the query, ordered by transaction date
    async fn list_payments(
        &self,
        policy_id: PolicyId,
        query: PaymentQuery,
    ) -> Result<Vec<Payment>, PortError>;

    /// Records a payment
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, PortError>;

    /// Replaces the stored policy record
    async fn update_policy(&self, policy: &Policy) -> Result<(), PortError>;

    /// Applies a unit of work atomically, returning the created invoices
    async fn commit(&self, unit: UnitOfWork) -> Result<Vec<Invoice>, PortError>;
}

/// In-memory store for tests and demo deployments
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::PaymentId;

    #[derive(Debug, Default)]
    struct State {
        policies: HashMap<PolicyId, Policy>,
        contacts: HashMap<ContactId, Contact>,
        invoices: Vec<Invoice>,
        payments: Vec<Payment>,
    }

    /// Accounting store backed by process memory
    ///
    /// Cloning shares the underlying data.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryAccountingStore {
        state: Arc<RwLock<State>>,
        fail_next_commit: Arc<AtomicBool>,
    }

    impl InMemoryAccountingStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds or replaces a policy
        pub async fn insert_policy(&self, policy: Policy) {
            self.state.write().await.policies.insert(policy.id, policy);
        }

        /// Adds or replaces a contact
        pub async fn insert_contact(&self, contact: Contact) {
            self.state.write().await.contacts.insert(contact.id, contact);
        }

        /// Makes the next commit fail with a transaction error
        pub fn fail_next_commit(&self) {
            self.fail_next_commit.store(true, Ordering::SeqCst);
        }

        /// Returns every invoice of a policy, soft-deleted ones included
        pub async fn all_invoices(&self, policy_id: PolicyId) -> Vec<Invoice> {
            let state = self.state.read().await;
            let mut invoices: Vec<_> = state
                .invoices
                .iter()
                .filter(|i| i.policy_id == policy_id)
                .cloned()
                .collect();
            invoices.sort_by_key(|i| i.bill_date);
            invoices
        }
    }

    impl DomainPort for InMemoryAccountingStore {}

    #[async_trait]
    impl AccountingStore for InMemoryAccountingStore {
        async fn find_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
            self.state
                .read()
                .await
                .policies
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Policy", id))
        }

        async fn find_contact(&self, id: ContactId) -> Result<Contact, PortError> {
            self.state
                .read()
                .await
                .contacts
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Contact", id))
        }

        async fn list_invoices(
            &self,
            policy_id: PolicyId,
            query: InvoiceQuery,
        ) -> Result<Vec<Invoice>, PortError> {
            let state = self.state.read().await;
            let mut invoices: Vec<_> = state
                .invoices
                .iter()
                .filter(|i| i.policy_id == policy_id && query.matches(i))
                .cloned()
                .collect();
            invoices.sort_by_key(|i| i.bill_date);
            Ok(invoices)
        }

        async fn list_payments(
            &self,
            policy_id: PolicyId,
            query: PaymentQuery,
        ) -> Result<Vec<Payment>, PortError> {
            let state = self.state.read().await;
            let mut payments: Vec<_> = state
                .payments
                .iter()
                .filter(|p| p.policy_id == policy_id && query.matches(p))
                .cloned()
                .collect();
            payments.sort_by_key(|p| p.transaction_date);
            Ok(payments)
        }

        async fn create_payment(&self, payment: NewPayment) -> Result<Payment, PortError> {
            let mut state = self.state.write().await;
            if !state.policies.contains_key(&payment.policy_id) {
                return Err(PortError::not_found("Policy", payment.policy_id));
            }

            let payment = Payment::from_new(PaymentId::new_v7(), payment);
            state.payments.push(payment.clone());
            Ok(payment)
        }

        async fn update_policy(&self, policy: &Policy) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            match state.policies.get_mut(&policy.id) {
                Some(stored) => {
                    *stored = policy.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Policy", policy.id)),
            }
        }

        async fn commit(&self, unit: UnitOfWork) -> Result<Vec<Invoice>, PortError> {
            if self.fail_next_commit.swap(false, Ordering::SeqCst) {
                return Err(PortError::transaction("Injected commit failure"));
            }
            unit.validate()?;

            let mut state = self.state.write().await;

            // Check everything before touching anything
            if !state.policies.contains_key(&unit.policy_id) {
                return Err(PortError::not_found("Policy", unit.policy_id));
            }
            for id in &unit.soft_delete {
                let known = state
                    .invoices
                    .iter()
                    .any(|i| i.id == *id && i.policy_id == unit.policy_id);
                if !known {
                    return Err(PortError::transaction(format!(
                        "Invoice {} not found; unit of work rolled back",
                        id
                    )));
                }
            }

            for invoice in state.invoices.iter_mut() {
                if unit.soft_delete.contains(&invoice.id) {
                    invoice.soft_delete();
                }
            }

            let created: Vec<Invoice> = unit
                .create
                .into_iter()
                .map(|draft| Invoice::from_draft(InvoiceId::new_v7(), draft))
                .collect();
            state.invoices.extend(created.iter().cloned());

            if let Some(policy) = unit.policy {
                state.policies.insert(policy.id, policy);
            }

            Ok(created)
        }
    }
}

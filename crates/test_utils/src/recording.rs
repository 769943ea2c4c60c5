//! Recording store decorator
//!
//! Wraps another [`AccountingStore`] and keeps every invoice and payment
//! query it forwards, so tests can check which dates the session asked for.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use core_kernel::{ContactId, DomainPort, PolicyId, PortError};
use domain_billing::{
    AccountingStore, Invoice, InvoiceQuery, NewPayment, Payment, PaymentQuery, UnitOfWork,
};
use domain_party::Contact;
use domain_policy::Policy;

/// Store that records queries before delegating
pub struct RecordingStore<S> {
    inner: S,
    invoice_queries: Arc<Mutex<Vec<InvoiceQuery>>>,
    payment_queries: Arc<Mutex<Vec<PaymentQuery>>>,
}

impl<S: AccountingStore> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            invoice_queries: Arc::default(),
            payment_queries: Arc::default(),
        }
    }

    /// Invoice queries seen so far, oldest first
    pub fn invoice_queries(&self) -> Vec<InvoiceQuery> {
        self.invoice_queries.lock().unwrap().clone()
    }

    /// Payment queries seen so far, oldest first
    pub fn payment_queries(&self) -> Vec<PaymentQuery> {
        self.payment_queries.lock().unwrap().clone()
    }

    /// Forgets everything recorded so far
    pub fn clear(&self) {
        self.invoice_queries.lock().unwrap().clear();
        self.payment_queries.lock().unwrap().clear();
    }
}

impl<S: AccountingStore> DomainPort for RecordingStore<S> {}

#[async_trait]
impl<S: AccountingStore> AccountingStore for RecordingStore<S> {
    async fn find_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
        self.inner.find_policy(id).await
    }

    async fn find_contact(&self, id: ContactId) -> Result<Contact, PortError> {
        self.inner.find_contact(id).await
    }

    async fn list_invoices(
        &self,
        policy_id: PolicyId,
        query: InvoiceQuery,
    ) -> Result<Vec<Invoice>, PortError> {
        self.invoice_queries.lock().unwrap().push(query);
        self.inner.list_invoices(policy_id, query).await
    }

    async fn list_payments(
        &self,
        policy_id: PolicyId,
        query: PaymentQuery,
    ) -> Result<Vec<Payment>, PortError> {
        self.payment_queries.lock().unwrap().push(query);
        self.inner.list_payments(policy_id, query).await
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, PortError> {
        self.inner.create_payment(payment).await
    }

    async fn update_policy(&self, policy: &Policy) -> Result<(), PortError> {
        self.inner.update_policy(policy).await
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<Vec<Invoice>, PortError> {
        self.inner.commit(unit).await
    }
}

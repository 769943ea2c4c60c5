//! PostgreSQL Accounting Adapter
//!
//! Implements `AccountingStore` using the `AccountingRepository`.
//!
//! # Error Handling
//!
//! Database errors are translated to `PortError` variants:
//! - `DatabaseError::NotFound` -> `PortError::NotFound`
//! - constraint violations -> `PortError::Conflict`
//! - connection and pool failures -> `PortError::Connection`
//! - `DatabaseError::TransactionFailed` -> `PortError::Transaction`
//! - Other errors -> `PortError::Internal`
//!
//! Stored values that do not map onto the domain (an unknown billing
//! schedule, status or role) are reported as `PortError::InvalidData`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ContactId, DomainPort, InvoiceId, PaymentId, PolicyId, PortError};
use domain_billing::{
    AccountingStore, Invoice, InvoiceQuery, NewPayment, Payment, PaymentQuery, UnitOfWork,
};
use domain_party::{Contact, ContactRole};
use domain_policy::{BillingSchedule, Policy, PolicyStatus};

use crate::error::DatabaseError;
use crate::repositories::accounting::{
    AccountingRepository, ContactRow, InvoiceChangeSet, InvoiceFilter, InvoiceRow, PaymentRow,
    PolicyRow,
};

/// PostgreSQL-backed implementation of `AccountingStore`
#[derive(Debug, Clone)]
pub struct PgAccountingStore {
    repository: AccountingRepository,
}

impl PgAccountingStore {
    /// Creates a new PostgreSQL accounting store
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: AccountingRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &AccountingRepository {
        &self.repository
    }
}

impl DomainPort for PgAccountingStore {}

#[async_trait]
impl AccountingStore for PgAccountingStore {
    #[instrument(skip(self), fields(policy_id = %id))]
    async fn find_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
        debug!("Fetching policy");

        let row = self
            .repository
            .find_policy(id.into())
            .await
            .map_err(db_to_port_error)?;
        row_to_policy(row)
    }

    #[instrument(skip(self), fields(contact_id = %id))]
    async fn find_contact(&self, id: ContactId) -> Result<Contact, PortError> {
        debug!("Fetching contact");

        let row = self
            .repository
            .find_contact(id.into())
            .await
            .map_err(db_to_port_error)?;
        row_to_contact(row)
    }

    #[instrument(skip(self), fields(policy_id = %policy_id))]
    async fn list_invoices(
        &self,
        policy_id: PolicyId,
        query: InvoiceQuery,
    ) -> Result<Vec<Invoice>, PortError> {
        let filter = InvoiceFilter {
            billed_on_or_after: query.billed_on_or_after,
            billed_on_or_before: query.billed_on_or_before,
            cancel_on_or_before: query.cancel_on_or_before,
            include_deleted: query.include_deleted,
        };

        let rows = self
            .repository
            .list_invoices(policy_id.into(), filter)
            .await
            .map_err(db_to_port_error)?;

        debug!(count = rows.len(), "Fetched invoices");
        Ok(rows.into_iter().map(row_to_invoice).collect())
    }

    #[instrument(skip(self), fields(policy_id = %policy_id))]
    async fn list_payments(
        &self,
        policy_id: PolicyId,
        query: PaymentQuery,
    ) -> Result<Vec<Payment>, PortError> {
        let rows = self
            .repository
            .list_payments(policy_id.into(), query.on_or_before)
            .await
            .map_err(db_to_port_error)?;

        debug!(count = rows.len(), "Fetched payments");
        Ok(rows.into_iter().map(row_to_payment).collect())
    }

    #[instrument(skip(self, payment), fields(policy_id = %payment.policy_id))]
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, PortError> {
        let payment = Payment::from_new(PaymentId::new_v7(), payment);

        self.repository
            .insert_payment(&payment_to_row(&payment))
            .await
            .map_err(db_to_port_error)?;

        debug!(payment_id = %payment.id, "Inserted payment");
        Ok(payment)
    }

    #[instrument(skip(self, policy), fields(policy_id = %policy.id))]
    async fn update_policy(&self, policy: &Policy) -> Result<(), PortError> {
        self.repository
            .update_policy(&policy_to_row(policy))
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self, unit), fields(policy_id = %unit.policy_id))]
    async fn commit(&self, unit: UnitOfWork) -> Result<Vec<Invoice>, PortError> {
        unit.validate()?;

        let created: Vec<Invoice> = unit
            .create
            .into_iter()
            .map(|draft| Invoice::from_draft(InvoiceId::new_v7(), draft))
            .collect();

        let changes = InvoiceChangeSet {
            soft_delete: unit.soft_delete.into_iter().map(Into::into).collect(),
            create: created.iter().map(invoice_to_row).collect(),
            policy: unit.policy.as_ref().map(policy_to_row),
        };

        self.repository
            .apply_changes(unit.policy_id.into(), &changes)
            .await
            .map_err(db_to_port_error)?;

        debug!(
            soft_deleted = changes.soft_delete.len(),
            created = created.len(),
            "Committed unit of work"
        );
        Ok(created)
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Converts a DatabaseError to a PortError
fn db_to_port_error(e: DatabaseError) -> PortError {
    match e {
        DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
        DatabaseError::DuplicateEntry(message)
        | DatabaseError::ForeignKeyViolation(message)
        | DatabaseError::ConstraintViolation(message) => PortError::Conflict { message },
        DatabaseError::ConnectionFailed(message) => PortError::connection(message),
        DatabaseError::PoolExhausted => PortError::connection("connection pool exhausted"),
        DatabaseError::TransactionFailed(message) => PortError::transaction(message),
        other => PortError::internal(other.to_string()),
    }
}

fn row_to_policy(row: PolicyRow) -> Result<Policy, PortError> {
    let billing_schedule: BillingSchedule = row
        .billing_schedule
        .parse()
        .map_err(|_| PortError::invalid_data("policy", "billing_schedule", &row.billing_schedule))?;
    let status: PolicyStatus = row
        .status
        .parse()
        .map_err(|_| PortError::invalid_data("policy", "status", &row.status))?;

    Ok(Policy {
        id: PolicyId::from(row.policy_id),
        name: row.name,
        effective_date: row.effective_date,
        annual_premium: row.annual_premium,
        billing_schedule,
        named_insured: row.named_insured.map(ContactId::from),
        agent: row.agent.map(ContactId::from),
        status,
        cancellation_reason: row.cancellation_reason,
        status_changed_on: row.status_changed_on,
    })
}

fn policy_to_row(policy: &Policy) -> PolicyRow {
    PolicyRow {
        policy_id: policy.id.into(),
        name: policy.name.clone(),
        effective_date: policy.effective_date,
        annual_premium: policy.annual_premium,
        billing_schedule: policy.billing_schedule.to_string(),
        named_insured: policy.named_insured.map(Into::into),
        agent: policy.agent.map(Into::into),
        status: policy.status.to_string(),
        cancellation_reason: policy.cancellation_reason.clone(),
        status_changed_on: policy.status_changed_on,
    }
}

fn row_to_contact(row: ContactRow) -> Result<Contact, PortError> {
    let role: ContactRole = row
        .role
        .parse()
        .map_err(|_| PortError::invalid_data("contact", "role", &row.role))?;

    Ok(Contact {
        id: ContactId::from(row.contact_id),
        name: row.name,
        role,
    })
}

fn row_to_invoice(row: InvoiceRow) -> Invoice {
    Invoice {
        id: InvoiceId::from(row.invoice_id),
        policy_id: PolicyId::from(row.policy_id),
        bill_date: row.bill_date,
        due_date: row.due_date,
        cancel_date: row.cancel_date,
        amount_due: row.amount_due,
        deleted: row.deleted,
    }
}

fn invoice_to_row(invoice: &Invoice) -> InvoiceRow {
    InvoiceRow {
        invoice_id: invoice.id.into(),
        policy_id: invoice.policy_id.into(),
        bill_date: invoice.bill_date,
        due_date: invoice.due_date,
        cancel_date: invoice.cancel_date,
        amount_due: invoice.amount_due,
        deleted: invoice.deleted,
    }
}

fn row_to_payment(row: PaymentRow) -> Payment {
    Payment {
        id: PaymentId::from(row.payment_id),
        policy_id: PolicyId::from(row.policy_id),
        contact_id: ContactId::from(row.contact_id),
        amount_paid: row.amount_paid,
        transaction_date: row.transaction_date,
    }
}

fn payment_to_row(payment: &Payment) -> PaymentRow {
    PaymentRow {
        payment_id: payment.id.into(),
        policy_id: payment.policy_id.into(),
        contact_id: payment.contact_id.into(),
        amount_paid: payment.amount_paid,
        transaction_date: payment.transaction_date,
    }
}

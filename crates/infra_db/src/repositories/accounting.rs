//! Accounting repository
//!
//! SQL for contacts, policies, invoices and payments. Invoice regeneration
//! runs inside a single database transaction.

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ContactRow {
    pub contact_id: Uuid,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PolicyRow {
    pub policy_id: Uuid,
    pub name: String,
    pub effective_date: NaiveDate,
    pub annual_premium: i64,
    pub billing_schedule: String,
    pub named_insured: Option<Uuid>,
    pub agent: Option<Uuid>,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub status_changed_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct InvoiceRow {
    pub invoice_id: Uuid,
    pub policy_id: Uuid,
    pub bill_date: NaiveDate,
    pub due_date: NaiveDate,
    pub cancel_date: NaiveDate,
    pub amount_due: i64,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub policy_id: Uuid,
    pub contact_id: Uuid,
    pub amount_paid: i64,
    pub transaction_date: NaiveDate,
}

/// Bounds for invoice listings; every bound is inclusive
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceFilter {
    pub billed_on_or_after: Option<NaiveDate>,
    pub billed_on_or_before: Option<NaiveDate>,
    pub cancel_on_or_before: Option<NaiveDate>,
    pub include_deleted: bool,
}

/// Invoice and policy writes applied in one transaction
#[derive(Debug, Clone, Default)]
pub struct InvoiceChangeSet {
    pub soft_delete: Vec<Uuid>,
    pub create: Vec<InvoiceRow>,
    pub policy: Option<PolicyRow>,
}

const POLICY_COLUMNS: &str = "policy_id, name, effective_date, annual_premium, billing_schedule, \
     named_insured, agent, status, cancellation_reason, status_changed_on";

const INVOICE_COLUMNS: &str =
    "invoice_id, policy_id, bill_date, due_date, cancel_date, amount_due, deleted";

/// Repository for accounting records
#[derive(Debug, Clone)]
pub struct AccountingRepository {
    pool: PgPool,
}

impl AccountingRepository {
    /// Creates a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_policy(&self, policy_id: Uuid) -> Result<PolicyRow, DatabaseError> {
        let sql = format!("SELECT {} FROM policies WHERE policy_id = $1", POLICY_COLUMNS);
        sqlx::query_as::<_, PolicyRow>(&sql)
            .bind(policy_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Policy", policy_id))
    }

    pub async fn find_contact(&self, contact_id: Uuid) -> Result<ContactRow, DatabaseError> {
        sqlx::query_as::<_, ContactRow>(
            "SELECT contact_id, name, role FROM contacts WHERE contact_id = $1",
        )
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Contact", contact_id))
    }

    /// Lists a policy's invoices ordered by bill date
    pub async fn list_invoices(
        &self,
        policy_id: Uuid,
        filter: InvoiceFilter,
    ) -> Result<Vec<InvoiceRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM invoices
            WHERE policy_id = $1
              AND ($2::date IS NULL OR bill_date >= $2)
              AND ($3::date IS NULL OR bill_date <= $3)
              AND ($4::date IS NULL OR cancel_date <= $4)
              AND ($5 OR NOT deleted)
            ORDER BY bill_date, created_at
            "#,
            INVOICE_COLUMNS
        );

        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(policy_id)
            .bind(filter.billed_on_or_after)
            .bind(filter.billed_on_or_before)
            .bind(filter.cancel_on_or_before)
            .bind(filter.include_deleted)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Lists a policy's payments ordered by transaction date
    pub async fn list_payments(
        &self,
        policy_id: Uuid,
        on_or_before: Option<NaiveDate>,
    ) -> Result<Vec<PaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, policy_id, contact_id, amount_paid, transaction_date
            FROM payments
            WHERE policy_id = $1
              AND ($2::date IS NULL OR transaction_date <= $2)
            ORDER BY transaction_date, created_at
            "#,
        )
        .bind(policy_id)
        .bind(on_or_before)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn insert_payment(&self, payment: &PaymentRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (payment_id, policy_id, contact_id, amount_paid, transaction_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(payment.payment_id)
        .bind(payment.policy_id)
        .bind(payment.contact_id)
        .bind(payment.amount_paid)
        .bind(payment.transaction_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_policy(&self, policy: &PolicyRow) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        write_policy(&mut *conn, policy).await
    }

    /// Applies soft deletions, inserts and a policy update atomically
    ///
    /// # Errors
    ///
    /// Returns `TransactionFailed` if any invoice to delete is missing or
    /// already deleted. Nothing is written in that case.
    pub async fn apply_changes(
        &self,
        policy_id: Uuid,
        changes: &InvoiceChangeSet,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        if !changes.soft_delete.is_empty() {
            let result = sqlx::query(
                r#"
                UPDATE invoices SET deleted = TRUE
                WHERE policy_id = $1 AND invoice_id = ANY($2) AND NOT deleted
                "#,
            )
            .bind(policy_id)
            .bind(&changes.soft_delete)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() != changes.soft_delete.len() as u64 {
                return Err(DatabaseError::TransactionFailed(format!(
                    "expected to soft-delete {} invoices, matched {}",
                    changes.soft_delete.len(),
                    result.rows_affected()
                )));
            }
        }

        for invoice in &changes.create {
            sqlx::query(
                r#"
                INSERT INTO invoices (invoice_id, policy_id, bill_date, due_date, cancel_date, amount_due, deleted)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(invoice.invoice_id)
            .bind(invoice.policy_id)
            .bind(invoice.bill_date)
            .bind(invoice.due_date)
            .bind(invoice.cancel_date)
            .bind(invoice.amount_due)
            .bind(invoice.deleted)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(policy) = &changes.policy {
            write_policy(&mut *tx, policy).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))
    }
}

async fn write_policy(
    conn: &mut sqlx::PgConnection,
    policy: &PolicyRow,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE policies
        SET name = $2, effective_date = $3, annual_premium = $4, billing_schedule = $5,
            named_insured = $6, agent = $7, status = $8, cancellation_reason = $9,
            status_changed_on = $10
        WHERE policy_id = $1
        "#,
    )
    .bind(policy.policy_id)
    .bind(&policy.name)
    .bind(policy.effective_date)
    .bind(policy.annual_premium)
    .bind(&policy.billing_schedule)
    .bind(policy.named_insured)
    .bind(policy.agent)
    .bind(&policy.status)
    .bind(&policy.cancellation_reason)
    .bind(policy.status_changed_on)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Policy", policy.policy_id));
    }
    Ok(())
}

//! Account statement
//!
//! Read-only projection of a policy's account at a date: the invoices billed
//! so far and the resulting balance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::PolicyId;

use crate::invoice::Invoice;

/// One billed invoice on a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub bill_date: NaiveDate,
    pub due_date: NaiveDate,
    pub cancel_date: NaiveDate,
    pub amount_due: i64,
}

impl From<&Invoice> for StatementLine {
    fn from(invoice: &Invoice) -> Self {
        Self {
            bill_date: invoice.bill_date,
            due_date: invoice.due_date,
            cancel_date: invoice.cancel_date,
            amount_due: invoice.amount_due,
        }
    }
}

/// A policy account as of a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatement {
    /// Policy the statement is for
    pub policy_id: PolicyId,
    /// Date the statement was computed at
    pub as_of: NaiveDate,
    /// Live invoices billed on or before `as_of`, oldest first
    pub invoices: Vec<StatementLine>,
    /// Billed minus paid; negative is a credit
    pub balance: i64,
}

impl AccountStatement {
    /// Builds a statement from already-filtered invoices
    pub fn new(policy_id: PolicyId, as_of: NaiveDate, invoices: &[Invoice], balance: i64) -> Self {
        Self {
            policy_id,
            as_of,
            invoices: invoices.iter().map(StatementLine::from).collect(),
            balance,
        }
    }

    /// Total billed on the statement
    pub fn total_billed(&self) -> i64 {
        self.invoices.iter().map(|line| line.amount_due).sum()
    }

    /// Total paid through `as_of`
    pub fn total_paid(&self) -> i64 {
        self.total_billed() - self.balance
    }
}

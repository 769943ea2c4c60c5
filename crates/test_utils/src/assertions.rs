//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for invoices and balances that give
//! more meaningful error messages than standard assertions.

use chrono::NaiveDate;

use core_kernel::add_months;
use domain_billing::{AccountingSession, Invoice};

/// Asserts that invoice amounts add up to the expected total
pub fn assert_amounts_sum_to(invoices: &[Invoice], expected: i64) {
    let total: i64 = invoices.iter().map(|i| i.amount_due).sum();
    assert_eq!(
        total, expected,
        "Invoice amounts sum to {}, expected {} ({:?})",
        total,
        expected,
        invoices.iter().map(|i| i.amount_due).collect::<Vec<_>>()
    );
}

/// Asserts that invoices are billed every `months` months starting at `first`
///
/// # Panics
///
/// Panics on the first invoice whose bill date is off the expected cadence
pub fn assert_billed_every(invoices: &[Invoice], first: NaiveDate, months: u32) {
    for (n, invoice) in invoices.iter().enumerate() {
        let expected = add_months(first, months * n as u32).unwrap();
        assert_eq!(
            invoice.bill_date, expected,
            "Invoice {} billed on {}, expected {}",
            n, invoice.bill_date, expected
        );
    }
}

/// Asserts that every invoice's due and cancel dates follow from its bill date
pub fn assert_invoice_dates_consistent(invoices: &[Invoice]) {
    for invoice in invoices {
        assert!(
            invoice.bill_date < invoice.due_date && invoice.due_date < invoice.cancel_date,
            "Invoice dates out of order: bill {}, due {}, cancel {}",
            invoice.bill_date,
            invoice.due_date,
            invoice.cancel_date
        );
    }
}

/// Asserts the session's balance as of a date
pub async fn assert_balance(session: &AccountingSession, as_of: NaiveDate, expected: i64) {
    let balance = session.return_account_balance(Some(as_of)).await.unwrap();
    assert_eq!(
        balance, expected,
        "Balance as of {} is {}, expected {}",
        as_of, balance, expected
    );
}

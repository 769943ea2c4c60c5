//! Billing Domain - Policy Accounting
//!
//! This crate turns a policy's premium, effective date and billing schedule
//! into a stream of invoices, records payments against that stream, and
//! answers point-in-time questions about it.
//!
//! # Components
//!
//! - **Schedule Engine** ([`ScheduleEngine`]): pure function from a policy to
//!   its invoice drafts. No state, no I/O.
//! - **Accounting Session** ([`AccountingSession`]): per-policy controller
//!   that makes sure invoices exist, takes payments, computes balances,
//!   evaluates non-payment cancellation and reschedules mid-term.
//! - **Storage port** ([`AccountingStore`]): what the session needs from
//!   persistence. Multi-step mutations travel as one [`UnitOfWork`].
//!
//! # Balance
//!
//! The balance as of a date is everything billed on or before that date on
//! live (not soft-deleted) invoices, minus everything paid on or before it.
//! A negative balance is a credit.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::AccountingSession;
//!
//! let mut session = AccountingSession::open(store, policy_id).await?;
//!
//! session.make_payment(None, Some(bill_date), 400).await?;
//! let balance = session.return_account_balance(Some(bill_date)).await?;
//!
//! if session.evaluate_cancellation_pending_due_to_non_pay(None).await? {
//!     session.cancel_policy("non-payment").await?;
//! }
//! ```

pub mod invoice;
pub mod payment;
pub mod schedule;
pub mod ports;
pub mod session;
pub mod statement;
pub mod error;

pub use invoice::{Invoice, InvoiceDraft};
pub use payment::{Payment, NewPayment};
pub use schedule::{ScheduleEngine, split_amount};
pub use ports::{AccountingStore, InvoiceQuery, PaymentQuery, UnitOfWork};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::InMemoryAccountingStore;
pub use session::{AccountingSession, PendingSession, SessionState};
pub use statement::{AccountStatement, StatementLine};
pub use error::BillingError;

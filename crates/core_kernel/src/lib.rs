//! Core Kernel - Foundational types and utilities for the policy accounting engine
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed identifiers for policies, invoices, payments and contacts
//! - Calendar arithmetic for billing dates and policy terms
//! - Port error types shared by every storage adapter

pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use temporal::{PolicyTerm, TemporalError, add_months, add_days};
pub use identifiers::{PolicyId, InvoiceId, PaymentId, ContactId};
pub use error::CoreError;
pub use ports::{PortError, DomainPort};

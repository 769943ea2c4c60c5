//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! policy accounting test suite.
//!
//! # Modules
//!
//! - `fixtures`: Dates and a ready-made in-memory accounting setup
//! - `builders`: Builder patterns for test policies and contacts
//! - `database`: PostgreSQL container management for adapter tests
//! - `assertions`: Custom assertion helpers for invoices and balances
//! - `generators`: Property-based test data generators
//! - `recording`: Store decorator that records the queries it receives

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;
pub mod recording;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
pub use recording::*;

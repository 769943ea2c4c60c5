//! Domain Adapters
//!
//! Implementations of domain ports on top of the repository layer.

pub mod accounting;

pub use accounting::PgAccountingStore;

//! SQL repositories
//!
//! Repositories speak rows and `DatabaseError`; domain mapping happens in
//! the adapters.

pub mod accounting;

pub use accounting::AccountingRepository;

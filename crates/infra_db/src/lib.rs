//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the policy accounting engine, built on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. [`repositories`] holds the SQL
//! and plain row types; [`adapters`] implements the domain's
//! `AccountingStore` port on top of it, translating rows into domain models
//! and database errors into `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgAccountingStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/accounting")).await?;
//! run_migrations(&pool).await?;
//! let store: Arc<dyn AccountingStore> = Arc::new(PgAccountingStore::new(pool));
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::PgAccountingStore;

//! Database Test Utilities
//!
//! Provides helpers for database testing including testcontainer management
//! and seeding of policies and contacts for PostgreSQL adapter tests.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;

use domain_party::Contact;
use domain_policy::Policy;
use infra_db::{create_pool, run_migrations, DatabaseConfig, PgAccountingStore};

/// Default PostgreSQL image for testing
const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "accounting_test";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A wrapper around a PostgreSQL test container
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container with the accounting schema applied
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or migrations fail
    pub async fn new() -> Result<Self, BoxError> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            host,
            port,
            ..TestDatabaseConfig::default()
        };

        let pool = create_pool(
            DatabaseConfig::new(config.connection_url())
                .max_connections(5)
                .connect_timeout(Duration::from_secs(30)),
        )
        .await?;
        run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            config,
            pool,
        })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns an accounting store over this database
    pub fn store(&self) -> PgAccountingStore {
        PgAccountingStore::new(self.pool.clone())
    }

    /// Inserts a contact row
    pub async fn insert_contact(&self, contact: &Contact) -> Result<(), BoxError> {
        sqlx::query("INSERT INTO contacts (contact_id, name, role) VALUES ($1, $2, $3)")
            .bind(*contact.id.as_uuid())
            .bind(&contact.name)
            .bind(contact.role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts a policy row
    pub async fn insert_policy(&self, policy: &Policy) -> Result<(), BoxError> {
        self.insert_policy_with_schedule(policy, policy.billing_schedule.as_str())
            .await
    }

    /// Inserts a policy row with a raw billing schedule value
    ///
    /// The schema does not constrain the column, so this can store values
    /// the domain would reject.
    pub async fn insert_policy_with_schedule(
        &self,
        policy: &Policy,
        billing_schedule: &str,
    ) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO policies (policy_id, name, effective_date, annual_premium,
                                  billing_schedule, named_insured, agent, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*policy.id.as_uuid())
        .bind(&policy.name)
        .bind(policy.effective_date)
        .bind(policy.annual_premium)
        .bind(billing_schedule)
        .bind(policy.named_insured.map(|c| *c.as_uuid()))
        .bind(policy.agent.map(|c| *c.as_uuid()))
        .bind(policy.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Clears all data from the database while preserving the schema
    ///
    /// Useful for resetting state between tests
    pub async fn clear_data(&self) -> Result<(), BoxError> {
        for table in ["payments", "invoices", "policies", "contacts"] {
            sqlx::query(&format!("TRUNCATE TABLE {} CASCADE", table))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

/// Global test database for shared integration tests
static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// Gets or creates a shared test database instance
///
/// # Panics
///
/// Panics if the database fails to initialize
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

/// Creates an isolated test database for a single test
pub async fn create_isolated_test_database() -> Result<TestDatabase, BoxError> {
    TestDatabase::new().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let config = TestDatabaseConfig::default();
        let url = config.connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.contains(POSTGRES_DB));
    }
}

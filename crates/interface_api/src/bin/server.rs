//! Policy Accounting - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # PostgreSQL storage
//! API_DATABASE_URL=postgres://localhost/accounting cargo run --bin accounting-api
//!
//! # In-memory storage with the demo dataset
//! API_STORAGE=memory API_SEED_DEMO_DATA=true cargo run --bin accounting-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_STORAGE` - `postgres` or `memory` (default: postgres)
//! * `API_SEED_DEMO_DATA` - Load the demo dataset into memory storage (default: false)
//! * `API_LOG_LEVEL` - Log filter, overridden by `RUST_LOG` (default: info)
//! * `API_LOG_FORMAT` - `text` or `json` (default: text)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_billing::{AccountingStore, InMemoryAccountingStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PgAccountingStore};
use interface_api::config::{ApiConfig, LogFormat, StorageBackend};
use interface_api::create_router;
use interface_api::seed::DemoDataset;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;
    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = ?config.storage,
        "Starting policy accounting API server"
    );

    let store = build_store(&config).await?;
    let app = create_router(store, config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ApiConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

async fn build_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn AccountingStore>> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool = create_pool(DatabaseConfig::new(&config.database_url))
                .await
                .context("connecting to database")?;
            run_migrations(&pool).await.context("running migrations")?;
            Ok(Arc::new(PgAccountingStore::new(pool)))
        }
        StorageBackend::Memory => {
            let store = InMemoryAccountingStore::new();
            if config.seed_demo_data {
                DemoDataset::build()?.load(&store).await?;
            }
            Ok(Arc::new(store))
        }
    }
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

//! HTTP API Layer
//!
//! REST API for the policy accounting engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one accounting session per request
//! - **Middleware**: request ids, tracing, request logging, CORS
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: `BillingError` mapped onto JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(store, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod seed;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_billing::AccountingStore;

use crate::config::ApiConfig;
use crate::handlers::{accounting, health};
use crate::middleware::request_logging;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountingStore>,
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(store: Arc<dyn AccountingStore>, config: ApiConfig) -> Router {
    let state = AppState { store, config };

    let policy_routes = Router::new()
        .route("/:id/statement/:as_of", get(accounting::get_statement))
        .route("/:id/payments", post(accounting::make_payment))
        .route("/:id/cancellation", get(accounting::evaluate_cancellation))
        .route("/:id/cancel", post(accounting::cancel_policy))
        .route("/:id/schedule", put(accounting::change_schedule));

    let api_routes = Router::new()
        .nest("/policies", policy_routes)
        .layer(axum_middleware::from_fn(request_logging));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::analytics::AnalyticsEngine;

pub use middleware::ApiKeys;
pub use routes::create_router;

/// State shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub analytics: Arc<AnalyticsEngine>,
    pub api_keys: ApiKeys,
}

impl AppState {
    pub fn new(pool: PgPool, analytics: AnalyticsEngine, api_keys: ApiKeys) -> Self {
        Self {
            pool,
            analytics: Arc::new(analytics),
            api_keys,
        }
    }
}

/// Build the application router
///
/// Layers run outermost first: trace, request logging, API key auth.
pub fn build_router(state: AppState) -> Router {
    let protected_routes = create_router()
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .layer(from_fn(middleware::logging_middleware));

    Router::new()
        // Health check (no auth)
        .route("/health", get(health_check))
        .nest("/api", protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

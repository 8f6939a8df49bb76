//! API gateway HTTP layer.
//!
//! The gateway is the single entry point for clients: it validates bearer
//! tokens issued by the account service, then forwards requests to the
//! downstream service owning the path prefix. Auth endpoints and the health
//! check are public; everything else sits behind the authentication filter.

pub mod config;
pub mod middleware;
pub mod proxy;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{any, get},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use velora_shared::TokenProvider;

use crate::proxy::RouteTable;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Token provider (validation only; the gateway never issues tokens).
    pub token_provider: Arc<TokenProvider>,
    /// HTTP client for downstream services.
    pub client: reqwest::Client,
    /// Path-prefix routing table.
    pub routes: Arc<RouteTable>,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    // Everything without an explicit public route goes through the filter
    // before being forwarded downstream.
    let protected = Router::new()
        .fallback(proxy::forward)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        // Login/register/refresh must be reachable without a token.
        .route("/accounts/auth/{*rest}", any(proxy::forward))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

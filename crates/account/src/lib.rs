//! Account service HTTP layer.
//!
//! This crate provides:
//! - Registration, login, and token refresh routes
//! - An in-memory user store
//! - Password hashing helpers

pub mod config;
pub mod password;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use velora_shared::TokenProvider;

use crate::store::UserStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Token provider for issuing and validating tokens.
    pub token_provider: Arc<TokenProvider>,
    /// User store.
    pub users: Arc<UserStore>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

//! Velora Account Service
//!
//! Registers users and issues access/refresh tokens.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use velora_account::{AppState, config::AccountConfig, create_router, store::UserStore};
use velora_shared::TokenProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "velora=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; an invalid JWT section must abort startup.
    let config = AccountConfig::load().context("Failed to load account configuration")?;

    let token_provider = TokenProvider::new(config.security.jwt.clone());

    let state = AppState {
        token_provider: Arc::new(token_provider),
        users: Arc::new(UserStore::new()),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Account service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

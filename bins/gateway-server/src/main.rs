//! Velora API Gateway
//!
//! Validates bearer tokens and forwards requests to downstream services.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use velora_gateway::{AppState, config::GatewayConfig, create_router, proxy::RouteTable};
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
    let config = GatewayConfig::load().context("Failed to load gateway configuration")?;

    let token_provider = TokenProvider::new(config.security.jwt.clone());
    let routes = RouteTable::from_config(&config.routes);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build downstream HTTP client")?;

    let state = AppState {
        token_provider: Arc::new(token_provider),
        client,
        routes: Arc::new(routes),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

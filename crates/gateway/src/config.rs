//! Gateway service configuration.

use serde::Deserialize;
use velora_shared::config::{SecurityConfig, ServerConfig, load_config};

/// Gateway service configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Security configuration (JWT validation). Must use the same secret as
    /// the account service or no token will validate.
    pub security: SecurityConfig,
    /// Downstream service base URLs.
    pub routes: RoutesConfig,
}

/// Base URLs of the downstream services, one per path prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    /// Account service base URL (prefix `/accounts`).
    pub account_url: String,
    /// Checkout service base URL (prefix `/checkout`).
    pub checkout_url: String,
    /// Order service base URL (prefix `/orders`).
    pub order_url: String,
    /// Stock service base URL (prefix `/stock`).
    pub stock_url: String,
}

impl GatewayConfig {
    /// Loads and validates the gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or malformed; the
    /// service must fail to start in that case.
    pub fn load() -> Result<Self, config::ConfigError> {
        let cfg: Self = load_config("gateway", "VELORA_GATEWAY")?;
        cfg.security.jwt.validate()?;
        Ok(cfg)
    }
}

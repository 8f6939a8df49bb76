//! Account service configuration.

use serde::Deserialize;
use velora_shared::config::{SecurityConfig, ServerConfig, load_config};

/// Account service configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Security configuration (JWT issuance).
    pub security: SecurityConfig,
}

impl AccountConfig {
    /// Loads and validates the account service configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or malformed; the
    /// service must fail to start in that case.
    pub fn load() -> Result<Self, config::ConfigError> {
        let cfg: Self = load_config("account", "VELORA_ACCOUNT")?;
        cfg.security.jwt.validate()?;
        Ok(cfg)
    }
}

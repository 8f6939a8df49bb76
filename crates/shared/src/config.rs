//! Per-service configuration management.
//!
//! Every service (account, gateway, ...) loads its own configuration copy at
//! startup and keeps it immutable for the process lifetime. The JWT section
//! must be configured identically across services for cross-service token
//! validation to succeed; that is an operational invariant, not one enforced
//! here.

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Security configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT signing configuration.
    pub jwt: JwtConfig,
}

/// JWT configuration (`security.jwt.*` keys).
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens.
    pub secret_key: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiration")]
    pub access_token_expiration_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiration")]
    pub refresh_token_expiration_secs: u64,
}

fn default_access_token_expiration() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiration() -> u64 {
    604_800 // 7 days
}

/// Upper bound on configured token lifetimes (10 years).
const MAX_TOKEN_EXPIRATION_SECS: u64 = 315_360_000;

impl JwtConfig {
    /// Checks the startup invariants: non-empty secret, positive and bounded
    /// expirations.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when any invariant is violated. Callers
    /// are expected to fail startup, not defer to request time.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.secret_key.is_empty() {
            return Err(config::ConfigError::Message(
                "security.jwt.secret_key must not be empty".to_string(),
            ));
        }
        if self.access_token_expiration_secs == 0 {
            return Err(config::ConfigError::Message(
                "security.jwt.access_token_expiration_secs must be positive".to_string(),
            ));
        }
        if self.refresh_token_expiration_secs == 0 {
            return Err(config::ConfigError::Message(
                "security.jwt.refresh_token_expiration_secs must be positive".to_string(),
            ));
        }
        if self.access_token_expiration_secs > MAX_TOKEN_EXPIRATION_SECS
            || self.refresh_token_expiration_secs > MAX_TOKEN_EXPIRATION_SECS
        {
            return Err(config::ConfigError::Message(format!(
                "security.jwt token expirations must not exceed {MAX_TOKEN_EXPIRATION_SECS} seconds"
            )));
        }
        Ok(())
    }
}

/// Loads a service configuration from layered files and environment.
///
/// Sources, later overriding earlier: `config/<service>/default`,
/// `config/<service>/<RUN_MODE>`, then environment variables prefixed with
/// `<env_prefix>` using `__` as the section separator (for example
/// `VELORA_GATEWAY__SECURITY__JWT__SECRET_KEY`).
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or deserialized.
pub fn load_config<T: DeserializeOwned>(
    service: &str,
    env_prefix: &str,
) -> Result<T, config::ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

    let config = config::Config::builder()
        .add_source(config::File::with_name(&format!("config/{service}/default")).required(false))
        .add_source(
            config::File::with_name(&format!("config/{service}/{run_mode}")).required(false),
        )
        .add_source(config::Environment::with_prefix(env_prefix).separator("__"))
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_config(secret: &str, access: u64, refresh: u64) -> JwtConfig {
        JwtConfig {
            secret_key: secret.to_string(),
            access_token_expiration_secs: access,
            refresh_token_expiration_secs: refresh,
        }
    }

    #[test]
    fn test_valid_jwt_config_passes() {
        assert!(jwt_config("a-secret", 900, 604_800).validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(jwt_config("", 900, 604_800).validate().is_err());
    }

    #[test]
    fn test_zero_access_expiration_rejected() {
        assert!(jwt_config("a-secret", 0, 604_800).validate().is_err());
    }

    #[test]
    fn test_zero_refresh_expiration_rejected() {
        assert!(jwt_config("a-secret", 900, 0).validate().is_err());
    }

    #[test]
    fn test_oversized_expirations_rejected() {
        assert!(jwt_config("a-secret", u64::MAX, 604_800).validate().is_err());
        assert!(jwt_config("a-secret", 900, u64::MAX).validate().is_err());
        assert!(
            jwt_config("a-secret", MAX_TOKEN_EXPIRATION_SECS, MAX_TOKEN_EXPIRATION_SECS)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_expiration_defaults() {
        let jwt: JwtConfig =
            serde_json::from_value(serde_json::json!({ "secret_key": "s" })).unwrap();
        assert_eq!(jwt.access_token_expiration_secs, 900);
        assert_eq!(jwt.refresh_token_expiration_secs, 604_800);
    }
}

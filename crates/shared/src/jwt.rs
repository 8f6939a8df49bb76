//! JWT token issuance and validation.
//!
//! Tokens are stateless HS256-signed JWTs: validation is a pure function of
//! (token, secret, current time), so any service configured with the shared
//! secret can validate tokens issued by another service without a shared
//! database. The trade-off is that issued tokens cannot be revoked.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::Claims;
use crate::config::JwtConfig;
use crate::types::{Role, UserId};

/// Which lifetime a token is issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived token authorizing requests.
    Access,
    /// Longer-lived token used to obtain new access tokens.
    Refresh,
}

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    Encoding(String),

    /// Token cannot be parsed into the expected structure.
    #[error("token is malformed")]
    Malformed,

    /// Signature check failed (forged or signed with a different secret).
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Token expiration has passed.
    #[error("token has expired")]
    Expired,
}

/// Issues and validates signed tokens.
///
/// Built once per service from its [`JwtConfig`] and shared read-only across
/// request handlers.
#[derive(Clone)]
pub struct TokenProvider {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("access_expiration_secs", &self.config.access_token_expiration_secs)
            .field("refresh_expiration_secs", &self.config.refresh_token_expiration_secs)
            .field("secret_key", &"[hidden]")
            .finish()
    }
}

impl TokenProvider {
    /// Creates a new token provider from the service JWT configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a signed token for a user.
    ///
    /// The expiration is `now + access_token_expiration_secs` for
    /// [`TokenKind::Access`] and `now + refresh_token_expiration_secs` for
    /// [`TokenKind::Refresh`]. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue(
        &self,
        user_id: UserId,
        email: &str,
        role: Role,
        kind: TokenKind,
    ) -> Result<String, TokenError> {
        let lifetime_secs = match kind {
            TokenKind::Access => self.config.access_token_expiration_secs,
            TokenKind::Refresh => self.config.refresh_token_expiration_secs,
        };
        // `Duration::seconds` panics out of range; a misconfigured lifetime
        // must surface as an error, not a panic at issue time.
        let lifetime = i64::try_from(lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| TokenError::Encoding("token lifetime out of range".to_string()))?;
        let expires_at = Utc::now() + lifetime;
        let claims = Claims::new(user_id, email, role, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Issues an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue_access_token(
        &self,
        user_id: UserId,
        email: &str,
        role: Role,
    ) -> Result<String, TokenError> {
        self.issue(user_id, email, role, TokenKind::Access)
    }

    /// Issues a refresh token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue_refresh_token(
        &self,
        user_id: UserId,
        email: &str,
        role: Role,
    ) -> Result<String, TokenError> {
        self.issue(user_id, email, role, TokenKind::Refresh)
    }

    /// Validates and decodes a token.
    ///
    /// The embedded expiration must be strictly in the future; no leeway is
    /// applied, so a token expired one second ago is already rejected.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` if the expiration has passed,
    /// `TokenError::InvalidSignature` if the signature does not match the
    /// configured secret, and `TokenError::Malformed` if the token cannot be
    /// parsed into the expected structure.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The default 60s leeway would accept a token expired a minute ago.
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        // The library check is `exp < now`; the expiration must be strictly
        // in the future, so a token whose exp equals the current second is
        // already dead.
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Returns the access token lifetime in seconds (for `expires_in` fields).
    #[must_use]
    pub fn access_token_expires_in(&self) -> i64 {
        i64::try_from(self.config.access_token_expiration_secs).unwrap_or(i64::MAX)
    }
}

//! Shared types, errors, and configuration for Velora.
//!
//! This crate provides common types used across all services:
//! - Token claims and the JWT token provider
//! - Typed IDs for type-safe entity references
//! - User roles
//! - Application-wide error types
//! - Per-service configuration loading

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, TokenPair};
pub use config::{JwtConfig, SecurityConfig, ServerConfig, load_config};
pub use error::{AppError, AppResult};
pub use jwt::{TokenError, TokenKind, TokenProvider};
pub use types::{Role, UserId};

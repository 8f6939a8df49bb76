//! Common types used across the services.

pub mod id;
pub mod role;

pub use id::*;
pub use role::Role;

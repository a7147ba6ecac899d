//! Shared types for the Bazaar catalog platform
//!
//! Common types used across crates: paginated list envelopes and the
//! caller identity consumed by permission-gated operations.

pub mod auth;
pub mod response;

// Re-exports
pub use auth::{AuthUser, UserRole};
pub use response::{ListResponse, PageMeta};
pub use serde::{Deserialize, Serialize};

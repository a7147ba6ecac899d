//! Caller identity and authorization predicate
//!
//! The catalog core does not issue or validate credentials; it consumes a
//! pre-validated identity plus a role classification and applies a single
//! ownership predicate wherever mutations are permission-gated.

use serde::{Deserialize, Serialize};

/// Role classification for a pre-validated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Privileged caller: may mutate any resource
    Admin,
    /// Standard caller: may only mutate resources they created
    User,
}

/// Pre-validated caller identity attached to each request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Opaque identity, "user:key" form
    pub user_id: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Whether this caller may mutate a resource owned by `owner_id`.
    ///
    /// Shared by the update and delete paths so the two cannot drift.
    pub fn can_modify(&self, owner_id: &str) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::User => self.user_id == owner_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_modify_anything() {
        let admin = AuthUser::new("user:alice", UserRole::Admin);
        assert!(admin.can_modify("user:bob"));
    }

    #[test]
    fn standard_user_only_owns_records() {
        let user = AuthUser::new("user:bob", UserRole::User);
        assert!(user.can_modify("user:bob"));
        assert!(!user.can_modify("user:alice"));
    }
}

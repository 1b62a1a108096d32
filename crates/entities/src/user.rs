//! User-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global role attached to a user account.
///
/// Relationship roles (project manager, task creator, assignee) are implied
/// by data and never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    /// Full access to every operation.
    Admin,
    /// Can create projects and manage teams and assignees.
    Manager,
    Developer,
    Designer,
    Tester,
}

impl Default for GlobalRole {
    fn default() -> Self {
        Self::Developer
    }
}

impl GlobalRole {
    /// Returns the snake_case name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::Admin => "admin",
            GlobalRole::Manager => "manager",
            GlobalRole::Developer => "developer",
            GlobalRole::Designer => "designer",
            GlobalRole::Tester => "tester",
        }
    }
}

impl std::fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GlobalRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(GlobalRole::Admin),
            "manager" => Ok(GlobalRole::Manager),
            "developer" => Ok(GlobalRole::Developer),
            "designer" => Ok(GlobalRole::Designer),
            "tester" => Ok(GlobalRole::Tester),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique display name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2id hash of the password, PHC string format. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Global role.
    pub role: GlobalRole,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with the default `developer` role.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: GlobalRole::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the global role.
    pub fn with_role(mut self, role: GlobalRole) -> Self {
        self.role = role;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("alice", "alice@example.com", "$argon2id$stub")
            .with_role(GlobalRole::Manager);

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, GlobalRole::Manager);
    }

    #[test]
    fn test_role_defaults_to_developer() {
        let user = User::new("bob", "bob@example.com", "hash");
        assert_eq!(user.role, GlobalRole::Developer);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            GlobalRole::Admin,
            GlobalRole::Manager,
            GlobalRole::Developer,
            GlobalRole::Designer,
            GlobalRole::Tester,
        ] {
            assert_eq!(role.as_str().parse::<GlobalRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("carol", "carol@example.com", "secret-hash");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("carol@example.com"));
    }
}

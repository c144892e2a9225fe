//! User model
//!
//! This module defines the User entity. There is no role system: the only
//! authorization rule anywhere in Inkpost is author ownership, checked
//! against the viewer identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: the password must already be hashed. Use
    /// `services::password::hash_password()` first.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for a user editing their own profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub email: Option<String>,
    /// New password (optional, will be hashed)
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "author".to_string(),
            "author@example.com".to_string(),
            "hashed_password".to_string(),
        );
        assert_eq!(user.id, 0);
        assert_eq!(user.username, "author");
        assert_eq!(user.email, "author@example.com");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(
            "author".to_string(),
            "author@example.com".to_string(),
            "secret-hash".to_string(),
        );
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("secret-hash"));
    }
}

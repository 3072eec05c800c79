//! User account types.

use serde::{Deserialize, Serialize};

/// Unique identifier for a user.
pub type UserId = u64;

/// A registered user.
///
/// The password hash is write-only data: it never appears in API responses,
/// only [`UserProfile`] does.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique username.
    pub username: String,
    /// Argon2id hash of the password, PHC-formatted.
    pub password_hash: String,
    /// Unix timestamp when created.
    pub created_at: u64,
}

impl User {
    /// Create a new user from an already-hashed password.
    pub fn new(id: UserId, username: String, password_hash: String) -> Self {
        Self {
            id,
            username,
            password_hash,
            created_at: crate::token::unix_now(),
        }
    }

    /// Validate a username format.
    ///
    /// Usernames must be 1-39 characters of lowercase alphanumerics,
    /// hyphens or underscores, starting and ending alphanumeric.
    pub fn validate_username(username: &str) -> std::result::Result<(), String> {
        if username.is_empty() {
            return Err("username cannot be empty".to_string());
        }

        if username.len() > 39 {
            return Err("username must be 39 characters or less".to_string());
        }

        if !username.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err("username must start with a letter or number".to_string());
        }

        if !username.ends_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err("username must end with a letter or number".to_string());
        }

        for c in username.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
                if c.is_ascii_uppercase() {
                    return Err("username must be lowercase".to_string());
                }
                return Err(format!("invalid character in username: {}", c));
            }
        }

        Ok(())
    }

    /// Convert to a public profile (for API responses).
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public user view for API responses. Carries no credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Unix timestamp when created.
    pub created_at: u64,
}

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Plaintext password; hashed before it is stored.
    pub password: String,
}

/// Request to log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

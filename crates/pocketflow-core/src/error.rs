//! Error types for the core crate.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in authentication and store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Username already exists.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Login failed. Deliberately does not say whether the username or
    /// the password was wrong.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// Bearer token missing, malformed, forged, expired, or bound to an
    /// unknown subject. All collapsed into one signal.
    #[error("could not validate credentials")]
    Unauthorized,

    /// Transaction absent, or owned by someone else. Collapsed into one
    /// signal so foreign resources are indistinguishable from missing ones.
    #[error("transaction not found")]
    NotFound,

    /// Cryptographic operation failed.
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl CoreError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UsernameTaken(_) => 400,
            Self::InvalidUsername(_) => 400,
            Self::InvalidCredentials => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Crypto(_) => 500,
        }
    }
}

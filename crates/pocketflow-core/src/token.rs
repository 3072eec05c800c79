//! Session token issuance and verification.
//!
//! Tokens are stateless bearer credentials: a base64url-encoded JSON claim
//! set and a base64url-encoded HMAC-SHA256 signature over it, joined by a
//! `.` delimiter. Validity is determined entirely by the signature and the
//! embedded expiry; nothing is persisted server-side.
//!
//! The signer is an explicitly constructed value, not a process global, so
//! tests can run with distinct secrets and clocks.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CoreError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime: 30 minutes.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 60;

/// Claim set embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username the token was issued to.
    pub sub: String,
    /// Unix timestamp at issuance.
    pub iat: u64,
    /// Absolute expiry, `iat + ttl`. A token is valid while `now <= exp`.
    pub exp: u64,
}

/// Why a token was rejected.
///
/// Diagnostic detail for logs and tests only. Callers facing the outside
/// world must collapse every variant into the same unauthorized signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFault {
    /// Not two base64url segments carrying a JSON claim set.
    Malformed,
    /// Signature did not match the claims segment.
    Signature,
    /// Structurally valid and correctly signed, but past its expiry.
    Expired,
}

/// Issues and verifies signed session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret.
        f.debug_struct("TokenSigner")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Create a signer with the given secret and token lifetime in seconds.
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    /// Create a signer with the default 30 minute lifetime.
    pub fn with_default_ttl(secret: impl Into<Vec<u8>>) -> Self {
        Self::new(secret, DEFAULT_TOKEN_TTL_SECS)
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a token for `username`, expiring `ttl_secs` from now.
    pub fn issue(&self, username: &str) -> Result<String> {
        self.issue_at(username, unix_now())
    }

    /// Issue a token as of an explicit clock reading.
    pub fn issue_at(&self, username: &str, now: u64) -> Result<String> {
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        let payload = serde_json::to_vec(&claims).map_err(|e| CoreError::Crypto(e.to_string()))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| CoreError::Crypto(e.to_string()))?;
        mac.update(payload_b64.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{payload_b64}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify a token against the current clock.
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenFault> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token as of an explicit clock reading.
    ///
    /// The pipeline runs structure, signature, then expiry; each step is
    /// deterministic given (token, now) and touches no external state.
    pub fn verify_at(&self, token: &str, now: u64) -> std::result::Result<Claims, TokenFault> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(TokenFault::Malformed)?;
        if payload_b64.is_empty() || signature_b64.is_empty() || signature_b64.contains('.') {
            return Err(TokenFault::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenFault::Malformed)?;

        // Recompute over the encoded claims segment. verify_slice compares
        // in constant time.
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenFault::Signature)?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenFault::Signature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenFault::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenFault::Malformed)?;

        if now > claims.exp {
            return Err(TokenFault::Expired);
        }

        Ok(claims)
    }
}

/// Current Unix timestamp in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

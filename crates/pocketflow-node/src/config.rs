//! Node configuration types.

use pocketflow_core::DEFAULT_TOKEN_TTL_SECS;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Configuration for the PocketFlow node.
///
/// Loaded from a YAML file and overridable by CLI flags. The token secret
/// and TTL are read once at startup and never rotated at runtime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// API listen address.
    pub listen_addr: SocketAddr,
    /// Secret key used to sign session tokens.
    pub token_secret: String,
    /// Session token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Emit logs as JSON instead of pretty text.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            token_secret: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.token_ttl_secs, 30 * 60);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("token_secret: s3cret\n").unwrap();
        assert_eq!(config.token_secret, "s3cret");
        assert_eq!(config.token_ttl_secs, 30 * 60);
    }
}

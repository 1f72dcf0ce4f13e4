//! Transport configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Result, TransportError};

/// Which transport the dispatcher uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Full onion routing (default).
    #[default]
    Onion,
    /// Single-hop relay proxying, for deployments with onion routing
    /// administratively disabled.
    Proxy,
    /// Plain HTTPS, only for unauthenticated bootstrap calls.
    Direct,
}

/// Complete transport configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport selection.
    #[serde(default)]
    pub mode: TransportMode,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Maximum fresh paths tried before an onion request gives up.
    #[serde(default = "default_max_path_attempts")]
    pub max_path_attempts: u32,
    /// Maximum proxy attempts across relay faults (401/500/503).
    #[serde(default = "default_proxy_retry_limit")]
    pub proxy_retry_limit: u32,
    /// Maximum 504s tolerated before the target is declared unreachable.
    #[serde(default = "default_proxy_unreachable_limit")]
    pub proxy_unreachable_limit: u32,
    /// Sleep before retrying after a relay-side 500, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

// Default value functions

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_path_attempts() -> u32 {
    3
}

fn default_proxy_retry_limit() -> u32 {
    5
}

fn default_proxy_unreachable_limit() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    5_000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Onion,
            request_timeout_secs: default_request_timeout_secs(),
            max_path_attempts: default_max_path_attempts(),
            proxy_retry_limit: default_proxy_retry_limit(),
            proxy_unreachable_limit: default_proxy_unreachable_limit(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl TransportConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| TransportError::Config(e.to_string()))?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TransportError::Config(e.to_string()))
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("SABLE_DATA_DIR") {
            return PathBuf::from(dir).join("transport.toml");
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".sable"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/sable"))
            .join("transport.toml")
    }
}

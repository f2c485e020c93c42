//! Store policy configuration.
//!
//! ```toml
//! capacity = 5242880
//! truncate_threshold = 1000
//! prune_cap = 50
//! retry_prune_cap = 20
//! protected_key = "blogverse_blogs"
//! sweep_markers = ["_temp_", "_cache_", "_backup"]
//! ```
//!
//! Every field is optional in the file; missing fields take the defaults.

use serde::Deserialize;
use std::path::Path;

use crate::policy::{
    DEFAULT_PRUNE_CAP, DEFAULT_RETRY_PRUNE_CAP, DEFAULT_SWEEP_MARKERS, DEFAULT_THRESHOLD,
};

/// Nominal ceiling used for usage reporting (5MB).
pub const DEFAULT_CAPACITY: u64 = 5 * 1024 * 1024;

/// Key holding the full blog catalog, exempt from first-write reduction.
pub const BLOGS_KEY: &str = "blogverse_blogs";
/// Key holding the signed-in user.
pub const USER_KEY: &str = "blogverse_user";
/// Key holding every registered account.
pub const USERS_KEY: &str = "blogverse_users";

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Policy knobs of the bounded store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Nominal ceiling in bytes, for reporting only (default: 5MB)
    pub capacity: u64,
    /// `content` length (characters) above which reduction truncates (default: 1000)
    pub truncate_threshold: usize,
    /// Array items kept by `prune_old` on the first write (default: 50)
    pub prune_cap: usize,
    /// Array items kept on the quota-recovery retry (default: 20)
    pub retry_prune_cap: usize,
    /// Key never reduced on the first write (default: `blogverse_blogs`)
    pub protected_key: Option<String>,
    /// Substrings marking sweep-eligible keys
    pub sweep_markers: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            truncate_threshold: DEFAULT_THRESHOLD,
            prune_cap: DEFAULT_PRUNE_CAP,
            retry_prune_cap: DEFAULT_RETRY_PRUNE_CAP,
            protected_key: Some(BLOGS_KEY.to_string()),
            sweep_markers: DEFAULT_SWEEP_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl StoreConfig {
    /// Config for testing (64KB nominal ceiling, default policies).
    pub fn for_testing() -> Self {
        Self {
            capacity: 64 * 1024,
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject settings the store cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be positive".into()));
        }
        if self.retry_prune_cap > self.prune_cap {
            return Err(ConfigError::Invalid(format!(
                "retry_prune_cap ({}) must not exceed prune_cap ({})",
                self.retry_prune_cap, self.prune_cap
            )));
        }
        if self.sweep_markers.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid("sweep markers must not be empty".into()));
        }
        Ok(())
    }

    /// Whether `key` is the protected large-collection key.
    pub fn is_protected(&self, key: &str) -> bool {
        self.protected_key.as_deref() == Some(key)
    }
}

//! Monitor configuration file.
//!
//! ```toml
//! [medium]
//! data_dir = "blogverse_data"
//! quota = 5242880
//! sync_writes = true
//!
//! [store]
//! capacity = 5242880
//! sweep_markers = ["_temp_", "_cache_", "_backup"]
//! ```

use std::path::{Path, PathBuf};

use blogverse_store::{ConfigError, RocksConfig, StoreConfig};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Store(#[from] ConfigError),
}

/// Top-level settings file.
#[derive(Debug, Deserialize, Default)]
pub struct MonitorSettings {
    #[serde(default)]
    pub medium: MediumSettings,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize)]
pub struct MediumSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_quota")]
    pub quota: u64,
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

impl Default for MediumSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            quota: default_quota(),
            sync_writes: default_sync_writes(),
        }
    }
}

impl MonitorSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.store.validate()?;
        Ok(settings)
    }

    /// Enforce `quota` on the medium and report usage against it.
    pub fn set_quota(&mut self, quota: u64) {
        self.medium.quota = quota;
        self.store.capacity = quota;
    }

    /// RocksDB medium configuration derived from these settings.
    pub fn rocks_config(&self) -> RocksConfig {
        RocksConfig {
            path: self.medium.data_dir.clone(),
            quota: self.medium.quota,
            sync_writes: self.medium.sync_writes,
            ..RocksConfig::default()
        }
    }
}

// ── Default value functions ──────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("blogverse_data")
}

fn default_quota() -> u64 {
    blogverse_store::config::DEFAULT_CAPACITY
}

fn default_sync_writes() -> bool {
    true
}

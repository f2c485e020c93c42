//! The bounded persistent store.
//!
//! Save path:
//! ```text
//!  value ──► JSON ──► [reduce if > max_size] ──► [prune to 50] ──► [LZ4] ──► put
//!                                                                           │
//!                                                         QuotaExceeded ◄───┘
//!                                                               │
//!   cleanup sweep ──► reduce(original) ──► prune to 20 ──► [LZ4] ──► put (last try)
//! ```
//!
//! Callers never see a medium error. Writes report a boolean (or a
//! [`SaveOutcome`]), reads fall back to the caller's default.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec;
use crate::config::StoreConfig;
use crate::medium::{MediumError, StorageMedium};
use crate::policy::{is_sweep_eligible, prune, reduce};
use crate::usage::UsageInfo;

/// Size threshold of the primary persistence path (1MB).
pub const PRIMARY_MAX_SIZE: usize = 1024 * 1024;

/// Per-call write policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveOptions {
    /// LZ4-compress the serialized record
    pub compress: bool,
    /// Serialized size above which the record is reduced before the first write
    pub max_size: Option<usize>,
    /// Trim array records to the most recent items on the first write
    pub prune_old: bool,
}

impl SaveOptions {
    /// Options of the application's primary persistence path.
    pub fn primary() -> Self {
        Self {
            compress: true,
            max_size: Some(PRIMARY_MAX_SIZE),
            prune_old: true,
        }
    }

    /// Write as-is: no compression, reduction or pruning on the first write.
    pub fn plain() -> Self {
        Self::default()
    }
}

/// What a save did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written on the first attempt.
    Stored {
        /// Records truncated because of `max_size`
        truncated: usize,
        /// Array items dropped by `prune_old`
        dropped: usize,
    },
    /// First write refused for lack of space; the reduced retry succeeded.
    Recovered {
        /// Transient keys deleted by the cleanup sweep
        swept: usize,
        /// Records truncated on the retry
        truncated: usize,
        /// Array items dropped on the retry
        dropped: usize,
    },
    /// Nothing was written.
    Failed,
}

impl SaveOutcome {
    /// Whether the record (possibly degraded) is now resident.
    pub fn is_stored(&self) -> bool {
        !matches!(self, SaveOutcome::Failed)
    }

    /// Whether what was written differs from what the caller passed.
    pub fn is_degraded(&self) -> bool {
        match *self {
            SaveOutcome::Stored { truncated, dropped }
            | SaveOutcome::Recovered {
                truncated, dropped, ..
            } => truncated > 0 || dropped > 0,
            SaveOutcome::Failed => false,
        }
    }
}

/// Quota-aware key → JSON record store over a [`StorageMedium`].
///
/// Construct once and share by reference: every operation takes `&self`.
pub struct BoundedStore<M> {
    medium: M,
    config: StoreConfig,
}

impl<M: StorageMedium> BoundedStore<M> {
    pub fn new(medium: M, config: StoreConfig) -> Self {
        Self { medium, config }
    }

    /// Create a store with the default policy configuration.
    pub fn with_defaults(medium: M) -> Self {
        Self::new(medium, StoreConfig::default())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The underlying medium, for inspection. Writes must go through the store.
    pub fn medium(&self) -> &M {
        &self.medium
    }

    // ─── Writes ───────────────────────────────────────────────────────

    /// Persist `value` under `key`. Returns whether anything was written.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T, options: &SaveOptions) -> bool {
        self.save_with_report(key, value, options).is_stored()
    }

    /// Persist with [`SaveOptions::primary`].
    pub fn save_primary<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.save(key, value, &SaveOptions::primary())
    }

    /// Persist `value` under `key`, reporting any degradation applied.
    pub fn save_with_report<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        options: &SaveOptions,
    ) -> SaveOutcome {
        let original = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                log::error!("Storage error for key {key}: cannot serialize value: {e}");
                return SaveOutcome::Failed;
            }
        };

        let mut payload = original.clone();
        let mut truncated = 0;
        if let Some(max_size) = options.max_size {
            if !self.config.is_protected(key) && json_len(&original) > max_size {
                truncated = reduce(&mut payload, self.config.truncate_threshold);
            }
        }
        let dropped = if options.prune_old {
            prune(&mut payload, self.config.prune_cap)
        } else {
            0
        };

        match self.write(key, &payload, options.compress) {
            Ok(()) => SaveOutcome::Stored { truncated, dropped },
            Err(e) if e.is_quota_exceeded() => {
                log::warn!("Storage quota exceeded for key: {key}");
                self.recover(key, original, options)
            }
            Err(e) => {
                log::error!("Storage error for key {key}: {e}");
                SaveOutcome::Failed
            }
        }
    }

    /// Second and last write attempt after a quota failure.
    ///
    /// Starts again from the caller's value: the protected key loses its
    /// first-write exemption here, and pruning applies whether or not
    /// `prune_old` was requested.
    fn recover(&self, key: &str, mut value: Value, options: &SaveOptions) -> SaveOutcome {
        let swept = self.cleanup();
        let truncated = reduce(&mut value, self.config.truncate_threshold);
        let dropped = prune(&mut value, self.config.retry_prune_cap);

        match self.write(key, &value, options.compress) {
            Ok(()) => {
                log::warn!(
                    "Stored reduced data for key {key} (swept {swept} keys, truncated {truncated}, dropped {dropped})"
                );
                SaveOutcome::Recovered {
                    swept,
                    truncated,
                    dropped,
                }
            }
            Err(e) => {
                log::error!("Failed to store even reduced data for key {key}: {e}");
                SaveOutcome::Failed
            }
        }
    }

    fn write(&self, key: &str, value: &Value, compress: bool) -> Result<(), MediumError> {
        let json = serde_json::to_vec(value)
            .map_err(|e| MediumError::Unavailable(format!("serialization failed: {e}")))?;
        let entry = codec::encode(json, compress);
        self.medium.put(key, &entry)
    }

    // ─── Reads ────────────────────────────────────────────────────────

    /// Read the record under `key`, or `default` if it is absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                log::error!("Error reading from storage for key {key}: {e}");
                default
            }
        }
    }

    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LoadError> {
        let Some(entry) = self.medium.get(key)? else {
            return Ok(None);
        };
        let json = codec::decode(&entry)?;
        Ok(Some(serde_json::from_slice(&json)?))
    }

    // ─── Removal & maintenance ────────────────────────────────────────

    /// Delete `key`. Absent keys and medium failures are not reported.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.medium.remove(key) {
            log::error!("Error removing item for key {key}: {e}");
        }
    }

    /// Delete every sweep-eligible key. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let keys = match self.medium.keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::error!("Error listing keys for cleanup: {e}");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys
            .iter()
            .filter(|key| is_sweep_eligible(key, &self.config.sweep_markers))
        {
            match self.medium.remove(key) {
                Ok(()) => {
                    log::debug!("Swept transient key {key}");
                    removed += 1;
                }
                Err(e) => log::error!("Error during cleanup for key {key}: {e}"),
            }
        }
        removed
    }

    /// Resident bytes against the nominal ceiling.
    pub fn usage_info(&self) -> UsageInfo {
        let used = self.medium.entries_size().unwrap_or_else(|e| {
            log::error!("Error computing storage usage: {e}");
            0
        });
        UsageInfo::new(used, self.config.capacity)
    }
}

/// Why a read fell back to the default.
#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Medium(#[from] MediumError),

    #[error(transparent)]
    Codec(#[from] codec::CodecError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn json_len(value: &Value) -> usize {
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(usize::MAX)
}

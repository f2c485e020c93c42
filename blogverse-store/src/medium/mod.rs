//! Storage media the bounded store writes through.
//!
//! Architecture:
//! ```text
//! ┌──────────────┐   get / put / remove   ┌──────────────────┐
//! │ BoundedStore │ ─────────────────────► │ StorageMedium    │
//! │ (policies)   │                        │ (raw key → bytes)│
//! └──────────────┘                        └────────┬─────────┘
//!                                                  │
//!                                  ┌───────────────┴───────────────┐
//!                                  ▼                               ▼
//!                          ┌──────────────┐               ┌──────────────┐
//!                          │ MemoryMedium │               │ RocksMedium  │
//!                          │ (in-process) │               │ (RocksDB)    │
//!                          └──────────────┘               └──────────────┘
//! ```
//!
//! A medium knows nothing about JSON, compression or degradation. It stores
//! opaque byte strings under string keys and refuses writes that would push
//! its resident size past its quota.

pub mod memory;
pub mod rocks;

pub use memory::MemoryMedium;
pub use rocks::{RocksConfig, RocksMedium};

/// Errors raised by a storage medium.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediumError {
    /// The write would exceed the medium's byte quota.
    #[error("quota exceeded writing '{key}': {required} bytes required, {available} available")]
    QuotaExceeded {
        key: String,
        required: u64,
        available: u64,
    },

    /// Any other failure of the underlying medium.
    #[error("storage medium unavailable: {0}")]
    Unavailable(String),
}

impl MediumError {
    /// Whether this error signals a capacity failure the store can recover from.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, MediumError::QuotaExceeded { .. })
    }
}

/// Synchronous key → bytes medium with a finite capacity.
///
/// All methods take `&self`; implementations use interior mutability so a
/// single store can be shared by reference between its callers.
pub trait StorageMedium {
    /// Read the raw entry stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError>;

    /// Write `value` under `key`, fully replacing any previous entry.
    ///
    /// On failure the previous entry (if any) is left in place.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), MediumError>;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), MediumError>;

    /// All resident keys, in no particular order.
    fn keys(&self) -> Result<Vec<String>, MediumError>;

    /// Sum of key and value lengths over every resident entry.
    fn entries_size(&self) -> Result<u64, MediumError>;
}

impl<M: StorageMedium + ?Sized> StorageMedium for &M {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), MediumError> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, MediumError> {
        (**self).keys()
    }

    fn entries_size(&self) -> Result<u64, MediumError> {
        (**self).entries_size()
    }
}

/// Size an entry occupies in the medium's accounting.
pub(crate) fn entry_footprint(key: &str, value: &[u8]) -> u64 {
    (key.len() + value.len()) as u64
}

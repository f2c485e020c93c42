//! # blogverse-store — Bounded persistent storage for Blogverse
//!
//! Backs user accounts, sessions and blog content with a key → JSON record
//! store that lives inside a hard, unpredictable byte ceiling.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  save / load / remove   ┌──────────────────┐
//! │ Accounts,    │ ──────────────────────► │ BoundedStore     │
//! │ blog content │ ◄────────────────────── │ (policies)       │
//! └──────────────┘   bool / default        └────────┬─────────┘
//!                                                   │
//!                          ┌────────────────────────┼──────────────────┐
//!                          ▼                        ▼                  ▼
//!                   ┌─────────────┐        ┌──────────────┐    ┌──────────────┐
//!                   │ codec       │        │ policy       │    │ usage        │
//!                   │ JSON + LZ4  │        │ reduce/prune │    │ UsageInfo    │
//!                   └─────────────┘        │ sweep        │    └──────────────┘
//!                                          └──────────────┘
//!                                                   │
//!                                                   ▼
//!                                          ┌──────────────────┐
//!                                          │ StorageMedium    │
//!                                          │ Memory / RocksDB │
//!                                          └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] — `BoundedStore`: save with quota recovery, load, remove, cleanup
//! - [`codec`] — entry encoding (JSON, optional LZ4 with a magic header)
//! - [`policy`] — size reduction, recency pruning, transient-key sweep
//! - [`medium`] — `StorageMedium` trait, in-memory and RocksDB media
//! - [`usage`] — usage snapshot, status levels, byte formatting
//! - [`config`] — `StoreConfig` and well-known keys
//!
//! ## Example
//!
//! ```
//! use blogverse_store::{BoundedStore, MemoryMedium};
//! use serde_json::json;
//!
//! let store = BoundedStore::with_defaults(MemoryMedium::default());
//! assert!(store.save_primary("blogverse_user", &json!({ "name": "Ada" })));
//! assert_eq!(store.load("blogverse_user", json!(null))["name"], "Ada");
//! assert_eq!(store.load("missing", 0u32), 0);
//! store.remove("blogverse_user");
//! ```

pub mod codec;
pub mod config;
pub mod medium;
pub mod policy;
pub mod store;
pub mod usage;

// Re-exports for convenience
pub use codec::CodecError;
pub use config::{ConfigError, StoreConfig, BLOGS_KEY, USERS_KEY, USER_KEY};
pub use medium::{MediumError, MemoryMedium, RocksConfig, RocksMedium, StorageMedium};
pub use policy::{content_hash, is_truncated};
pub use store::{BoundedStore, SaveOptions, SaveOutcome, PRIMARY_MAX_SIZE};
pub use usage::{format_bytes, UsageInfo, UsageStatus};

//! RocksDB-backed durable medium.
//!
//! Column families:
//! - `entries` — one value per store key (already JSON/LZ4 encoded by the store)
//!
//! RocksDB has no notion of a byte ceiling, so the quota is enforced here:
//! the resident size (key + value lengths) is recovered by a full scan on
//! open and kept current on every put/remove.
//!
//! Reference: Kleppmann — DDIA, Chapter 3 (LSM Trees, SSTables)

use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamily, ColumnFamilyDescriptor, DBCompressionType,
    DBWithThreadMode, IteratorMode, Options, SingleThreaded, WriteOptions,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{entry_footprint, MediumError, StorageMedium};

/// Column family holding store entries.
const CF_ENTRIES: &str = "entries";

/// Medium configuration.
#[derive(Debug, Clone)]
pub struct RocksConfig {
    /// Database directory path
    pub path: PathBuf,
    /// Byte quota over key + value lengths (default: 5MB)
    pub quota: u64,
    /// Block cache size in bytes (default: 8MB)
    pub block_cache_size: usize,
    /// Bloom filter bits per key (default: 10)
    pub bloom_filter_bits: i32,
    /// Enable fsync on every write (default: true)
    pub sync_writes: bool,
    /// Max open files for RocksDB (default: 64)
    pub max_open_files: i32,
    /// Write buffer size (default: 4MB)
    pub write_buffer_size: usize,
}

impl Default for RocksConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("blogverse_data"),
            quota: 5 * 1024 * 1024,
            block_cache_size: 8 * 1024 * 1024,
            bloom_filter_bits: 10,
            sync_writes: true,
            max_open_files: 64,
            write_buffer_size: 4 * 1024 * 1024,
        }
    }
}

impl RocksConfig {
    /// Create config for testing (small caches, no fsync).
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota: 64 * 1024,
            block_cache_size: 1024 * 1024,
            bloom_filter_bits: 10,
            sync_writes: false,
            max_open_files: 16,
            write_buffer_size: 1024 * 1024,
        }
    }
}

impl From<rocksdb::Error> for MediumError {
    fn from(e: rocksdb::Error) -> Self {
        MediumError::Unavailable(e.to_string())
    }
}

/// Quota-enforcing RocksDB medium.
pub struct RocksMedium {
    /// RocksDB instance (single-threaded mode)
    db: DBWithThreadMode<SingleThreaded>,
    /// Medium configuration
    config: RocksConfig,
    /// Resident size in bytes (keys + values)
    used: AtomicU64,
}

impl RocksMedium {
    /// Open the medium at the configured path.
    ///
    /// Creates the database and column family if they don't exist.
    pub fn open(config: RocksConfig) -> Result<Self, MediumError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);
        db_opts.set_keep_log_file_num(2);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_ENTRIES,
            Self::cf_options(&config),
        )];

        let db = DBWithThreadMode::<SingleThreaded>::open_cf_descriptors(
            &db_opts,
            &config.path,
            cf_descriptors,
        )?;

        let used = Self::recover_usage(&db)?;
        log::debug!(
            "Opened storage at {} ({used} bytes resident, quota {})",
            config.path.display(),
            config.quota
        );

        Ok(Self {
            db,
            config,
            used: AtomicU64::new(used),
        })
    }

    /// Build column family options.
    fn cf_options(config: &RocksConfig) -> Options {
        let mut opts = Options::default();

        let mut block_opts = BlockBasedOptions::default();
        let cache = Cache::new_lru_cache(config.block_cache_size);
        block_opts.set_block_cache(&cache);
        block_opts.set_bloom_filter(config.bloom_filter_bits as f64, false);
        opts.set_block_based_table_factory(&block_opts);

        // Values are LZ4-compressed by the store already
        opts.set_compression_type(DBCompressionType::None);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.optimize_for_point_lookup(config.block_cache_size as u64);

        opts
    }

    /// Sum key and value lengths over the whole entries column family.
    fn recover_usage(db: &DBWithThreadMode<SingleThreaded>) -> Result<u64, MediumError> {
        let cf = db
            .cf_handle(CF_ENTRIES)
            .ok_or_else(|| MediumError::Unavailable(format!("Column family '{CF_ENTRIES}' not found")))?;

        let mut used = 0u64;
        for item in db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            used += (key.len() + value.len()) as u64;
        }
        Ok(used)
    }

    /// The configured quota in bytes.
    pub fn quota(&self) -> u64 {
        self.config.quota
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Force a flush of memtables to disk.
    pub fn sync(&self) -> Result<(), MediumError> {
        self.db.flush()?;
        Ok(())
    }

    fn cf(&self) -> Result<&ColumnFamily, MediumError> {
        self.db
            .cf_handle(CF_ENTRIES)
            .ok_or_else(|| MediumError::Unavailable(format!("Column family '{CF_ENTRIES}' not found")))
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }
}

impl StorageMedium for RocksMedium {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError> {
        let cf = self.cf()?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), MediumError> {
        let cf = self.cf()?;

        let replaced = self
            .db
            .get_cf(cf, key.as_bytes())?
            .map(|old| entry_footprint(key, &old))
            .unwrap_or(0);
        let used = self.used.load(Ordering::SeqCst);
        let base = used.saturating_sub(replaced);
        let required = entry_footprint(key, value);

        if base.saturating_add(required) > self.config.quota {
            return Err(MediumError::QuotaExceeded {
                key: key.to_string(),
                required,
                available: self.config.quota.saturating_sub(base),
            });
        }

        self.db
            .put_cf_opt(cf, key.as_bytes(), value, &self.write_options())?;
        self.used.store(base + required, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        let cf = self.cf()?;

        let Some(old) = self.db.get_cf(cf, key.as_bytes())? else {
            return Ok(());
        };

        self.db
            .delete_cf_opt(cf, key.as_bytes(), &self.write_options())?;
        let freed = entry_footprint(key, &old);
        let used = self.used.load(Ordering::SeqCst);
        self.used.store(used.saturating_sub(freed), Ordering::SeqCst);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, MediumError> {
        let cf = self.cf()?;
        let mut keys = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item?;
            let key = String::from_utf8(key.into_vec())
                .map_err(|e| MediumError::Unavailable(format!("Non UTF-8 key: {e}")))?;
            keys.push(key);
        }

        Ok(keys)
    }

    fn entries_size(&self) -> Result<u64, MediumError> {
        Ok(self.used.load(Ordering::SeqCst))
    }
}

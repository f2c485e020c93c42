//! In-process medium with an enforced byte quota.
//!
//! Behaves like a browser's local storage: every entry counts its key and
//! value length against a fixed quota, and a write that would cross the
//! quota is refused without touching the previous value.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{entry_footprint, MediumError, StorageMedium};

/// Default quota (5 MiB).
pub const DEFAULT_QUOTA: u64 = 5 * 1024 * 1024;

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, Vec<u8>>,
    used: u64,
}

/// Quota-bounded in-memory medium.
#[derive(Debug)]
pub struct MemoryMedium {
    inner: RwLock<Inner>,
    quota: u64,
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::with_quota(DEFAULT_QUOTA)
    }
}

impl MemoryMedium {
    /// Create an empty medium refusing writes beyond `quota` bytes.
    pub fn with_quota(quota: u64) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            quota,
        }
    }

    /// Create an empty medium that never refuses a write.
    pub fn unbounded() -> Self {
        Self::with_quota(u64::MAX)
    }

    /// The configured quota in bytes.
    pub fn quota(&self) -> u64 {
        self.quota
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> MediumError {
        MediumError::Unavailable("memory medium lock poisoned".into())
    }
}

impl StorageMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner.entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), MediumError> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        let replaced = inner
            .entries
            .get(key)
            .map(|old| entry_footprint(key, old))
            .unwrap_or(0);
        let base = inner.used - replaced;
        let required = entry_footprint(key, value);

        if base.saturating_add(required) > self.quota {
            return Err(MediumError::QuotaExceeded {
                key: key.to_string(),
                required,
                available: self.quota.saturating_sub(base),
            });
        }

        inner.entries.insert(key.to_string(), value.to_vec());
        inner.used = base + required;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;
        if let Some(old) = inner.entries.remove(key) {
            inner.used -= entry_footprint(key, &old);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, MediumError> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner.entries.keys().cloned().collect())
    }

    fn entries_size(&self) -> Result<u64, MediumError> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner.used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let medium = MemoryMedium::unbounded();
        medium.put("a", b"hello").unwrap();
        assert_eq!(medium.get("a").unwrap().as_deref(), Some(&b"hello"[..]));

        medium.remove("a").unwrap();
        assert_eq!(medium.get("a").unwrap(), None);
        // Absent key
        medium.remove("a").unwrap();
        assert!(medium.is_empty());
    }

    #[test]
    fn test_size_tracks_keys_and_values() {
        let medium = MemoryMedium::unbounded();
        medium.put("key", b"12345").unwrap();
        assert_eq!(medium.entries_size().unwrap(), 8);

        // Overwrite replaces, does not accumulate
        medium.put("key", b"1").unwrap();
        assert_eq!(medium.entries_size().unwrap(), 4);

        medium.remove("key").unwrap();
        assert_eq!(medium.entries_size().unwrap(), 0);
    }

    #[test]
    fn test_quota_refuses_and_keeps_previous_value() {
        let medium = MemoryMedium::with_quota(16);
        medium.put("k", b"small").unwrap();

        let err = medium.put("k", &[b'x'; 32]).unwrap_err();
        assert!(err.is_quota_exceeded());
        match err {
            MediumError::QuotaExceeded { required, available, .. } => {
                assert_eq!(required, 33);
                assert_eq!(available, 16);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(medium.get("k").unwrap().as_deref(), Some(&b"small"[..]));
        assert_eq!(medium.entries_size().unwrap(), 6);
    }

    #[test]
    fn test_overwrite_may_use_space_of_replaced_entry() {
        let medium = MemoryMedium::with_quota(10);
        medium.put("k", &[0u8; 9]).unwrap();
        // 1 + 9 == 10: replacing in place fits even though 20 would not
        medium.put("k", &[1u8; 9]).unwrap();
        assert_eq!(medium.entries_size().unwrap(), 10);
    }

    #[test]
    fn test_keys_listing() {
        let medium = MemoryMedium::default();
        medium.put("b", b"2").unwrap();
        medium.put("a", b"1").unwrap();
        assert_eq!(medium.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(medium.quota(), DEFAULT_QUOTA);
    }
}

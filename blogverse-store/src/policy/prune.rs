//! Recency pruning of array records.
//!
//! Elements are ordered newest first by their recency field and the tail is
//! dropped. There is no read tracking in the store, so "recent" means
//! recently created or joined, not recently accessed.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Recency fields, in lookup order.
pub const RECENCY_FIELDS: [&str; 2] = ["createdAt", "joinedAt"];

/// Items kept when pruning on the first write.
pub const DEFAULT_PRUNE_CAP: usize = 50;
/// Items kept when pruning on the quota-recovery retry.
pub const DEFAULT_RETRY_PRUNE_CAP: usize = 20;

/// Keep the `max_items` most recent elements of an array value.
///
/// Returns the number of elements dropped. Non-array values are left alone.
/// Elements with equal recency keep their relative order.
pub fn prune(value: &mut Value, max_items: usize) -> usize {
    let Value::Array(items) = value else {
        return 0;
    };

    items.sort_by_cached_key(|item| std::cmp::Reverse(recency_millis(item)));

    let dropped = items.len().saturating_sub(max_items);
    items.truncate(max_items);
    dropped
}

/// Recency of an element in milliseconds since the Unix epoch.
///
/// The first recency field holding a non-empty, non-zero value wins.
/// Missing or unparseable values count as the epoch.
pub fn recency_millis(item: &Value) -> i64 {
    RECENCY_FIELDS
        .iter()
        .filter_map(|field| item.get(field))
        .find(|v| is_set(v))
        .and_then(parse_timestamp)
        .unwrap_or(0)
}

/// Whether a field counts as present for the fallback chain.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse a timestamp: epoch milliseconds, RFC 3339, a plain date, or a
/// date-time without offset (read as UTC).
fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.timestamp_millis());
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(dt.and_utc().timestamp_millis());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp_millis())
        }
        _ => None,
    }
}

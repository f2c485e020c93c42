//! Degradation policies applied to records before they hit the medium.
//!
//! Ordered by destructiveness:
//! 1. [`sweep`] — delete transient keys (other data, never the record itself)
//! 2. [`reduce`] — truncate long `content` fields, flagged and hashed
//! 3. [`prune`] — drop the oldest elements of array records

pub mod prune;
pub mod reduce;
pub mod sweep;

pub use prune::{prune, recency_millis, DEFAULT_PRUNE_CAP, DEFAULT_RETRY_PRUNE_CAP};
pub use reduce::{content_hash, count_truncated, is_truncated, reduce, DEFAULT_THRESHOLD};
pub use sweep::{is_sweep_eligible, DEFAULT_SWEEP_MARKERS};

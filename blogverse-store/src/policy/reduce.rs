//! Size reduction: truncate long `content` fields, leaving a flag and a hash.
//!
//! ```text
//! { "title": "...", "content": "<5000 chars>" }
//!                     │
//!                     ▼
//! { "title": "...",
//!   "content": "<first 1000 UTF-16 units>...",
//!   "contentTruncated": true,
//!   "fullContentHash": "<rolling hash of the full text>" }
//! ```
//!
//! Truncation is lossy. It is always flagged, never silent.

use serde_json::Value;

/// Field inspected for truncation.
pub const CONTENT_FIELD: &str = "content";
/// Flag set on every truncated record.
pub const TRUNCATED_FLAG: &str = "contentTruncated";
/// Rolling hash of the content before truncation.
pub const HASH_FIELD: &str = "fullContentHash";
/// Appended to truncated content.
pub const ELLIPSIS: &str = "...";

/// Default truncation threshold in UTF-16 code units.
pub const DEFAULT_THRESHOLD: usize = 1000;

/// Truncate oversize `content` fields in `value`, returning how many records
/// were truncated.
///
/// Objects are inspected at their top level only. Arrays are walked
/// element by element (nested arrays included). Scalars are untouched.
pub fn reduce(value: &mut Value, threshold: usize) -> usize {
    match value {
        Value::Array(items) => items.iter_mut().map(|item| reduce(item, threshold)).sum(),
        Value::Object(map) => {
            let Some(Value::String(content)) = map.get(CONTENT_FIELD) else {
                return 0;
            };
            let Some(cut) = utf16_cut(content, threshold) else {
                return 0;
            };

            let hash = content_hash(content);
            let mut truncated = String::with_capacity(cut + ELLIPSIS.len());
            truncated.push_str(&content[..cut]);
            truncated.push_str(ELLIPSIS);

            map.insert(CONTENT_FIELD.to_string(), Value::String(truncated));
            map.insert(TRUNCATED_FLAG.to_string(), Value::Bool(true));
            map.insert(HASH_FIELD.to_string(), Value::String(hash));
            1
        }
        _ => 0,
    }
}

/// Byte offset at which `text` must be cut to keep at most `limit` UTF-16
/// code units, or `None` if it already fits. The cut never splits a
/// surrogate pair, so it may fall one unit short of `limit`.
fn utf16_cut(text: &str, limit: usize) -> Option<usize> {
    if text.encode_utf16().count() <= limit {
        return None;
    }
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > limit {
            return Some(idx);
        }
    }
    None
}

/// Whether a record carries the truncation flag. Absent means not truncated.
pub fn is_truncated(record: &Value) -> bool {
    record
        .get(TRUNCATED_FLAG)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Count truncated records in `value` (the value itself or array elements).
pub fn count_truncated(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.iter().map(count_truncated).sum(),
        other => usize::from(is_truncated(other)),
    }
}

/// Low-collision-resistance checksum of `text`.
///
/// `h = h * 31 + unit` over UTF-16 code units with 32-bit wrap-around,
/// rendered in decimal. Good enough to tell whether a full text looks like
/// the one a truncated record came from. Not an integrity check.
pub fn content_hash(text: &str) -> String {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit));
    }
    hash.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_long_content_truncated_and_flagged() {
        let original = "x".repeat(2500);
        let mut post = json!({ "id": 7, "title": "Long read", "content": original });

        assert_eq!(reduce(&mut post, DEFAULT_THRESHOLD), 1);

        let content = post[CONTENT_FIELD].as_str().unwrap();
        assert_eq!(content.chars().count(), 1003);
        assert!(content.ends_with(ELLIPSIS));
        assert!(is_truncated(&post));
        assert_eq!(post[HASH_FIELD], json!(content_hash(&original)));
        assert_eq!(post["title"], json!("Long read"));
        assert_eq!(post["id"], json!(7));
    }

    #[test]
    fn test_content_at_threshold_kept() {
        let mut post = json!({ "content": "y".repeat(1000) });
        assert_eq!(reduce(&mut post, 1000), 0);
        assert!(!is_truncated(&post));
        assert!(post.get(HASH_FIELD).is_none());
    }

    #[test]
    fn test_multibyte_content_cut_on_char_boundary() {
        let mut post = json!({ "content": "é".repeat(1200) });
        reduce(&mut post, 1000);
        let content = post[CONTENT_FIELD].as_str().unwrap();
        assert_eq!(content.chars().count(), 1003);
    }

    #[test]
    fn test_astral_content_measured_in_utf16_units() {
        // 900 emoji = 1800 UTF-16 units
        let mut post = json!({ "content": "😀".repeat(900) });
        assert_eq!(reduce(&mut post, 1000), 1);

        let content = post[CONTENT_FIELD].as_str().unwrap();
        assert_eq!(content, format!("{}...", "😀".repeat(500)));
        assert!(is_truncated(&post));
    }

    #[test]
    fn test_cut_never_splits_surrogate_pair() {
        let mut post = json!({ "content": format!("a{}", "😀".repeat(600)) });
        assert_eq!(reduce(&mut post, 1000), 1);

        let content = post[CONTENT_FIELD].as_str().unwrap();
        assert_eq!(content, format!("a{}...", "😀".repeat(499)));
        assert_eq!(content.encode_utf16().count(), 999 + ELLIPSIS.len());
    }

    #[test]
    fn test_astral_content_within_threshold_kept() {
        let mut post = json!({ "content": "😀".repeat(500) });
        assert_eq!(reduce(&mut post, 1000), 0);
        assert!(!is_truncated(&post));
    }

    #[test]
    fn test_arrays_walked_per_element() {
        let mut posts = json!([
            { "content": "a".repeat(1500) },
            { "content": "short" },
            [ { "content": "b".repeat(1001) } ],
            42,
        ]);
        assert_eq!(reduce(&mut posts, 1000), 2);
        assert_eq!(count_truncated(&posts), 2);
        assert_eq!(posts[1][CONTENT_FIELD], json!("short"));
        assert_eq!(posts[3], json!(42));
    }

    #[test]
    fn test_non_string_content_ignored() {
        let mut record = json!({ "content": { "blocks": ["a".repeat(2000)] } });
        let before = record.clone();
        assert_eq!(reduce(&mut record, 1000), 0);
        assert_eq!(record, before);
    }

    #[test]
    fn test_nested_objects_not_inspected() {
        let mut users = json!({ "ada": { "content": "z".repeat(5000) } });
        assert_eq!(reduce(&mut users, 1000), 0);
    }

    #[test]
    fn test_content_hash_known_values() {
        assert_eq!(content_hash(""), "0");
        assert_eq!(content_hash("a"), "97");
        assert_eq!(content_hash("ab"), "3105");
        assert_eq!(content_hash("hello"), "99162322");
        assert_ne!(content_hash("hello"), content_hash("hellp"));
    }
}

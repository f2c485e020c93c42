//! Entry encoding: JSON text, optionally LZ4 compressed.
//!
//! Layout of a compressed entry:
//! ```text
//! ┌──────────────┬──────────────────────┬─────────────────────┐
//! │ magic "\0LZ4"│ original size (u32 LE)│ LZ4 block payload   │
//! └──────────────┴──────────────────────┴─────────────────────┘
//! ```
//!
//! Serialized JSON never starts with a NUL byte, so an entry without the
//! magic header is plain JSON and decodes as itself. This keeps entries
//! written with compression off (or written by older versions) readable.

use std::borrow::Cow;

/// Header marking an LZ4-compressed entry.
pub const MAGIC: [u8; 4] = *b"\0LZ4";

/// Upper bound on a decoded entry, guards against corrupt size prefixes.
pub const MAX_DECODED_LEN: usize = 256 * 1024 * 1024;

/// Entry decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("compressed entry truncated: {0} bytes")]
    Truncated(usize),

    #[error("compressed entry claims {0} bytes, above the {limit} byte limit", limit = MAX_DECODED_LEN)]
    TooLarge(usize),

    #[error("LZ4 decompression failed: {0}")]
    Decompression(String),
}

/// Whether `entry` carries the compressed-entry header.
pub fn is_compressed(entry: &[u8]) -> bool {
    entry.starts_with(&MAGIC)
}

/// Encode serialized JSON for storage.
///
/// With `compress`, the LZ4 form is used only when it is actually smaller
/// than the plain text.
pub fn encode(json: Vec<u8>, compress: bool) -> Vec<u8> {
    if !compress {
        return json;
    }

    let packed = lz4_flex::compress_prepend_size(&json);
    let compressed_len = MAGIC.len() + packed.len();
    if compressed_len >= json.len() {
        log::debug!(
            "Compression skipped: {} bytes would become {compressed_len}",
            json.len()
        );
        return json;
    }

    log::debug!(
        "Compressed entry {} -> {compressed_len} bytes ({:.1}x)",
        json.len(),
        json.len() as f64 / compressed_len as f64
    );

    let mut entry = Vec::with_capacity(compressed_len);
    entry.extend_from_slice(&MAGIC);
    entry.extend_from_slice(&packed);
    entry
}

/// Reverse [`encode`]. Plain entries are returned borrowed and unchanged.
pub fn decode(entry: &[u8]) -> Result<Cow<'_, [u8]>, CodecError> {
    let Some(body) = entry.strip_prefix(&MAGIC[..]) else {
        return Ok(Cow::Borrowed(entry));
    };

    if body.len() < 4 {
        return Err(CodecError::Truncated(entry.len()));
    }

    let mut size_buf = [0u8; 4];
    size_buf.copy_from_slice(&body[..4]);
    let size = u32::from_le_bytes(size_buf) as usize;
    if size > MAX_DECODED_LEN {
        return Err(CodecError::TooLarge(size));
    }

    let decoded = lz4_flex::decompress(&body[4..], size)
        .map_err(|e| CodecError::Decompression(e.to_string()))?;
    Ok(Cow::Owned(decoded))
}

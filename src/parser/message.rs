//! Reading `.eml` files and splitting them into a root header block and body.

use std::path::Path;

use tracing::debug;

use crate::error::{MemailError, Result};
use crate::model::part::HeaderView;
use crate::parser::header::{decode_encoded_words, parse_header_block};

/// Default maximum message size in bytes (256 MB).
pub const MAX_MESSAGE_SIZE: u64 = 256 * 1024 * 1024;

/// Read a message file into memory.
///
/// Files larger than `max_size` bytes are refused.
pub fn read_message(path: impl AsRef<Path>, max_size: u64) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MemailError::FileNotFound(path.to_path_buf())
        } else {
            MemailError::io(path, e)
        }
    })?;

    if metadata.len() > max_size {
        return Err(MemailError::MessageTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: max_size,
        });
    }

    let data = std::fs::read(path).map_err(|e| MemailError::io(path, e))?;
    debug!(path = %path.display(), bytes = data.len(), "Read message");
    Ok(data)
}

/// Split a raw RFC 5322 message into its header view and body bytes.
///
/// A UTF-8 BOM and a leading mbox `From ` line are skipped. A message without
/// a blank line is all headers and an empty body.
pub fn split_message(raw: &[u8]) -> (HeaderView, &[u8]) {
    let data = skip_from_line(raw);
    let (header_bytes, body) = split_at_blank_line(data);
    (parse_header_block(header_bytes), body)
}

/// Split at the first blank line: `(headers, body)`.
///
/// A block that starts with a blank line has no headers.
pub fn split_at_blank_line(data: &[u8]) -> (&[u8], &[u8]) {
    if let Some(rest) = data.strip_prefix(b"\r\n") {
        return (&data[..0], rest);
    }
    if let Some(rest) = data.strip_prefix(b"\n") {
        return (&data[..0], rest);
    }
    match find_header_end(data) {
        Some((end, sep_len)) => (&data[..end], &data[end + sep_len..]),
        None => (data, &data[data.len()..]),
    }
}

/// Find where headers end: `(offset, separator_length)` of the first blank line.
fn find_header_end(data: &[u8]) -> Option<(usize, usize)> {
    let mut search_from = 0;
    while let Some(pos) = memchr::memchr(b'\n', &data[search_from..]) {
        let nl = search_from + pos;
        let rest = &data[nl + 1..];
        if rest.starts_with(b"\n") {
            return Some((nl + 1, 1));
        }
        if rest.starts_with(b"\r\n") {
            return Some((nl + 1, 2));
        }
        search_from = nl + 1;
    }
    None
}

/// Skip the BOM and the `From ` separator line found at the start of mbox exports.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = memchr::memchr(b'\n', data) {
            return &data[pos + 1..];
        }
    }
    data
}

/// The envelope fields an inspector shows above the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSummary {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub content_type: String,
}

impl MessageSummary {
    /// Build the summary from root headers, decoding RFC 2047 encoded words.
    pub fn from_headers(headers: &HeaderView) -> Self {
        let decoded = |name: &str| {
            headers
                .get(name)
                .map(decode_encoded_words)
                .unwrap_or_default()
        };
        Self {
            from: decoded("from"),
            to: decoded("to"),
            subject: decoded("subject"),
            date: headers.get("date").unwrap_or_default().to_string(),
            content_type: headers.get("content-type").unwrap_or_default().to_string(),
        }
    }
}

//! Charset resolution for decoded text bodies.
//!
//! Only UTF-8 (and its ASCII subset) plus a fixed table of single-byte code
//! pages are accepted. Single-byte tables map every byte value, so decoding
//! under them cannot fail.

use encoding_rs::Encoding;
use tracing::warn;

use crate::error::MimeError;

/// A charset the walker knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// `utf-8` and `us-ascii`.
    Utf8,
    /// A single-byte code page backed by an `encoding_rs` table.
    SingleByte(&'static Encoding),
}

impl Charset {
    /// Resolve a charset label (case-insensitive, quotes and whitespace ignored).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().trim_matches('"').trim().to_ascii_lowercase();
        let encoding = match normalized.as_str() {
            "utf-8" | "utf8" | "us-ascii" | "ascii" | "ansi_x3.4-1968" => {
                return Some(Self::Utf8)
            }
            "windows-1250" | "cp1250" => encoding_rs::WINDOWS_1250,
            "windows-1251" | "cp1251" => encoding_rs::WINDOWS_1251,
            "windows-1252" | "cp1252" | "iso-8859-1" | "iso8859-1" | "latin1" => {
                encoding_rs::WINDOWS_1252
            }
            "windows-1253" | "cp1253" => encoding_rs::WINDOWS_1253,
            "windows-1254" | "cp1254" | "iso-8859-9" | "latin5" => encoding_rs::WINDOWS_1254,
            "windows-1255" | "cp1255" => encoding_rs::WINDOWS_1255,
            "windows-1256" | "cp1256" => encoding_rs::WINDOWS_1256,
            "windows-1257" | "cp1257" => encoding_rs::WINDOWS_1257,
            "windows-1258" | "cp1258" => encoding_rs::WINDOWS_1258,
            "windows-874" | "cp874" | "iso-8859-11" => encoding_rs::WINDOWS_874,
            "iso-8859-2" | "latin2" => encoding_rs::ISO_8859_2,
            "iso-8859-3" => encoding_rs::ISO_8859_3,
            "iso-8859-4" => encoding_rs::ISO_8859_4,
            "iso-8859-5" => encoding_rs::ISO_8859_5,
            "iso-8859-6" => encoding_rs::ISO_8859_6,
            "iso-8859-7" => encoding_rs::ISO_8859_7,
            "iso-8859-8" => encoding_rs::ISO_8859_8,
            "iso-8859-8-i" => encoding_rs::ISO_8859_8_I,
            "iso-8859-10" => encoding_rs::ISO_8859_10,
            "iso-8859-13" => encoding_rs::ISO_8859_13,
            "iso-8859-14" => encoding_rs::ISO_8859_14,
            "iso-8859-15" | "latin9" => encoding_rs::ISO_8859_15,
            "iso-8859-16" => encoding_rs::ISO_8859_16,
            "koi8-r" => encoding_rs::KOI8_R,
            "koi8-u" => encoding_rs::KOI8_U,
            "ibm866" | "cp866" => encoding_rs::IBM866,
            "macintosh" | "mac" => encoding_rs::MACINTOSH,
            _ => return None,
        };
        Some(Self::SingleByte(encoding))
    }

    /// Decode bytes to text. Invalid UTF-8 sequences become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::SingleByte(encoding) => {
                let (decoded, _had_errors) = encoding.decode_without_bom_handling(bytes);
                decoded.into_owned()
            }
        }
    }
}

/// Decode bytes labeled with `charset` into a Unicode string.
pub fn decode_charset(bytes: &[u8], charset: &str) -> Result<String, MimeError> {
    Charset::from_label(charset)
        .map(|cs| cs.decode(bytes))
        .ok_or_else(|| MimeError::UnsupportedCharset(charset.trim().to_string()))
}

/// Decode header-level text (encoded words, RFC 2231 values) that must not fail.
///
/// Falls back to any `encoding_rs` label, then to lossy UTF-8.
pub fn decode_lossy(bytes: &[u8], label: &str) -> String {
    if let Some(cs) = Charset::from_label(label) {
        return cs.decode(bytes);
    }
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => {
            let (decoded, _, _) = encoding.decode(bytes);
            decoded.into_owned()
        }
        None => {
            warn!(charset = label, "Unknown charset, falling back to UTF-8 lossy");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

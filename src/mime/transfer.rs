//! Content-Transfer-Encoding decoding.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quoted_printable::ParseMode;
use tracing::warn;

use crate::error::MimeError;

/// A transfer encoding, as named by `Content-Transfer-Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    Base64,
    QuotedPrintable,
    /// `7bit`, `8bit`, `binary`, absent, or anything unrecognized.
    Identity,
}

impl TransferEncoding {
    /// Map an encoding name (case-insensitive) to its decoder.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::Identity,
        }
    }
}

/// Reverse the transfer encoding applied to a body.
///
/// Identity encodings borrow the input unchanged.
pub fn decode_transfer<'a>(bytes: &'a [u8], encoding: &str) -> Result<Cow<'a, [u8]>, MimeError> {
    match TransferEncoding::from_name(encoding) {
        TransferEncoding::Base64 => decode_base64(bytes).map(Cow::Owned),
        TransferEncoding::QuotedPrintable => Ok(Cow::Owned(decode_quoted_printable(bytes))),
        TransferEncoding::Identity => Ok(Cow::Borrowed(bytes)),
    }
}

/// Decode a base64 body, ignoring the line breaks MIME inserts every 76 chars.
fn decode_base64(bytes: &[u8]) -> Result<Vec<u8>, MimeError> {
    let compact: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(&compact)
        .map_err(|e| MimeError::InvalidBase64(e.to_string()))
}

/// Decode quoted-printable (RFC 2045 §6.7) in robust mode: trailing
/// whitespace is dropped, line breaks come out as CRLF, malformed escapes are
/// copied through literally.
fn decode_quoted_printable(bytes: &[u8]) -> Vec<u8> {
    match quoted_printable::decode(bytes, ParseMode::Robust) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "Quoted-printable decoding failed, keeping raw bytes");
            bytes.to_vec()
        }
    }
}

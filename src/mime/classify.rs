//! Part classification from `Content-Type` and `Content-Disposition`.

use percent_encoding::percent_decode_str;

use crate::error::MimeError;
use crate::mime::charset;
use crate::model::descriptor::{
    ContentDescriptor, DispositionDescriptor, DispositionKind, Parameters,
};
use crate::model::part::HeaderView;
use crate::parser::header::decode_encoded_words;

/// Value assumed when a part has no `Content-Type` header (RFC 2045 §5.2).
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=us-ascii";

const DEFAULT_CHARSET: &str = "us-ascii";
const DEFAULT_TRANSFER_ENCODING: &str = "7bit";
const FALLBACK_ATTACHMENT_TYPE: &str = "application/octet-stream";

/// What the walker should do with a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A container; the payload is the boundary token.
    Multipart(String),
    /// A part to be listed, not decoded.
    AttachmentLeaf {
        filename: String,
        content_type: String,
    },
    /// A `text/plain` part to decode.
    TextLeaf {
        charset: String,
        transfer_encoding: String,
    },
    /// Any other media type; the payload is its `type/subtype`.
    UnsupportedLeaf(String),
}

/// Classify a part from its headers alone.
///
/// An attachment disposition is resolved before the media type, so an
/// attachment with an unparseable `Content-Type` is still listed.
pub fn classify(headers: &HeaderView) -> Result<Classification, MimeError> {
    let raw_content_type = headers.get("content-type").unwrap_or(DEFAULT_CONTENT_TYPE);

    if let Some(raw) = headers.get("content-disposition") {
        let disposition = parse_disposition(raw)?;
        if disposition.kind == DispositionKind::Attachment {
            let filename = attachment_filename(&disposition).ok_or(MimeError::MissingFilename)?;
            return Ok(Classification::AttachmentLeaf {
                filename,
                content_type: attachment_content_type(raw_content_type),
            });
        }
    }

    let content_type = parse_content_type(raw_content_type)?;

    if content_type.is_multipart() {
        return match content_type.param("boundary") {
            Some(boundary) if !boundary.is_empty() => {
                Ok(Classification::Multipart(boundary.to_string()))
            }
            _ => Err(MimeError::MissingBoundary(content_type.essence())),
        };
    }

    if content_type.media_type == "text" && content_type.subtype == "plain" {
        let charset = content_type
            .param("charset")
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string());
        let transfer_encoding = headers
            .get("content-transfer-encoding")
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_TRANSFER_ENCODING.to_string());
        return Ok(Classification::TextLeaf {
            charset,
            transfer_encoding,
        });
    }

    Ok(Classification::UnsupportedLeaf(content_type.essence()))
}

/// The `type/subtype` of an attachment, or the raw header value when it
/// does not parse.
fn attachment_content_type(raw: &str) -> String {
    match parse_content_type(raw) {
        Ok(content_type) => content_type.essence(),
        Err(_) => {
            let raw = raw.trim();
            if raw.is_empty() {
                FALLBACK_ATTACHMENT_TYPE.to_string()
            } else {
                raw.to_string()
            }
        }
    }
}

/// Parse a `Content-Type` value such as `text/plain; charset="utf-8"`.
pub fn parse_content_type(value: &str) -> Result<ContentDescriptor, MimeError> {
    let segments = split_segments(value);
    let head = segments.first().map(|s| s.trim()).unwrap_or("");

    let (media_type, subtype) = head
        .split_once('/')
        .ok_or_else(|| MimeError::malformed(value, "missing '/' between type and subtype"))?;
    let media_type = media_type.trim();
    let subtype = subtype.trim();
    if !is_token(media_type) || !is_token(subtype) {
        return Err(MimeError::malformed(value, "invalid type or subtype"));
    }

    Ok(ContentDescriptor {
        media_type: media_type.to_ascii_lowercase(),
        subtype: subtype.to_ascii_lowercase(),
        parameters: parse_parameters(value, &segments[1..])?,
    })
}

/// Parse a `Content-Disposition` value such as `attachment; filename="a.txt"`.
///
/// Unknown disposition kinds are treated as `attachment` (RFC 2183 §2.8).
pub fn parse_disposition(value: &str) -> Result<DispositionDescriptor, MimeError> {
    let segments = split_segments(value);
    let head = segments.first().map(|s| s.trim()).unwrap_or("");
    if !is_token(head) {
        return Err(MimeError::malformed(value, "invalid disposition type"));
    }

    let kind = if head.eq_ignore_ascii_case("inline") {
        DispositionKind::Inline
    } else {
        DispositionKind::Attachment
    };

    Ok(DispositionDescriptor {
        kind,
        parameters: parse_parameters(value, &segments[1..])?,
    })
}

/// Split on `;` outside of quoted strings.
fn split_segments(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, ch) in value.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

fn parse_parameters(value: &str, segments: &[&str]) -> Result<Parameters, MimeError> {
    let mut parameters = Parameters::new();
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (key, raw) = segment.split_once('=').ok_or_else(|| {
            MimeError::malformed(value, format!("parameter '{segment}' has no value"))
        })?;
        let key = key.trim();
        if !is_token(key) {
            return Err(MimeError::malformed(value, "empty parameter name"));
        }
        parameters
            .entry(key.to_ascii_lowercase())
            .or_insert_with(|| unquote(raw.trim()));
    }
    Ok(parameters)
}

/// Strip surrounding double quotes and resolve backslash escapes.
fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"') else {
        return raw.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(ch);
        }
    }
    result
}

fn is_token(s: &str) -> bool {
    const TSPECIALS: &str = "()<>@,;:\\\"/[]?=";
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_graphic() && !TSPECIALS.contains(c))
}

/// Resolve the filename of an attachment.
///
/// Tries `filename` (with RFC 2047 encoded words), then RFC 2231
/// `filename*`, then RFC 2231 continuations `filename*0`, `filename*1`, ….
fn attachment_filename(disposition: &DispositionDescriptor) -> Option<String> {
    let name = if let Some(plain) = disposition.param("filename") {
        decode_encoded_words(plain.trim())
    } else if let Some(extended) = disposition.param("filename*") {
        decode_extended_value(extended)
    } else {
        join_continuations(disposition)?
    };

    let name = name.trim().to_string();
    (!name.is_empty()).then_some(name)
}

/// Decode an RFC 2231 `charset'language'percent-encoded` value.
fn decode_extended_value(value: &str) -> String {
    let mut pieces = value.splitn(3, '\'');
    match (pieces.next(), pieces.next(), pieces.next()) {
        (Some(label), Some(_lang), Some(encoded)) => {
            charset::decode_lossy(&percent_decode(encoded), label)
        }
        _ => String::from_utf8_lossy(&percent_decode(value)).into_owned(),
    }
}

fn join_continuations(disposition: &DispositionDescriptor) -> Option<String> {
    let mut label: Option<String> = None;
    let mut bytes = Vec::new();
    let mut found = false;

    for n in 0.. {
        if let Some(extended) = disposition.param(&format!("filename*{n}*")) {
            let encoded = if n == 0 {
                let mut pieces = extended.splitn(3, '\'');
                match (pieces.next(), pieces.next(), pieces.next()) {
                    (Some(cs), Some(_lang), Some(rest)) => {
                        label = Some(cs.to_string());
                        rest
                    }
                    _ => extended,
                }
            } else {
                extended
            };
            bytes.extend(percent_decode(encoded));
        } else if let Some(plain) = disposition.param(&format!("filename*{n}")) {
            bytes.extend_from_slice(plain.as_bytes());
        } else {
            break;
        }
        found = true;
    }

    if !found {
        return None;
    }
    Some(match label {
        Some(label) => charset::decode_lossy(&bytes, &label),
        None => String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn percent_decode(s: &str) -> Vec<u8> {
    percent_decode_str(s).collect()
}

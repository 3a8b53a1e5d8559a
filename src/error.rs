//! Centralized error types for memail.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while walking the MIME tree of a message.
///
/// Structural errors stop the frame they occur in (the walker moves on to the
/// next sibling). Decoding errors are scoped to a single leaf and surface as
/// warning outcomes instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MimeError {
    /// A `Content-Type` or `Content-Disposition` value could not be parsed.
    #[error("Malformed content type '{value}': {reason}")]
    MalformedContentType { value: String, reason: String },

    /// `Content-Disposition: attachment` without a usable filename.
    #[error("Attachment has no filename in its content disposition")]
    MissingFilename,

    /// A multipart container without a `boundary` parameter.
    #[error("Multipart content type '{0}' has no boundary")]
    MissingBoundary(String),

    /// The body ended before the closing `--boundary--` line.
    #[error("Multipart body ended before closing boundary '{boundary}'")]
    TruncatedMultipart { boundary: String },

    /// The base64 body contains invalid characters or padding.
    #[error("Invalid base64 content: {0}")]
    InvalidBase64(String),

    /// The declared charset is not in the supported table.
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Multipart nesting exceeded the configured depth limit.
    #[error("Multipart nesting exceeds the maximum depth of {limit}")]
    MultipartTooDeep { limit: usize },
}

impl MimeError {
    /// `true` for errors that prevent determining what a part is.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MalformedContentType { .. }
                | Self::MissingFilename
                | Self::MissingBoundary(_)
                | Self::MultipartTooDeep { .. }
        )
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedContentType { .. } => "malformed_content_type",
            Self::MissingFilename => "missing_filename",
            Self::MissingBoundary(_) => "missing_boundary",
            Self::TruncatedMultipart { .. } => "truncated_multipart",
            Self::InvalidBase64(_) => "invalid_base64",
            Self::UnsupportedCharset(_) => "unsupported_charset",
            Self::MultipartTooDeep { .. } => "multipart_too_deep",
        }
    }

    pub(crate) fn malformed(value: &str, reason: impl Into<String>) -> Self {
        Self::MalformedContentType {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// All errors produced at the memail application boundary.
#[derive(Error, Debug)]
pub enum MemailError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// The message file exceeds the configured size limit.
    #[error("Message '{path}' is {size} bytes, over the {limit} byte limit")]
    MessageTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// A structural MIME error that aborted the walk.
    #[error(transparent)]
    Mime(#[from] MimeError),
}

/// Convenience alias for `Result<T, MemailError>`.
pub type Result<T> = std::result::Result<T, MemailError>;

impl MemailError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

//! Terminal results of a MIME walk.

use crate::error::MimeError;

/// One leaf-level result, emitted in document order.
///
/// Attachment bodies are never materialized here; only their name and
/// declared type are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Decoded textual content.
    Text {
        text: String,
        /// The charset label the text was decoded from, as declared.
        charset: String,
    },

    /// An attachment descriptor.
    Attachment {
        filename: String,
        content_type: String,
    },

    /// A leaf whose media type the walker does not interpret.
    Unsupported { content_type: String },

    /// A leaf-scoped failure (bad base64, unknown charset, truncated container).
    Warning {
        error: MimeError,
        /// Length in bytes of the undecoded body the warning refers to.
        raw_len: usize,
    },
}

impl Outcome {
    /// The decoded text, if this is a text leaf.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }
}

//! Parsed `Content-Type` and `Content-Disposition` values.
//!
//! Parsing lives in [`crate::mime::classify`]; these are plain data.

use std::collections::BTreeMap;

/// Parameters of a structured header, keyed by lower-cased name.
pub type Parameters = BTreeMap<String, String>;

/// A parsed `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    /// Lower-cased top-level type (`text`, `multipart`, …).
    pub media_type: String,
    /// Lower-cased subtype (`plain`, `mixed`, …).
    pub subtype: String,
    /// Parameter values are kept verbatim, minus surrounding quotes.
    pub parameters: Parameters,
}

impl ContentDescriptor {
    /// The `type/subtype` pair without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.media_type, self.subtype)
    }

    /// Look up a parameter (case-insensitive).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_multipart(&self) -> bool {
        self.media_type == "multipart"
    }
}

/// Whether a part is meant to be displayed or saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispositionKind {
    Inline,
    Attachment,
}

/// A parsed `Content-Disposition` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispositionDescriptor {
    pub kind: DispositionKind,
    pub parameters: Parameters,
}

impl DispositionDescriptor {
    /// Look up a parameter (case-insensitive).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

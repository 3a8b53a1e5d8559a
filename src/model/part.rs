//! Header views and MIME parts.

/// Ordered, case-insensitive view over the header fields of one part.
///
/// Field names are stored lower-cased. When a name occurs more than once,
/// lookups return the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderView {
    fields: Vec<(String, String)>,
}

impl HeaderView {
    /// An empty header view (a part with no header lines).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a view from `(name, value)` pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_ascii_lowercase(), v.into()))
            .collect();
        Self { fields }
    }

    /// Get the first value for a header name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `true` if at least one field with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over all fields in their original order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderView {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// One node of the MIME tree: its own headers and a slice of the message buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<'a> {
    pub headers: HeaderView,
    pub body: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn new(headers: HeaderView, body: &'a [u8]) -> Self {
        Self { headers, body }
    }
}

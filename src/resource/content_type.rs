//! Content types and the extension → MIME table.

use std::fmt;

use rustc_hash::FxHashMap;

/// A MIME-like content type such as `application/javascript`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentType(String);

impl ContentType {
    /// Create a content type.
    pub fn new(mime: impl Into<String>) -> Self {
        Self(mime.into())
    }

    /// The MIME string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentType {
    fn from(mime: &str) -> Self {
        Self::new(mime)
    }
}

impl From<String> for ContentType {
    fn from(mime: String) -> Self {
        Self(mime)
    }
}

impl PartialEq<str> for ContentType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ContentType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// =============================================================================
// MimeTypes
// =============================================================================

/// Maps format extensions (without the leading dot) to content types.
#[derive(Debug, Clone)]
pub struct MimeTypes {
    types: FxHashMap<String, ContentType>,
}

impl MimeTypes {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            types: FxHashMap::default(),
        }
    }

    /// Register `ext` as a format extension for `content_type`.
    pub fn insert(&mut self, ext: impl AsRef<str>, content_type: impl Into<ContentType>) {
        self.types
            .insert(normalize_ext(ext.as_ref()), content_type.into());
    }

    /// Content type registered for `ext`.
    pub fn get(&self, ext: &str) -> Option<&ContentType> {
        self.types.get(&normalize_ext(ext))
    }

    /// Whether `ext` is a registered format extension.
    pub fn contains(&self, ext: &str) -> bool {
        self.get(ext).is_some()
    }
}

impl Default for MimeTypes {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("js", "application/javascript");
        table.insert("css", "text/css");
        table.insert("html", "text/html");
        table.insert("json", "application/json");
        table.insert("svg", "image/svg+xml");
        table.insert("txt", "text/plain");
        table
    }
}

/// Lowercase and strip a leading dot.
pub(crate) fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

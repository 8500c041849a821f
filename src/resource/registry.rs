//! The search-path registry seam.
//!
//! The engine never touches the filesystem directly; every lookup goes
//! through a [`Registry`]. [`FileRegistry`](super::FileRegistry) is the
//! disk-backed implementation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::content_type::ContentType;
use crate::diagnostic::Result;
use crate::process::Processor;

/// Lazy sequence of candidate paths for a reference.
pub type Candidates<'a> = Box<dyn Iterator<Item = PathBuf> + 'a>;

// =============================================================================
// AssetAttributes
// =============================================================================

/// Facts about a path that are derived from its name alone.
#[derive(Clone, Default)]
pub struct AssetAttributes {
    /// Content type implied by the format extension or engine.
    pub content_type: Option<ContentType>,
    /// The format extension (`"js"` in `foo.js.erb`), if present.
    pub format_extension: Option<String>,
    /// Processing steps in application order.
    pub processors: Vec<Arc<dyn Processor>>,
}

impl AssetAttributes {
    /// Whether the path carries an explicit format extension.
    pub fn has_format_extension(&self) -> bool {
        self.format_extension.is_some()
    }

    /// Names of the processing steps, in application order.
    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }
}

impl fmt::Debug for AssetAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetAttributes")
            .field("content_type", &self.content_type)
            .field("format_extension", &self.format_extension)
            .field("processors", &self.processor_names())
            .finish()
    }
}

// =============================================================================
// Registry Trait
// =============================================================================

/// Environment collaborator: enumerates candidate files and maps extensions
/// to content types and processor chains.
///
/// Implementations are queried concurrently by independent compilations and
/// must be safe for shared reads.
///
/// # Example
///
/// ```ignore
/// struct Fixed(Vec<PathBuf>);
///
/// impl Registry for Fixed {
///     fn search_paths(&self) -> &[PathBuf] { &self.0 }
///     fn attributes_for(&self, _: &Path) -> AssetAttributes { AssetAttributes::default() }
///     fn resolve_search<'a>(&'a self, reference: &'a str, _: &'a Path) -> Candidates<'a> {
///         Box::new(self.0.iter().map(move |root| root.join(reference)))
///     }
///     fn read_unicode_text(&self, path: &Path) -> Result<String> { /* ... */ }
///     fn is_file(&self, path: &Path) -> bool { path.is_file() }
/// }
/// ```
pub trait Registry: Send + Sync {
    /// Configured search roots, in priority order.
    fn search_paths(&self) -> &[PathBuf];

    /// Attributes implied by the name of `path`. Never touches the filesystem.
    fn attributes_for(&self, path: &Path) -> AssetAttributes;

    /// Content type of `path`.
    fn content_type_of(&self, path: &Path) -> Option<ContentType> {
        self.attributes_for(path).content_type
    }

    /// Enumerate existing files that `reference` may refer to.
    ///
    /// Relative references (`./`, `../`) are anchored at `base_dir`; logical
    /// references are looked up in the search roots. May be empty.
    fn resolve_search<'a>(&'a self, reference: &'a str, base_dir: &'a Path) -> Candidates<'a>;

    /// Read `path` as text.
    fn read_unicode_text(&self, path: &Path) -> Result<String>;

    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Last modification time of `path`, if it exists.
    fn modified(&self, path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }
}

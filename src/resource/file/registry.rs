//! Disk-backed [`Registry`] implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::cache::EntryCache;
use super::path::{clean_path, is_relative_reference, normalize_path, split_extensions};
use super::read::read_text;
use crate::config;
use crate::diagnostic::Result;
use crate::process::Processor;
use crate::resource::content_type::{normalize_ext, ContentType, MimeTypes};
use crate::resource::registry::{AssetAttributes, Candidates, Registry};

/// A template engine bound to an extension.
#[derive(Clone)]
struct Engine {
    processor: Arc<dyn Processor>,
    /// Content type produced when the path has no format extension.
    default_type: Option<ContentType>,
}

type ProcessorTable = FxHashMap<ContentType, Vec<Arc<dyn Processor>>>;

// =============================================================================
// FileRegistry
// =============================================================================

/// Registry over an ordered list of search roots on disk.
///
/// Use [`FileRegistry::builder`] to configure roots, MIME types and
/// processors.
///
/// # Example
///
/// ```ignore
/// let registry = FileRegistry::builder()
///     .root("app/assets/javascripts")
///     .root("vendor/assets")
///     .register_engine("erb", ErbProcessor)
///     .build();
///
/// let asset = Compiler::new(&registry).compile("application.js")?;
/// ```
pub struct FileRegistry {
    roots: Vec<PathBuf>,
    mimes: MimeTypes,
    engines: FxHashMap<String, Engine>,
    preprocessors: ProcessorTable,
    postprocessors: ProcessorTable,
    index_name: String,
    entries: EntryCache,
}

impl FileRegistry {
    /// Create a builder.
    pub fn builder() -> FileRegistryBuilder {
        FileRegistryBuilder::new()
    }

    /// The MIME table.
    pub fn mime_types(&self) -> &MimeTypes {
        &self.mimes
    }

    /// Drop cached directory listings.
    pub fn clear_cache(&self) {
        self.entries.clear();
    }

    /// Number of directories whose listing is cached.
    pub fn cached_directories(&self) -> usize {
        self.entries.len()
    }

    fn is_registered(&self, ext: &str) -> bool {
        let ext = normalize_ext(ext);
        self.mimes.contains(&ext) || self.engines.contains_key(&ext)
    }

    /// Candidates for `reference` below one directory, in priority order.
    fn candidates_in(&self, dir: &Path, reference: &str) -> Vec<PathBuf> {
        let target = clean_path(&dir.join(reference));
        let (Some(parent), Some(name)) = (target.parent(), target.file_name().and_then(|n| n.to_str()))
        else {
            return Vec::new();
        };

        let mut found = self.matches_in(parent, name);

        // `foo.js` may also be served by `foo/index.js`
        let (stem, _) = split_extensions(name);
        let tail = &name[stem.len()..];
        let index = format!("{}{tail}", self.index_name);
        found.extend(self.matches_in(&parent.join(stem), &index));

        trace!(dir = %dir.display(), reference, count = found.len(), "enumerated candidates");
        found
    }

    /// The exact file `name`, then `name.<ext>...` with only registered extensions.
    fn matches_in(&self, dir: &Path, name: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();

        let exact = dir.join(name);
        if self.is_file(&exact) {
            found.push(exact);
        }

        let prefix = format!("{name}.");
        for entry in self.entries.entries(dir).iter() {
            let Some(suffix) = entry.strip_prefix(&prefix) else {
                continue;
            };
            if suffix.split('.').all(|ext| !ext.is_empty() && self.is_registered(ext)) {
                let candidate = dir.join(entry);
                if self.is_file(&candidate) {
                    found.push(candidate);
                }
            }
        }

        found
    }
}

impl Registry for FileRegistry {
    fn search_paths(&self) -> &[PathBuf] {
        &self.roots
    }

    fn attributes_for(&self, path: &Path) -> AssetAttributes {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let (_, exts) = split_extensions(name);
        let exts: Vec<String> = exts.into_iter().map(normalize_ext).collect();

        // Trailing run of engine extensions: `foo.js.coffee.erb` → [coffee, erb]
        let mut engine_start = exts.len();
        while engine_start > 0 && self.engines.contains_key(&exts[engine_start - 1]) {
            engine_start -= 1;
        }
        let engines: Vec<&Engine> = exts[engine_start..]
            .iter()
            .filter_map(|ext| self.engines.get(ext))
            .collect();

        let format_extension = exts[..engine_start]
            .iter()
            .rev()
            .find(|ext| self.mimes.contains(ext))
            .cloned();

        let content_type = format_extension
            .as_deref()
            .and_then(|ext| self.mimes.get(ext))
            .cloned()
            .or_else(|| engines.iter().find_map(|engine| engine.default_type.clone()));

        let mut processors = Vec::new();
        if let Some(content_type) = &content_type {
            processors.extend(self.preprocessors.get(content_type).into_iter().flatten().cloned());
        }
        // Engines apply right to left
        processors.extend(engines.iter().rev().map(|engine| engine.processor.clone()));
        if let Some(content_type) = &content_type {
            processors.extend(self.postprocessors.get(content_type).into_iter().flatten().cloned());
        }

        AssetAttributes {
            content_type,
            format_extension,
            processors,
        }
    }

    fn resolve_search<'a>(&'a self, reference: &'a str, base_dir: &'a Path) -> Candidates<'a> {
        let path = Path::new(reference);
        if path.is_absolute() {
            let exact = clean_path(path);
            return Box::new(self.is_file(&exact).then_some(exact).into_iter());
        }

        if is_relative_reference(reference) {
            return Box::new(self.candidates_in(base_dir, reference).into_iter());
        }

        Box::new(
            self.roots
                .iter()
                .flat_map(move |root| self.candidates_in(root, reference)),
        )
    }

    fn read_unicode_text(&self, path: &Path) -> Result<String> {
        read_text(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`FileRegistry`].
#[derive(Default)]
pub struct FileRegistryBuilder {
    roots: Vec<PathBuf>,
    mimes: Option<MimeTypes>,
    engines: FxHashMap<String, Engine>,
    preprocessors: ProcessorTable,
    postprocessors: ProcessorTable,
    index_name: Option<String>,
}

impl FileRegistryBuilder {
    /// Create a builder with the default MIME table and no roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a search root. Earlier roots win.
    pub fn root(mut self, dir: impl AsRef<Path>) -> Self {
        self.roots.push(normalize_path(dir.as_ref()));
        self
    }

    /// Append several search roots.
    pub fn roots<I, P>(self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        dirs.into_iter().fold(self, |builder, dir| builder.root(dir))
    }

    /// Replace the MIME table.
    pub fn mime_types(mut self, mimes: MimeTypes) -> Self {
        self.mimes = Some(mimes);
        self
    }

    /// Register a format extension.
    pub fn register_mime(mut self, ext: &str, content_type: impl Into<ContentType>) -> Self {
        self.mimes
            .get_or_insert_with(MimeTypes::default)
            .insert(ext, content_type);
        self
    }

    /// Register a template engine for `ext`.
    pub fn register_engine(self, ext: &str, processor: impl Processor + 'static) -> Self {
        self.insert_engine(ext, Arc::new(processor), None)
    }

    /// Register a template engine that produces `content_type` when the
    /// path has no format extension (`foo.coffee` → `application/javascript`).
    pub fn register_engine_with_type(
        self,
        ext: &str,
        processor: impl Processor + 'static,
        content_type: impl Into<ContentType>,
    ) -> Self {
        self.insert_engine(ext, Arc::new(processor), Some(content_type.into()))
    }

    /// Register a step that runs before the engines for `content_type`.
    pub fn register_preprocessor(
        mut self,
        content_type: impl Into<ContentType>,
        processor: impl Processor + 'static,
    ) -> Self {
        self.preprocessors
            .entry(content_type.into())
            .or_default()
            .push(Arc::new(processor));
        self
    }

    /// Register a step that runs after the engines for `content_type`.
    pub fn register_postprocessor(
        mut self,
        content_type: impl Into<ContentType>,
        processor: impl Processor + 'static,
    ) -> Self {
        self.postprocessors
            .entry(content_type.into())
            .or_default()
            .push(Arc::new(processor));
        self
    }

    /// Set the directory index basename.
    ///
    /// Default: [`Config::index_name`](crate::config::Config::index_name)
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Build the registry.
    pub fn build(self) -> FileRegistry {
        FileRegistry {
            roots: self.roots,
            mimes: self.mimes.unwrap_or_default(),
            engines: self.engines,
            preprocessors: self.preprocessors,
            postprocessors: self.postprocessors,
            index_name: self
                .index_name
                .unwrap_or_else(|| config::get().index_name.clone()),
            entries: EntryCache::new(),
        }
    }

    fn insert_engine(
        mut self,
        ext: &str,
        processor: Arc<dyn Processor>,
        default_type: Option<ContentType>,
    ) -> Self {
        self.engines.insert(
            normalize_ext(ext),
            Engine {
                processor,
                default_type,
            },
        );
        self
    }
}

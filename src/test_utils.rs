//! In-memory fixtures shared by unit tests.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::SystemTime;

use rustc_hash::FxHashMap;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::diagnostic::{AssetError, Result};
use crate::process::Processor;
use crate::resource::file::clean_path;
use crate::resource::{AssetAttributes, Candidates, MimeTypes, Registry};

static INIT_LOGGING: Once = Once::new();

/// Initialize tracing output for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG` if set, otherwise stays
/// silent.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Registry over a fixed set of in-memory files.
///
/// Extensions map to content types through the default [`MimeTypes`]; the
/// last known one is the format extension. Registered engines after it form
/// the processor chain, applied right to left.
pub struct StubRegistry {
    roots: Vec<PathBuf>,
    files: BTreeMap<PathBuf, String>,
    mimes: MimeTypes,
    engines: FxHashMap<String, Arc<dyn Processor>>,
    overrides: FxHashMap<PathBuf, Vec<Arc<dyn Processor>>>,
    searches: AtomicUsize,
}

impl StubRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
            files: BTreeMap::new(),
            mimes: MimeTypes::default(),
            engines: FxHashMap::default(),
            overrides: FxHashMap::default(),
            searches: AtomicUsize::new(0),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn with_engine(mut self, ext: &str, processor: impl Processor + 'static) -> Self {
        self.engines.insert(ext.to_string(), Arc::new(processor));
        self
    }

    /// Use `processors` for `path` regardless of its extensions.
    pub fn with_processors_for(
        mut self,
        path: impl Into<PathBuf>,
        processors: Vec<Arc<dyn Processor>>,
    ) -> Self {
        self.overrides.insert(path.into(), processors);
        self
    }

    /// Number of `resolve_search` calls so far.
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::Relaxed)
    }

    fn matches(&self, candidate: PathBuf) -> Vec<PathBuf> {
        let prefix = format!("{}.", candidate.display());
        self.files
            .keys()
            .filter(|path| {
                **path == candidate || path.to_str().is_some_and(|p| p.starts_with(&prefix))
            })
            .cloned()
            .collect()
    }
}

impl Registry for StubRegistry {
    fn search_paths(&self) -> &[PathBuf] {
        &self.roots
    }

    fn attributes_for(&self, path: &Path) -> AssetAttributes {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let exts: Vec<&str> = name.split('.').skip(1).collect();
        let format_at = exts.iter().rposition(|ext| self.mimes.contains(ext));

        let trailing = format_at.map_or(&exts[..], |at| &exts[at + 1..]);
        let processors = match self.overrides.get(path) {
            Some(processors) => processors.clone(),
            None => trailing
                .iter()
                .rev()
                .filter_map(|ext| self.engines.get(*ext).cloned())
                .collect(),
        };

        AssetAttributes {
            content_type: format_at.and_then(|at| self.mimes.get(exts[at]).cloned()),
            format_extension: format_at.map(|at| exts[at].to_string()),
            processors,
        }
    }

    fn resolve_search<'a>(&'a self, reference: &'a str, base_dir: &'a Path) -> Candidates<'a> {
        self.searches.fetch_add(1, Ordering::Relaxed);

        if reference.starts_with("./") || reference.starts_with("../") {
            return Box::new(self.matches(clean_path(&base_dir.join(reference))).into_iter());
        }
        Box::new(
            self.roots
                .iter()
                .flat_map(move |root| self.matches(clean_path(&root.join(reference)))),
        )
    }

    fn read_unicode_text(&self, path: &Path) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            AssetError::io(path, io::Error::new(io::ErrorKind::NotFound, "no such file"))
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        self.is_file(path).then(SystemTime::now)
    }
}

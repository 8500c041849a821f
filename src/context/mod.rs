//! The execution context passed to every processing step.
//!
//! One [`Context`] exists per file being processed. It owns the
//! [`DependencyRecorder`] for that file, resolves references against the
//! [`Registry`], and spawns child contexts for nested [`Context::evaluate`]
//! calls.
//!
//! ```text
//! Compiler::compile("application.js")
//! └── Context(application.js)          ← dependency set reported to the cache
//!     ├── require_asset("lib")         → required_paths += lib.js
//!     ├── depend_on("config.json")     → dependency_paths += config.json
//!     └── evaluate("./row.html")
//!         └── Context(row.html)        ← independent record, returned in Evaluation
//! ```

mod logical;
mod recorder;
mod resolve;

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config;
use crate::diagnostic::{AssetError, Result, SourceLocation};
use crate::process::pipeline::{self, EvaluateOptions, Evaluation};
use crate::resource::{ContentType, Registry};

pub use logical::logical_path;
pub use recorder::{DependencyRecord, DependencyRecorder};
pub use resolve::{ContentTypeConstraint, ResolveOptions};

/// Façade each processing step operates against.
pub struct Context<'a> {
    registry: &'a dyn Registry,
    pathname: PathBuf,
    logical_path: String,
    content_type: Option<ContentType>,
    root_path: Option<PathBuf>,
    line: Option<usize>,
    recorder: DependencyRecorder,
    /// Files being evaluated above this one, outermost first.
    ancestry: Vec<PathBuf>,
    max_depth: usize,
}

impl<'a> Context<'a> {
    /// Create a top-level context for `pathname`, requested as `reference`.
    pub fn new(registry: &'a dyn Registry, pathname: &Path, reference: &str) -> Self {
        Self::with_ancestry(registry, pathname, reference, Vec::new(), config::get().max_depth)
    }

    pub(crate) fn with_ancestry(
        registry: &'a dyn Registry,
        pathname: &Path,
        reference: &str,
        ancestry: Vec<PathBuf>,
        max_depth: usize,
    ) -> Self {
        let root_path = registry
            .search_paths()
            .iter()
            .find(|root| pathname.starts_with(root))
            .cloned();
        let logical_path = logical::logical_path_for(reference, pathname, root_path.as_deref());

        Self {
            registry,
            pathname: pathname.to_path_buf(),
            logical_path,
            content_type: registry.content_type_of(pathname),
            root_path,
            line: None,
            recorder: DependencyRecorder::new(pathname),
            ancestry,
            max_depth,
        }
    }

    /// Set the nesting limit for evaluations started from this context.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The registry this context resolves against.
    pub fn registry(&self) -> &'a dyn Registry {
        self.registry
    }

    /// Concrete path of the file being processed.
    pub fn pathname(&self) -> &Path {
        &self.pathname
    }

    /// Extension-stripped logical path.
    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    /// Content type of the asset being compiled, if known.
    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    /// First search root containing the current file.
    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    /// Line last reported by a processing step.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Report the line currently being rendered. Used only to annotate errors.
    pub fn set_line(&mut self, line: usize) {
        self.line = Some(line);
    }

    /// Forget the current line.
    pub fn clear_line(&mut self) {
        self.line = None;
    }

    /// Location of the current file and line.
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(&self.pathname, self.line)
    }

    /// Bookkeeping accumulated so far.
    pub fn recorder(&self) -> &DependencyRecorder {
        &self.recorder
    }

    /// Consume the context, keeping its bookkeeping.
    pub fn into_record(self) -> DependencyRecord {
        self.recorder.finish()
    }

    // =========================================================================
    // Dependency Operations
    // =========================================================================

    /// Record that the output depends on the content of `reference`.
    pub fn depend_on(&mut self, reference: &str) -> Result<PathBuf> {
        let path = self.resolve(reference, &ResolveOptions::any())?;
        if self.recorder.add_dependency(path.clone()) {
            debug!(from = %self.pathname.display(), dependency = %path.display(), "depend_on");
        }
        Ok(path)
    }

    /// Record that the output depends on the compiled form of `reference`.
    pub fn depend_on_asset(&mut self, reference: &str) -> Result<PathBuf> {
        let path = self.resolve(reference, &ResolveOptions::any())?;
        self.recorder.add_dependency(path.clone());
        self.recorder.add_dependency_asset(path.clone());
        debug!(from = %self.pathname.display(), asset = %path.display(), "depend_on_asset");
        Ok(path)
    }

    /// Require `reference` to be included once, before this asset.
    ///
    /// Resolves with the [`ContentTypeConstraint::SameAsSelf`] constraint.
    /// A target that does not exist is `NotFound`; one that exists but fails
    /// the requirability check is `NotRequirable`. Returns the resolved path whether or not it was newly appended.
    pub fn require_asset(&mut self, reference: &str) -> Result<PathBuf> {
        let path = self.resolve(reference, &ResolveOptions::same_as_self())?;
        if !self.registry.is_file(&path) {
            return Err(AssetError::not_found(reference, self.base_dir()));
        }
        if let Some(reason) = self.unrequirable_reason(&path) {
            return Err(AssetError::NotRequirable {
                reference: reference.to_string(),
                path,
                reason,
            });
        }

        self.recorder.add_dependency(path.clone());
        if self.recorder.add_required(path.clone()) {
            debug!(from = %self.pathname.display(), required = %path.display(), "require_asset");
        }
        Ok(path)
    }

    /// Exclude `reference` from the bundle.
    pub fn stub_asset(&mut self, reference: &str) -> Result<PathBuf> {
        let path = self.resolve(reference, &ResolveOptions::same_as_self())?;
        self.recorder.add_stubbed(path.clone());
        debug!(from = %self.pathname.display(), stubbed = %path.display(), "stub_asset");
        Ok(path)
    }

    /// Whether `reference` could be required by this asset.
    ///
    /// Takes `&self`: no bookkeeping is touched. A reference that does not
    /// resolve is not requirable.
    pub fn asset_requirable(&self, reference: &str) -> bool {
        match self.resolve(reference, &ResolveOptions::any()) {
            Ok(path) => self.unrequirable_reason(&path).is_none(),
            Err(err) => {
                trace!(reference, error = %err, "not requirable");
                false
            }
        }
    }

    fn unrequirable_reason(&self, path: &Path) -> Option<String> {
        if !self.registry.is_file(path) {
            return Some(format!("{} is not a file", path.display()));
        }
        let own = self.content_type.as_ref()?;
        match self.registry.content_type_of(path) {
            Some(found) if &found == own => None,
            Some(found) => Some(format!("'{found}' does not match '{own}'")),
            None => Some(format!("unknown content type, expected '{own}'")),
        }
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Run `reference` through its processor chain in a child context.
    ///
    /// The child's bookkeeping is returned in [`Evaluation::record`] and is
    /// not merged into this context. When content is read from disk rather
    /// than supplied via [`EvaluateOptions::with_data`], the evaluated file
    /// is added to this context's dependency set.
    pub fn evaluate(&mut self, reference: &str, options: EvaluateOptions) -> Result<Evaluation> {
        pipeline::evaluate(self, reference, options)
    }

    /// Create the context for a nested evaluation of `pathname`.
    pub(crate) fn child(&self, pathname: &Path, reference: &str) -> Result<Context<'a>> {
        let mut ancestry = self.ancestry.clone();
        ancestry.push(self.pathname.clone());

        if ancestry.iter().any(|ancestor| ancestor == pathname) {
            return Err(AssetError::CircularEvaluation {
                path: pathname.to_path_buf(),
                chain: ancestry,
            });
        }
        if ancestry.len() > self.max_depth {
            return Err(AssetError::DepthExceeded {
                path: pathname.to_path_buf(),
                limit: self.max_depth,
            });
        }

        Ok(Self::with_ancestry(
            self.registry,
            pathname,
            reference,
            ancestry,
            self.max_depth,
        ))
    }

    pub(crate) fn record_dependency(&mut self, path: PathBuf) {
        self.recorder.add_dependency(path);
    }
}

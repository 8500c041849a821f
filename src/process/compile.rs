//! Top-level asset compilation.
//!
//! # Example
//!
//! ```ignore
//! use asset_batch::{Compiler, FileRegistry};
//!
//! let registry = FileRegistry::builder()
//!     .root("app/assets/javascripts")
//!     .register_engine("erb", ErbProcessor)
//!     .build();
//!
//! let asset = Compiler::new(&registry).compile("application.js")?;
//! std::fs::write("public/application.js", &asset.content)?;
//! cache.store(asset.to_json())?;
//!
//! // Later: has anything changed?
//! if !asset.stale_dependencies(&registry).is_empty() {
//!     // recompile
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::pipeline::run_chain;
use crate::config;
use crate::context::{Context, DependencyRecord};
use crate::diagnostic::{AssetError, Result};
use crate::resource::{ContentType, Registry};

// =============================================================================
// CompiledAsset
// =============================================================================

/// Result of compiling one top-level asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAsset {
    /// Concrete source path.
    pub pathname: PathBuf,
    /// Extension-stripped logical path.
    pub logical_path: String,
    /// Content type, if the registry knows it.
    pub content_type: Option<ContentType>,
    /// Final output of the processor chain.
    pub content: String,
    /// Files and assets the output depends on.
    pub record: DependencyRecord,
    /// When compilation started.
    pub compiled_at: DateTime<Utc>,
}

impl CompiledAsset {
    /// Cache manifest for this asset.
    ///
    /// Path sets are sorted so equal records serialize identically.
    pub fn to_json(&self) -> Value {
        let paths = |paths: Vec<&Path>| -> Vec<String> {
            paths
                .into_iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect()
        };

        json!({
            "pathname": self.pathname.to_string_lossy(),
            "logical_path": self.logical_path,
            "content_type": self.content_type.as_ref().map(ContentType::as_str),
            "compiled_at": self.compiled_at.to_rfc3339(),
            "dependency_paths": paths(self.record.sorted_dependency_paths()),
            "required_paths": paths(self.record.required_paths.iter().map(PathBuf::as_path).collect()),
            "dependency_assets": paths(self.record.sorted_dependency_assets()),
            "stubbed_assets": paths(self.record.sorted_stubbed_assets()),
        })
    }

    /// Dependencies modified after compilation started, or no longer present.
    pub fn stale_dependencies(&self, registry: &dyn Registry) -> Vec<PathBuf> {
        self.record
            .sorted_dependency_paths()
            .into_iter()
            .filter(|path| match registry.modified(path) {
                Some(modified) => DateTime::<Utc>::from(modified) > self.compiled_at,
                None => {
                    warn!(path = %path.display(), "dependency missing");
                    true
                }
            })
            .map(Path::to_path_buf)
            .collect()
    }

    /// Whether no dependency changed since compilation.
    pub fn is_fresh(&self, registry: &dyn Registry) -> bool {
        self.stale_dependencies(registry).is_empty()
    }
}

// =============================================================================
// Compiler
// =============================================================================

/// Entry point for compiling top-level assets against a registry.
///
/// Each call to [`Compiler::compile`] owns exactly one root [`Context`];
/// nothing mutable is shared between calls.
#[derive(Clone, Copy)]
pub struct Compiler<'a> {
    registry: &'a dyn Registry,
    max_depth: usize,
}

impl<'a> Compiler<'a> {
    /// Create a compiler over `registry`.
    pub fn new(registry: &'a dyn Registry) -> Self {
        Self {
            registry,
            max_depth: config::get().max_depth,
        }
    }

    /// Override the nesting limit for nested evaluations.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Convert into a batch compiler.
    #[cfg(feature = "batch")]
    pub fn into_batch(self) -> super::batch::Batcher<'a> {
        super::batch::Batcher::new(self.registry).with_max_depth(self.max_depth)
    }

    /// Resolve a top-level `reference` to a concrete file.
    ///
    /// Absolute paths must name an existing file; other references are
    /// searched from the first search root.
    pub fn locate(&self, reference: &str) -> Result<PathBuf> {
        let path = Path::new(reference);
        let base = self
            .registry
            .search_paths()
            .first()
            .map_or(Path::new("."), PathBuf::as_path);

        if path.is_absolute() {
            return if self.registry.is_file(path) {
                Ok(path.to_path_buf())
            } else {
                Err(AssetError::not_found(reference, base))
            };
        }

        self.registry
            .resolve_search(reference, base)
            .next()
            .ok_or_else(|| AssetError::not_found(reference, base))
    }

    /// Compile `reference`.
    ///
    /// On failure the partial bookkeeping is dropped and the annotated error
    /// is returned.
    pub fn compile(&self, reference: &str) -> Result<CompiledAsset> {
        let pathname = self.locate(reference)?;
        let compiled_at = Utc::now();
        debug!(reference, path = %pathname.display(), "compile");

        let mut context = Context::new(self.registry, &pathname, reference);
        context.set_max_depth(self.max_depth);
        let processors = self.registry.attributes_for(&pathname).processors;
        let input = self.registry.read_unicode_text(&pathname)?;
        let content = run_chain(&mut context, &processors, input)?;

        let logical_path = context.logical_path().to_string();
        let content_type = context.content_type().cloned();
        let record = context.into_record();
        debug!(
            path = %pathname.display(),
            dependencies = record.dependency_paths.len(),
            required = record.required_paths.len(),
            "compiled"
        );

        Ok(CompiledAsset {
            pathname,
            logical_path,
            content_type,
            content,
            record,
            compiled_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;
    use crate::process::{EvaluateOptions, FnProcessor};
    use crate::resource::FileRegistry;
    use crate::test_utils::StubRegistry;
    use std::fs;
    use tempfile::TempDir;

    fn failing_erb() -> FnProcessor {
        FnProcessor::new("erb", |ctx, input| {
            for (index, line) in input.lines().enumerate() {
                ctx.set_line(index + 1);
                if line.contains("<%= boom %>") {
                    return Err(AssetError::processor("erb", "undefined local variable `boom'"));
                }
            }
            Ok(input)
        })
    }

    #[test]
    fn test_compile_failure_annotated_with_line() {
        let reg = StubRegistry::new("/assets")
            .with_file("/assets/broken.js.erb", "var a;\nvar b;\nvar c;\n<%= boom %>\n")
            .with_engine("erb", failing_erb());

        let err = Compiler::new(&reg).compile("broken.js").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Processor);
        assert!(err.location().unwrap().to_string().ends_with("broken.js.erb:4"));
    }

    #[test]
    fn test_compile_records_requires() {
        crate::test_utils::init_test_logging(None);
        let require_all = FnProcessor::new("directives", |ctx, input| {
            ctx.require_asset("lib.js")?;
            ctx.require_asset("lib.js")?;
            ctx.require_asset("util.js")?;
            Ok(input)
        });
        let reg = StubRegistry::new("/assets")
            .with_file("/assets/app.js.erb", "app")
            .with_file("/assets/lib.js", "")
            .with_file("/assets/util.js", "")
            .with_engine("erb", require_all);

        let asset = Compiler::new(&reg).compile("app.js").unwrap();

        assert_eq!(asset.logical_path, "app");
        assert_eq!(asset.content, "app");
        assert_eq!(
            asset.record.required_paths,
            [PathBuf::from("/assets/lib.js"), PathBuf::from("/assets/util.js")]
        );
        assert_eq!(
            asset.record.sorted_dependency_paths(),
            [
                Path::new("/assets/app.js.erb"),
                Path::new("/assets/lib.js"),
                Path::new("/assets/util.js"),
            ]
        );
    }

    #[test]
    fn test_nested_failure_keeps_innermost_location() {
        let outer = FnProcessor::new("erb", |ctx, input| {
            ctx.set_line(2);
            let row = ctx.evaluate("row.html.erb", EvaluateOptions::new())?;
            Ok(format!("{input}{}", row.content))
        });
        let reg = StubRegistry::new("/assets")
            .with_file("/assets/page.js.erb", "")
            .with_file("/assets/row.html.erb", "ok\n<%= boom %>\n")
            .with_engine("erb", outer)
            .with_processors_for("/assets/row.html.erb", vec![std::sync::Arc::new(failing_erb())]);
        let err = Compiler::new(&reg).compile("page.js").unwrap_err();

        let trace: Vec<String> = err.trace().iter().map(ToString::to_string).collect();
        assert_eq!(trace, ["/assets/row.html.erb:2", "/assets/page.js.erb:2"]);
        assert_eq!(err.kind(), ErrorKind::Processor);
    }

    #[test]
    fn test_compile_not_found() {
        let reg = StubRegistry::new("/assets");
        let err = Compiler::new(&reg).compile("nope.js").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = Compiler::new(&reg).compile("/assets/nope.js").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_to_json_manifest() {
        let reg = StubRegistry::new("/assets").with_file("/assets/plain.css", "body {}");
        let asset = Compiler::new(&reg).compile("plain.css").unwrap();
        let manifest = asset.to_json();

        assert_eq!(manifest["logical_path"], "plain");
        assert_eq!(manifest["content_type"], "text/css");
        assert_eq!(manifest["dependency_paths"], json!(["/assets/plain.css"]));
        assert_eq!(manifest["required_paths"], json!([]));
    }

    #[test]
    fn test_stale_dependencies_on_disk() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("app.js");
        let data = dir.path().join("data.json");
        fs::write(&app, "app").unwrap();
        fs::write(&data, "{}").unwrap();

        let reg = FileRegistry::builder()
            .root(dir.path())
            .register_preprocessor(
                "application/javascript",
                FnProcessor::new("deps", |ctx, input| {
                    ctx.depend_on("data.json")?;
                    Ok(input)
                }),
            )
            .build();

        let mut asset = Compiler::new(&reg).compile("app.js").unwrap();
        assert!(asset.is_fresh(&reg));

        // Pretend compilation happened long ago
        asset.compiled_at = DateTime::<Utc>::from(std::time::UNIX_EPOCH);
        assert_eq!(asset.stale_dependencies(&reg), [app.clone(), data.clone()]);

        fs::remove_file(&data).unwrap();
        asset.compiled_at = Utc::now();
        assert_eq!(asset.stale_dependencies(&reg), [data]);
    }
}

//! Parallel compilation of many top-level assets.
//!
//! Every reference gets its own root [`Context`](crate::context::Context);
//! the only state shared between workers is the registry, which is read-only
//! apart from its internal directory cache.
//!
//! # Example
//!
//! ```ignore
//! let batcher = Batcher::new(&registry);
//! let results = batcher.batch_compile_each(&["app.js", "site.css"], |reference| {
//!     progress.inc(1);
//! });
//! for result in results {
//!     match result {
//!         Ok(asset) => write_output(&asset)?,
//!         Err(err) => eprintln!("{}", format_error(&err, &DiagnosticOptions::colored())),
//!     }
//! }
//! ```

use rayon::prelude::*;
use tracing::debug;

use super::compile::{CompiledAsset, Compiler};
use crate::config;
use crate::diagnostic::Result;
use crate::resource::Registry;

/// Batch compiler over a shared registry.
pub struct Batcher<'a> {
    registry: &'a dyn Registry,
    max_depth: usize,
}

impl<'a> Batcher<'a> {
    /// Create a batcher over `registry`.
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

    /// Compile multiple references in parallel.
    ///
    /// Returns results in the same order as input references. A failure in
    /// one compilation does not affect the others.
    pub fn batch_compile<S: AsRef<str> + Sync>(&self, references: &[S]) -> Vec<Result<CompiledAsset>> {
        self.batch_compile_each(references, |_| {})
    }

    /// Compile multiple references in parallel with callback for each one.
    ///
    /// Like `batch_compile`, but invokes the callback once per reference
    /// compiled. Useful for progress tracking.
    pub fn batch_compile_each<S, F>(&self, references: &[S], on_each: F) -> Vec<Result<CompiledAsset>>
    where
        S: AsRef<str> + Sync,
        F: Fn(&str) + Sync,
    {
        if references.is_empty() {
            return vec![];
        }
        debug!(count = references.len(), "batch compile");

        let compiler = Compiler::new(self.registry).with_max_depth(self.max_depth);
        references
            .par_iter()
            .map(|reference| {
                let reference = reference.as_ref();
                let result = compiler.compile(reference);
                on_each(reference);
                result
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;
    use crate::process::FnProcessor;
    use crate::resource::FileRegistry;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileRegistry) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.js"), "lib").unwrap();
        for name in ["a", "b", "c", "d"] {
            fs::write(dir.path().join(format!("{name}.js")), name).unwrap();
        }

        let registry = FileRegistry::builder()
            .root(dir.path())
            .register_preprocessor(
                "application/javascript",
                FnProcessor::new("require-lib", |ctx, input| {
                    if ctx.logical_path() != "lib" {
                        ctx.require_asset("lib")?;
                    }
                    Ok(input)
                }),
            )
            .build();
        (dir, registry)
    }

    #[test]
    fn test_batch_preserves_order() {
        let (_dir, registry) = setup();
        let results = Batcher::new(&registry).batch_compile(&["d", "a", "c", "b"]);

        let contents: Vec<_> = results
            .into_iter()
            .map(|r| r.unwrap().content)
            .collect();
        assert_eq!(contents, ["d", "a", "c", "b"]);
    }

    #[test]
    fn test_batch_records_are_independent() {
        let (dir, registry) = setup();
        let results = Batcher::new(&registry).batch_compile(&["a.js", "b.js"]);

        for (result, name) in results.into_iter().zip(["a.js", "b.js"]) {
            let asset = result.unwrap();
            assert_eq!(asset.record.required_paths, [dir.path().join("lib.js")]);
            assert_eq!(asset.record.dependency_paths.len(), 2);
            assert!(asset.record.dependency_paths.contains(&dir.path().join(name)));
        }
    }

    #[test]
    fn test_batch_failure_is_isolated() {
        let (_dir, registry) = setup();
        let results = Batcher::new(&registry).batch_compile(&["a.js", "missing.js", "b.js"]);

        assert!(results[0].is_ok());
        assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::NotFound);
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_batch_each_callback() {
        let (_dir, registry) = setup();
        let seen = AtomicUsize::new(0);

        let results = Batcher::new(&registry).batch_compile_each(&["a", "b", "c"], |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(results.len(), 3);
        assert_eq!(seen.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_batch_empty() {
        let (_dir, registry) = setup();
        let none: [&str; 0] = [];
        assert!(Batcher::new(&registry).batch_compile(&none).is_empty());
    }

    #[test]
    fn test_compiler_into_batch() {
        let (_dir, registry) = setup();
        let batcher = Compiler::new(&registry).with_max_depth(4).into_batch();
        assert_eq!(batcher.max_depth, 4);
    }
}

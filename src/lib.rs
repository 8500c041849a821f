//! # asset-batch
//!
//! Asset resolution and dependency tracking for build pipelines.
//!
//! Every top-level asset is compiled by threading its source through a chain
//! of processors. Each step runs against a [`Context`] for the file being
//! transformed, through which it can:
//!
//! - **Resolve** references to concrete files, by search path or relative to
//!   the current file, optionally constrained to a content type
//! - **Record** what the output depends on (`depend_on`, `require_asset`,
//!   `stub_asset`), for cache invalidation and bundling
//! - **Evaluate** other files through their own chains, with independent
//!   bookkeeping
//!
//! Failures carry the file and line being processed when they happened.
//!
//! ## Quick Start
//!
//! ```ignore
//! use asset_batch::prelude::*;
//!
//! let registry = FileRegistry::builder()
//!     .root("app/assets")
//!     .register_preprocessor("application/javascript", DirectiveProcessor)
//!     .build();
//!
//! match Compiler::new(&registry).compile("application.js") {
//!     Ok(asset) => {
//!         std::fs::write("public/application.js", &asset.content)?;
//!         println!("{}", asset.to_json());
//!     }
//!     Err(err) => eprintln!("{}", format_error(&err, &DiagnosticOptions::colored())),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Runtime configuration (nesting limit, directory index name)
//! - [`context`]: The per-file façade and dependency bookkeeping
//! - [`process`]: Processor chains, compilation and batching
//! - [`resource`]: The registry seam and its filesystem implementation
//! - [`diagnostic`]: Error taxonomy and formatting

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod prelude;
pub mod process;
pub mod resource;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{Config, ConfigBuilder};
pub use context::{Context, ContentTypeConstraint, DependencyRecord, ResolveOptions};
pub use diagnostic::{
    format_error, format_error_with_sources, AssetError, DiagnosticOptions, DisplayStyle, ErrorKind,
    Result,
};
pub use process::{CompiledAsset, Compiler, DirectiveProcessor, EvaluateOptions, FnProcessor, Processor};
#[cfg(feature = "batch")]
pub use process::Batcher;
pub use resource::{ContentType, FileRegistry, MimeTypes, Registry};

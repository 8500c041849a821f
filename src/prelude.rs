//! Prelude module for convenient imports.
//!
//! ```ignore
//! use asset_batch::prelude::*;
//! ```

// Compilation
pub use crate::process::{
    CompiledAsset, Compiler, DirectiveProcessor, EvaluateOptions, Evaluation, FnProcessor,
    Processor,
};
#[cfg(feature = "batch")]
pub use crate::process::Batcher;

// Context
pub use crate::context::{
    Context, ContentTypeConstraint, DependencyRecord, DependencyRecorder, ResolveOptions,
};

// Registry
pub use crate::resource::{
    AssetAttributes, ContentType, FileRegistry, FileRegistryBuilder, MimeTypes, Registry,
};

// Diagnostics
pub use crate::diagnostic::{
    format_error, format_error_with_sources, AssetError, DiagnosticOptions, DisplayStyle, ErrorKind,
    Result, SourceLocation,
};

// Configuration
pub use crate::config::{Config, ConfigBuilder};

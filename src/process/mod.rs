//! Processing pipeline.
//!
//! - [`Compiler`] - Top-level compilation of one asset
//! - [`Batcher`] - Parallel compilation of many assets
//! - [`Processor`] - One transformation step in a chain
//! - [`DirectiveProcessor`] - `//= require` style header directives

pub mod compile;
pub mod directive;
pub(crate) mod pipeline;
pub mod processor;
#[cfg(feature = "batch")]
pub mod batch;

pub use compile::{CompiledAsset, Compiler};
pub use directive::DirectiveProcessor;
pub use pipeline::{EvaluateOptions, Evaluation};
pub use processor::{FnProcessor, Processor};

#[cfg(feature = "batch")]
pub use batch::Batcher;

//! Error taxonomy and formatting for asset resolution and processing.

mod error;
mod format;

pub use error::{AssetError, ErrorKind, Result, SourceLocation};
pub use format::{format_error, format_error_with_sources, DiagnosticOptions, DisplayStyle};

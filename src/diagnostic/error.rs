//! Asset error type.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::resource::ContentType;

/// Result alias used across the crate.
pub type Result<T, E = AssetError> = std::result::Result<T, E>;

// =============================================================================
// SourceLocation
// =============================================================================

/// A file and, when known, the line that was active when a failure occurred.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Concrete path of the file being processed.
    pub path: PathBuf,
    /// Line reported by the processing step (1-indexed), if any.
    pub line: Option<usize>,
}

impl SourceLocation {
    /// Create a location.
    pub fn new(path: impl Into<PathBuf>, line: Option<usize>) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}", self.path.display()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

// =============================================================================
// ErrorKind
// =============================================================================

/// Classification of an [`AssetError`], independent of annotation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No candidate matched during search.
    NotFound,
    /// An explicit extension or a resolved candidate has the wrong content type.
    ContentTypeMismatch,
    /// The target exists but cannot be required by the current asset.
    NotRequirable,
    /// A processing step failed.
    Processor,
    /// Reading a file failed.
    Io,
    /// File content is not valid UTF-8.
    InvalidUtf8,
    /// A file was evaluated while already being evaluated further up the chain.
    CircularEvaluation,
    /// Nested evaluation went deeper than the configured limit.
    DepthExceeded,
}

// =============================================================================
// AssetError
// =============================================================================

/// Error type for resolution and processing failures.
///
/// Failures that cross a file-processing boundary are wrapped in
/// [`AssetError::Annotated`]; [`AssetError::kind`] always reports the
/// classification of the original failure.
///
/// # Example
///
/// ```ignore
/// match compiler.compile("application.js") {
///     Ok(asset) => { /* cache it */ }
///     Err(e) if e.kind() == ErrorKind::NotFound => eprintln!("bad reference: {e}"),
///     Err(e) => {
///         if let Some(location) = e.location() {
///             eprintln!("failed in {location}");
///         }
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum AssetError {
    /// No file matched the reference.
    #[error("couldn't find file '{reference}'")]
    NotFound {
        /// The reference as written by the caller.
        reference: String,
        /// Directory the search was anchored at.
        base: PathBuf,
    },

    /// Content type conflict between a reference and the requested type.
    #[error("{reference} is '{found}', not '{expected}'")]
    ContentTypeMismatch {
        /// The reference as written by the caller.
        reference: String,
        /// The content type that was requested.
        expected: ContentType,
        /// The content type implied by the reference.
        found: ContentType,
    },

    /// The target resolved but fails the requirability check.
    #[error("{reference} is not requirable: {reason}")]
    NotRequirable {
        /// The reference as written by the caller.
        reference: String,
        /// The resolved path.
        path: PathBuf,
        /// Why the target was rejected.
        reason: String,
    },

    /// A processing step reported a failure.
    #[error("{processor}: {message}")]
    Processor {
        /// Name of the failing processor.
        processor: String,
        /// Message produced by the processor.
        message: String,
    },

    /// File I/O error.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// File content could not be decoded as text.
    #[error("{} is not valid UTF-8", path.display())]
    InvalidUtf8 {
        /// The offending file.
        path: PathBuf,
    },

    /// Evaluation cycle.
    #[error("circular evaluation of {}", path.display())]
    CircularEvaluation {
        /// The file that closed the cycle.
        path: PathBuf,
        /// Files being evaluated when the cycle was detected, outermost first.
        chain: Vec<PathBuf>,
    },

    /// Evaluation nesting limit reached.
    #[error("evaluation depth limit of {limit} exceeded at {}", path.display())]
    DepthExceeded {
        /// The file that would have exceeded the limit.
        path: PathBuf,
        /// The configured limit.
        limit: usize,
    },

    /// A failure annotated with the file (and line) it occurred in.
    #[error("{source}\n  (in {location})")]
    Annotated {
        /// Where the failure was observed.
        location: SourceLocation,
        /// The original failure.
        source: Box<AssetError>,
    },
}

impl AssetError {
    /// Create a processor failure.
    pub fn processor(processor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Processor {
            processor: processor.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(reference: impl Into<String>, base: &Path) -> Self {
        Self::NotFound {
            reference: reference.into(),
            base: base.to_path_buf(),
        }
    }

    /// Create an I/O error for `path`.
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wrap this error with a location. The original kind is preserved.
    pub fn annotate(self, location: SourceLocation) -> Self {
        Self::Annotated {
            location,
            source: Box::new(self),
        }
    }

    /// The original failure, with all annotation layers removed.
    pub fn root(&self) -> &AssetError {
        let mut current = self;
        while let Self::Annotated { source, .. } = current {
            current = source;
        }
        current
    }

    /// Classification of the original failure.
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ContentTypeMismatch { .. } => ErrorKind::ContentTypeMismatch,
            Self::NotRequirable { .. } => ErrorKind::NotRequirable,
            Self::Processor { .. } => ErrorKind::Processor,
            Self::Io { .. } => ErrorKind::Io,
            Self::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
            Self::CircularEvaluation { .. } => ErrorKind::CircularEvaluation,
            Self::DepthExceeded { .. } => ErrorKind::DepthExceeded,
            // root() never returns an annotation layer
            Self::Annotated { .. } => ErrorKind::Processor,
        }
    }

    /// Location closest to the fault, if the error crossed a file boundary.
    pub fn location(&self) -> Option<&SourceLocation> {
        self.trace().into_iter().next()
    }

    /// All annotated locations, innermost first.
    pub fn trace(&self) -> Vec<&SourceLocation> {
        let mut locations = Vec::new();
        let mut current = self;
        while let Self::Annotated { location, source } = current {
            locations.push(location);
            current = source;
        }
        locations.reverse();
        locations
    }

    /// Message of the original failure, without location suffixes.
    pub fn message(&self) -> String {
        self.root().to_string()
    }

    /// Whether this error means "the reference cannot be required".
    ///
    /// True for [`ErrorKind::NotFound`], [`ErrorKind::ContentTypeMismatch`]
    /// and [`ErrorKind::NotRequirable`].
    pub fn is_not_requirable_class(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::ContentTypeMismatch | ErrorKind::NotRequirable
        )
    }
}

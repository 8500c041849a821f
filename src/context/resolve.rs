//! Path resolution against the registry.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::Context;
use crate::diagnostic::{AssetError, Result};
use crate::resource::ContentType;

/// Content type a resolved path must have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeConstraint {
    /// Same type as the asset currently being compiled.
    SameAsSelf,
    /// A specific type.
    Exact(ContentType),
}

/// Options for [`Context::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Required content type, if any.
    pub content_type: Option<ContentTypeConstraint>,
}

impl ResolveOptions {
    /// No constraint: search anchored at the current file's directory.
    pub fn any() -> Self {
        Self::default()
    }

    /// Require the content type of the asset being compiled.
    pub fn same_as_self() -> Self {
        Self {
            content_type: Some(ContentTypeConstraint::SameAsSelf),
        }
    }

    /// Require a specific content type.
    pub fn content_type(content_type: impl Into<ContentType>) -> Self {
        Self {
            content_type: Some(ContentTypeConstraint::Exact(content_type.into())),
        }
    }
}

impl Context<'_> {
    /// Resolve `reference` to a concrete path.
    ///
    /// - Absolute paths are returned unchanged, without search or type check.
    /// - With a content-type constraint, an explicit format extension of a
    ///   different type fails with `ContentTypeMismatch` before any search;
    ///   otherwise the first candidate of the requested type wins.
    /// - Without a constraint, the first candidate wins.
    ///
    /// Searches are anchored at the directory of the current file. A
    /// [`ContentTypeConstraint::SameAsSelf`] constraint on an asset with no
    /// content type behaves as no constraint.
    pub fn resolve(&self, reference: &str, options: &ResolveOptions) -> Result<PathBuf> {
        let path = Path::new(reference);
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }

        let base = self.base_dir();
        let Some(expected) = self.requested_type(options) else {
            let found = self
                .registry
                .resolve_search(reference, base)
                .next()
                .ok_or_else(|| AssetError::not_found(reference, base))?;
            debug!(reference, resolved = %found.display(), "resolved");
            return Ok(found);
        };

        let attributes = self.registry.attributes_for(path);
        if attributes.has_format_extension()
            && let Some(found) = attributes.content_type
            && found != expected
        {
            debug!(reference, %expected, %found, "rejected by extension");
            return Err(AssetError::ContentTypeMismatch {
                reference: reference.to_string(),
                expected,
                found,
            });
        }

        let found = self
            .registry
            .resolve_search(reference, base)
            .find(|candidate| self.registry.content_type_of(candidate).as_ref() == Some(&expected))
            .ok_or_else(|| AssetError::not_found(reference, base))?;
        debug!(reference, %expected, resolved = %found.display(), "resolved");
        Ok(found)
    }

    fn requested_type(&self, options: &ResolveOptions) -> Option<ContentType> {
        match options.content_type.as_ref()? {
            ContentTypeConstraint::SameAsSelf => self.content_type.clone(),
            ContentTypeConstraint::Exact(content_type) => Some(content_type.clone()),
        }
    }

    /// Directory containing the file being compiled.
    pub(crate) fn base_dir(&self) -> &Path {
        self.pathname.parent().unwrap_or(Path::new("/"))
    }
}

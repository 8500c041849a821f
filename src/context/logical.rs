//! Logical path derivation.

use std::path::Path;

use crate::resource::file::{is_relative_reference, split_extensions};

/// Strip extensions from the last segment of `reference`.
///
/// `"application.js.erb"` → `"application"`, `"vendor/jquery.min.js"` →
/// `"vendor/jquery"`. A leading `./` is dropped.
pub fn logical_path(reference: &str) -> String {
    let reference = reference.strip_prefix("./").unwrap_or(reference);
    let (dir, name) = match reference.rfind('/') {
        Some(i) => reference.split_at(i + 1),
        None => ("", reference),
    };
    let (stem, _) = split_extensions(name);
    format!("{dir}{stem}")
}

/// Logical path for a context compiling `pathname`, requested as `reference`.
///
/// Logical references keep their own spelling. Absolute and relative ones
/// fall back to the path below its search root, or the file name.
pub(crate) fn logical_path_for(reference: &str, pathname: &Path, root: Option<&Path>) -> String {
    if !Path::new(reference).is_absolute() && !is_relative_reference(reference) {
        return logical_path(reference);
    }

    let relative = root
        .and_then(|root| pathname.strip_prefix(root).ok())
        .or_else(|| pathname.file_name().map(Path::new))
        .unwrap_or(pathname);

    let relative = relative.to_string_lossy().replace('\\', "/");
    logical_path(&relative)
}

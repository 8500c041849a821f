//! Path utilities.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Relative paths are joined with the current directory, then `.` and `..`
/// components are folded lexically. Symlinks are left alone so that recorded
/// dependency paths match what the registry enumerates.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        std::env::current_dir().map_or_else(|_| clean_path(path), |cwd| clean_path(&cwd.join(path)))
    }
}

/// Fold `.` and `..` components without touching the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Split a file name into its stem and extensions.
///
/// `"application.js.erb"` → `("application", ["js", "erb"])`. A leading dot
/// belongs to the stem, so `".babelrc"` has no extensions.
pub fn split_extensions(name: &str) -> (&str, Vec<&str>) {
    let start = usize::from(name.starts_with('.'));
    match name[start..].find('.') {
        Some(offset) => {
            let (stem, rest) = name.split_at(start + offset);
            let exts = rest[1..].split('.').filter(|ext| !ext.is_empty()).collect();
            (stem, exts)
        }
        None => (name, Vec::new()),
    }
}

/// Whether a reference is anchored at the requesting file (`./x`, `../x`).
pub fn is_relative_reference(reference: &str) -> bool {
    reference.starts_with("./") || reference.starts_with("../")
}

//! Directory listing cache.
//!
//! ```text
//! EntryCache (shared by every compilation using one FileRegistry)
//! └── FxHashMap<PathBuf, Arc<[String]>>
//!     └── sorted file names of one directory
//! ```
//!
//! Listings are taken once and reused until [`EntryCache::clear`]. A
//! directory that cannot be read is cached as empty.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Cache of directory entries keyed by directory path.
#[derive(Default)]
pub struct EntryCache {
    listings: RwLock<FxHashMap<PathBuf, Arc<[String]>>>,
}

impl EntryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted entry names of `dir`.
    pub fn entries(&self, dir: &Path) -> Arc<[String]> {
        if let Some(hit) = self.listings.read().get(dir) {
            return hit.clone();
        }

        let listing: Arc<[String]> = list_dir(dir).into();
        self.listings
            .write()
            .insert(dir.to_path_buf(), listing.clone());
        listing
    }

    /// Drop every cached listing.
    ///
    /// Call when files were added or removed under a search root.
    pub fn clear(&self) {
        self.listings.write().clear();
    }

    /// Number of cached directories.
    pub fn len(&self) -> usize {
        self.listings.read().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = read_dir
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

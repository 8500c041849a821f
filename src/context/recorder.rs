//! Dependency bookkeeping for one execution context.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

/// Everything one compilation recorded about the files it touched.
///
/// Produced by [`DependencyRecorder::finish`]; this is what a cache layer
/// stores next to the compiled output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Files whose content influenced the output. Always contains the
    /// asset's own path.
    pub dependency_paths: FxHashSet<PathBuf>,
    /// Assets to include once, before this one, in first-require order.
    pub required_paths: Vec<PathBuf>,
    /// Assets whose compiled form this asset depends on.
    pub dependency_assets: FxHashSet<PathBuf>,
    /// Assets excluded from the bundle.
    pub stubbed_assets: FxHashSet<PathBuf>,
}

impl DependencyRecord {
    /// Dependency paths in sorted order.
    pub fn sorted_dependency_paths(&self) -> Vec<&Path> {
        sorted(&self.dependency_paths)
    }

    /// Dependency assets in sorted order.
    pub fn sorted_dependency_assets(&self) -> Vec<&Path> {
        sorted(&self.dependency_assets)
    }

    /// Stubbed assets in sorted order.
    pub fn sorted_stubbed_assets(&self) -> Vec<&Path> {
        sorted(&self.stubbed_assets)
    }
}

fn sorted(set: &FxHashSet<PathBuf>) -> Vec<&Path> {
    let mut paths: Vec<&Path> = set.iter().map(PathBuf::as_path).collect();
    paths.sort();
    paths
}

/// Grow-only accumulator behind [`DependencyRecord`].
#[derive(Debug, Clone)]
pub struct DependencyRecorder {
    record: DependencyRecord,
    required_index: FxHashSet<PathBuf>,
}

impl DependencyRecorder {
    /// Create a recorder whose dependency set holds `own_path`.
    pub fn new(own_path: &Path) -> Self {
        let mut record = DependencyRecord::default();
        record.dependency_paths.insert(own_path.to_path_buf());
        Self {
            record,
            required_index: FxHashSet::default(),
        }
    }

    /// Insert into the dependency set. Returns `true` if newly added.
    pub fn add_dependency(&mut self, path: PathBuf) -> bool {
        self.record.dependency_paths.insert(path)
    }

    /// Append to the required paths unless already present.
    /// Returns `true` if newly appended.
    pub fn add_required(&mut self, path: PathBuf) -> bool {
        if self.required_index.contains(&path) {
            return false;
        }
        self.required_index.insert(path.clone());
        self.record.required_paths.push(path);
        true
    }

    /// Insert into the dependency assets.
    pub fn add_dependency_asset(&mut self, path: PathBuf) -> bool {
        self.record.dependency_assets.insert(path)
    }

    /// Insert into the stubbed assets.
    pub fn add_stubbed(&mut self, path: PathBuf) -> bool {
        self.record.stubbed_assets.insert(path)
    }

    /// Current dependency set.
    pub fn dependency_paths(&self) -> &FxHashSet<PathBuf> {
        &self.record.dependency_paths
    }

    /// Current required paths.
    pub fn required_paths(&self) -> &[PathBuf] {
        &self.record.required_paths
    }

    /// Borrow the record accumulated so far.
    pub fn record(&self) -> &DependencyRecord {
        &self.record
    }

    /// Consume the recorder.
    pub fn finish(self) -> DependencyRecord {
        self.record
    }
}

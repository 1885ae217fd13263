//! Collaborator interfaces for notebook content and declared dependencies,
//! with filesystem-backed implementations.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use nbspace_core::path_validation::{join_under_root, PathError};
use nbspace_core::NotebookVersion;

/// Errors surfaced by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependency name → version constraint. Empty constraint means any version.
/// Ordered so rendered manifests are stable across runs.
pub type DependencyMap = BTreeMap<String, String>;

/// Source of the dependencies declared for a notebook version.
pub trait DependencyStore: Send + Sync {
    /// An empty map is a valid answer: the notebook declares nothing.
    fn get_data(&self, name: &str, version: &NotebookVersion) -> Result<DependencyMap, StoreError>;
}

/// Read-only access to stored notebook content.
pub trait NotebookStore: Send + Sync {
    /// Directory holding the notebook's files. May not exist.
    fn paths_store(&self, name: &str, version: &NotebookVersion) -> Result<PathBuf, PathError>;

    fn exists(&self, name: &str, version: &NotebookVersion) -> bool {
        self.paths_store(name, version)
            .map(|p| p.is_dir())
            .unwrap_or(false)
    }
}

/// Stored notebooks laid out as `{root}/{name}/{version}/`.
#[derive(Debug, Clone)]
pub struct FsNotebookStore {
    root: PathBuf,
}

impl FsNotebookStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl NotebookStore for FsNotebookStore {
    fn paths_store(&self, name: &str, version: &NotebookVersion) -> Result<PathBuf, PathError> {
        join_under_root(&self.root, &[("name", name), ("version", version.as_str())])
    }
}

/// Dependencies stored as `{root}/{name}/{version}.json`, a JSON object of
/// package name → constraint. A missing file means no dependencies; `null`
/// constraints are treated as "any version".
#[derive(Debug, Clone)]
pub struct JsonDependencyStore {
    root: PathBuf,
}

impl JsonDependencyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_for(&self, name: &str, version: &NotebookVersion) -> Result<PathBuf, PathError> {
        let dir = join_under_root(&self.root, &[("name", name)])?;
        Ok(dir.join(format!("{}.json", version.as_str())))
    }
}

impl DependencyStore for JsonDependencyStore {
    fn get_data(&self, name: &str, version: &NotebookVersion) -> Result<DependencyMap, StoreError> {
        nbspace_core::path_validation::validate_segment("version", version.as_str())?;
        let path = self.file_for(name, version)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No dependency file at {}", path.display());
                return Ok(DependencyMap::new());
            }
            Err(e) => return Err(Box::new(e)),
        };
        let raw: BTreeMap<String, Option<String>> = serde_json::from_str(&content)?;
        Ok(raw
            .into_iter()
            .map(|(pkg, constraint)| (pkg, constraint.unwrap_or_default()))
            .collect())
    }
}

/// In-process dependency store, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDependencyStore {
    entries: HashMap<(String, String), DependencyMap>,
}

impl InMemoryDependencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, version: &str, deps: DependencyMap) {
        self.entries
            .insert((name.to_string(), version.to_string()), deps);
    }

    pub fn with(mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        let map = deps
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.insert(name, version, map);
        self
    }
}

impl DependencyStore for InMemoryDependencyStore {
    fn get_data(&self, name: &str, version: &NotebookVersion) -> Result<DependencyMap, StoreError> {
        Ok(self
            .entries
            .get(&(name.to_string(), version.as_str().to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

//! Directory layout for one preparation request.
//!
//! Pure path arithmetic: nothing here touches the filesystem.

use std::path::PathBuf;

use nbspace_core::config::PathsConfig;
use nbspace_core::path_validation::join_under_root;
use nbspace_core::NotebookBasic;

use crate::error::{Result, SpaceError};

/// Build-context and notebook-content directories for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    /// Holds the dockerfile, `docker-compose.yml` and `requirements.txt`
    pub build_dir: PathBuf,
    /// Holds the staged notebook files; bind-mounted into the container
    pub content_dir: PathBuf,
}

/// Resolves [`PathPair`]s under two disjoint roots.
#[derive(Debug, Clone)]
pub struct PathLayout {
    build_root: PathBuf,
    content_root: PathBuf,
}

impl PathLayout {
    /// Roots must be disjoint: neither may equal or contain the other.
    pub fn new(build_root: impl Into<PathBuf>, content_root: impl Into<PathBuf>) -> Result<Self> {
        let build_root = build_root.into();
        let content_root = content_root.into();
        if build_root.starts_with(&content_root) || content_root.starts_with(&build_root) {
            return Err(SpaceError::OverlappingRoots {
                build_root,
                content_root,
            });
        }
        Ok(Self {
            build_root,
            content_root,
        })
    }

    pub fn from_config(paths: &PathsConfig) -> Result<Self> {
        Self::new(paths.container_root.clone(), paths.container_nb_root.clone())
    }

    /// `{root}/{request_id}/{name}/{version}` under each root.
    ///
    /// Rejects segments that could escape the root or are not valid in a
    /// container name.
    pub fn resolve(&self, request_id: &str, notebook: &NotebookBasic) -> Result<PathPair> {
        let version = notebook.version.as_str();
        let segments = [
            ("request_id", request_id),
            ("name", notebook.name.as_str()),
            ("version", version),
        ];
        Ok(PathPair {
            build_dir: join_under_root(&self.build_root, &segments)?,
            content_dir: join_under_root(&self.content_root, &segments)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbspace_core::path_validation::PathError;

    fn layout() -> PathLayout {
        PathLayout::new("/srv/containers", "/srv/notebooks").unwrap()
    }

    #[test]
    fn test_resolve_paths() {
        let nb = NotebookBasic::new("demo", "1.0");
        let pair = layout().resolve("r7", &nb).unwrap();
        assert_eq!(pair.build_dir, PathBuf::from("/srv/containers/r7/demo/1.0"));
        assert_eq!(pair.content_dir, PathBuf::from("/srv/notebooks/r7/demo/1.0"));
    }

    #[test]
    fn test_paths_never_nest() {
        let nb = NotebookBasic::new("demo", "1.0");
        let pair = layout().resolve("r7", &nb).unwrap();
        assert!(!pair.build_dir.starts_with(&pair.content_dir));
        assert!(!pair.content_dir.starts_with(&pair.build_dir));
    }

    #[test]
    fn test_request_id_namespaces_paths() {
        let nb = NotebookBasic::new("demo", "1.0");
        let a = layout().resolve("r1", &nb).unwrap();
        let b = layout().resolve("r2", &nb).unwrap();
        assert_ne!(a.build_dir, b.build_dir);
        assert_ne!(a.content_dir, b.content_dir);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let nb = NotebookBasic::new("..", "1.0");
        let err = layout().resolve("r7", &nb).unwrap_err();
        assert!(matches!(
            err,
            SpaceError::Path(PathError::IllegalSegment { field: "name", .. })
        ));

        let nb = NotebookBasic::new("demo", "../../etc");
        assert!(layout().resolve("r7", &nb).is_err());
        let nb = NotebookBasic::new("demo", "1.0");
        assert!(layout().resolve("r7/../x", &nb).is_err());
    }

    #[test]
    fn test_overlapping_roots_rejected() {
        assert!(matches!(
            PathLayout::new("/srv/a", "/srv/a"),
            Err(SpaceError::OverlappingRoots { .. })
        ));
        assert!(PathLayout::new("/srv/a", "/srv/a/nb").is_err());
        assert!(PathLayout::new("/srv/a/build", "/srv/a").is_err());
        assert!(PathLayout::new("/srv/a", "/srv/ab").is_ok());
    }
}

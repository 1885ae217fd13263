//! Error type for the preparation pipeline.

use std::io;
use std::path::PathBuf;

use nbspace_core::path_validation::PathError;
use thiserror::Error;

use crate::credential::TokenError;
use crate::store::StoreError;
use crate::template::TemplateError;

/// Errors returned by [`EnvironmentPreparer::prepare`](crate::EnvironmentPreparer::prepare)
/// and its building blocks. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum SpaceError {
    /// The notebook has no stored content directory.
    #[error("No stored notebook exists for {name} {version} (looked in {})", path.display())]
    NotebookNotFound {
        name: String,
        version: String,
        path: PathBuf,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("build root {} and content root {} must be disjoint", build_root.display(), content_root.display())]
    OverlappingRoots {
        build_root: PathBuf,
        content_root: PathBuf,
    },

    #[error("no free port available: {0}")]
    PortUnavailable(#[source] io::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("dependency store lookup failed for {name} {version}: {source}")]
    DependencyStore {
        name: String,
        version: String,
        #[source]
        source: StoreError,
    },

    /// Template set and substitution call sites disagree. This is a defect,
    /// not something a caller can recover from.
    #[error("template contract violated: {0}")]
    TemplateContract(#[from] TemplateError),

    /// A configured path or derived name cannot be written into the
    /// compose descriptor as a quoted scalar.
    #[error("{field} is empty or contains a quote, backslash or control character")]
    UnsafeValue { field: &'static str },

    #[error("token could not be decoded: {0}")]
    Token(#[from] TokenError),

    #[error("host probe failed: {0}")]
    Probe(String),
}

pub type Result<T> = std::result::Result<T, SpaceError>;

/// `map_err` helper attaching a short description of the failed operation.
pub(crate) fn io_context(context: impl Into<String>) -> impl FnOnce(io::Error) -> SpaceError {
    let context = context.into();
    move |source| SpaceError::Io { context, source }
}

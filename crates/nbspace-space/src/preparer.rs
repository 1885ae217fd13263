//! Environment preparation pipeline.
//!
//! One call to [`EnvironmentPreparer::prepare`] runs these steps in order,
//! aborting on the first failure without cleaning up what was already
//! written:
//!
//! 1. check the stored notebook exists
//! 2. allocate a free port
//! 3. create the build directory
//! 4. create the content directory
//! 5. write `requirements.txt` when the notebook declares dependencies
//! 6. write the dockerfile
//! 7. write `docker-compose.yml` (the token is decoded here and only here)
//! 8. merge-copy the stored notebook into the content directory
//!
//! Calls for different request ids may run concurrently. Calls sharing a
//! request id must be serialized by the caller.

use std::path::{Path, PathBuf};

use nbspace_core::config::{CredentialConfig, PathsConfig, PortConfig};
use nbspace_core::{NotebookBasic, RequestContext};
use serde::Serialize;

use crate::credential::{KeyedTokenCodec, TokenCodec};
use crate::error::{io_context, Result, SpaceError};
use crate::info_log;
use crate::layout::PathLayout;
use crate::port::{LocalPortAllocator, PortAllocator};
use crate::probe::{HostProbe, ShellHostProbe};
use crate::render::{self, ComposeMode, ComposeParams, DockerfileParams};
use crate::requirements::generate_requirements;
use crate::store::{DependencyStore, FsNotebookStore, JsonDependencyStore, NotebookStore};

/// Where the prepared environment lives. Paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedEnvironment {
    /// Build context: run `docker-compose up` here
    pub build_dir: PathBuf,
    pub port: u16,
    /// Staged notebook content, bind-mounted into the container
    pub content_dir: PathBuf,
    /// Dockerfile name inside `build_dir`
    pub dockerfile: String,
    pub has_requirements: bool,
}

pub struct EnvironmentPreparer {
    layout: PathLayout,
    notebooks: Box<dyn NotebookStore>,
    dependencies: Box<dyn DependencyStore>,
    codec: Box<dyn TokenCodec>,
    ports: Box<dyn PortAllocator>,
    probe: Box<dyn HostProbe>,
}

impl EnvironmentPreparer {
    /// Preparer using the local port allocator and shell probe.
    pub fn new(
        layout: PathLayout,
        notebooks: Box<dyn NotebookStore>,
        dependencies: Box<dyn DependencyStore>,
        codec: Box<dyn TokenCodec>,
    ) -> Self {
        Self {
            layout,
            notebooks,
            dependencies,
            codec,
            ports: Box::new(LocalPortAllocator::default()),
            probe: Box::new(ShellHostProbe),
        }
    }

    /// Filesystem-backed stores and keyed codec, all taken from config.
    pub fn from_config(
        paths: &PathsConfig,
        credentials: &CredentialConfig,
        ports: &PortConfig,
    ) -> Result<Self> {
        let layout = PathLayout::from_config(paths)?;
        Ok(Self::new(
            layout,
            Box::new(FsNotebookStore::new(paths.store_root.clone())),
            Box::new(JsonDependencyStore::new(paths.deps_root.clone())),
            Box::new(KeyedTokenCodec::from_config(credentials)),
        )
        .with_ports(Box::new(LocalPortAllocator::from_config(ports))))
    }

    pub fn with_ports(mut self, ports: Box<dyn PortAllocator>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_probe(mut self, probe: Box<dyn HostProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Pre-flight check for `docker` and `docker-compose`. Independent of
    /// [`prepare`](Self::prepare); callers gate on it before launching.
    pub fn verify_integrity(&self) -> bool {
        self.probe.tooling_available()
    }

    pub fn prepare(
        &self,
        notebook: &NotebookBasic,
        ctx: &RequestContext,
    ) -> Result<PreparedEnvironment> {
        // Pure and fallible on bad segments, so resolved before anything
        // touches the filesystem.
        let pair = self.layout.resolve(&ctx.request_id, notebook)?;

        let notebook_dir = self.notebooks.paths_store(&notebook.name, &notebook.version)?;
        if !self.notebooks.exists(&notebook.name, &notebook.version) {
            return Err(SpaceError::NotebookNotFound {
                name: notebook.name.clone(),
                version: notebook.version.to_string(),
                path: notebook_dir,
            });
        }

        let port = self.ports.free_port().map_err(SpaceError::PortUnavailable)?;
        tracing::debug!("Allocated port {} for {}", port, ctx.request_id);

        let build_dir = absolute(&pair.build_dir)?;
        let content_dir = absolute(&pair.content_dir)?;

        crate::fs::create_dir_all(&build_dir)?;
        crate::fs::create_dir_all(&content_dir)?;
        if crate::fs::has_entries(&content_dir)? {
            tracing::warn!(
                "Content directory {} is not empty; staging merges over existing files",
                content_dir.display()
            );
        }

        let has_requirements =
            generate_requirements(self.dependencies.as_ref(), notebook, &build_dir)?;

        let dockerfile = render::write_dockerfile(
            &build_dir,
            notebook,
            &ctx.request_id,
            DockerfileParams {
                has_requirements,
                view_only: ctx.view_only,
            },
        )?;

        self.write_compose(&build_dir, &content_dir, &dockerfile, notebook, ctx, port)?;

        let copied = crate::fs::copy_tree_merge(&notebook_dir, &content_dir)?;
        tracing::debug!("Staged {} file(s) into {}", copied, content_dir.display());

        info_log!(
            "[INFO] Prepared {} for request {} on port {}",
            notebook.fqn(),
            ctx.request_id,
            port
        );

        Ok(PreparedEnvironment {
            build_dir,
            port,
            content_dir,
            dockerfile,
            has_requirements,
        })
    }

    fn write_compose(
        &self,
        build_dir: &Path,
        content_dir: &Path,
        dockerfile: &str,
        notebook: &NotebookBasic,
        ctx: &RequestContext,
        port: u16,
    ) -> Result<PathBuf> {
        let mode = if ctx.view_only {
            ComposeMode::ViewOnly
        } else {
            ComposeMode::Owner(self.probe.current_identity()?)
        };
        let params = ComposeParams::new(
            render::project_name(notebook, &ctx.request_id),
            dockerfile.to_string(),
            self.codec.decode(&ctx.token)?,
            content_dir,
            port,
            mode,
        )?;
        render::write_compose(build_dir, &params)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(io_context(format!("resolve {}", path.display())))
}

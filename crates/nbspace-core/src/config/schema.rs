//! Configuration structs grouped by concern, loaded from the environment.

use super::env_keys::{credentials, observability as obv_keys, paths, ports};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Default key material for the token codec. Deployments are expected to
/// override it with `NBSPACE_TOKEN_SECRET`.
pub const DEFAULT_TOKEN_SECRET: &str = "nbspace-default-token-secret";

fn data_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nbspace"))
        .unwrap_or_else(|| PathBuf::from(".").join(".nbspace"))
}

/// Directory roots used by the preparation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// Build-context root: `{container_root}/{request_id}/{name}/{version}`
    pub container_root: PathBuf,
    /// Notebook-content root: `{container_nb_root}/{request_id}/{name}/{version}`
    pub container_nb_root: PathBuf,
    /// Stored notebooks: `{store_root}/{name}/{version}`
    pub store_root: PathBuf,
    /// Dependency store: `{deps_root}/{name}/{version}.json`
    pub deps_root: PathBuf,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let base = data_root();
        let container_root = env_optional(
            paths::NBSPACE_CONTAINER_ROOT,
            paths::CONTAINER_ROOT_ALIASES,
        )
        .map(PathBuf::from)
        .unwrap_or_else(|| base.join("containers"));
        let container_nb_root = env_optional(
            paths::NBSPACE_CONTAINER_NB_ROOT,
            paths::CONTAINER_NB_ROOT_ALIASES,
        )
        .map(PathBuf::from)
        .unwrap_or_else(|| base.join("notebooks"));
        let store_root = env_optional(paths::NBSPACE_STORE_ROOT, paths::STORE_ROOT_ALIASES)
            .map(PathBuf::from)
            .unwrap_or_else(|| base.join("store"));
        let deps_root = env_optional(paths::NBSPACE_DEPS_ROOT, &[])
            .map(PathBuf::from)
            .unwrap_or_else(|| store_root.join(".deps"));
        Self {
            container_root,
            container_nb_root,
            store_root,
            deps_root,
        }
    }

    /// All roots placed under one base directory. Handy for tests and for
    /// the CLI `--root` override.
    pub fn under(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let store_root = base.join("store");
        Self {
            container_root: base.join("containers"),
            container_nb_root: base.join("notebooks"),
            deps_root: store_root.join(".deps"),
            store_root,
        }
    }
}

/// Token codec key material.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    pub secret: String,
}

impl CredentialConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let secret = env_or(
            credentials::NBSPACE_TOKEN_SECRET,
            credentials::TOKEN_SECRET_ALIASES,
            || DEFAULT_TOKEN_SECRET.to_string(),
        );
        if secret == DEFAULT_TOKEN_SECRET {
            tracing::debug!("NBSPACE_TOKEN_SECRET not set, using built-in default");
        }
        Self { secret }
    }
}

/// Host address probed when allocating a free port.
#[derive(Debug, Clone)]
pub struct PortConfig {
    pub host: String,
}

impl PortConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            host: env_or(ports::NBSPACE_PORT_HOST, &[], || "127.0.0.1".to_string()),
        }
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Observability: quiet, log_level, log_json
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    /// Cached for the lifetime of the process.
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::NBSPACE_QUIET, obv_keys::QUIET_ALIASES, false),
                log_level: env_or(
                    obv_keys::NBSPACE_LOG_LEVEL,
                    obv_keys::LOG_LEVEL_ALIASES,
                    || "nbspace=info".to_string(),
                ),
                log_json: env_bool(obv_keys::NBSPACE_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_keeps_roots_distinct() {
        let cfg = PathsConfig::under("/srv/nbspace");
        assert_eq!(cfg.container_root, PathBuf::from("/srv/nbspace/containers"));
        assert_eq!(cfg.container_nb_root, PathBuf::from("/srv/nbspace/notebooks"));
        assert_eq!(cfg.store_root, PathBuf::from("/srv/nbspace/store"));
        assert_eq!(cfg.deps_root, PathBuf::from("/srv/nbspace/store/.deps"));
        assert_ne!(cfg.container_root, cfg.container_nb_root);
    }
}

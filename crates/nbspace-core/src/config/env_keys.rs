//! Environment variable keys and their aliases.
//!
//! Primary keys use the `NBSPACE_*` prefix; the `JUPYTER_SPACE_*` names are
//! accepted as aliases for deployments configured before the rename.

/// Directory layout
pub mod paths {
    /// Root for build contexts (dockerfile, compose file, requirements.txt)
    pub const NBSPACE_CONTAINER_ROOT: &str = "NBSPACE_CONTAINER_ROOT";
    pub const CONTAINER_ROOT_ALIASES: &[&str] = &["JUPYTER_SPACE_CONTAINER_DEFAULT"];

    /// Root for staged notebook content (bind-mounted into the container)
    pub const NBSPACE_CONTAINER_NB_ROOT: &str = "NBSPACE_CONTAINER_NB_ROOT";
    pub const CONTAINER_NB_ROOT_ALIASES: &[&str] = &["JUPYTER_SPACE_CONTAINER_NB_DEFAULT"];

    /// Root of the stored notebooks
    pub const NBSPACE_STORE_ROOT: &str = "NBSPACE_STORE_ROOT";
    pub const STORE_ROOT_ALIASES: &[&str] = &["JUPYTER_SPACE_STORE"];

    /// Root of the dependency store (`{name}/{version}.json`)
    pub const NBSPACE_DEPS_ROOT: &str = "NBSPACE_DEPS_ROOT";
}

/// Token codec
pub mod credentials {
    pub const NBSPACE_TOKEN_SECRET: &str = "NBSPACE_TOKEN_SECRET";
    pub const TOKEN_SECRET_ALIASES: &[&str] = &["JUPYTER_SPACE_SECRET"];
}

/// Port allocation
pub mod ports {
    pub const NBSPACE_PORT_HOST: &str = "NBSPACE_PORT_HOST";
}

/// Observability and logging
pub mod observability {
    pub const NBSPACE_QUIET: &str = "NBSPACE_QUIET";
    pub const QUIET_ALIASES: &[&str] = &["JUPYTER_SPACE_QUIET"];

    pub const NBSPACE_LOG_LEVEL: &str = "NBSPACE_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["JUPYTER_SPACE_LOG_LEVEL"];

    pub const NBSPACE_LOG_JSON: &str = "NBSPACE_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &["JUPYTER_SPACE_LOG_JSON"];
}

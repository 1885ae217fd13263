//! Observability: tracing initialization.
//!
//! Reads `NBSPACE_QUIET`, `NBSPACE_LOG_LEVEL` and `NBSPACE_LOG_JSON` through
//! [`ObservabilityConfig`](crate::config::ObservabilityConfig). `RUST_LOG`
//! takes precedence when set.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Filter directive used when quiet mode is on.
const QUIET_LEVEL: &str = "nbspace=warn";

/// Whether `[INFO]` style progress output should be suppressed.
pub fn is_quiet() -> bool {
    crate::config::ObservabilityConfig::from_env().quiet
}

/// Initialize tracing. Call once at process startup; later calls are no-ops.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        QUIET_LEVEL.to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
}

//! Quiet-mode aware logging. When NBSPACE_QUIET=1 (e.g. when driven by a
//! service that parses stdout), progress `[INFO]` lines are suppressed.
//! Uses `tracing::info!` so output goes through the tracing subscriber.

#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            tracing::info!($($arg)*);
        }
    }};
}

pub fn is_quiet() -> bool {
    nbspace_core::observability::is_quiet()
}

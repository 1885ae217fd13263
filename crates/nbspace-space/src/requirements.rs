//! Render a notebook's declared dependencies into `requirements.txt`.

use std::path::Path;

use nbspace_core::NotebookBasic;

use crate::error::{Result, SpaceError};
use crate::store::{DependencyMap, DependencyStore};

/// Manifest file name inside the build directory. The dockerfile template
/// with requirements copies this exact name.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Operator prefixes that already form a valid pip requirement suffix.
const CONSTRAINT_PREFIXES: &[&str] = &["===", "==", ">=", "<=", "!=", "~=", "<", ">", "@", "[", ";"];

/// One manifest line in pip requirement syntax.
///
/// - empty constraint → bare package name (any version)
/// - constraint starting with an operator, extras, marker or URL → appended as is
/// - anything else is taken as an exact version → `name==constraint`
pub fn pkg_info(name: &str, constraint: &str) -> String {
    let constraint = constraint.trim();
    if constraint.is_empty() {
        name.to_string()
    } else if CONSTRAINT_PREFIXES.iter().any(|p| constraint.starts_with(p)) {
        format!("{}{}", name, constraint)
    } else {
        format!("{}=={}", name, constraint)
    }
}

/// Manifest lines for a dependency map, in map order.
pub fn render_lines(deps: &DependencyMap) -> Vec<String> {
    deps.iter()
        .map(|(name, constraint)| pkg_info(name, constraint))
        .collect()
}

/// Fetch the notebook's dependencies and write `<build_dir>/requirements.txt`.
///
/// Returns `true` when the manifest was written, `false` when the notebook
/// declares no dependencies. In that case a manifest left by an earlier run
/// for the same request is removed.
pub fn generate_requirements(
    store: &dyn DependencyStore,
    notebook: &NotebookBasic,
    build_dir: &Path,
) -> Result<bool> {
    let deps = store
        .get_data(&notebook.name, &notebook.version)
        .map_err(|source| SpaceError::DependencyStore {
            name: notebook.name.clone(),
            version: notebook.version.to_string(),
            source,
        })?;
    let lines = render_lines(&deps);
    if lines.is_empty() {
        tracing::debug!("{} declares no dependencies", notebook.fqn());
        if crate::fs::remove_file_if_exists(&build_dir.join(REQUIREMENTS_FILE))? {
            tracing::debug!("Removed stale {} from {}", REQUIREMENTS_FILE, build_dir.display());
        }
        return Ok(false);
    }
    crate::fs::write_text(build_dir, REQUIREMENTS_FILE, &lines.join("\n"))?;
    tracing::debug!("Wrote {} requirement(s) for {}", lines.len(), notebook.fqn());
    Ok(true)
}

//! Environment loading with alias fallback chains.
//!
//! The fallback logic lives here so callers never repeat `or_else` chains.

use std::env;
use std::path::Path;

/// Legacy variable → current variable. Used only to print a migration hint.
const DEPRECATED_PAIRS: &[(&str, &str)] = &[
    ("JUPYTER_SPACE_CONTAINER_DEFAULT", "NBSPACE_CONTAINER_ROOT"),
    ("JUPYTER_SPACE_CONTAINER_NB_DEFAULT", "NBSPACE_CONTAINER_NB_ROOT"),
    ("JUPYTER_SPACE_STORE", "NBSPACE_STORE_ROOT"),
    ("JUPYTER_SPACE_SECRET", "NBSPACE_TOKEN_SECRET"),
    ("JUPYTER_SPACE_LOG_LEVEL", "NBSPACE_LOG_LEVEL"),
];

fn warn_deprecated_env_vars() {
    use std::sync::Once;
    static WARNED: Once = Once::new();
    WARNED.call_once(|| {
        let hints: Vec<String> = DEPRECATED_PAIRS
            .iter()
            .filter(|(deprecated, recommended)| {
                env::var(deprecated).is_ok() && env::var(recommended).is_err()
            })
            .map(|(deprecated, recommended)| format!("{} → {}", deprecated, recommended))
            .collect();
        if !hints.is_empty() {
            tracing::warn!(
                "[DEPRECATED] environment variables should be migrated:\n   {}",
                hints.join("\n   ")
            );
        }
    });
}

/// Load `.env` from the current directory once per process.
/// Variables already present in the environment are never overridden.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
        warn_deprecated_env_vars();
    });
}

/// Load `<dir>/.env` without overriding existing variables.
pub fn load_dotenv_from_dir(dir: &Path) {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            #[allow(unsafe_code)]
            unsafe {
                env::set_var(&key, &value);
            }
        }
    }
}

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped, inline comments are stripped
/// outside quotes, and matching surrounding quotes are removed.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Read the primary variable or the first set alias, falling back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Like [`env_or`] but returns `None` when unset; blank values count as unset.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Boolean variable: `0/false/no/off` are false, anything else set is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    let v = env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()));
    match v.as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

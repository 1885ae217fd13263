//! Path validation utilities.
//!
//! Notebook names, versions and request ids end up as directory names and
//! inside container identifiers, so every segment is checked before it is
//! joined onto a configured root. Joined paths must stay within that root.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Longest segment accepted. Container names get `{name}-{version}-r{id}`,
/// so three maximal segments still fit comfortably in a container name.
pub const MAX_SEGMENT_LEN: usize = 64;

/// Errors returned by segment and root validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("{field} must not be empty")]
    EmptySegment { field: &'static str },

    #[error("{field} is longer than {max} characters: {value:?}")]
    SegmentTooLong {
        field: &'static str,
        value: String,
        max: usize,
    },

    #[error("{field} must be letters and digits, optionally joined by single '.', '_' or '-': {value:?}")]
    IllegalSegment { field: &'static str, value: String },

    #[error("path {path} escapes root {root}")]
    EscapesRoot { path: PathBuf, root: PathBuf },
}

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]+(?:[._-][A-Za-z0-9]+)*$").expect("segment regex is valid")
    })
}

/// Validate one path segment.
///
/// Separators (`.`, `_`, `-`) may only sit between letters or digits, so a
/// segment is also a valid component of a container image reference once
/// lower-cased. This rules out `.`, `..`, `/`, `\` and whitespace.
pub fn validate_segment<'a>(field: &'static str, value: &'a str) -> Result<&'a str, PathError> {
    if value.is_empty() {
        return Err(PathError::EmptySegment { field });
    }
    if value.len() > MAX_SEGMENT_LEN {
        return Err(PathError::SegmentTooLong {
            field,
            value: value.to_string(),
            max: MAX_SEGMENT_LEN,
        });
    }
    if !segment_pattern().is_match(value) {
        return Err(PathError::IllegalSegment {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Join validated segments onto `root`.
///
/// Each `(field, value)` pair is validated with [`validate_segment`]; the
/// result is then checked lexically so it never leaves `root`. No filesystem
/// access happens here.
pub fn join_under_root(root: &Path, segments: &[(&'static str, &str)]) -> Result<PathBuf, PathError> {
    let mut path = root.to_path_buf();
    for (field, value) in segments {
        path.push(validate_segment(field, value)?);
    }
    ensure_within(root, &path)?;
    Ok(path)
}

/// Lexical containment check: `path` must start with `root` and hold no
/// `..` components past it.
pub fn ensure_within(root: &Path, path: &Path) -> Result<(), PathError> {
    let escapes = || PathError::EscapesRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };
    let rest = path.strip_prefix(root).map_err(|_| escapes())?;
    if rest
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(escapes());
    }
    Ok(())
}

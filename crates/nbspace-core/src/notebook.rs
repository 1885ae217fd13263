//! Notebook identity and per-request context.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Notebook version. Compares dot-separated parts numerically where both
/// sides are numbers, so `1.10` sorts after `1.9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotebookVersion(String);

impl NotebookVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotebookVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotebookVersion {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NotebookVersion {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Ord for NotebookVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.0.split('.');
        let mut right = other.0.split('.');
        loop {
            match (left.next(), right.next()) {
                (None, None) => return self.0.cmp(&other.0),
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => {
                    let ord = match (a.parse::<u64>(), b.parse::<u64>()) {
                        (Ok(x), Ok(y)) => x.cmp(&y),
                        _ => a.cmp(b),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
        }
    }
}

impl PartialOrd for NotebookVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A stored notebook, identified by name and version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotebookBasic {
    pub name: String,
    pub version: NotebookVersion,
}

impl NotebookBasic {
    pub fn new(name: impl Into<String>, version: impl Into<NotebookVersion>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Fully-qualified name used for container and file naming: `{name}-{version}`.
    pub fn fqn(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// Caller-supplied context for one preparation call.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    /// Token in obscured form; decoded only when the descriptor is rendered.
    pub token: String,
    pub view_only: bool,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, token: impl Into<String>, view_only: bool) -> Self {
        Self {
            request_id: request_id.into(),
            token: token.into(),
            view_only,
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("token", &"<redacted>")
            .field("view_only", &self.view_only)
            .finish()
    }
}

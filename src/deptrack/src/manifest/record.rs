//! Normalized dependency records.

use serde::Serialize;

/// A single dependency declared by a manifest.
///
/// `path` is always non-empty. Which of the remaining fields are populated depends on the
/// manifest format: vendor-lock documents may carry all three, module files only `version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DependencyRecord {
    /// Import path of the dependency (e.g. "github.com/hashicorp/go-cleanhttp").
    pub path: String,

    /// Pinned revision, usually a commit hash.
    pub revision: String,

    /// Semantic version or version constraint.
    pub version: String,

    /// Exact resolved version.
    pub version_exact: String,
}

impl DependencyRecord {
    /// Creates a record carrying only a path and a version.
    pub fn versioned(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            ..Default::default()
        }
    }
}

//! Repository references handed to the crawl workers.

use serde::Serialize;
use std::fmt;

/// One unit of crawl work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryRef {
    /// Owning user or organization.
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Full repository name in "owner/name" format.
    pub full_name: String,

    /// Branch the manifest is read from.
    pub branch: String,

    /// Substring a dependency path must contain to be kept.
    pub package_filter: Option<String>,
}

impl RepositoryRef {
    /// Creates a reference for `owner/name` on `branch`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>, branch: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let full_name = format!("{owner}/{name}");
        Self {
            owner,
            name,
            full_name,
            branch: branch.into(),
            package_filter: None,
        }
    }

    /// Sets the package-name filter carried to the parser.
    #[must_use]
    pub fn with_package_filter(mut self, filter: Option<String>) -> Self {
        self.package_filter = filter.filter(|f| !f.is_empty());
        self
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Splits an "owner/name" slug.
///
/// Returns `None` unless the slug has exactly two non-empty segments.
#[must_use]
pub fn split_slug(slug: &str) -> Option<(&str, &str)> {
    let (owner, name) = slug.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

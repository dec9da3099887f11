//! Discovered repository information.

use crate::repository::RepositoryRef;
use serde::Serialize;

/// A repository returned by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredRepository {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Full repository name in "owner/name" format.
    pub full_name: String,

    /// Default branch name reported by the API, if any.
    pub default_branch: Option<String>,

    /// Whether the repository is archived.
    pub archived: bool,
}

impl DiscoveredRepository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            full_name: format!("{owner}/{name}"),
            owner,
            name,
            default_branch: None,
            archived: false,
        }
    }

    /// Converts into crawl work.
    ///
    /// With `follow_default_branch`, the repository's own default branch is used when the
    /// API reported one; otherwise `branch`.
    #[must_use]
    pub fn into_ref(
        self,
        branch: &str,
        follow_default_branch: bool,
        package_filter: Option<&str>,
    ) -> RepositoryRef {
        let branch = match self.default_branch {
            Some(default) if follow_default_branch => default,
            _ => branch.to_string(),
        };
        RepositoryRef {
            owner: self.owner,
            name: self.name,
            full_name: self.full_name,
            branch,
            package_filter: None,
        }
        .with_package_filter(package_filter.map(str::to_string))
    }
}

impl From<octocrab::models::Repository> for DiscoveredRepository {
    fn from(repo: octocrab::models::Repository) -> Self {
        // `full_name` is authoritative when present; the owner is only optional in the model.
        let owner = repo
            .owner
            .as_ref()
            .map(|owner| owner.login.clone())
            .or_else(|| {
                repo.full_name
                    .as_deref()
                    .and_then(|full| full.split_once('/'))
                    .map(|(owner, _)| owner.to_string())
            })
            .unwrap_or_default();
        let full_name = repo
            .full_name
            .clone()
            .unwrap_or_else(|| format!("{}/{}", owner, repo.name));

        Self {
            owner,
            name: repo.name,
            full_name,
            default_branch: repo.default_branch,
            archived: repo.archived.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_ref_uses_fixed_branch() {
        let mut repo = DiscoveredRepository::new("org", "svc");
        repo.default_branch = Some("main".to_string());

        let work = repo.into_ref("master", false, Some("hashicorp"));

        assert_eq!(work.full_name, "org/svc");
        assert_eq!(work.branch, "master");
        assert_eq!(work.package_filter.as_deref(), Some("hashicorp"));
    }

    #[test]
    fn into_ref_follows_default_branch() {
        let mut repo = DiscoveredRepository::new("org", "svc");
        repo.default_branch = Some("main".to_string());

        assert_eq!(repo.clone().into_ref("master", true, None).branch, "main");

        repo.default_branch = None;
        assert_eq!(repo.into_ref("master", true, None).branch, "master");
    }
}

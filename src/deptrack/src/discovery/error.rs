//! Repository discovery error types.

use thiserror::Error;

/// Errors that can occur during repository discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// A repository was not given as "owner/name".
    #[error("Invalid repository '{slug}', expected owner/name")]
    InvalidSlug { slug: String },
}

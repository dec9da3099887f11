//! Runner error types.

/// Errors that abort a run.
///
/// Per-repository failures never appear here; they are recorded in the aggregate.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading and validation errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// HTTP client initialization errors.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// Repository discovery errors.
    #[error(transparent)]
    Discovery(#[from] crate::discovery::DiscoveryError),

    /// Report output errors.
    #[error(transparent)]
    Report(#[from] crate::report::ReportError),

    /// Discovery succeeded but nothing is left to crawl.
    #[error("No repositories found")]
    NoRepositories,
}

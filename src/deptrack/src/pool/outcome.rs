//! Per-repository crawl outcomes.

use crate::fetch::FetchError;
use crate::manifest::{DependencyRecord, ParseError};
use crate::repository::RepositoryRef;
use std::fmt;
use thiserror::Error;

/// Why a repository produced no dependencies.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The manifest could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The manifest was retrieved but is malformed.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: &'static str,
        #[source]
        source: ParseError,
    },

    /// Processing the repository panicked.
    #[error("Crawl aborted: {message}")]
    Panicked { message: String },
}

impl CrawlError {
    /// Classifies the failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Fetch(FetchError::Network { .. }) => FailureKind::Network,
            Self::Fetch(FetchError::NotFound { .. }) => FailureKind::NotFound,
            Self::Parse { .. } => FailureKind::Parse,
            Self::Panicked { .. } => FailureKind::Internal,
        }
    }
}

/// Classification of a per-repository failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    /// Connection error, timeout or truncated body.
    Network,

    /// The repository has no manifest of the crawled format (non-200 status).
    NotFound,

    /// The manifest body is malformed.
    Parse,

    /// The crawl of the repository panicked.
    Internal,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::NotFound => "not-found",
            Self::Parse => "parse",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of crawling one repository.
///
/// Exactly one outcome is produced for every repository submitted to the pool.
#[derive(Debug)]
pub struct FetchOutcome {
    /// The repository that was crawled.
    pub repository: RepositoryRef,

    /// Parsed (and filtered) dependencies, or the classified failure.
    pub result: Result<Vec<DependencyRecord>, CrawlError>,
}

impl FetchOutcome {
    /// Creates a successful outcome.
    pub fn success(repository: RepositoryRef, dependencies: Vec<DependencyRecord>) -> Self {
        Self {
            repository,
            result: Ok(dependencies),
        }
    }

    /// Creates a failed outcome.
    pub fn failure(repository: RepositoryRef, error: impl Into<CrawlError>) -> Self {
        Self {
            repository,
            result: Err(error.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.result.as_ref().err().map(CrawlError::kind)
    }

    /// Returns the parsed dependencies; empty for failed outcomes.
    #[must_use]
    pub fn dependencies(&self) -> &[DependencyRecord] {
        match &self.result {
            Ok(dependencies) => dependencies,
            Err(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_failures() {
        let not_found = CrawlError::from(FetchError::NotFound {
            url: "u".to_string(),
            status: 404,
        });
        assert_eq!(not_found.kind(), FailureKind::NotFound);

        let parse = CrawlError::Parse {
            path: "go.mod",
            source: ParseError::GoMod {
                line: 3,
                message: "unterminated require block".to_string(),
            },
        };
        assert_eq!(parse.kind(), FailureKind::Parse);
        assert_eq!(
            parse.to_string(),
            "Failed to parse go.mod: go.mod:3: unterminated require block"
        );
    }

    #[test]
    fn failed_outcome_has_no_dependencies() {
        let outcome = FetchOutcome::failure(
            RepositoryRef::new("a", "b", "master"),
            FetchError::NotFound {
                url: "u".to_string(),
                status: 404,
            },
        );

        assert!(!outcome.is_success());
        assert_eq!(outcome.failure_kind(), Some(FailureKind::NotFound));
        assert!(outcome.dependencies().is_empty());
    }
}

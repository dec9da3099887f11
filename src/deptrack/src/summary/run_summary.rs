//! Run summary types.

use crate::aggregate::Aggregate;
use crate::pool::FailureKind;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of repositories returned by discovery.
    pub repositories_discovered: usize,

    /// Number of repositories crawled after filtering and limiting.
    pub repositories_processed: usize,

    /// Number of repositories whose manifest was parsed.
    pub succeeded: usize,

    /// Number of repositories without a manifest of the crawled format.
    pub not_found: usize,

    /// Number of repositories whose manifest could not be retrieved.
    pub network_failures: usize,

    /// Number of repositories with a malformed manifest.
    pub parse_failures: usize,

    /// Number of repositories whose crawl panicked.
    pub internal_failures: usize,

    /// Number of distinct dependency keys in the report.
    pub dependencies: usize,

    /// Where the report was written.
    pub output: String,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(repositories_discovered: usize) -> Self {
        Self {
            repositories_discovered,
            ..Default::default()
        }
    }

    /// Updates the summary with the aggregate of a run.
    pub fn record_aggregate(&mut self, aggregate: &Aggregate) {
        self.repositories_processed += aggregate.processed();
        self.succeeded += aggregate.succeeded();
        self.not_found += aggregate.failures_of(FailureKind::NotFound);
        self.network_failures += aggregate.failures_of(FailureKind::Network);
        self.parse_failures += aggregate.failures_of(FailureKind::Parse);
        self.internal_failures += aggregate.failures_of(FailureKind::Internal);
        self.dependencies = aggregate.len();
    }

    /// Total number of failed repositories.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.not_found + self.network_failures + self.parse_failures + self.internal_failures
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Returns true if every processed repository succeeded.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}

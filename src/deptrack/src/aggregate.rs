//! Folds crawl outcomes into the cross-repository dependency mapping.

use crate::key::DependencyKey;
use crate::pool::{CrawlError, FailureKind, FetchOutcome};
use crate::repository::RepositoryRef;
use std::collections::{BTreeMap, BTreeSet};

/// Repositories using one dependency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateEntry {
    key: DependencyKey,
    repositories: BTreeSet<String>,
}

impl AggregateEntry {
    /// The dependency key; its fields are the smallest field tuple seen for this key.
    #[must_use]
    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    /// Repository display names in sorted order, without duplicates.
    pub fn repositories(&self) -> impl Iterator<Item = &str> {
        self.repositories.iter().map(String::as_str)
    }

    /// Number of distinct repositories using the key.
    #[must_use]
    pub fn count(&self) -> usize {
        self.repositories.len()
    }
}

/// A repository excluded from the mapping, with the reason.
#[derive(Debug)]
pub struct Failure {
    pub repository: RepositoryRef,
    pub error: CrawlError,
}

impl Failure {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

/// Result of aggregating a whole run.
#[derive(Debug, Default)]
pub struct Aggregate {
    entries: BTreeMap<String, AggregateEntry>,
    failures: Vec<Failure>,
    succeeded: usize,
}

impl Aggregate {
    /// Entries sorted by key string.
    pub fn entries(&self) -> impl Iterator<Item = &AggregateEntry> {
        self.entries.values()
    }

    /// Looks up an entry by its key string.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AggregateEntry> {
        self.entries.get(key)
    }

    /// Number of distinct dependency keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failed repositories sorted by full name.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Number of failures of a given kind.
    #[must_use]
    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind() == kind).count()
    }

    /// Number of repositories whose manifest was parsed.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of repositories that failed for any reason.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Total number of outcomes consumed.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    fn insert(&mut self, key: DependencyKey, repository: &str) {
        match self.entries.get_mut(key.as_str()) {
            Some(entry) => {
                if key < entry.key {
                    entry.key = key;
                }
                if !entry.repositories.contains(repository) {
                    entry.repositories.insert(repository.to_string());
                }
            }
            None => {
                let mut repositories = BTreeSet::new();
                repositories.insert(repository.to_string());
                self.entries.insert(
                    key.as_str().to_string(),
                    AggregateEntry { key, repositories },
                );
            }
        }
    }
}

/// Partitions outcomes and folds the successful ones into a sorted mapping.
///
/// Must only be called once every outcome of the run is available. The result does not
/// depend on the order of `outcomes`.
pub fn aggregate<I>(outcomes: I) -> Aggregate
where
    I: IntoIterator<Item = FetchOutcome>,
{
    let mut aggregate = Aggregate::default();

    for outcome in outcomes {
        match outcome.result {
            Ok(dependencies) => {
                aggregate.succeeded += 1;
                for record in &dependencies {
                    aggregate.insert(
                        DependencyKey::from_record(record),
                        &outcome.repository.full_name,
                    );
                }
            }
            Err(error) => aggregate.failures.push(Failure {
                repository: outcome.repository,
                error,
            }),
        }
    }

    aggregate.failures.sort_by(|a, b| {
        a.repository
            .full_name
            .cmp(&b.repository.full_name)
            .then_with(|| a.kind().cmp(&b.kind()))
    });

    aggregate
}

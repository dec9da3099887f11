//! Orchestrates a crawl run.
//!
//! The phases run strictly in sequence: discovery, the fetch-parse worker pool,
//! aggregation of every outcome, then report output. Aggregation only starts once the
//! pool has fully drained.

mod config;
mod error;

pub use config::{RunnerConfig, DEFAULT_BRANCH, DEFAULT_CONCURRENCY};
pub use error::RunnerError;

use crate::aggregate::{aggregate, Aggregate};
use crate::discovery::{discover_repositories, select_repositories, DiscoveredRepository};
use crate::fetch::{ManifestFetcher, RawContentFetcher};
use crate::manifest::ManifestFormat;
use crate::pool::{Progress, WorkerPool};
use crate::report::{write_failures, ReportError, ReportWriter};
use crate::repository::RepositoryRef;
use crate::summary::RunSummary;
use indicatif::MultiProgress;
use octocrab::Octocrab;
use std::io;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs a full discovery, crawl and report cycle.
pub struct Runner {
    config: RunnerConfig,
    octocrab: Octocrab,
    fetcher: Arc<RawContentFetcher>,
    bars: MultiProgress,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the configuration is invalid, before any client
    /// is created.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        config.validate()?;

        let mut builder = Octocrab::builder();
        match config.token() {
            Some(token) => builder = builder.personal_token(token.to_string()),
            None => warn!("No GitHub token configured, using unauthenticated API access"),
        }
        let octocrab = builder.build()?;
        let fetcher = RawContentFetcher::new(config.raw_base_url()?, config.request_timeout())?;

        Ok(Self {
            config,
            octocrab,
            fetcher: Arc::new(fetcher),
            bars: MultiProgress::new(),
        })
    }

    /// Draws the crawl progress bar through `bars`.
    ///
    /// Share it with the log writer so log lines are printed around the bar.
    #[must_use]
    pub fn with_progress_bars(mut self, bars: MultiProgress) -> Self {
        self.bars = bars;
        self
    }

    /// Returns the configuration of this runner.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Executes the run.
    ///
    /// # Errors
    ///
    /// Fails on discovery errors, when no repository is left to crawl, and when the report
    /// cannot be written. Per-repository failures are reported in the summary instead.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        info!(
            orgs = ?self.config.organizations(),
            repos = ?self.config.repositories(),
            "Discovering repositories"
        );
        let discovered = discover_repositories(
            &self.octocrab,
            self.config.organizations(),
            self.config.repositories(),
        )
        .await?;

        let mut summary = RunSummary::new(discovered.len());
        let repositories = prepare_repositories(discovered, &self.config);
        if repositories.is_empty() {
            warn!("No repositories left after filtering");
            return Err(RunnerError::NoRepositories);
        }

        let progress = if self.config.show_progress() {
            Progress::with_bar(&self.bars, repositories.len())
        } else {
            Progress::hidden()
        };
        let aggregate = crawl(
            Arc::clone(&self.fetcher),
            self.config.format(),
            self.config.concurrency(),
            repositories,
            &progress,
        )
        .await;
        progress.finish();
        summary.record_aggregate(&aggregate);

        let output = self.config.output();
        ReportWriter::for_target(self.config.format(), output).write_to(output, &aggregate)?;
        summary.output = output.describe();

        if self.config.show_errors() {
            write_failures(&mut io::stderr().lock(), aggregate.failures()).map_err(|source| {
                ReportError::Io {
                    path: "stderr".to_string(),
                    source,
                }
            })?;
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed(),
            dependencies = summary.dependencies,
            "Crawl complete"
        );
        Ok(summary)
    }
}

/// Applies the name filter and limit, then turns repositories into crawl work.
#[must_use]
pub fn prepare_repositories(
    discovered: Vec<DiscoveredRepository>,
    config: &RunnerConfig,
) -> Vec<RepositoryRef> {
    select_repositories(discovered, config.name_filter(), config.limit())
        .into_iter()
        .map(|repo| {
            repo.into_ref(
                config.branch(),
                config.use_default_branch(),
                config.package_filter(),
            )
        })
        .collect()
}

/// Crawls `repositories` with a bounded pool and aggregates every outcome.
pub async fn crawl<F>(
    fetcher: Arc<F>,
    format: ManifestFormat,
    concurrency: usize,
    repositories: Vec<RepositoryRef>,
    progress: &Progress,
) -> Aggregate
where
    F: ManifestFetcher + 'static,
{
    let pool = WorkerPool::new(fetcher, format, concurrency);
    let outcomes = pool.run(repositories, progress).await;
    aggregate(outcomes)
}

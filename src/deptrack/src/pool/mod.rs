//! Bounded worker pool that fetches and parses manifests.
//!
//! A fixed number of worker tasks drain one shared input queue. Each worker handles one
//! repository at a time (fetch, then parse) and publishes exactly one [`FetchOutcome`]
//! per repository to a shared results queue. Aggregation happens only after every worker
//! has exited, so no mapping is shared between workers.

mod outcome;
mod progress;

pub use outcome::{CrawlError, FailureKind, FetchOutcome};
pub use progress::Progress;

use crate::fetch::ManifestFetcher;
use crate::manifest::{self, ManifestFormat};
use crate::repository::RepositoryRef;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Runs manifest crawls with bounded concurrency.
#[derive(Debug)]
pub struct WorkerPool<F> {
    fetcher: Arc<F>,
    format: ManifestFormat,
    concurrency: usize,
}

impl<F> WorkerPool<F>
where
    F: ManifestFetcher + 'static,
{
    /// Creates a pool running up to `concurrency` workers.
    pub fn new(fetcher: Arc<F>, format: ManifestFormat, concurrency: usize) -> Self {
        Self {
            fetcher,
            format,
            concurrency,
        }
    }

    /// Number of workers started for `items` repositories.
    ///
    /// At least one, and never more than there are repositories.
    #[must_use]
    pub fn worker_count(&self, items: usize) -> usize {
        self.concurrency.max(1).min(items)
    }

    /// Crawls every repository and returns one outcome per input, in completion order.
    ///
    /// `progress` is incremented exactly once per repository, whether it succeeded or not.
    /// There is no cancellation: every submitted repository is processed to completion.
    pub async fn run(&self, repositories: Vec<RepositoryRef>, progress: &Progress) -> Vec<FetchOutcome> {
        let total = repositories.len();
        if total == 0 {
            return Vec::new();
        }

        let workers = self.worker_count(total);
        info!(
            repositories = total,
            workers,
            format = %self.format,
            "Starting crawl"
        );

        let (work_tx, work_rx) = mpsc::channel::<RepositoryRef>(workers);
        let work_rx = Arc::new(Mutex::new(work_rx));
        // Room for every outcome, so no worker blocks on publishing before the join below.
        let (result_tx, mut result_rx) = mpsc::channel::<FetchOutcome>(total);

        let mut tasks = JoinSet::new();
        for worker in 0..workers {
            tasks.spawn(run_worker(
                worker,
                Arc::clone(&self.fetcher),
                self.format,
                Arc::clone(&work_rx),
                result_tx.clone(),
                progress.clone(),
            ));
        }
        drop(result_tx);

        for repository in repositories {
            if let Err(unsent) = work_tx.send(repository).await {
                error!(
                    repo = %unsent.0.full_name,
                    "All workers exited before the queue was drained"
                );
                break;
            }
        }
        // Closing the queue lets idle workers exit.
        drop(work_tx);

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Worker task failed");
            }
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = result_rx.recv().await {
            outcomes.push(outcome);
        }

        if outcomes.len() != total {
            warn!(
                expected = total,
                received = outcomes.len(),
                "Outcome count does not match submitted repositories"
            );
        }

        outcomes
    }
}

async fn run_worker<F>(
    worker: usize,
    fetcher: Arc<F>,
    format: ManifestFormat,
    queue: Arc<Mutex<mpsc::Receiver<RepositoryRef>>>,
    results: mpsc::Sender<FetchOutcome>,
    progress: Progress,
) where
    F: ManifestFetcher,
{
    let mut processed = 0usize;

    loop {
        let next = queue.lock().await.recv().await;
        let Some(repository) = next else {
            break;
        };

        let outcome = match AssertUnwindSafe(process_repository(
            fetcher.as_ref(),
            format,
            repository.clone(),
        ))
        .catch_unwind()
        .await
        {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(repo = %repository.full_name, worker, panic = %message, "Crawl panicked");
                FetchOutcome::failure(repository, CrawlError::Panicked { message })
            }
        };
        if results.send(outcome).await.is_err() {
            break;
        }
        progress.increment();
        processed += 1;
    }

    debug!(worker, processed, "Worker finished");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fetches and parses the manifest of a single repository.
///
/// Never fails: every problem is captured in the returned outcome.
pub async fn process_repository<F>(
    fetcher: &F,
    format: ManifestFormat,
    repository: RepositoryRef,
) -> FetchOutcome
where
    F: ManifestFetcher,
{
    let raw = match fetcher.fetch(&repository, format).await {
        Ok(raw) => raw,
        Err(e) => {
            let error = CrawlError::from(e);
            match error.kind() {
                FailureKind::NotFound => {
                    debug!(repo = %repository.full_name, error = %error, "No manifest")
                }
                _ => warn!(repo = %repository.full_name, error = %error, "Failed to fetch manifest"),
            }
            return FetchOutcome::failure(repository, error);
        }
    };

    match manifest::parse(format, &raw, repository.package_filter.as_deref()) {
        Ok(dependencies) => {
            debug!(
                repo = %repository.full_name,
                dependencies = dependencies.len(),
                "Parsed manifest"
            );
            FetchOutcome::success(repository, dependencies)
        }
        Err(source) => {
            warn!(
                repo = %repository.full_name,
                error = %source,
                "Failed to parse manifest"
            );
            FetchOutcome::failure(
                repository,
                CrawlError::Parse {
                    path: format.manifest_path(),
                    source,
                },
            )
        }
    }
}

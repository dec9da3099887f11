#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod fetch;
pub mod key;
pub mod manifest;
pub mod pool;
pub mod rate_limit;
pub mod report;
pub mod repository;
pub mod runner;
pub mod summary;

pub use aggregate::{aggregate, Aggregate, AggregateEntry, Failure};
pub use config::{ConfigError, FileConfig};
pub use discovery::{
    discover_repositories, get_repository, list_organization_repositories, select_repositories,
    DiscoveredRepository, DiscoveryError,
};
pub use fetch::{FetchError, ManifestFetcher, RawContentFetcher, DEFAULT_RAW_BASE_URL};
pub use key::DependencyKey;
pub use manifest::{filter_packages, DependencyRecord, ManifestFormat, ParseError};
pub use pool::{CrawlError, FailureKind, FetchOutcome, Progress, WorkerPool};
pub use rate_limit::{core_rate_limit, ensure_core_rate_limit, reset_delay, RateLimitInfo};
pub use report::{write_failures, OutputTarget, ReportError, ReportWriter};
pub use repository::RepositoryRef;
pub use runner::{crawl, prepare_repositories, Runner, RunnerConfig, RunnerError};
pub use summary::RunSummary;

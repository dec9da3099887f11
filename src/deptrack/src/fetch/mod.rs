//! Manifest retrieval over HTTP.
//!
//! Manifests are read from the raw-content host rather than through the API, so fetching
//! them does not consume API rate limit.

mod error;

pub use error::FetchError;

use crate::manifest::ManifestFormat;
use crate::repository::RepositoryRef;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default host serving raw repository contents.
pub const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

const USER_AGENT: &str = concat!("deptrack/", env!("CARGO_PKG_VERSION"));

/// Retrieves raw manifest bytes for a repository.
pub trait ManifestFetcher: Send + Sync {
    /// Fetches the manifest of `format` from `repository`.
    ///
    /// Performs a single attempt; failures are classified, never retried.
    fn fetch(
        &self,
        repository: &RepositoryRef,
        format: ManifestFormat,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Fetches manifests from a raw-content host with a plain HTTP GET.
#[derive(Debug, Clone)]
pub struct RawContentFetcher {
    client: Client,
    base_url: Url,
}

impl RawContentFetcher {
    /// Creates a fetcher for `base_url`.
    ///
    /// Without a `timeout`, a request that never completes blocks its worker indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Builds the raw-content URL of a repository's manifest.
    ///
    /// Format: `{base}/{owner}/{name}/{branch}/{manifest path}`. Components are
    /// percent-encoded per path segment, so a branch containing `#`, `%` or `?` stays part
    /// of the path. Slashes in a branch name are kept as separators.
    #[must_use]
    pub fn manifest_url(&self, repository: &RepositoryRef, format: ManifestFormat) -> Url {
        let mut url = self.base_url.clone();
        // Only http(s) bases are accepted by configuration, and those always have a path.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([repository.owner.as_str(), repository.name.as_str()])
                .extend(repository.branch.split('/'))
                .extend(format.manifest_path().split('/'));
        }
        url
    }
}

impl ManifestFetcher for RawContentFetcher {
    async fn fetch(
        &self,
        repository: &RepositoryRef,
        format: ManifestFormat,
    ) -> Result<Vec<u8>, FetchError> {
        let target = self.manifest_url(repository, format);
        let url = target.to_string();
        debug!(url = %url, "Fetching manifest");

        let response = match self.client.get(target).send().await {
            Ok(response) => response,
            Err(source) => return Err(FetchError::Network { url, source }),
        };

        // Dropping the response releases the connection on every path below.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::NotFound {
                url,
                status: status.as_u16(),
            });
        }

        match response.bytes().await {
            Ok(body) => Ok(body.to_vec()),
            Err(source) => Err(FetchError::Network { url, source }),
        }
    }
}

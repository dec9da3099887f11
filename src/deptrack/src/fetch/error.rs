//! Manifest fetch error types.

use thiserror::Error;

/// Errors that can occur while retrieving a manifest.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body read failure.
    #[error("Failed to GET {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status other than 200.
    #[error("Manifest not found at {url} (HTTP {status})")]
    NotFound { url: String, status: u16 },
}

impl FetchError {
    /// Returns the URL that was requested.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::NotFound { url, .. } => url,
        }
    }
}

//! Configuration file deserialization.

use crate::config::ConfigError;
use crate::manifest::ManifestFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings read from a TOML configuration file.
///
/// Every key is optional; keys present here override built-in defaults and are in turn
/// overridden by command-line flags.
///
/// ```toml
/// orgs = ["terraform-providers"]
/// repos = ["hashicorp/terraform"]
/// mode = "vendor"
/// concurrency = 8
/// output = "dep_result.csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    /// Organizations whose repositories are crawled.
    #[serde(default)]
    pub orgs: Vec<String>,

    /// Explicit repositories in "owner/name" format.
    #[serde(default)]
    pub repos: Vec<String>,

    /// Keep only dependencies whose path contains this substring.
    pub package_filter: Option<String>,

    /// Keep only repositories whose name contains this substring.
    pub name_filter: Option<String>,

    /// Maximum number of repositories crawled.
    pub limit: Option<usize>,

    /// Number of concurrent workers.
    pub concurrency: Option<usize>,

    /// Manifest format to crawl.
    pub mode: Option<ManifestFormat>,

    /// Branch the manifest is read from.
    pub branch: Option<String>,

    /// Read each repository's default branch instead of `branch`.
    pub use_default_branch: Option<bool>,

    /// Report file; standard output when absent.
    pub output: Option<PathBuf>,

    /// Print failed repositories after the run.
    pub show_errors: Option<bool>,

    /// Host serving raw repository contents.
    pub raw_base_url: Option<String>,

    /// Per-request timeout for manifest fetches.
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parses configuration text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] if the text is not valid.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

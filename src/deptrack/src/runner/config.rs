//! Runner configuration.

use crate::config::{ConfigError, FileConfig};
use crate::fetch::DEFAULT_RAW_BASE_URL;
use crate::manifest::ManifestFormat;
use crate::report::OutputTarget;
use crate::repository::split_slug;
use std::time::Duration;
use url::Url;

/// Default number of concurrent workers.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Default branch manifests are read from.
pub const DEFAULT_BRANCH: &str = "master";

/// Configuration for a single crawl run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Organizations whose repositories are crawled.
    organizations: Vec<String>,
    /// Explicit repositories in "owner/name" format.
    repositories: Vec<String>,
    /// GitHub token used for discovery API calls.
    token: Option<String>,
    /// Substring a dependency path must contain.
    package_filter: Option<String>,
    /// Substring a repository name must contain.
    name_filter: Option<String>,
    /// Maximum number of repositories crawled.
    limit: Option<usize>,
    /// Number of concurrent workers.
    concurrency: usize,
    /// Manifest format to crawl.
    format: ManifestFormat,
    /// Branch manifests are read from.
    branch: String,
    /// Whether to use each repository's default branch instead of `branch`.
    use_default_branch: bool,
    /// Report destination.
    output: OutputTarget,
    /// Whether failed repositories are listed after the run.
    show_errors: bool,
    /// Whether a progress bar is drawn.
    show_progress: bool,
    /// Host serving raw repository contents.
    raw_base_url: String,
    /// Per-request timeout for manifest fetches.
    request_timeout: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            organizations: Vec::new(),
            repositories: Vec::new(),
            token: None,
            package_filter: None,
            name_filter: None,
            limit: None,
            concurrency: DEFAULT_CONCURRENCY,
            format: ManifestFormat::default(),
            branch: DEFAULT_BRANCH.to_string(),
            use_default_branch: false,
            output: OutputTarget::Stdout,
            show_errors: false,
            show_progress: true,
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl RunnerConfig {
    /// Creates a configuration crawling the given organizations and repositories.
    pub fn new(organizations: Vec<String>, repositories: Vec<String>) -> Self {
        Self {
            organizations,
            repositories,
            ..Self::default()
        }
    }

    /// Layers the settings of a configuration file on top of this configuration.
    ///
    /// Lists from the file are appended; scalar settings present in the file replace the
    /// current value.
    #[must_use]
    pub fn merge_file(mut self, file: FileConfig) -> Self {
        self.organizations.extend(file.orgs);
        self.repositories.extend(file.repos);
        if file.package_filter.is_some() {
            self.package_filter = file.package_filter;
        }
        if file.name_filter.is_some() {
            self.name_filter = file.name_filter;
        }
        if file.limit.is_some() {
            self.limit = file.limit;
        }
        if let Some(concurrency) = file.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(format) = file.mode {
            self.format = format;
        }
        if let Some(branch) = file.branch {
            self.branch = branch;
        }
        if let Some(use_default_branch) = file.use_default_branch {
            self.use_default_branch = use_default_branch;
        }
        if let Some(path) = file.output {
            self.output = OutputTarget::File(path);
        }
        if let Some(show_errors) = file.show_errors {
            self.show_errors = show_errors;
        }
        if let Some(raw_base_url) = file.raw_base_url {
            self.raw_base_url = raw_base_url;
        }
        if let Some(secs) = file.timeout_secs {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        self
    }

    /// Adds organizations to crawl.
    #[must_use]
    pub fn with_organizations(mut self, organizations: impl IntoIterator<Item = String>) -> Self {
        self.organizations.extend(organizations);
        self
    }

    /// Adds explicit repositories to crawl.
    #[must_use]
    pub fn with_repositories(mut self, repositories: impl IntoIterator<Item = String>) -> Self {
        self.repositories.extend(repositories);
        self
    }

    /// Sets the GitHub token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_package_filter(mut self, filter: impl Into<String>) -> Self {
        self.package_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        self.name_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: ManifestFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    #[must_use]
    pub fn with_default_branch(mut self, use_default_branch: bool) -> Self {
        self.use_default_branch = use_default_branch;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_show_errors(mut self, show_errors: bool) -> Self {
        self.show_errors = show_errors;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[must_use]
    pub fn with_raw_base_url(mut self, raw_base_url: impl Into<String>) -> Self {
        self.raw_base_url = raw_base_url.into();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Checks the configuration before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.organizations.is_empty() && self.repositories.is_empty() {
            return Err(ConfigError::invalid(
                "targets",
                "no organizations or repositories specified",
            ));
        }
        if let Some(org) = self.organizations.iter().find(|o| o.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "organization",
                format!("empty organization name {org:?}"),
            ));
        }
        if let Some(slug) = self.repositories.iter().find(|r| split_slug(r).is_none()) {
            return Err(ConfigError::invalid(
                "repository",
                format!("'{slug}' is not in owner/name format"),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid("concurrency", "must be at least 1"));
        }
        if self.limit == Some(0) {
            return Err(ConfigError::invalid("limit", "must be at least 1"));
        }
        if self.branch.trim().is_empty() {
            return Err(ConfigError::invalid("branch", "must not be empty"));
        }
        self.raw_base_url()?;
        Ok(())
    }

    /// Parsed raw-content base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the URL does not parse or is not HTTP(S).
    pub fn raw_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.raw_base_url)
            .map_err(|e| ConfigError::invalid("raw base URL", format!("{}: {e}", self.raw_base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "raw base URL",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    /// Returns the organizations to crawl.
    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }

    /// Returns the explicit repositories to crawl.
    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn package_filter(&self) -> Option<&str> {
        self.package_filter.as_deref()
    }

    pub fn name_filter(&self) -> Option<&str> {
        self.name_filter.as_deref()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the number of concurrent workers.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn format(&self) -> ManifestFormat {
        self.format
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn use_default_branch(&self) -> bool {
        self.use_default_branch
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    pub fn show_errors(&self) -> bool {
        self.show_errors
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid() -> RunnerConfig {
        RunnerConfig::new(vec!["terraform-providers".to_string()], Vec::new())
    }

    fn invalid_field(config: &RunnerConfig) -> String {
        match config.validate() {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = valid();

        assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(config.branch(), "master");
        assert_eq!(config.format(), ManifestFormat::VendorJson);
        assert_eq!(config.output(), &OutputTarget::Stdout);
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn requires_targets() {
        assert_eq!(invalid_field(&RunnerConfig::default()), "targets");
    }

    #[test]
    fn rejects_zero_concurrency_and_limit() {
        assert_eq!(invalid_field(&valid().with_concurrency(0)), "concurrency");
        assert_eq!(invalid_field(&valid().with_limit(0)), "limit");
    }

    #[test]
    fn rejects_malformed_repository() {
        let config = RunnerConfig::new(Vec::new(), vec!["just-a-name".to_string()]);
        assert_eq!(invalid_field(&config), "repository");
    }

    #[test]
    fn rejects_bad_raw_base_url() {
        assert_eq!(invalid_field(&valid().with_raw_base_url("not a url")), "raw base URL");
        assert_eq!(
            invalid_field(&valid().with_raw_base_url("ftp://example.com")),
            "raw base URL"
        );
    }

    #[test]
    fn empty_token_is_ignored() {
        assert!(valid().with_token(Some(String::new())).token().is_none());
        assert_eq!(valid().with_token(Some("t".into())).token(), Some("t"));
    }

    #[test]
    fn file_settings_override_defaults_and_flags_override_file() {
        let file = FileConfig {
            orgs: vec!["from-file".to_string()],
            concurrency: Some(8),
            mode: Some(ManifestFormat::GoMod),
            output: Some(PathBuf::from("deps.csv")),
            timeout_secs: Some(5),
            ..Default::default()
        };

        let config = RunnerConfig::default()
            .merge_file(file)
            .with_organizations(vec!["from-flag".to_string()])
            .with_concurrency(2);

        assert_eq!(config.organizations(), ["from-file", "from-flag"]);
        assert_eq!(config.concurrency(), 2);
        assert_eq!(config.format(), ManifestFormat::GoMod);
        assert_eq!(config.output().delimiter(), ',');
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
        assert!(config.validate().is_ok());
    }
}

//! Configuration file loading.
//!
//! A run is configured from command-line flags, optionally layered on top of a TOML file.
//! This module only reads and parses the file; merging and validation live in
//! [`crate::runner::RunnerConfig`].

mod error;
mod file;

pub use error::ConfigError;
pub use file::FileConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestFormat;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[test]
    fn can_load_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deptrack.toml");
        fs::write(
            &path,
            r#"
orgs = ["terraform-providers"]
repos = ["hashicorp/terraform"]
package-filter = "hashicorp"
limit = 10
concurrency = 8
mode = "go-mod"
branch = "main"
use-default-branch = true
output = "deps.csv"
show-errors = true
raw-base-url = "https://raw.example.com"
timeout-secs = 30
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();

        assert_eq!(config.orgs, vec!["terraform-providers"]);
        assert_eq!(config.repos, vec!["hashicorp/terraform"]);
        assert_eq!(config.package_filter.as_deref(), Some("hashicorp"));
        assert_eq!(config.limit, Some(10));
        assert_eq!(config.concurrency, Some(8));
        assert_eq!(config.mode, Some(ManifestFormat::GoMod));
        assert_eq!(config.use_default_branch, Some(true));
        assert_eq!(config.output, Some(PathBuf::from("deps.csv")));
        assert_eq!(config.timeout_secs, Some(30));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = FileConfig::parse("", Path::new("deptrack.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = FileConfig::parse("organisations = [\"x\"]", Path::new("deptrack.toml"));
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let result = FileConfig::load(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}

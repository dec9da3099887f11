//! Dependency manifest formats and parsers.
//!
//! Two formats are supported:
//! - [`ManifestFormat::VendorJson`] - the legacy `vendor/vendor.json` lock file
//! - [`ManifestFormat::GoMod`] - the Go module file `go.mod`
//!
//! Both parsers turn raw bytes into a list of [`DependencyRecord`] values. The format also
//! decides where the manifest lives in a repository and how the report lays out its columns.

mod error;
mod gomod;
mod record;
mod vendor;

pub use error::ParseError;
pub use gomod::{parse_go_mod, parse_go_module, GoModule};
pub use record::DependencyRecord;
pub use vendor::parse_vendor_json;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Manifest format crawled during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestFormat {
    /// `vendor/vendor.json` lock file.
    #[default]
    #[serde(rename = "vendor", alias = "vendor-json")]
    VendorJson,

    /// `go.mod` module file.
    GoMod,
}

impl ManifestFormat {
    /// Path of the manifest relative to the repository root.
    #[must_use]
    pub fn manifest_path(self) -> &'static str {
        match self {
            Self::VendorJson => "vendor/vendor.json",
            Self::GoMod => "go.mod",
        }
    }

    /// Returns the format name as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VendorJson => "vendor",
            Self::GoMod => "go-mod",
        }
    }

    /// Parses raw manifest bytes in this format.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the bytes are malformed for this format.
    pub fn parse(self, raw: &[u8]) -> Result<Vec<DependencyRecord>, ParseError> {
        match self {
            Self::VendorJson => parse_vendor_json(raw),
            Self::GoMod => parse_go_mod(raw),
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vendor" | "vendor-json" => Ok(Self::VendorJson),
            "go-mod" | "gomod" => Ok(Self::GoMod),
            other => Err(format!(
                "unknown manifest format '{other}' (expected 'vendor' or 'go-mod')"
            )),
        }
    }
}

/// Parses a manifest and applies the package-name filter.
///
/// # Errors
///
/// Returns [`ParseError`] if the manifest is malformed.
pub fn parse(
    format: ManifestFormat,
    raw: &[u8],
    package_filter: Option<&str>,
) -> Result<Vec<DependencyRecord>, ParseError> {
    let records = format.parse(raw)?;
    Ok(filter_packages(records, package_filter))
}

/// Keeps only records whose path contains `filter`.
///
/// The match is a case-sensitive, unanchored substring match. An absent or empty filter
/// keeps everything.
#[must_use]
pub fn filter_packages(
    records: Vec<DependencyRecord>,
    filter: Option<&str>,
) -> Vec<DependencyRecord> {
    match filter {
        Some(needle) if !needle.is_empty() => records
            .into_iter()
            .filter(|record| record.path.contains(needle))
            .collect(),
        _ => records,
    }
}

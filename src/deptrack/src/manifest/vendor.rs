//! Parser for the legacy `vendor/vendor.json` lock format.

use super::{DependencyRecord, ParseError};
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Top-level vendor-lock document.
#[derive(Debug, Deserialize)]
struct VendorFile {
    #[serde(default, deserialize_with = "null_as_default", alias = "Comment")]
    #[allow(dead_code)]
    comment: String,

    #[serde(default, deserialize_with = "null_as_default", alias = "Ignore")]
    #[allow(dead_code)]
    ignore: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "package", alias = "Package")]
    packages: Vec<VendorPackage>,
}

/// One entry of the `package` array.
#[derive(Debug, Deserialize)]
struct VendorPackage {
    #[serde(default, deserialize_with = "null_as_default", alias = "Path")]
    path: String,

    #[serde(default, deserialize_with = "null_as_default", alias = "Revision")]
    revision: String,

    #[serde(default, deserialize_with = "null_as_default", alias = "Version")]
    version: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        rename = "versionExact",
        alias = "VersionExact",
    )]
    version_exact: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        rename = "checksumSHA1",
        alias = "ChecksumSHA1",
    )]
    #[allow(dead_code)]
    checksum_sha1: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        rename = "revisionTime",
        alias = "RevisionTime",
    )]
    #[allow(dead_code)]
    revision_time: String,
}

/// Reads `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses a vendor-lock JSON document.
///
/// Every entry of the `package` array becomes one record with its fields copied verbatim.
/// Entries without a path are dropped.
///
/// # Errors
///
/// Returns [`ParseError::Json`] if the document is not valid JSON or has the wrong shape.
pub fn parse_vendor_json(raw: &[u8]) -> Result<Vec<DependencyRecord>, ParseError> {
    let file: VendorFile = serde_json::from_slice(raw)?;

    let total = file.packages.len();
    let records: Vec<DependencyRecord> = file
        .packages
        .into_iter()
        .filter(|package| !package.path.is_empty())
        .map(|package| DependencyRecord {
            path: package.path,
            revision: package.revision,
            version: package.version,
            version_exact: package.version_exact,
        })
        .collect();

    if records.len() != total {
        debug!(
            dropped = total - records.len(),
            "Dropped vendor entries without a path"
        );
    }

    Ok(records)
}

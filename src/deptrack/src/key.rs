//! Aggregation keys for dependency records.

use crate::manifest::DependencyRecord;
use serde::Serialize;
use std::fmt;

/// Separator placed between the non-empty fields of a key.
pub const KEY_SEPARATOR: &str = "_";

/// Deduplication identity of a dependency.
///
/// The key string joins the non-empty fields of a record in a fixed order: path, revision,
/// version, exact version. Records whose non-empty fields form the same sequence share a
/// key even if the values came from different fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DependencyKey {
    key: String,
    record: DependencyRecord,
}

impl DependencyKey {
    /// Derives the key for a record.
    #[must_use]
    pub fn from_record(record: &DependencyRecord) -> Self {
        let key = [
            record.path.as_str(),
            record.revision.as_str(),
            record.version.as_str(),
            record.version_exact.as_str(),
        ]
        .into_iter()
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR);

        Self {
            key,
            record: record.clone(),
        }
    }

    /// Returns the joined key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Returns the record fields the key was derived from.
    #[must_use]
    pub fn fields(&self) -> &DependencyRecord {
        &self.record
    }

    pub fn path(&self) -> &str {
        &self.record.path
    }

    pub fn revision(&self) -> &str {
        &self.record.revision
    }

    pub fn version(&self) -> &str {
        &self.record.version
    }

    pub fn version_exact(&self) -> &str {
        &self.record.version_exact
    }
}

impl From<&DependencyRecord> for DependencyKey {
    fn from(record: &DependencyRecord) -> Self {
        Self::from_record(record)
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, revision: &str, version: &str, version_exact: &str) -> DependencyRecord {
        DependencyRecord {
            path: path.to_string(),
            revision: revision.to_string(),
            version: version.to_string(),
            version_exact: version_exact.to_string(),
        }
    }

    #[test]
    fn joins_all_populated_fields() {
        let key = DependencyKey::from_record(&record("a.b/c", "abc123", "v1", "v1.0.0"));
        assert_eq!(key.as_str(), "a.b/c_abc123_v1_v1.0.0");
    }

    #[test]
    fn skips_empty_fields() {
        assert_eq!(
            DependencyKey::from_record(&record("a.b/c", "abc123", "", "")).as_str(),
            "a.b/c_abc123"
        );
        assert_eq!(
            DependencyKey::from_record(&record("a.b/c", "", "v1.2.3", "")).as_str(),
            "a.b/c_v1.2.3"
        );
        assert_eq!(
            DependencyKey::from_record(&record("a.b/c", "", "", "")).as_str(),
            "a.b/c"
        );
    }

    #[test]
    fn is_deterministic() {
        let r = record("a.b/c", "abc123", "", "v2");
        assert_eq!(DependencyKey::from_record(&r), DependencyKey::from_record(&r));
        assert_eq!(DependencyKey::from_record(&r).to_string(), "a.b/c_abc123_v2");
    }

    #[test]
    fn same_sequence_from_different_fields_collides() {
        let as_revision = DependencyKey::from_record(&record("a.b/c", "x", "", ""));
        let as_version = DependencyKey::from_record(&record("a.b/c", "", "x", ""));

        assert_eq!(as_revision.as_str(), as_version.as_str());
        assert_ne!(as_revision.fields(), as_version.fields());
    }

    #[test]
    fn exposes_decomposed_fields() {
        let key = DependencyKey::from(&record("a.b/c", "abc", "v1", "v1.0.1"));

        assert_eq!(key.path(), "a.b/c");
        assert_eq!(key.revision(), "abc");
        assert_eq!(key.version(), "v1");
        assert_eq!(key.version_exact(), "v1.0.1");
    }
}

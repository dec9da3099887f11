//! Tabular report output.
//!
//! Standard output gets tab-separated rows, files get comma-separated rows. Within a row
//! the repository list uses a secondary separator that differs from the field delimiter.

use crate::aggregate::{Aggregate, AggregateEntry, Failure};
use crate::manifest::ManifestFormat;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while writing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to create or write the output.
    #[error("Failed to write report to '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Where the report is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output, tab separated.
    #[default]
    Stdout,

    /// A file, comma separated. Truncated if it exists.
    File(PathBuf),
}

impl OutputTarget {
    /// Field delimiter used for this target.
    #[must_use]
    pub fn delimiter(&self) -> char {
        match self {
            Self::Stdout => '\t',
            Self::File(_) => ',',
        }
    }

    /// Human-readable destination.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Stdout => "stdout".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Serializes an [`Aggregate`] as delimited rows.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    format: ManifestFormat,
    delimiter: char,
}

impl ReportWriter {
    pub fn new(format: ManifestFormat, delimiter: char) -> Self {
        Self { format, delimiter }
    }

    /// Creates a writer using the delimiter of `target`.
    pub fn for_target(format: ManifestFormat, target: &OutputTarget) -> Self {
        Self::new(format, target.delimiter())
    }

    /// Column names for the manifest format.
    #[must_use]
    pub fn header(&self) -> &'static [&'static str] {
        match self.format {
            ManifestFormat::VendorJson => &[
                "Package",
                "Revision",
                "Version",
                "VersionExact",
                "Count",
                "Repositories",
            ],
            ManifestFormat::GoMod => &["Package", "Version", "Count", "Repositories"],
        }
    }

    /// Separator between repository names inside the last column.
    #[must_use]
    pub fn repository_separator(&self) -> &'static str {
        if self.delimiter == ',' {
            ";"
        } else {
            ","
        }
    }

    /// Writes the header and one row per dependency key, in key order.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `out`.
    pub fn write<W: Write>(&self, out: &mut W, aggregate: &Aggregate) -> io::Result<()> {
        self.write_row(out, self.header().iter().copied())?;
        for entry in aggregate.entries() {
            let row = self.row(entry);
            self.write_row(out, row.iter().map(String::as_str))?;
        }
        out.flush()
    }

    /// Writes the report to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] if the target cannot be created or written.
    pub fn write_to(&self, target: &OutputTarget, aggregate: &Aggregate) -> Result<(), ReportError> {
        let result = match target {
            OutputTarget::Stdout => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                self.write(&mut lock, aggregate)
            }
            OutputTarget::File(path) => File::create(path).and_then(|file| {
                let mut out = BufWriter::new(file);
                self.write(&mut out, aggregate)
            }),
        };

        result.map_err(|source| ReportError::Io {
            path: target.describe(),
            source,
        })?;

        info!(
            destination = %target.describe(),
            rows = aggregate.len(),
            "Report written"
        );
        Ok(())
    }

    fn row(&self, entry: &AggregateEntry) -> Vec<String> {
        let key = entry.key();
        let repositories = entry
            .repositories()
            .collect::<Vec<_>>()
            .join(self.repository_separator());

        let mut row = vec![key.path().to_string()];
        match self.format {
            ManifestFormat::VendorJson => {
                row.push(key.revision().to_string());
                row.push(key.version().to_string());
                row.push(key.version_exact().to_string());
            }
            ManifestFormat::GoMod => row.push(key.version().to_string()),
        }
        row.push(entry.count().to_string());
        row.push(repositories);
        row
    }

    fn write_row<'a, W, I>(&self, out: &mut W, fields: I) -> io::Result<()>
    where
        W: Write,
        I: IntoIterator<Item = &'a str>,
    {
        let mut first = true;
        for field in fields {
            if !first {
                write!(out, "{}", self.delimiter)?;
            }
            first = false;
            out.write_all(self.escape(field).as_bytes())?;
        }
        out.write_all(b"\n")
    }

    fn escape<'a>(&self, field: &'a str) -> Cow<'a, str> {
        let needs_quotes = field.contains(self.delimiter)
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r');
        if needs_quotes {
            Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(field)
        }
    }
}

/// Writes one line per failed repository: `repository<TAB>kind<TAB>message`.
///
/// # Errors
///
/// Returns any I/O error from `out`.
pub fn write_failures<W: Write>(out: &mut W, failures: &[Failure]) -> io::Result<()> {
    for failure in failures {
        writeln!(
            out,
            "{}\t{}\t{}",
            failure.repository.full_name,
            failure.kind(),
            failure.error
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::fetch::FetchError;
    use crate::manifest::DependencyRecord;
    use crate::pool::FetchOutcome;
    use crate::repository::RepositoryRef;

    fn repo(name: &str) -> RepositoryRef {
        RepositoryRef::new("org", name, "master")
    }

    fn render(writer: &ReportWriter, aggregate: &Aggregate) -> String {
        let mut out = Vec::new();
        writer.write(&mut out, aggregate).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_vendor_rows_as_csv() {
        let record = DependencyRecord {
            path: "github.com/x/y".to_string(),
            revision: "abc".to_string(),
            version: "v1".to_string(),
            version_exact: "v1.0.0".to_string(),
        };
        let aggregate = aggregate(vec![
            FetchOutcome::success(repo("b"), vec![record.clone()]),
            FetchOutcome::success(repo("a"), vec![record]),
        ]);
        let writer = ReportWriter::for_target(
            ManifestFormat::VendorJson,
            &OutputTarget::File("out.csv".into()),
        );

        let text = render(&writer, &aggregate);

        assert_eq!(
            text,
            "Package,Revision,Version,VersionExact,Count,Repositories\n\
             github.com/x/y,abc,v1,v1.0.0,2,org/a;org/b\n"
        );
    }

    #[test]
    fn writes_go_mod_rows_as_tsv() {
        let aggregate = aggregate(vec![
            FetchOutcome::success(repo("a"), vec![DependencyRecord::versioned("z.z/z", "v2.0.0")]),
            FetchOutcome::success(
                repo("b"),
                vec![
                    DependencyRecord::versioned("a.b/c", "v1.2.3"),
                    DependencyRecord::versioned("z.z/z", "v2.0.0"),
                ],
            ),
        ]);
        let writer = ReportWriter::for_target(ManifestFormat::GoMod, &OutputTarget::Stdout);

        let text = render(&writer, &aggregate);

        assert_eq!(
            text,
            "Package\tVersion\tCount\tRepositories\n\
             a.b/c\tv1.2.3\t1\torg/b\n\
             z.z/z\tv2.0.0\t2\torg/a,org/b\n"
        );
    }

    #[test]
    fn quotes_fields_containing_delimiter() {
        let writer = ReportWriter::new(ManifestFormat::GoMod, ',');

        assert_eq!(writer.escape("plain"), "plain");
        assert_eq!(writer.escape("a,b"), "\"a,b\"");
        assert_eq!(writer.escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn empty_aggregate_writes_header_only() {
        let writer = ReportWriter::new(ManifestFormat::GoMod, ',');
        let text = render(&writer, &Aggregate::default());
        assert_eq!(text, "Package,Version,Count,Repositories\n");
    }

    #[test]
    fn writes_report_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("dep_result.csv");
        let target = OutputTarget::File(path.clone());
        let aggregate = aggregate(vec![FetchOutcome::success(
            repo("a"),
            vec![DependencyRecord::versioned("a.b/c", "v1.0.0")],
        )]);

        ReportWriter::for_target(ManifestFormat::GoMod, &target)
            .write_to(&target, &aggregate)
            .unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "Package,Version,Count,Repositories\na.b/c,v1.0.0,1,org/a\n");
    }

    #[test]
    fn unwritable_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = OutputTarget::File(temp.path().join("missing-dir/out.csv"));

        let result = ReportWriter::for_target(ManifestFormat::GoMod, &target)
            .write_to(&target, &Aggregate::default());

        assert!(matches!(result, Err(ReportError::Io { .. })));
    }

    #[test]
    fn lists_failures() {
        let aggregate = aggregate(vec![FetchOutcome::failure(
            repo("gone"),
            FetchError::NotFound {
                url: "https://raw.example/org/gone/master/go.mod".to_string(),
                status: 404,
            },
        )]);
        let mut out = Vec::new();

        write_failures(&mut out, aggregate.failures()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "org/gone\tnot-found\tManifest not found at https://raw.example/org/gone/master/go.mod (HTTP 404)\n"
        );
    }
}

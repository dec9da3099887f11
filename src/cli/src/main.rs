//! CLI for deptrack.
//!
//! Crawls the repositories of GitHub organizations, reads their dependency manifests and
//! reports which dependency versions are used by which repositories.

use clap::{Parser, ValueEnum};
use deptrack::{
    FileConfig, ManifestFormat, OutputTarget, RunSummary, Runner, RunnerConfig, RunnerError,
};
use indicatif::MultiProgress;
use std::io::{self, Write};
use std::mem;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, fmt::MakeWriter, prelude::*, EnvFilter};

/// deptrack - Report which dependency versions are used across repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Organization whose repositories are crawled (repeatable).
    #[arg(short, long = "org", value_name = "ORG")]
    orgs: Vec<String>,

    /// Explicit repository in owner/name format (repeatable).
    #[arg(short, long = "repo", value_name = "OWNER/NAME")]
    repos: Vec<String>,

    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Manifest format to crawl.
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Keep only dependencies whose path contains this substring.
    #[arg(short, long)]
    package: Option<String>,

    /// Keep only repositories whose name contains this substring.
    #[arg(long)]
    name_filter: Option<String>,

    /// Maximum number of repositories crawled.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    limit: Option<u64>,

    /// Maximum concurrent manifest fetches.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    concurrency: Option<u64>,

    /// Branch manifests are read from.
    #[arg(short, long)]
    branch: Option<String>,

    /// Read each repository's default branch instead of --branch.
    #[arg(long)]
    default_branch: bool,

    /// Write a comma separated report to this file instead of standard output.
    #[arg(short = 'f', long)]
    output: Option<PathBuf>,

    /// Print failed repositories and their errors.
    #[arg(short = 'e', long)]
    show_errors: bool,

    /// Host serving raw repository contents.
    #[arg(long)]
    raw_base_url: Option<String>,

    /// Per-request timeout for manifest fetches, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Do not draw a progress bar.
    #[arg(long)]
    no_progress: bool,
}

/// Manifest format selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// vendor/vendor.json lock files.
    Vendor,
    /// go.mod module files.
    GoMod,
}

impl From<Mode> for ManifestFormat {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Vendor => ManifestFormat::VendorJson,
            Mode::GoMod => ManifestFormat::GoMod,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Log lines and the progress bar share stderr.
    let bars = MultiProgress::new();

    // Initialize tracing
    init_tracing(bars.clone());

    // Both ring and aws-lc-rs end up in the dependency graph; pick one explicitly.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Parse arguments
    let args = Args::parse();

    // Run the main logic
    let result = run(args, bars).await;
    match &result {
        Ok(summary) => print_summary(summary),
        Err(RunnerError::NoRepositories) => error!("No repositories found"),
        Err(e) => error!(error = %e, "Critical failure"),
    }
    exit_code(&result)
}

/// Maps the outcome of a run to the process exit code.
///
/// 0 for a completed run even if some repositories failed, 1 when no repository was
/// found, 2 for everything that aborted the run.
fn exit_code(result: &Result<RunSummary, RunnerError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(RunnerError::NoRepositories) => ExitCode::from(1),
        Err(_) => ExitCode::from(2),
    }
}

/// Initializes tracing with environment filter support.
///
/// Logs go to stderr so a report on stdout stays machine readable. The level is taken
/// from `RUST_LOG` and defaults to "info".
fn init_tracing(bars: MultiProgress) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(BarAwareStderr { bars }),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Writes log events to stderr with the progress bar cleared.
#[derive(Clone)]
struct BarAwareStderr {
    bars: MultiProgress,
}

impl<'a> MakeWriter<'a> for BarAwareStderr {
    type Writer = SuspendingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendingWriter::new(self.bars.clone(), io::stderr())
    }
}

/// Buffers one log event and emits it while the bars are suspended.
struct SuspendingWriter<W: Write> {
    bars: MultiProgress,
    out: W,
    pending: Vec<u8>,
}

impl<W: Write> SuspendingWriter<W> {
    fn new(bars: MultiProgress, out: W) -> Self {
        Self {
            bars,
            out,
            pending: Vec::new(),
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let pending = mem::take(&mut self.pending);
        let out = &mut self.out;
        self.bars.suspend(|| {
            out.write_all(&pending)?;
            out.flush()
        })
    }
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

impl<W: Write> Drop for SuspendingWriter<W> {
    fn drop(&mut self) {
        let _ = self.emit();
    }
}

/// Builds the configuration: defaults, then the config file, then flags.
fn build_config(args: Args) -> Result<RunnerConfig, RunnerError> {
    let mut config = RunnerConfig::default();
    if let Some(path) = &args.config {
        config = config.merge_file(FileConfig::load(path)?);
    }

    let token = args.token.or_else(|| std::env::var("GITHUB_TOKEN").ok());
    config = config
        .with_organizations(args.orgs)
        .with_repositories(args.repos)
        .with_token(token);

    if let Some(mode) = args.mode {
        config = config.with_format(mode.into());
    }
    if let Some(package) = args.package {
        config = config.with_package_filter(package);
    }
    if let Some(name_filter) = args.name_filter {
        config = config.with_name_filter(name_filter);
    }
    if let Some(limit) = args.limit {
        config = config.with_limit(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(usize::try_from(concurrency).unwrap_or(usize::MAX));
    }
    if let Some(branch) = args.branch {
        config = config.with_branch(branch);
    }
    if args.default_branch {
        config = config.with_default_branch(true);
    }
    if let Some(path) = args.output {
        config = config.with_output(OutputTarget::File(path));
    }
    if args.show_errors {
        config = config.with_show_errors(true);
    }
    if let Some(raw_base_url) = args.raw_base_url {
        config = config.with_raw_base_url(raw_base_url);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    if args.no_progress {
        config = config.with_progress(false);
    }

    Ok(config)
}

/// Main execution logic.
async fn run(args: Args, bars: MultiProgress) -> Result<RunSummary, RunnerError> {
    let config = build_config(args)?;
    let runner = Runner::new(config)?.with_progress_bars(bars);
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    eprintln!("\nSummary:");
    eprintln!(
        "  Repositories discovered: {}",
        summary.repositories_discovered
    );
    eprintln!("  Repositories processed: {}", summary.repositories_processed);
    eprintln!("  Succeeded: {}", summary.succeeded);
    eprintln!("  Failed: {}", summary.failed());
    if summary.has_failures() {
        eprintln!("    Not found: {}", summary.not_found);
        eprintln!("    Network errors: {}", summary.network_failures);
        eprintln!("    Parse errors: {}", summary.parse_failures);
        if summary.internal_failures > 0 {
            eprintln!("    Internal errors: {}", summary.internal_failures);
        }
    }
    eprintln!("  Distinct dependencies: {}", summary.dependencies);
    eprintln!("  Report: {}", summary.output);
}

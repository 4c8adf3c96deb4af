//! Script tracer CLI.
//!
//! Provides the `steptrace` binary: run a script file and print one
//! JSON execution report on stdout. The report is the only thing
//! written to stdout; diagnostics and logs go to stderr so callers can
//! parse stdout unconditionally.
//!
//! Reads configuration from environment variables:
//! - `STEPTRACE_MAX_CALL_DEPTH`: nested-call limit for the run
//!   (default: 256)
//! - `RUST_LOG`: log filter, e.g. `steptrace=debug` (default: warn)

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use steptrace_core::report::ExecutionReport;
use steptrace_run::session::run_path;
use steptrace_run::RunConfig;

/// Report message emitted when the script argument is missing.
const NO_PATH_ERROR: &str = "No script path provided";

/// Script tracer: run a script and report every executed line.
#[derive(Parser)]
#[command(
    name = "steptrace",
    about = "Run a script and emit a JSON execution report"
)]
struct Cli {
    /// Path to the script to run.
    script: Option<PathBuf>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    process::exit(run(cli));
}

/// Execute the run.
///
/// Returns exit code: 0 = a report was produced (including error
/// reports), 1 = the script file could not be read.
fn run(cli: Cli) -> i32 {
    let path = match cli.script {
        Some(path) => path,
        None => {
            // missing input still produces a well-formed report
            print_report(&ExecutionReport::input_error(NO_PATH_ERROR));
            return 0;
        }
    };

    let config = config_from_env();
    tracing::debug!(
        "running {} with max call depth {}",
        path.display(),
        config.max_call_depth
    );

    match run_path(&path, &config) {
        Ok(report) => {
            tracing::debug!("run finished with {} trace events", report.traces.len());
            print_report(&report);
            0
        }
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", path.display(), e);
            1
        }
    }
}

/// Build run limits from the environment.
fn config_from_env() -> RunConfig {
    let mut config = RunConfig::default();
    if let Ok(raw) = std::env::var("STEPTRACE_MAX_CALL_DEPTH") {
        match raw.parse::<usize>() {
            Ok(depth) if depth > 0 => config.max_call_depth = depth,
            _ => eprintln!("Warning: ignoring invalid STEPTRACE_MAX_CALL_DEPTH '{}'", raw),
        }
    }
    config
}

/// Print the report as a single JSON document on stdout.
fn print_report(report: &ExecutionReport) {
    let json = serde_json::to_string(report)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {}\"}}", e));
    println!("{}", json);
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

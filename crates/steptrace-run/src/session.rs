//! One-shot script runs: source in, report out.
//!
//! This is the seam between the two failure tiers. Read failures
//! propagate as [`io::Error`] because the run never started; parse and
//! runtime failures are captured inside the returned
//! [`ExecutionReport`].

use std::fs;
use std::io;
use std::path::Path;

use steptrace_core::report::ExecutionReport;

use crate::interpreter::{Interpreter, RunConfig};
use crate::parser::parse;

/// Runs a script from source text and aggregates the outcome.
///
/// Parse errors and runtime errors both produce an error report. On a
/// runtime failure the report keeps whatever stdout and trace the run
/// captured before the failing line.
pub fn run_source(source: &str, config: &RunConfig) -> ExecutionReport {
    let program = match parse(source) {
        Ok(program) => program,
        Err(err) => return ExecutionReport::error(err.to_string(), String::new(), Vec::new()),
    };
    let mut interpreter = Interpreter::new(&program, config.clone());
    let outcome = interpreter.run();
    let (stdout, traces) = interpreter.into_parts();
    match outcome {
        Ok(()) => ExecutionReport::ok(stdout, traces),
        Err(err) => ExecutionReport::error(err.to_string(), stdout, traces),
    }
}

/// Reads the script at `path` and runs it.
pub fn run_path(path: &Path, config: &RunConfig) -> io::Result<ExecutionReport> {
    let source = fs::read_to_string(path)?;
    Ok(run_source(&source, config))
}

#[cfg(test)]
mod tests {
    use steptrace_core::report::RunStatus;

    use super::*;

    #[test]
    fn run_source_aggregates_stdout_and_trace() {
        let report = run_source("x = 2\nprint(x * 3)\n", &RunConfig::default());
        assert_eq!(report.status, RunStatus::Ok);
        assert_eq!(report.stdout, "6\n");
        assert_eq!(report.traces.len(), 2);
    }

    #[test]
    fn run_source_turns_parse_errors_into_reports() {
        let report = run_source("fn {\n", &RunConfig::default());
        assert_eq!(report.status, RunStatus::Error);
        assert!(report.traces.is_empty());
        assert_eq!(report.stdout, "");
    }

    #[test]
    fn run_path_reads_and_runs_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.st");
        std::fs::write(&path, "print(\"from disk\")\n").unwrap();
        let report = run_path(&path, &RunConfig::default()).unwrap();
        assert_eq!(report.status, RunStatus::Ok);
        assert_eq!(report.stdout, "from disk\n");
    }

    #[test]
    fn run_path_propagates_read_failures() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.st");
        assert!(run_path(&missing, &RunConfig::default()).is_err());
    }

    #[test]
    fn runs_do_not_share_state() {
        let config = RunConfig::default();
        let first = run_source("x = 1\n", &config);
        let second = run_source("print(x)\n", &config);
        assert_eq!(first.status, RunStatus::Ok);
        assert_eq!(second.status, RunStatus::Error);
    }
}

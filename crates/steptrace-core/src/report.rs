//! The execution report: the single JSON document a run produces.

use serde::{Deserialize, Serialize};

use crate::trace::TraceEvent;

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Error,
}

/// Everything observed during one run, aggregated for the visualizer.
///
/// `error` is present exactly when `status` is [`RunStatus::Error`]. On
/// a failed run, `stdout` and `traces` still hold everything captured
/// before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Whether the run completed.
    pub status: RunStatus,
    /// Everything the script printed, in order, with no interleaved
    /// host output.
    pub stdout: String,
    /// Step events in the dynamic order lines executed.
    pub traces: Vec<TraceEvent>,
    /// Flat error message, only on failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionReport {
    /// Report for a run that completed.
    pub fn ok(stdout: String, traces: Vec<TraceEvent>) -> Self {
        ExecutionReport {
            status: RunStatus::Ok,
            stdout,
            traces,
            error: None,
        }
    }

    /// Report for a run that failed, keeping whatever was captured
    /// before the failure.
    pub fn error(message: impl Into<String>, stdout: String, traces: Vec<TraceEvent>) -> Self {
        ExecutionReport {
            status: RunStatus::Error,
            stdout,
            traces,
            error: Some(message.into()),
        }
    }

    /// Report for input that never started executing, such as a missing
    /// script path.
    pub fn input_error(message: impl Into<String>) -> Self {
        ExecutionReport::error(message, String::new(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use insta::assert_json_snapshot;

    use super::*;
    use crate::trace::TraceEvent;

    #[test]
    fn ok_report_omits_the_error_key() {
        let report = ExecutionReport::ok("1\n".to_string(), vec![]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json.as_object().unwrap().get("error").is_none());
    }

    #[test]
    fn error_report_carries_the_message() {
        let report = ExecutionReport::error("bad", String::new(), vec![]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "bad");
    }

    #[test]
    fn missing_error_key_deserializes_as_none() {
        let report: ExecutionReport =
            serde_json::from_str(r#"{"status":"ok","stdout":"","traces":[]}"#).unwrap();
        assert_eq!(report.status, RunStatus::Ok);
        assert_eq!(report.error, None);
    }

    #[test]
    fn report_roundtrips_through_json() {
        let mut locals = IndexMap::new();
        locals.insert("x".to_string(), "1".to_string());
        let report = ExecutionReport::error(
            "divide by zero at line 2",
            "1\n".to_string(),
            vec![TraceEvent::step(1, IndexMap::new()), TraceEvent::step(2, locals)],
        );
        let json = serde_json::to_string(&report).unwrap();
        let back: ExecutionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn ok_report_shape() {
        let mut locals = IndexMap::new();
        locals.insert("x".to_string(), "1".to_string());
        let report = ExecutionReport::ok("1\n".to_string(), vec![TraceEvent::step(2, locals)]);
        assert_json_snapshot!(report, @r###"
        {
          "status": "ok",
          "stdout": "1\n",
          "traces": [
            {
              "event": "step",
              "line": 2,
              "locals": {
                "x": "1"
              }
            }
          ]
        }
        "###);
    }

    #[test]
    fn missing_path_report_shape() {
        let report = ExecutionReport::input_error("No script path provided");
        assert_json_snapshot!(report, @r###"
        {
          "status": "error",
          "stdout": "",
          "traces": [],
          "error": "No script path provided"
        }
        "###);
    }
}

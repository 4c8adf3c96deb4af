//! Trace events recorded during a run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind tag carried by every trace event. Only line steps exist today;
/// the tag is kept explicit so consumers can filter on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    /// A source line is about to execute.
    Step,
}

/// One observation of the running script, recorded immediately before
/// a statement executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Event kind tag.
    pub event: TraceKind,
    /// 1-based source line about to execute.
    pub line: u32,
    /// Every variable visible in the executing frame at that instant,
    /// rendered to snapshot text, in creation order. Inside a function
    /// this is the frame's locals; at top level, the globals.
    pub locals: IndexMap<String, String>,
}

impl TraceEvent {
    /// Builds a step event.
    pub fn step(line: u32, locals: IndexMap<String, String>) -> Self {
        TraceEvent {
            event: TraceKind::Step,
            line,
            locals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_tag_serializes_as_step() {
        let event = TraceEvent::step(3, IndexMap::new());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "step");
        assert_eq!(json["line"], 3);
        assert!(json["locals"].as_object().unwrap().is_empty());
    }

    #[test]
    fn locals_keep_creation_order_through_serde() {
        let mut locals = IndexMap::new();
        locals.insert("zebra".to_string(), "1".to_string());
        locals.insert("apple".to_string(), "2".to_string());
        locals.insert("mango".to_string(), "3".to_string());
        let event = TraceEvent::step(1, locals);

        let json = serde_json::to_string(&event).unwrap();
        let back: TraceEvent = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = back.locals.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zebra", "apple", "mango"]);
        assert_eq!(back, event);
    }
}

//! Recorded pointer sessions.
//!
//! A session file is JSONL: an optional `# {header}` first line followed by
//! one [`SessionRecord`] per line, each naming the element the event was
//! delivered to. Lines starting with `#` and blank lines are skipped.

use serde::{Deserialize, Serialize};

use hoverintent_common::clock::TimestampNs;

use crate::event::PointerEvent;

/// Metadata written as the commented first line of a session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at the session epoch (RFC 3339).
    pub epoch_wall: String,

    /// Free-form description of what was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One pointer event addressed to a named element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub element: String,

    #[serde(flatten)]
    pub event: PointerEvent,
}

impl SessionRecord {
    pub fn new(element: impl Into<String>, event: PointerEvent) -> Self {
        Self {
            element: element.into(),
            event,
        }
    }
}

/// Parse records from JSONL content.
pub fn parse_session(jsonl: &str) -> Result<Vec<SessionRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Extract the header from the first `# ` line, if present and well formed.
pub fn parse_session_header(jsonl: &str) -> Option<SessionHeader> {
    let first = jsonl.lines().map(str::trim).find(|line| !line.is_empty())?;
    let json = first.strip_prefix('#')?.trim();
    serde_json::from_str(json).ok()
}

/// Element names in order of first appearance.
pub fn session_elements(records: &[SessionRecord]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for record in records {
        if !seen.contains(&record.element.as_str()) {
            seen.push(&record.element);
        }
    }
    seen
}

/// Index of the first record whose timestamp goes backwards, if any.
pub fn first_out_of_order(records: &[SessionRecord]) -> Option<usize> {
    let mut last: TimestampNs = 0;
    for (idx, record) in records.iter().enumerate() {
        if record.event.timestamp_ns < last {
            return Some(idx);
        }
        last = record.event.timestamp_ns;
    }
    None
}

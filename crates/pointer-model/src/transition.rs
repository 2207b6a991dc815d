//! Intent transitions observed while replaying or driving a tracker.

use serde::{Deserialize, Serialize};

use hoverintent_common::clock::TimestampNs;

/// What happened to a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// The pointer settled and the enter callback ran.
    Confirmed,
    /// The leave callback ran after the out delay.
    Left,
}

/// A confirmed or left notification, as written to a transition log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentTransition {
    /// Time the callback ran (timer deadline), ns since the epoch.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    pub element: String,

    /// Tracker-assigned registration id.
    pub registration: u64,

    pub kind: TransitionKind,

    /// Position carried by the triggering enter or leave event.
    pub x: f64,
    pub y: f64,
}

/// Metadata written as the commented first line of a transition log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionLogHeader {
    pub schema_version: String,

    /// Wall-clock time at the log epoch (RFC 3339).
    pub epoch_wall: String,

    /// Settings the transitions were produced with.
    pub sensitivity: f64,
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

/// Parse transitions from JSONL content, skipping `#` and blank lines.
pub fn parse_transitions(jsonl: &str) -> Result<Vec<IntentTransition>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

impl IntentTransition {
    /// Timestamp in fractional milliseconds.
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000.0
    }
}

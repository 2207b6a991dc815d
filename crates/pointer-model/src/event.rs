//! Pointer event types delivered to the tracker.

use serde::{Deserialize, Serialize};

pub use hoverintent_common::clock::TimestampNs;

use crate::geometry::Point;

/// The three pointer notifications the tracker listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    /// Pointer crossed into the element.
    Enter,
    /// Pointer moved while inside the element.
    Move,
    /// Pointer crossed out of the element.
    Leave,
}

/// A single pointer event with timestamp and page position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Monotonic nanoseconds since the session epoch.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(rename = "type")]
    pub kind: PointerEventKind,

    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(timestamp_ns: TimestampNs, kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            timestamp_ns,
            kind,
            x,
            y,
        }
    }

    /// Create an enter event.
    pub fn enter(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self::new(timestamp_ns, PointerEventKind::Enter, x, y)
    }

    /// Create a move event.
    pub fn moved(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self::new(timestamp_ns, PointerEventKind::Move, x, y)
    }

    /// Create a leave event.
    pub fn leave(timestamp_ns: TimestampNs, x: f64, y: f64) -> Self {
        Self::new(timestamp_ns, PointerEventKind::Leave, x, y)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

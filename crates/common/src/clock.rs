//! Monotonic clock shared by the tracker and its drivers.
//!
//! Timer deadlines inside the tracker are plain nanosecond offsets from
//! an epoch. Real-time drivers anchor that epoch with a [`HoverClock`]
//! and convert back to [`Instant`]s when they need to sleep.

use std::time::{Duration, Instant};

/// Nanoseconds since the clock epoch.
pub type TimestampNs = u64;

/// A clock that provides monotonic timestamps relative to a fixed epoch.
#[derive(Debug, Clone)]
pub struct HoverClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339), for log headers.
    epoch_wall: String,
}

impl HoverClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self::anchored_at(Instant::now())
    }

    /// Create a clock whose epoch is `epoch`, stamped with the current wall time.
    ///
    /// Async drivers pass an instant taken from their runtime's clock so that
    /// paused or mocked time flows through the same conversions.
    pub fn anchored_at(epoch: Instant) -> Self {
        Self {
            epoch,
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Nanoseconds between the epoch and `instant` (zero if before the epoch).
    pub fn ns_at(&self, instant: Instant) -> TimestampNs {
        duration_to_ns(instant.saturating_duration_since(self.epoch))
    }

    /// The instant corresponding to a timestamp on this clock, if representable.
    pub fn instant_at(&self, timestamp_ns: TimestampNs) -> Option<Instant> {
        self.epoch.checked_add(Duration::from_nanos(timestamp_ns))
    }

    /// Wall-clock time at the epoch.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Convert a duration to whole nanoseconds, saturating at `u64::MAX`.
pub fn duration_to_ns(duration: Duration) -> TimestampNs {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Convert nanoseconds to fractional milliseconds (for display).
pub fn ns_to_ms(ns: TimestampNs) -> f64 {
    ns as f64 / 1_000_000.0
}

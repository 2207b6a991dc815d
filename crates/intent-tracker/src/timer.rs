//! Single-shot timer queue on a virtual nanosecond clock.
//!
//! Timers never repeat on their own; a callback that wants to poll again
//! schedules a fresh timer. Expiry order is deadline first, then the order
//! in which timers were scheduled.

use std::collections::BTreeMap;
use std::time::Duration;

use hoverintent_common::clock::{duration_to_ns, TimestampNs};

/// Handle to a pending timer. Ordering follows expiry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId {
    deadline_ns: TimestampNs,
    seq: u64,
}

impl TimerId {
    pub fn deadline_ns(&self) -> TimestampNs {
        self.deadline_ns
    }
}

/// Pending single-shot timers carrying a payload each.
#[derive(Debug)]
pub struct TimerQueue<T> {
    pending: BTreeMap<TimerId, T>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to expire `delay` after `now_ns`.
    pub fn schedule(&mut self, now_ns: TimestampNs, delay: Duration, payload: T) -> TimerId {
        let id = TimerId {
            deadline_ns: now_ns.saturating_add(duration_to_ns(delay)),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(id, payload);
        id
    }

    /// Cancel a timer, returning its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.pending.remove(&id)
    }

    /// Remove and return the earliest timer whose deadline is at or before `now_ns`.
    pub fn pop_due(&mut self, now_ns: TimestampNs) -> Option<(TimerId, T)> {
        let (first, _) = self.pending.first_key_value()?;
        if first.deadline_ns > now_ns {
            return None;
        }
        self.pending.pop_first()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<TimestampNs> {
        self.pending.keys().next().map(TimerId::deadline_ns)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

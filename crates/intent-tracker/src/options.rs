//! Registration options.
//!
//! Options are built over the defaults (sensitivity 7 px, 100 ms poll
//! interval, no out delay). The two-callback form mirrors a plain hover
//! binding; the builder form exposes every knob plus the clear directive.

use std::fmt;
use std::time::Duration;

use hoverintent_common::config::IntentDefaults;
use hoverintent_common::error::{HoverIntentError, HoverIntentResult};
use hoverintent_common::TimestampNs;
use hoverintent_pointer_model::event::PointerEvent;

use crate::tracker::RegistrationId;

pub const DEFAULT_SENSITIVITY: f64 = 7.0;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_TIMEOUT: Duration = Duration::ZERO;

/// What a callback receives when it runs.
#[derive(Debug)]
pub struct IntentContext<'a, E> {
    /// The element the registration belongs to.
    pub element: &'a E,
    /// The enter event (for confirm callbacks) or leave event (for leave callbacks).
    pub event: &'a PointerEvent,
    pub registration: RegistrationId,
    /// Tracker time at which the timer fired.
    pub fired_at_ns: TimestampNs,
}

/// Boxed enter/leave callback.
pub type IntentCallback<E> = Box<dyn FnMut(&IntentContext<'_, E>) + Send + 'static>;

/// Options for one `register` call.
pub struct IntentOptions<E> {
    pub(crate) sensitivity: f64,
    pub(crate) interval: Duration,
    pub(crate) timeout: Duration,
    pub(crate) over: Option<IntentCallback<E>>,
    pub(crate) out: Option<IntentCallback<E>>,
    pub(crate) clear: bool,
}

impl<E> IntentOptions<E> {
    /// Default timings with no callbacks. Registering this is a no-op.
    pub fn new() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            over: None,
            out: None,
            clear: false,
        }
    }

    /// Start from configured defaults instead of the built-in ones.
    pub fn from_defaults(defaults: &IntentDefaults) -> Self {
        Self::new()
            .sensitivity(defaults.sensitivity)
            .interval(Duration::from_millis(defaults.interval_ms))
            .timeout(Duration::from_millis(defaults.timeout_ms))
    }

    /// Enter and leave callbacks with default timings.
    pub fn hover<F, G>(over: F, out: G) -> Self
    where
        F: FnMut(&IntentContext<'_, E>) + Send + 'static,
        G: FnMut(&IntentContext<'_, E>) + Send + 'static,
    {
        Self::new().over(over).out(out)
    }

    /// Drop every existing registration on the element without adding one.
    pub fn clear_all() -> Self {
        Self::new().clear(true)
    }

    /// Manhattan displacement threshold in pixels; must be at least 1.
    pub fn sensitivity(mut self, pixels: f64) -> Self {
        self.sensitivity = pixels;
        self
    }

    /// Delay between displacement samples.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Delay between the pointer leaving and the leave callback.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn over<F>(mut self, over: F) -> Self
    where
        F: FnMut(&IntentContext<'_, E>) + Send + 'static,
    {
        self.over = Some(Box::new(over));
        self
    }

    pub fn out<F>(mut self, out: F) -> Self
    where
        F: FnMut(&IntentContext<'_, E>) + Send + 'static,
    {
        self.out = Some(Box::new(out));
        self
    }

    /// Request that existing registrations be dropped before this one is added.
    pub fn clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// Check numeric settings. Durations are non-negative by construction.
    pub(crate) fn validate(&self) -> HoverIntentResult<()> {
        if !self.sensitivity.is_finite() || self.sensitivity < 1.0 {
            return Err(HoverIntentError::InvalidSensitivity {
                value: self.sensitivity,
            });
        }
        Ok(())
    }
}

impl<E> Default for IntentOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for IntentOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentOptions")
            .field("sensitivity", &self.sensitivity)
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .field("over", &self.over.is_some())
            .field("out", &self.out.is_some())
            .field("clear", &self.clear)
            .finish()
    }
}

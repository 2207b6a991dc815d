//! The hover intent state machine.
//!
//! Each observed element owns an ordered list of registrations and one
//! shared pointer sample. While the pointer is inside an element every
//! unconfirmed registration polls the displacement between the previous
//! and current sample; once it drops below the registration's sensitivity
//! the pointer is considered settled and the enter callback runs.
//!
//! Time is virtual: every public entry point takes or implies a timestamp
//! and fires due timers up to it before doing anything else.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use hoverintent_common::clock::{ns_to_ms, TimestampNs};
use hoverintent_common::error::HoverIntentResult;
use hoverintent_pointer_model::event::{PointerEvent, PointerEventKind};
use hoverintent_pointer_model::geometry::Point;

use crate::options::{IntentCallback, IntentContext, IntentOptions};
use crate::timer::{TimerId, TimerQueue};
use crate::{DetachedListeners, ListenerHost};

/// Tracker-unique identifier of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

impl RegistrationId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observable state of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentState {
    /// Not polling and not confirmed.
    Idle,
    /// A displacement check is scheduled.
    Polling,
    /// The enter callback has run; a leave callback may be pending.
    Confirmed,
}

/// Result of a `register` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new registration was appended (after clearing, if requested).
    Registered(RegistrationId),
    /// Existing registrations were dropped and nothing was added.
    Cleared,
    /// No enter callback and no clear directive: nothing changed.
    Unchanged,
}

impl RegisterOutcome {
    pub fn registration(&self) -> Option<RegistrationId> {
        match self {
            Self::Registered(id) => Some(*id),
            _ => None,
        }
    }
}

/// Previous and current pointer position for one hover session.
#[derive(Debug, Clone, Copy, Default)]
struct PointerSample {
    previous: Point,
    current: Point,
}

impl PointerSample {
    fn at(position: Point) -> Self {
        Self {
            previous: position,
            current: position,
        }
    }

    fn displacement(&self) -> f64 {
        self.previous.manhattan_distance(&self.current)
    }
}

struct Registration<E> {
    id: RegistrationId,
    sensitivity: f64,
    interval: Duration,
    timeout: Duration,
    over: IntentCallback<E>,
    out: Option<IntentCallback<E>>,
    timer: Option<TimerId>,
    confirmed: bool,
}

impl<E> Registration<E> {
    fn state(&self) -> IntentState {
        if self.confirmed {
            IntentState::Confirmed
        } else if self.timer.is_some() {
            IntentState::Polling
        } else {
            IntentState::Idle
        }
    }
}

struct ElementState<E> {
    registrations: Vec<Registration<E>>,
    sample: PointerSample,
    tracking_moves: bool,
}

impl<E> ElementState<E> {
    fn new() -> Self {
        Self {
            registrations: Vec::new(),
            sample: PointerSample::default(),
            tracking_moves: false,
        }
    }

    fn cancel_timers<T>(&mut self, timers: &mut TimerQueue<T>) {
        for registration in &mut self.registrations {
            if let Some(timer) = registration.timer.take() {
                timers.cancel(timer);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TimerAction {
    Compare(PointerEvent),
    Leave(PointerEvent),
}

struct TimerTask<E> {
    element: E,
    registration: RegistrationId,
    action: TimerAction,
}

/// Hover intent tracker for any number of elements identified by `E`.
pub struct HoverIntentTracker<E> {
    elements: HashMap<E, ElementState<E>>,
    timers: TimerQueue<TimerTask<E>>,
    listeners: Box<dyn ListenerHost<E>>,
    now_ns: TimestampNs,
    next_registration: u64,
}

impl<E> HoverIntentTracker<E>
where
    E: Clone + Eq + Hash + fmt::Debug + Send + 'static,
{
    /// Create a tracker whose host delivers every pointer event unconditionally.
    pub fn new() -> Self {
        Self::with_listeners(DetachedListeners)
    }

    /// Create a tracker that tells `listeners` which events it needs per element.
    pub fn with_listeners(listeners: impl ListenerHost<E> + 'static) -> Self {
        Self {
            elements: HashMap::new(),
            timers: TimerQueue::new(),
            listeners: Box::new(listeners),
            now_ns: 0,
            next_registration: 0,
        }
    }

    /// Add a registration to `element`, or clear its registrations.
    ///
    /// With `clear` set, pending timers of every existing registration are
    /// cancelled and the list is emptied first. Options without an enter
    /// callback add nothing. Enter/leave listeners are bound the first time
    /// a registration is added to an element.
    pub fn register(
        &mut self,
        element: E,
        options: IntentOptions<E>,
    ) -> HoverIntentResult<RegisterOutcome> {
        if options.over.is_some() {
            options.validate()?;
        }

        let IntentOptions {
            sensitivity,
            interval,
            timeout,
            over,
            out,
            clear,
        } = options;

        if clear {
            if let Some(state) = self.elements.get_mut(&element) {
                state.cancel_timers(&mut self.timers);
                let dropped = state.registrations.len();
                state.registrations.clear();
                tracing::debug!(element = ?element, dropped, "Cleared hover intent registrations");
            }
        }

        let Some(over) = over else {
            return Ok(if clear {
                RegisterOutcome::Cleared
            } else {
                RegisterOutcome::Unchanged
            });
        };

        let id = RegistrationId(self.next_registration);
        self.next_registration += 1;

        let state = match self.elements.entry(element) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.listeners.bind(entry.key(), PointerEventKind::Enter);
                self.listeners.bind(entry.key(), PointerEventKind::Leave);
                entry.insert(ElementState::new())
            }
        };
        state.registrations.push(Registration {
            id,
            sensitivity,
            interval,
            timeout,
            over,
            out,
            timer: None,
            confirmed: false,
        });

        tracing::debug!(
            registration = %id,
            sensitivity,
            interval_ms = interval.as_millis() as u64,
            timeout_ms = timeout.as_millis() as u64,
            "Registered hover intent"
        );
        Ok(RegisterOutcome::Registered(id))
    }

    /// Dispatch an event by kind.
    pub fn handle(&mut self, element: &E, event: PointerEvent) {
        match event.kind {
            PointerEventKind::Enter => self.pointer_enter(element, event),
            PointerEventKind::Move => self.pointer_move(element, event),
            PointerEventKind::Leave => self.pointer_leave(element, event),
        }
    }

    /// The pointer entered `element`.
    ///
    /// Cancels pending timers, reseeds the sample at the entry point, starts
    /// move tracking and schedules a check for every unconfirmed registration.
    /// Events with a non-finite position are dropped after advancing time.
    pub fn pointer_enter(&mut self, element: &E, event: PointerEvent) {
        self.advance(event.timestamp_ns);
        if !event.position().is_finite() {
            tracing::trace!(element = ?element, "Dropped enter with non-finite position");
            return;
        }
        let now = self.now_ns;
        let Some(state) = self.elements.get_mut(element) else {
            return;
        };

        state.cancel_timers(&mut self.timers);
        state.sample = PointerSample::at(event.position());
        if !state.tracking_moves {
            state.tracking_moves = true;
            self.listeners.bind(element, PointerEventKind::Move);
        }

        for registration in state.registrations.iter_mut().filter(|r| !r.confirmed) {
            registration.timer = Some(self.timers.schedule(
                now,
                registration.interval,
                TimerTask {
                    element: element.clone(),
                    registration: registration.id,
                    action: TimerAction::Compare(event),
                },
            ));
        }
        tracing::trace!(element = ?element, x = event.x, y = event.y, "Pointer entered");

        self.run_due();
    }

    /// The pointer moved inside `element`. Ignored unless move tracking is on.
    pub fn pointer_move(&mut self, element: &E, event: PointerEvent) {
        self.advance(event.timestamp_ns);
        if !event.position().is_finite() {
            return;
        }
        if let Some(state) = self.elements.get_mut(element) {
            if state.tracking_moves {
                state.sample.current = event.position();
            }
        }
    }

    /// The pointer left `element`.
    ///
    /// Cancels pending timers, stops move tracking and schedules the leave
    /// callback of every confirmed registration after its out delay.
    pub fn pointer_leave(&mut self, element: &E, event: PointerEvent) {
        self.advance(event.timestamp_ns);
        let now = self.now_ns;
        let Some(state) = self.elements.get_mut(element) else {
            return;
        };

        state.cancel_timers(&mut self.timers);
        if state.tracking_moves {
            state.tracking_moves = false;
            self.listeners.unbind(element, PointerEventKind::Move);
        }

        for registration in state.registrations.iter_mut().filter(|r| r.confirmed) {
            registration.timer = Some(self.timers.schedule(
                now,
                registration.timeout,
                TimerTask {
                    element: element.clone(),
                    registration: registration.id,
                    action: TimerAction::Leave(event),
                },
            ));
        }
        tracing::trace!(element = ?element, x = event.x, y = event.y, "Pointer left");

        self.run_due();
    }

    /// Fire every timer due at or before `now_ns`, in expiry order.
    ///
    /// Time never moves backwards: an earlier `now_ns` is treated as the
    /// current tracker time.
    pub fn advance(&mut self, now_ns: TimestampNs) {
        let target = self.now_ns.max(now_ns);
        while let Some((timer, task)) = self.timers.pop_due(target) {
            self.now_ns = self.now_ns.max(timer.deadline_ns());
            self.fire(task);
        }
        self.now_ns = target;
    }

    fn run_due(&mut self) {
        self.advance(self.now_ns);
    }

    fn fire(&mut self, task: TimerTask<E>) {
        let TimerTask {
            element,
            registration: id,
            action,
        } = task;
        let now = self.now_ns;
        let Some(state) = self.elements.get_mut(&element) else {
            return;
        };
        let Some(registration) = state.registrations.iter_mut().find(|r| r.id == id) else {
            return;
        };
        registration.timer = None;

        match action {
            TimerAction::Compare(event) => {
                let displacement = state.sample.displacement();
                if displacement < registration.sensitivity {
                    // Any confirmation ends move tracking for the whole element.
                    if state.tracking_moves {
                        state.tracking_moves = false;
                        self.listeners.unbind(&element, PointerEventKind::Move);
                    }
                    registration.confirmed = true;
                    tracing::debug!(
                        element = ?element,
                        registration = %id,
                        displacement,
                        at_ms = ns_to_ms(now),
                        "Hover intent confirmed"
                    );
                    (registration.over)(&IntentContext {
                        element: &element,
                        event: &event,
                        registration: id,
                        fired_at_ns: now,
                    });
                } else {
                    tracing::trace!(
                        element = ?element,
                        registration = %id,
                        displacement,
                        "Pointer still moving"
                    );
                    state.sample.previous = state.sample.current;
                    let interval = registration.interval;
                    registration.timer = Some(self.timers.schedule(
                        now,
                        interval,
                        TimerTask {
                            element,
                            registration: id,
                            action: TimerAction::Compare(event),
                        },
                    ));
                }
            }
            TimerAction::Leave(event) => {
                registration.confirmed = false;
                tracing::debug!(
                    element = ?element,
                    registration = %id,
                    at_ms = ns_to_ms(now),
                    "Hover intent ended"
                );
                if let Some(out) = registration.out.as_mut() {
                    out(&IntentContext {
                        element: &element,
                        event: &event,
                        registration: id,
                        fired_at_ns: now,
                    });
                }
            }
        }
    }

    /// Stop observing `element`: drop its registrations and unbind its listeners.
    pub fn forget(&mut self, element: &E) -> bool {
        let Some(mut state) = self.elements.remove(element) else {
            return false;
        };
        state.cancel_timers(&mut self.timers);
        if state.tracking_moves {
            self.listeners.unbind(element, PointerEventKind::Move);
        }
        self.listeners.unbind(element, PointerEventKind::Enter);
        self.listeners.unbind(element, PointerEventKind::Leave);
        tracing::debug!(
            element = ?element,
            dropped = state.registrations.len(),
            "Stopped observing element"
        );
        true
    }

    /// State of one registration, or `None` if it no longer exists.
    pub fn state(&self, element: &E, id: RegistrationId) -> Option<IntentState> {
        self.elements
            .get(element)?
            .registrations
            .iter()
            .find(|r| r.id == id)
            .map(Registration::state)
    }

    /// Registration ids on `element` in insertion order.
    pub fn registrations(&self, element: &E) -> Vec<RegistrationId> {
        self.elements
            .get(element)
            .map(|state| state.registrations.iter().map(|r| r.id).collect())
            .unwrap_or_default()
    }

    pub fn registration_count(&self, element: &E) -> usize {
        self.elements
            .get(element)
            .map_or(0, |state| state.registrations.len())
    }

    /// Whether enter/leave handling is attached to `element`.
    pub fn is_observed(&self, element: &E) -> bool {
        self.elements.contains_key(element)
    }

    /// Whether move events currently update the pointer sample for `element`.
    pub fn is_tracking_moves(&self, element: &E) -> bool {
        self.elements
            .get(element)
            .is_some_and(|state| state.tracking_moves)
    }

    /// Earliest pending timer deadline across all elements.
    pub fn next_deadline(&self) -> Option<TimestampNs> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Current tracker time.
    pub fn now_ns(&self) -> TimestampNs {
        self.now_ns
    }
}

impl<E> Default for HoverIntentTracker<E>
where
    E: Clone + Eq + Hash + fmt::Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

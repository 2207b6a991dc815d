//! HoverIntent Tracker
//!
//! Tells a deliberate pause over an element apart from a pointer that is
//! merely passing through. While the pointer is inside an element, each
//! registration samples the pointer every `interval` and fires its enter
//! callback once the Manhattan displacement between two samples drops below
//! `sensitivity` pixels. Leaving an element fires the leave callback of
//! every confirmed registration after its `timeout`.
//!
//! - [`HoverIntentTracker`]: synchronous state machine on virtual time
//! - [`driver`]: tokio task that owns a tracker and runs its timers in real time
//! - [`writer`]: append-only JSONL log of confirm/leave transitions
//!
//! The host UI owns hit-testing. It feeds enter/move/leave events per
//! element and may implement [`ListenerHost`] to learn which events the
//! tracker currently needs for each element.

pub mod driver;
pub mod options;
pub mod timer;
pub mod tracker;
pub mod writer;

pub use driver::{spawn_driver, DriverHandle};
pub use options::{IntentCallback, IntentContext, IntentOptions};
pub use tracker::{HoverIntentTracker, IntentState, RegisterOutcome, RegistrationId};

use hoverintent_pointer_model::event::PointerEventKind;

/// Host-side event subscription for observed elements.
///
/// `bind(Enter)`/`bind(Leave)` happen once, when the first registration is
/// added to an element. `Move` is bound for the duration of a hover
/// session and unbound on leave or as soon as any registration confirms.
pub trait ListenerHost<E>: Send {
    fn bind(&mut self, element: &E, kind: PointerEventKind);

    fn unbind(&mut self, element: &E, kind: PointerEventKind);
}

/// A host that always delivers every event; subscription changes are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedListeners;

impl<E> ListenerHost<E> for DetachedListeners {
    fn bind(&mut self, _element: &E, _kind: PointerEventKind) {}

    fn unbind(&mut self, _element: &E, _kind: PointerEventKind) {}
}

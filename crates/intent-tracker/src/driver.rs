//! Real-time driver for a [`HoverIntentTracker`].
//!
//! The tracker is moved into a single tokio task, so every registration,
//! pointer event and timer expiry is applied on one logical thread. Hosts
//! talk to it through a cloneable [`DriverHandle`]; pointer events are
//! stamped with the driver's monotonic clock when they are received.

use std::fmt;
use std::hash::Hash;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use hoverintent_common::clock::{HoverClock, TimestampNs};
use hoverintent_common::error::{HoverIntentError, HoverIntentResult};
use hoverintent_pointer_model::event::{PointerEvent, PointerEventKind};
use hoverintent_pointer_model::geometry::Point;

use crate::options::IntentOptions;
use crate::tracker::{HoverIntentTracker, RegisterOutcome};

const COMMAND_BUFFER: usize = 1024;

enum Command<E> {
    Register {
        element: E,
        options: IntentOptions<E>,
        reply: oneshot::Sender<HoverIntentResult<RegisterOutcome>>,
    },
    Pointer {
        element: E,
        kind: PointerEventKind,
        position: Point,
    },
    Forget {
        element: E,
    },
    Shutdown,
}

/// Sends commands to a running driver task.
pub struct DriverHandle<E> {
    commands: mpsc::Sender<Command<E>>,
}

impl<E> Clone for DriverHandle<E> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

/// Move `tracker` onto a new tokio task.
///
/// The join handle yields the tracker back once the driver shuts down
/// (explicitly, or when every handle has been dropped).
pub fn spawn_driver<E>(
    tracker: HoverIntentTracker<E>,
) -> (DriverHandle<E>, JoinHandle<HoverIntentTracker<E>>)
where
    E: Clone + Eq + Hash + fmt::Debug + Send + 'static,
{
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let join = tokio::spawn(run_driver(tracker, rx));
    (DriverHandle { commands: tx }, join)
}

impl<E> DriverHandle<E>
where
    E: Send + 'static,
{
    /// Register on the driver's tracker and wait for the outcome.
    pub async fn register(
        &self,
        element: E,
        options: IntentOptions<E>,
    ) -> HoverIntentResult<RegisterOutcome> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Register {
            element,
            options,
            reply,
        })
        .await?;
        response.await.map_err(|_| HoverIntentError::DriverClosed)?
    }

    pub async fn enter(&self, element: E, position: Point) -> HoverIntentResult<()> {
        self.pointer(element, PointerEventKind::Enter, position).await
    }

    pub async fn moved(&self, element: E, position: Point) -> HoverIntentResult<()> {
        self.pointer(element, PointerEventKind::Move, position).await
    }

    pub async fn leave(&self, element: E, position: Point) -> HoverIntentResult<()> {
        self.pointer(element, PointerEventKind::Leave, position).await
    }

    /// Deliver a pointer event; it is timestamped on arrival at the driver.
    pub async fn pointer(
        &self,
        element: E,
        kind: PointerEventKind,
        position: Point,
    ) -> HoverIntentResult<()> {
        self.send(Command::Pointer {
            element,
            kind,
            position,
        })
        .await
    }

    pub async fn forget(&self, element: E) -> HoverIntentResult<()> {
        self.send(Command::Forget { element }).await
    }

    /// Stop the driver. Pending timers are dropped without firing.
    pub async fn shutdown(&self) -> HoverIntentResult<()> {
        self.send(Command::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: Command<E>) -> HoverIntentResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| HoverIntentError::DriverClosed)
    }
}

async fn run_driver<E>(
    mut tracker: HoverIntentTracker<E>,
    mut commands: mpsc::Receiver<Command<E>>,
) -> HoverIntentTracker<E>
where
    E: Clone + Eq + Hash + fmt::Debug + Send + 'static,
{
    let clock = HoverClock::anchored_at(Instant::now().into_std());
    tracing::info!(epoch = clock.epoch_wall(), "Hover intent driver started");

    loop {
        let deadline = tracker.next_deadline();

        tokio::select! {
            command = commands.recv() => {
                match command {
                    None | Some(Command::Shutdown) => break,
                    Some(Command::Register { element, options, reply }) => {
                        let _ = reply.send(tracker.register(element, options));
                    }
                    Some(Command::Pointer { element, kind, position }) => {
                        let event = PointerEvent::new(elapsed_ns(&clock), kind, position.x, position.y);
                        tracker.handle(&element, event);
                    }
                    Some(Command::Forget { element }) => {
                        tracker.forget(&element);
                    }
                }
            }

            _ = sleep_until_deadline(&clock, deadline) => {
                let now = elapsed_ns(&clock).max(deadline.unwrap_or(0));
                tracker.advance(now);
            }
        }
    }

    tracing::info!(
        pending_timers = tracker.pending_timers(),
        "Hover intent driver stopped"
    );
    tracker
}

fn elapsed_ns(clock: &HoverClock) -> TimestampNs {
    clock.ns_at(Instant::now().into_std())
}

async fn sleep_until_deadline(clock: &HoverClock, deadline: Option<TimestampNs>) {
    match deadline.and_then(|ns| clock.instant_at(ns)) {
        Some(at) => tokio::time::sleep_until(Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hoverintent_pointer_model::event::{PointerEvent, PointerEventKind};
use hoverintent_tracker::{
    HoverIntentTracker, IntentContext, IntentOptions, IntentState, ListenerHost, RegisterOutcome,
};
use proptest::prelude::*;

type Element = &'static str;

#[derive(Debug, Clone, PartialEq)]
struct Call {
    label: &'static str,
    element: Element,
    at_ms: u64,
    event_x: f64,
}

#[derive(Clone, Default)]
struct Calls(Arc<Mutex<Vec<Call>>>);

impl Calls {
    fn callback(&self, label: &'static str) -> impl FnMut(&IntentContext<'_, Element>) + Send {
        let calls = self.0.clone();
        move |ctx| {
            calls.lock().unwrap().push(Call {
                label,
                element: *ctx.element,
                at_ms: ctx.fired_at_ns / 1_000_000,
                event_x: ctx.event.x,
            })
        }
    }

    fn labels(&self) -> Vec<(&'static str, u64)> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|c| (c.label, c.at_ms))
            .collect()
    }

    fn count(&self, label: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.label == label)
            .count()
    }
}

#[derive(Clone, Default)]
struct Subscriptions(Arc<Mutex<Vec<(bool, Element, PointerEventKind)>>>);

impl ListenerHost<Element> for Subscriptions {
    fn bind(&mut self, element: &Element, kind: PointerEventKind) {
        self.0.lock().unwrap().push((true, *element, kind));
    }

    fn unbind(&mut self, element: &Element, kind: PointerEventKind) {
        self.0.lock().unwrap().push((false, *element, kind));
    }
}

fn ms(value: u64) -> u64 {
    value * 1_000_000
}

fn hover(calls: &Calls, over: &'static str, out: &'static str) -> IntentOptions<Element> {
    IntentOptions::hover(calls.callback(over), calls.callback(out))
}

#[test]
fn settled_pointer_confirms_then_leaves_immediately() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    tracker
        .register(
            "menu",
            hover(&calls, "A", "B")
                .sensitivity(7.0)
                .interval(Duration::from_millis(100))
                .timeout(Duration::ZERO),
        )
        .unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.pointer_move(&"menu", PointerEvent::moved(ms(40), 1.0, 1.0));
    tracker.pointer_move(&"menu", PointerEvent::moved(ms(80), 2.0, 2.0));
    tracker.advance(ms(100));
    assert_eq!(calls.labels(), vec![("A", 100)]);

    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(130), 5.0, 2.0));
    assert_eq!(calls.labels(), vec![("A", 100), ("B", 130)]);

    let recorded = calls.0.lock().unwrap().clone();
    assert_eq!(recorded[0].element, "menu");
    assert_eq!(recorded[0].event_x, 0.0, "enter callback sees the enter event");
    assert_eq!(recorded[1].event_x, 5.0, "leave callback sees the leave event");
}

#[test]
fn clear_only_drops_every_registration_and_cancels_timers() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    tracker.register("menu", hover(&calls, "A", "a")).unwrap();
    tracker
        .register(
            "menu",
            hover(&calls, "B", "b").interval(Duration::from_millis(300)),
        )
        .unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    assert_eq!(tracker.pending_timers(), 2);

    let outcome = tracker
        .register("menu", IntentOptions::clear_all())
        .unwrap();
    assert_eq!(outcome, RegisterOutcome::Cleared);
    assert_eq!(tracker.registration_count(&"menu"), 0);
    assert_eq!(tracker.pending_timers(), 0);

    tracker.advance(ms(1_000));
    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(1_100), 0.0, 0.0));
    tracker.advance(ms(2_000));
    assert!(calls.labels().is_empty());
}

#[test]
fn clear_during_out_delay_drops_pending_leave() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    let id = tracker
        .register(
            "menu",
            hover(&calls, "A", "B").timeout(Duration::from_millis(300)),
        )
        .unwrap()
        .registration()
        .unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.advance(ms(100));
    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(150), 0.0, 0.0));
    assert_eq!(tracker.state(&"menu", id), Some(IntentState::Confirmed));
    assert_eq!(tracker.pending_timers(), 1);

    tracker.advance(ms(200));
    let outcome = tracker
        .register("menu", IntentOptions::clear_all())
        .unwrap();
    assert_eq!(outcome, RegisterOutcome::Cleared);
    assert_eq!(tracker.pending_timers(), 0);
    assert_eq!(tracker.state(&"menu", id), None);

    tracker.advance(ms(1_000));
    assert_eq!(calls.labels(), vec![("A", 100)]);
}

#[test]
fn clear_with_callbacks_replaces_previous_registrations() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    let first = tracker
        .register("menu", hover(&calls, "A", "a"))
        .unwrap()
        .registration()
        .unwrap();
    let second = tracker
        .register("menu", hover(&calls, "B", "b").clear(true))
        .unwrap()
        .registration()
        .unwrap();

    assert_eq!(tracker.registrations(&"menu"), vec![second]);
    assert_eq!(tracker.state(&"menu", first), None);

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.advance(ms(100));
    assert_eq!(calls.labels(), vec![("B", 100)]);
}

#[test]
fn registrations_accumulate_in_insertion_order() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    let a = tracker.register("menu", hover(&calls, "A", "a")).unwrap();
    let b = tracker.register("menu", hover(&calls, "B", "b")).unwrap();

    assert_eq!(
        tracker.registrations(&"menu"),
        vec![a.registration().unwrap(), b.registration().unwrap()]
    );

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.advance(ms(100));
    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(200), 0.0, 0.0));
    assert_eq!(
        calls.labels(),
        vec![("A", 100), ("B", 100), ("a", 200), ("b", 200)]
    );
}

#[test]
fn leave_before_confirmation_does_not_call_out() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    let id = tracker
        .register("menu", hover(&calls, "A", "B"))
        .unwrap()
        .registration()
        .unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(60), 0.0, 0.0));
    tracker.advance(ms(1_000));

    assert!(calls.labels().is_empty());
    assert_eq!(tracker.state(&"menu", id), Some(IntentState::Idle));
}

#[test]
fn reentering_cancels_pending_leave() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    let id = tracker
        .register(
            "menu",
            hover(&calls, "A", "B").timeout(Duration::from_millis(300)),
        )
        .unwrap()
        .registration()
        .unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.advance(ms(100));
    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(150), 0.0, 0.0));
    assert_eq!(tracker.state(&"menu", id), Some(IntentState::Confirmed));

    // Back inside before the out delay elapses.
    tracker.pointer_enter(&"menu", PointerEvent::enter(ms(300), 1.0, 1.0));
    tracker.advance(ms(1_000));
    assert_eq!(calls.labels(), vec![("A", 100)]);
    assert_eq!(tracker.state(&"menu", id), Some(IntentState::Confirmed));
    assert_eq!(tracker.pending_timers(), 0, "confirmed registrations do not poll");

    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(1_200), 1.0, 1.0));
    tracker.advance(ms(1_500));
    assert_eq!(calls.labels(), vec![("A", 100), ("B", 1_500)]);
}

#[test]
fn each_hover_session_confirms_once() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    tracker.register("menu", hover(&calls, "A", "B")).unwrap();

    for session in 0..3u64 {
        let start = session * 1_000;
        tracker.pointer_enter(&"menu", PointerEvent::enter(ms(start), 0.0, 0.0));
        tracker.advance(ms(start + 700));
        tracker.pointer_leave(&"menu", PointerEvent::leave(ms(start + 800), 0.0, 0.0));
    }

    assert_eq!(calls.count("A"), 3);
    assert_eq!(calls.count("B"), 3);
}

#[test]
fn zero_interval_confirms_on_entry() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    tracker
        .register(
            "menu",
            hover(&calls, "A", "B").interval(Duration::ZERO),
        )
        .unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(ms(5), 3.0, 3.0));
    assert_eq!(calls.labels(), vec![("A", 5)]);
}

#[test]
fn zero_interval_with_unusable_position_returns_without_confirming() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    tracker
        .register(
            "menu",
            hover(&calls, "A", "B").interval(Duration::ZERO),
        )
        .unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, f64::NAN, 0.0));
    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(10), f64::NAN, 0.0));
    assert!(calls.labels().is_empty());
    assert_eq!(tracker.pending_timers(), 0);

    tracker.pointer_enter(&"menu", PointerEvent::enter(ms(20), 1.0, 1.0));
    assert_eq!(calls.labels(), vec![("A", 20)]);
}

#[test]
fn first_confirmation_stops_move_tracking_for_other_registrations() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    tracker
        .register(
            "menu",
            hover(&calls, "fast", "fast-out")
                .sensitivity(50.0)
                .interval(Duration::from_millis(50)),
        )
        .unwrap();
    let slow = tracker
        .register(
            "menu",
            hover(&calls, "slow", "slow-out")
                .sensitivity(2.0)
                .interval(Duration::from_millis(200)),
        )
        .unwrap()
        .registration()
        .unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.pointer_move(&"menu", PointerEvent::moved(ms(20), 10.0, 0.0));
    tracker.advance(ms(50));
    assert_eq!(calls.labels(), vec![("fast", 50)]);
    assert!(!tracker.is_tracking_moves(&"menu"));

    // Later moves are no longer sampled.
    tracker.pointer_move(&"menu", PointerEvent::moved(ms(100), 400.0, 0.0));
    tracker.advance(ms(200));
    assert_eq!(tracker.state(&"menu", slow), Some(IntentState::Polling));
    tracker.advance(ms(400));
    assert_eq!(calls.labels(), vec![("fast", 50), ("slow", 400)]);
}

#[test]
fn listeners_follow_the_hover_lifecycle() {
    let subscriptions = Subscriptions::default();
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::with_listeners(subscriptions.clone());

    tracker.register("menu", hover(&calls, "A", "a")).unwrap();
    tracker.register("menu", hover(&calls, "B", "b")).unwrap();
    tracker.register("other", IntentOptions::clear_all()).unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.advance(ms(100));
    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(150), 0.0, 0.0));
    tracker.pointer_enter(&"menu", PointerEvent::enter(ms(200), 0.0, 0.0));
    tracker.pointer_leave(&"menu", PointerEvent::leave(ms(210), 0.0, 0.0));
    tracker.forget(&"menu");

    use PointerEventKind::*;
    assert_eq!(
        *subscriptions.0.lock().unwrap(),
        vec![
            (true, "menu", Enter),
            (true, "menu", Leave),
            (true, "menu", Move),
            (false, "menu", Move),
            (true, "menu", Move),
            (false, "menu", Move),
            (false, "menu", Enter),
            (false, "menu", Leave),
        ]
    );
}

#[test]
fn elements_are_tracked_independently() {
    let calls = Calls::default();
    let mut tracker = HoverIntentTracker::new();
    tracker.register("menu", hover(&calls, "menu", "menu-out")).unwrap();
    tracker.register("nav", hover(&calls, "nav", "nav-out")).unwrap();

    tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
    tracker.pointer_enter(&"nav", PointerEvent::enter(ms(10), 500.0, 0.0));
    tracker.pointer_move(&"nav", PointerEvent::moved(ms(50), 600.0, 0.0));
    tracker.advance(ms(110));

    assert_eq!(calls.labels(), vec![("menu", 100)]);
    assert!(tracker.is_tracking_moves(&"nav"));
    assert!(!tracker.is_tracking_moves(&"menu"));
}

proptest! {
    #[test]
    fn small_displacement_confirms_exactly_once(
        sensitivity in 1u32..40,
        moving_polls in 0usize..8,
        jitter in proptest::collection::vec((0.0f64..1.0, 0.0f64..1.0), 1..6),
    ) {
        let calls = Calls::default();
        let mut tracker = HoverIntentTracker::new();
        tracker.register("menu", hover(&calls, "A", "B").sensitivity(sensitivity as f64)).unwrap();

        let sensitivity = sensitivity as f64;
        tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));

        // Moving phase: every interval the pointer travels exactly the threshold.
        let mut x = 0.0;
        for poll in 0..moving_polls as u64 {
            x += sensitivity;
            tracker.pointer_move(&"menu", PointerEvent::moved(ms(poll * 100 + 50), x, 0.0));
        }

        // Settled phase: jitter stays strictly under the threshold in total.
        let settle_start = moving_polls as u64 * 100;
        let scale = (sensitivity - 0.01) / (2.0 * jitter.len() as f64);
        let (mut jx, mut jy) = (x, 0.0);
        for (i, (dx, dy)) in jitter.iter().enumerate() {
            jx += dx * scale;
            jy += dy * scale;
            tracker.pointer_move(&"menu", PointerEvent::moved(ms(settle_start) + 1 + i as u64, jx, jy));
        }

        tracker.advance(ms(settle_start + 5_000));
        prop_assert_eq!(calls.labels(), vec![("A", settle_start + 100)]);
    }

    #[test]
    fn persistent_motion_never_confirms(
        sensitivity in 1u32..40,
        polls in 1u64..30,
        extra in 0u32..25,
    ) {
        let calls = Calls::default();
        let mut tracker = HoverIntentTracker::new();
        let id = tracker
            .register("menu", hover(&calls, "A", "B").sensitivity(sensitivity as f64))
            .unwrap()
            .registration()
            .unwrap();

        tracker.pointer_enter(&"menu", PointerEvent::enter(0, 0.0, 0.0));
        let mut y = 0.0;
        for poll in 0..polls {
            y += (sensitivity + extra) as f64;
            tracker.pointer_move(&"menu", PointerEvent::moved(ms(poll * 100 + 50), 0.0, y));
        }
        tracker.advance(ms(polls * 100));
        prop_assert_eq!(tracker.state(&"menu", id), Some(IntentState::Polling));

        tracker.pointer_leave(&"menu", PointerEvent::leave(ms(polls * 100 + 10), 0.0, y));
        tracker.advance(ms(polls * 100 + 5_000));
        prop_assert!(calls.labels().is_empty());
    }
}

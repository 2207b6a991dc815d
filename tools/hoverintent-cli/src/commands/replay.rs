//! Replay a recorded pointer session through the tracker.
//!
//! One registration with the given defaults is added per element, in order
//! of first appearance. Virtual replay feeds events on the tracker's own
//! clock; live replay paces them in real time through the async driver.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hoverintent_common::clock::{duration_to_ns, ns_to_ms, HoverClock, TimestampNs};
use hoverintent_common::config::IntentDefaults;
use hoverintent_common::error::HoverIntentError;
use hoverintent_pointer_model::session::{
    first_out_of_order, parse_session, parse_session_header, session_elements, SessionHeader,
};
use hoverintent_pointer_model::transition::{
    IntentTransition, TransitionKind, TransitionLogHeader,
};
use hoverintent_pointer_model::SessionRecord;
use hoverintent_tracker::writer::TransitionWriter;
use hoverintent_tracker::{spawn_driver, HoverIntentTracker, IntentContext, IntentOptions};

pub async fn run(
    path: PathBuf,
    defaults: IntentDefaults,
    output: Option<PathBuf>,
    live: bool,
) -> anyhow::Result<()> {
    let (header, records) = load_session(&path)?;
    println!(
        "Replaying {} event(s) on {} element(s) from {}",
        records.len(),
        session_elements(&records).len(),
        path.display()
    );
    if let Some(header) = &header {
        println!(
            "  recorded {}{}",
            header.epoch_wall,
            header
                .description
                .as_deref()
                .map(|d| format!(": {d}"))
                .unwrap_or_default()
        );
    }
    println!(
        "  sensitivity={} interval={}ms timeout={}ms{}",
        defaults.sensitivity,
        defaults.interval_ms,
        defaults.timeout_ms,
        if live { " (live)" } else { "" }
    );

    let transitions = if live {
        replay_live(&records, &defaults).await?
    } else {
        replay(&records, &defaults)?
    };

    if transitions.is_empty() {
        println!("\nNo hover intent detected.");
    } else {
        println!();
        for t in &transitions {
            println!(
                "  {:>9.1}ms  {:<16} reg #{:<3} {:?}",
                t.timestamp_ms(),
                t.element,
                t.registration,
                t.kind
            );
        }
    }

    if let Some(output) = output {
        let header = TransitionLogHeader {
            schema_version: "1.0".to_string(),
            epoch_wall: HoverClock::start().epoch_wall().to_string(),
            sensitivity: defaults.sensitivity,
            interval_ms: defaults.interval_ms,
            timeout_ms: defaults.timeout_ms,
        };
        let mut writer = TransitionWriter::create(&output, &header)?;
        for t in &transitions {
            writer.write(t)?;
        }
        writer.flush()?;
        println!(
            "\nWrote {} transition(s) to {}",
            writer.transitions_written(),
            output.display()
        );
    }

    Ok(())
}

/// Read and parse a session file, rejecting timestamps that go backwards.
pub fn load_session(
    path: &Path,
) -> anyhow::Result<(Option<SessionHeader>, Vec<SessionRecord>)> {
    if !path.exists() {
        return Err(HoverIntentError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path)?;
    let records = parse_session(&content)
        .map_err(|e| HoverIntentError::session(format!("{}: {e}", path.display())))?;
    if let Some(idx) = first_out_of_order(&records) {
        return Err(HoverIntentError::session(format!(
            "record {} goes back in time ({}ms)",
            idx + 1,
            ns_to_ms(records[idx].event.timestamp_ns)
        ))
        .into());
    }
    Ok((parse_session_header(&content), records))
}

/// Collects transitions from tracker callbacks.
#[derive(Clone, Default)]
struct TransitionSink(Arc<Mutex<Vec<IntentTransition>>>);

impl TransitionSink {
    fn callback(
        &self,
        kind: TransitionKind,
    ) -> impl FnMut(&IntentContext<'_, String>) + Send + 'static {
        let sink = self.0.clone();
        move |ctx| {
            let transition = IntentTransition {
                timestamp_ns: ctx.fired_at_ns,
                element: ctx.element.clone(),
                registration: ctx.registration.as_u64(),
                kind,
                x: ctx.event.x,
                y: ctx.event.y,
            };
            tracing::debug!(element = %transition.element, ?kind, "Transition");
            if let Ok(mut transitions) = sink.lock() {
                transitions.push(transition);
            }
        }
    }

    fn options(&self, defaults: &IntentDefaults) -> IntentOptions<String> {
        IntentOptions::from_defaults(defaults)
            .over(self.callback(TransitionKind::Confirmed))
            .out(self.callback(TransitionKind::Left))
    }

    fn take(&self) -> Vec<IntentTransition> {
        self.0
            .lock()
            .map(|mut transitions| std::mem::take(&mut *transitions))
            .unwrap_or_default()
    }
}

/// How long to keep running after the last event so pending timers fire.
fn settle_window(defaults: &IntentDefaults) -> Duration {
    Duration::from_millis(
        defaults
            .interval_ms
            .saturating_mul(2)
            .saturating_add(defaults.timeout_ms),
    )
}

fn last_timestamp(records: &[SessionRecord]) -> TimestampNs {
    records.last().map_or(0, |r| r.event.timestamp_ns)
}

/// Replay on virtual time.
pub fn replay(
    records: &[SessionRecord],
    defaults: &IntentDefaults,
) -> anyhow::Result<Vec<IntentTransition>> {
    let sink = TransitionSink::default();
    let mut tracker = HoverIntentTracker::new();
    for element in session_elements(records) {
        tracker.register(element.to_string(), sink.options(defaults))?;
    }

    for record in records {
        tracker.handle(&record.element, record.event);
    }
    let settle_ns = duration_to_ns(settle_window(defaults));
    tracker.advance(last_timestamp(records).saturating_add(settle_ns));

    Ok(sink.take())
}

/// Replay in real time through the async driver.
pub async fn replay_live(
    records: &[SessionRecord],
    defaults: &IntentDefaults,
) -> anyhow::Result<Vec<IntentTransition>> {
    let sink = TransitionSink::default();
    let (handle, join) = spawn_driver(HoverIntentTracker::new());
    for element in session_elements(records) {
        handle
            .register(element.to_string(), sink.options(defaults))
            .await?;
    }

    let start = tokio::time::Instant::now();
    for record in records {
        tokio::time::sleep_until(start + Duration::from_nanos(record.event.timestamp_ns)).await;
        handle
            .pointer(
                record.element.clone(),
                record.event.kind,
                record.event.position(),
            )
            .await?;
    }
    tokio::time::sleep_until(
        start + Duration::from_nanos(last_timestamp(records)) + settle_window(defaults),
    )
    .await;

    handle.shutdown().await?;
    join.await?;
    Ok(sink.take())
}

//! Touch-trace replay.
//!
//! A trace is a JSON array of touch callbacks stamped with their offset
//! from the start of the recording:
//!
//! ```json
//! [
//!   { "at_ms": 0,  "phase": "start", "contacts": [{ "x": 100.0, "y": 100.0 }] },
//!   { "at_ms": 80, "phase": "end",   "contacts": [] }
//! ]
//! ```
//!
//! [`replay_offline`] runs a trace through a [`GestureEngine`] on a virtual
//! clock. [`replay_paced`] feeds a live session in real time.

use std::path::Path;
use std::time::Duration;

use padlink_gesture::{GestureConfig, GestureEngine, ThrottleConfig, TouchEvent};
use padlink_types::Intent;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep_until, Instant};

use crate::error::ClientError;
use crate::session::ClientHandle;

/// One recorded touch callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: TouchEvent,
}

impl TraceRecord {
    pub fn at(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

/// An intent and the trace time it was produced at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedIntent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub intent: Intent,
}

/// Parse a trace and check that timestamps never go backwards.
pub fn parse_trace(json: &str) -> Result<Vec<TraceRecord>, ClientError> {
    let records: Vec<TraceRecord> =
        serde_json::from_str(json).map_err(|e| ClientError::Trace(e.to_string()))?;
    if let Some(pair) = records.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
        return Err(ClientError::Trace(format!(
            "timestamps go backwards: {} ms after {} ms",
            pair[1].at_ms, pair[0].at_ms
        )));
    }
    Ok(records)
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceRecord>, ClientError> {
    let json = std::fs::read_to_string(path)?;
    parse_trace(&json)
}

#[allow(clippy::cast_possible_truncation)]
fn stamp(at: Duration, intents: Vec<Intent>, out: &mut Vec<TimedIntent>) {
    let at_ms = at.as_millis() as u64;
    out.extend(intents.into_iter().map(|intent| TimedIntent { at_ms, intent }));
}

/// Fire every engine deadline up to and including `until`.
fn run_timers(engine: &mut GestureEngine, until: Duration, out: &mut Vec<TimedIntent>) {
    while let Some(deadline) = engine.next_deadline().filter(|d| *d <= until) {
        let intents = engine.poll_timers(deadline);
        stamp(deadline, intents, out);
        if engine.next_deadline() == Some(deadline) {
            break;
        }
    }
}

/// Classify a whole trace without a clock or a network.
///
/// Timers fire at their exact deadlines between records. After the last
/// record, outstanding timers run out and the engine is finished.
pub fn replay_offline(
    trace: &[TraceRecord],
    gesture: &GestureConfig,
    throttle: &ThrottleConfig,
) -> Vec<TimedIntent> {
    let mut engine = GestureEngine::new(gesture, throttle);
    let mut out = Vec::new();
    for record in trace {
        run_timers(&mut engine, record.at(), &mut out);
        let intents = engine.handle(record.at(), &record.event);
        stamp(record.at(), intents, &mut out);
    }

    let mut end = trace.last().map_or(Duration::ZERO, TraceRecord::at);
    while let Some(deadline) = engine.next_deadline() {
        end = end.max(deadline);
        let before = out.len();
        run_timers(&mut engine, deadline, &mut out);
        if out.len() == before && engine.next_deadline() == Some(deadline) {
            break;
        }
    }
    let intents = engine.finish(end);
    stamp(end, intents, &mut out);
    out
}

/// Feed `trace` into a running session, sleeping between records so the
/// session sees the recorded timing.
pub async fn replay_paced(trace: &[TraceRecord], handle: &ClientHandle) -> Result<(), ClientError> {
    let start = Instant::now();
    for record in trace {
        sleep_until(start + record.at()).await;
        handle.touch(record.event.clone()).await?;
    }
    Ok(())
}

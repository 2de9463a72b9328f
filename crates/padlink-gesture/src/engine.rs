//! Classifier and throttle composed into one synchronous pipeline.

use std::time::Duration;

use padlink_types::Intent;

use crate::classifier::GestureClassifier;
use crate::config::{GestureConfig, ThrottleConfig};
use crate::throttle::DispatchThrottle;
use crate::touch::{TouchEvent, TouchPhase};

/// Everything the client runs between a touch callback and the transport.
///
/// Times are offsets from the start of the session. The caller must feed
/// events in non-decreasing time order and call
/// [`poll_timers`](Self::poll_timers) no later than
/// [`next_deadline`](Self::next_deadline) while idle.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    classifier: GestureClassifier,
    throttle: DispatchThrottle,
}

impl GestureEngine {
    pub fn new(gesture: &GestureConfig, throttle: &ThrottleConfig) -> Self {
        Self {
            classifier: GestureClassifier::new(gesture.clone()),
            throttle: DispatchThrottle::new(throttle),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.classifier.is_dragging()
    }

    /// Handle one touch callback, returning the intents to send, in order.
    pub fn handle(&mut self, now: Duration, event: &TouchEvent) -> Vec<Intent> {
        let mut raw = Vec::new();
        self.classifier.fire_due_timers(now, &mut raw);
        match event.phase {
            TouchPhase::Start => self.classifier.touch_start(now, &event.contacts, &mut raw),
            TouchPhase::Move => self.classifier.touch_move(now, &event.contacts, &mut raw),
            TouchPhase::End => self.classifier.touch_end(now, &event.contacts, &mut raw),
        }

        let mut out = Vec::with_capacity(raw.len() + 1);
        self.dispatch(now, raw, &mut out);
        if event.phase == TouchPhase::End && event.contacts.is_empty() {
            out.extend(self.throttle.flush());
        }
        out
    }

    /// Fire due timers and forward held-back motion whose interval is over.
    pub fn poll_timers(&mut self, now: Duration) -> Vec<Intent> {
        let mut raw = Vec::new();
        self.classifier.fire_due_timers(now, &mut raw);
        let mut out = Vec::with_capacity(raw.len() + 1);
        self.dispatch(now, raw, &mut out);
        out.extend(self.throttle.poll(now));
        out
    }

    /// Send an intent that did not come from the touch surface (keyboard,
    /// media, dimensions) behind any held-back motion.
    pub fn submit(&mut self, now: Duration, intent: Intent) -> Vec<Intent> {
        let mut out = Vec::with_capacity(2);
        self.dispatch(now, vec![intent], &mut out);
        out
    }

    /// The next time [`poll_timers`](Self::poll_timers) has work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.classifier.next_deadline(), self.throttle.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Wind the session down: forward held-back motion and close any drag
    /// or scroll bracket the current episode left open.
    pub fn finish(&mut self, now: Duration) -> Vec<Intent> {
        let mut raw = Vec::new();
        self.classifier.fire_due_timers(now, &mut raw);
        self.classifier.cancel(now, &mut raw);
        let mut out = Vec::with_capacity(raw.len() + 1);
        self.dispatch(now, raw, &mut out);
        out.extend(self.throttle.flush());
        out
    }

    fn dispatch(&mut self, now: Duration, raw: Vec<Intent>, out: &mut Vec<Intent>) {
        for intent in raw {
            if intent.is_motion() {
                out.extend(self.throttle.offer(now, intent));
            } else {
                out.extend(self.throttle.flush());
                out.push(intent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThrottleMode;
    use padlink_types::{ClickButton, MediaCommand, Point};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn engine(mode: ThrottleMode) -> GestureEngine {
        GestureEngine::new(
            &GestureConfig::default(),
            &ThrottleConfig {
                interval_ms: 32,
                mode,
            },
        )
    }

    fn total_motion(intents: &[Intent]) -> (f64, f64) {
        intents.iter().fold((0.0, 0.0), |(x, y), i| match i {
            Intent::Movement { dx, dy } | Intent::Drag { dx, dy } => (x + dx, y + dy),
            _ => (x, y),
        })
    }

    /// A finger sliding 2 px every 8 ms for 20 samples.
    fn slide(engine: &mut GestureEngine) -> Vec<Intent> {
        let mut sent = engine.handle(ms(0), &TouchEvent::start(vec![p(0.0, 0.0)]));
        for step in 1..=20u32 {
            let x = f64::from(step) * 2.0;
            sent.extend(engine.handle(ms(u64::from(step) * 8), &TouchEvent::moved(vec![p(x, 0.0)])));
        }
        sent.extend(engine.handle(ms(170), &TouchEvent::end(vec![])));
        sent
    }

    #[test]
    fn accumulating_throttle_preserves_total_travel() {
        let mut e = engine(ThrottleMode::Accumulate);
        let sent = slide(&mut e);
        let (dx, dy) = total_motion(&sent);
        assert!((dx - 40.0).abs() < 1e-9, "travel was {dx}");
        assert!(dy.abs() < 1e-9);
        // 160 ms of motion at a 32 ms interval, plus the final flush.
        assert!(sent.len() <= 7, "sent {} intents", sent.len());
    }

    #[test]
    fn dropping_throttle_under_travels() {
        let mut e = engine(ThrottleMode::Drop);
        let sent = slide(&mut e);
        let (dx, _) = total_motion(&sent);
        assert!(dx < 40.0);
        assert!(dx > 0.0);
    }

    #[test]
    fn drag_bracket_flushes_before_drag_end() {
        let mut e = engine(ThrottleMode::Accumulate);
        let mut sent = e.handle(ms(0), &TouchEvent::start(vec![p(0.0, 0.0)]));
        sent.extend(e.poll_timers(ms(500)));
        assert!(e.is_dragging());
        sent.extend(e.handle(ms(510), &TouchEvent::moved(vec![p(3.0, 0.0)])));
        sent.extend(e.handle(ms(520), &TouchEvent::moved(vec![p(6.0, 0.0)])));
        sent.extend(e.handle(ms(530), &TouchEvent::end(vec![])));
        assert_eq!(
            sent,
            vec![
                Intent::DragStart,
                Intent::Drag { dx: 3.0, dy: 0.0 },
                Intent::Drag { dx: 3.0, dy: 0.0 },
                Intent::DragEnd,
            ]
        );
    }

    #[test]
    fn next_deadline_covers_timers_and_pending_motion() {
        let mut e = engine(ThrottleMode::Accumulate);
        assert_eq!(e.next_deadline(), None);
        e.handle(ms(0), &TouchEvent::start(vec![p(0.0, 0.0)]));
        assert_eq!(e.next_deadline(), Some(ms(50)));
        e.handle(ms(60), &TouchEvent::moved(vec![p(5.0, 0.0)]));
        e.handle(ms(70), &TouchEvent::moved(vec![p(9.0, 0.0)]));
        assert_eq!(e.next_deadline(), Some(ms(92)));
        assert_eq!(e.poll_timers(ms(92)), vec![Intent::Movement { dx: 4.0, dy: 0.0 }]);
    }

    #[test]
    fn submitted_intent_follows_pending_motion() {
        let mut e = engine(ThrottleMode::Accumulate);
        e.handle(ms(0), &TouchEvent::start(vec![p(0.0, 0.0)]));
        e.handle(ms(60), &TouchEvent::moved(vec![p(5.0, 0.0)]));
        e.handle(ms(70), &TouchEvent::moved(vec![p(9.0, 0.0)]));
        let sent = e.submit(ms(75), Intent::Media(MediaCommand::Mute));
        assert_eq!(
            sent,
            vec![
                Intent::Movement { dx: 4.0, dy: 0.0 },
                Intent::Media(MediaCommand::Mute),
            ]
        );
    }

    #[test]
    fn finish_releases_an_open_drag() {
        let mut e = engine(ThrottleMode::Accumulate);
        e.handle(ms(0), &TouchEvent::start(vec![p(0.0, 0.0)]));
        let sent = e.finish(ms(600));
        assert_eq!(sent, vec![Intent::DragStart, Intent::DragEnd]);
        assert!(!e.is_dragging());
        assert!(e.finish(ms(700)).is_empty());
    }

    #[test]
    fn tap_goes_through_untouched() {
        let mut e = engine(ThrottleMode::Accumulate);
        e.handle(ms(0), &TouchEvent::start(vec![p(100.0, 100.0)]));
        let sent = e.handle(ms(60), &TouchEvent::end(vec![]));
        assert_eq!(sent, vec![Intent::Click(ClickButton::Left)]);
    }
}

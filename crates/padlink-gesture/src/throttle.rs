//! Dispatch throttle for motion intents.
//!
//! Bounds `movement` and `drag` traffic to one intent per interval. Motion
//! that arrives early is either folded into the next forwarded intent
//! ([`ThrottleMode::Accumulate`]) or discarded ([`ThrottleMode::Drop`]).

use std::time::Duration;

use padlink_types::Intent;
use tracing::{debug, trace};

use crate::config::{ThrottleConfig, ThrottleMode};
use crate::quantizer::round3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionKind {
    Movement,
    Drag,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: MotionKind,
    dx: f64,
    dy: f64,
}

impl Pending {
    fn into_intent(self) -> Intent {
        let (dx, dy) = (round3(self.dx), round3(self.dy));
        match self.kind {
            MotionKind::Movement => Intent::Movement { dx, dy },
            MotionKind::Drag => Intent::Drag { dx, dy },
        }
    }
}

fn split(intent: &Intent) -> Option<Pending> {
    match *intent {
        Intent::Movement { dx, dy } => Some(Pending {
            kind: MotionKind::Movement,
            dx,
            dy,
        }),
        Intent::Drag { dx, dy } => Some(Pending {
            kind: MotionKind::Drag,
            dx,
            dy,
        }),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct DispatchThrottle {
    interval: Duration,
    mode: ThrottleMode,
    last_forwarded_at: Option<Duration>,
    pending: Option<Pending>,
}

impl DispatchThrottle {
    pub fn new(config: &ThrottleConfig) -> Self {
        Self {
            interval: config.interval(),
            mode: config.mode,
            last_forwarded_at: None,
            pending: None,
        }
    }

    fn ready(&self, now: Duration) -> bool {
        self.last_forwarded_at
            .map_or(true, |last| now.saturating_sub(last) >= self.interval)
    }

    /// Offer a motion intent. Returns the intent to send now, if any.
    ///
    /// Non-motion intents are passed straight through; callers are expected
    /// to [`flush`](Self::flush) before sending them.
    pub fn offer(&mut self, now: Duration, intent: Intent) -> Option<Intent> {
        let Some(mut incoming) = split(&intent) else {
            return Some(intent);
        };

        if let Some(pending) = self.pending.take() {
            if pending.kind == incoming.kind {
                incoming.dx += pending.dx;
                incoming.dy += pending.dy;
            } else {
                debug!(?pending.kind, ?incoming.kind, "discarding motion of the other kind");
            }
        }

        if self.ready(now) {
            self.last_forwarded_at = Some(now);
            return Some(incoming.into_intent());
        }

        match self.mode {
            ThrottleMode::Accumulate => {
                trace!(dx = incoming.dx, dy = incoming.dy, "motion held back");
                self.pending = Some(incoming);
            }
            ThrottleMode::Drop => {
                trace!(dx = incoming.dx, dy = incoming.dy, "motion dropped");
            }
        }
        None
    }

    /// Forward held-back motion if its interval has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<Intent> {
        if self.pending.is_none() || !self.ready(now) {
            return None;
        }
        self.last_forwarded_at = Some(now);
        self.pending.take().map(Pending::into_intent)
    }

    /// Hand over held-back motion regardless of the interval.
    pub fn flush(&mut self) -> Option<Intent> {
        self.pending.take().map(Pending::into_intent)
    }

    /// When [`poll`](Self::poll) would next forward something.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending?;
        Some(self.last_forwarded_at.map_or(Duration::ZERO, |last| last + self.interval))
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padlink_types::ClickButton;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn throttle(mode: ThrottleMode) -> DispatchThrottle {
        DispatchThrottle::new(&ThrottleConfig {
            interval_ms: 32,
            mode,
        })
    }

    fn mv(dx: f64, dy: f64) -> Intent {
        Intent::Movement { dx, dy }
    }

    #[test]
    fn first_motion_goes_straight_through() {
        let mut t = throttle(ThrottleMode::Accumulate);
        assert_eq!(t.offer(ms(5), mv(1.0, 2.0)), Some(mv(1.0, 2.0)));
    }

    #[test]
    fn accumulate_folds_early_deltas_into_next_forward() {
        let mut t = throttle(ThrottleMode::Accumulate);
        assert!(t.offer(ms(0), mv(1.0, 0.0)).is_some());
        assert_eq!(t.offer(ms(10), mv(2.0, 1.0)), None);
        assert_eq!(t.offer(ms(20), mv(3.0, -1.5)), None);
        assert_eq!(t.offer(ms(32), mv(1.0, 0.5)), Some(mv(6.0, 0.0)));
        assert!(!t.has_pending());
    }

    #[test]
    fn drop_mode_loses_early_deltas() {
        let mut t = throttle(ThrottleMode::Drop);
        assert!(t.offer(ms(0), mv(1.0, 0.0)).is_some());
        assert_eq!(t.offer(ms(10), mv(2.0, 1.0)), None);
        assert_eq!(t.offer(ms(40), mv(1.0, 0.5)), Some(mv(1.0, 0.5)));
        assert_eq!(t.flush(), None);
    }

    #[test]
    fn interval_is_closed_open() {
        let mut t = throttle(ThrottleMode::Drop);
        t.offer(ms(100), mv(1.0, 0.0));
        assert_eq!(t.offer(ms(131), mv(1.0, 0.0)), None);
        assert!(t.offer(ms(132), mv(1.0, 0.0)).is_some());
    }

    #[test]
    fn flush_drains_without_touching_the_clock() {
        let mut t = throttle(ThrottleMode::Accumulate);
        t.offer(ms(0), mv(1.0, 0.0));
        t.offer(ms(10), mv(0.75, 0.25));
        assert_eq!(t.flush(), Some(mv(0.75, 0.25)));
        assert_eq!(t.flush(), None);
        assert_eq!(t.offer(ms(20), mv(1.0, 1.0)), None);
    }

    #[test]
    fn poll_forwards_pending_after_interval() {
        let mut t = throttle(ThrottleMode::Accumulate);
        t.offer(ms(0), mv(1.0, 0.0));
        t.offer(ms(8), mv(2.0, 2.0));
        assert_eq!(t.next_deadline(), Some(ms(32)));
        assert_eq!(t.poll(ms(20)), None);
        assert_eq!(t.poll(ms(32)), Some(mv(2.0, 2.0)));
        assert_eq!(t.next_deadline(), None);
    }

    #[test]
    fn kind_change_discards_stale_motion() {
        let mut t = throttle(ThrottleMode::Accumulate);
        t.offer(ms(0), mv(1.0, 0.0));
        t.offer(ms(10), mv(4.0, 0.0));
        assert_eq!(
            t.offer(ms(40), Intent::Drag { dx: 1.0, dy: 1.0 }),
            Some(Intent::Drag { dx: 1.0, dy: 1.0 })
        );
    }

    #[test]
    fn discrete_intents_pass_through() {
        let mut t = throttle(ThrottleMode::Accumulate);
        t.offer(ms(0), mv(1.0, 0.0));
        let click = Intent::Click(ClickButton::Left);
        assert_eq!(t.offer(ms(1), click.clone()), Some(click));
    }
}

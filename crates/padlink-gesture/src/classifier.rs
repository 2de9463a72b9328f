//! Gesture classifier.
//!
//! Turns native touch callbacks into [`Intent`]s with no lookahead. Each
//! entry point takes the current session time explicitly; timers are kept
//! as absolute deadlines which the caller fires through
//! [`GestureClassifier::fire_due_timers`] before delivering the next event.
//!
//! Rules, in brief:
//! - One finger: motion is quantized and sent as `movement`, or `drag`
//!   once a long-press has promoted the episode. A still tap clicks left
//!   when the click-arm delay has passed and no cooldown is active.
//! - Two fingers: same-direction vertical travel scrolls, a change in
//!   finger spacing zooms, and a still tap clicks right. A recent scroll
//!   step blocks zoom for the arbitration window and vice versa.

use std::time::Duration;

use padlink_types::{ClickButton, Intent, Point, ScrollDirection, ZoomDirection};
use tracing::{debug, trace};

use crate::config::GestureConfig;
use crate::quantizer::{round3, MotionQuantizer};
use crate::state::{within, Cooldowns, TouchState};

#[derive(Debug, Clone, Copy)]
enum Timer {
    ClickArm,
    LongPress,
    ScrollLatchRelease,
}

/// The gesture state machine for one client session.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: GestureConfig,
    quantizer: MotionQuantizer,
    touch: TouchState,
    cooldowns: Cooldowns,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            quantizer: MotionQuantizer::new(config.minimum_movement),
            config,
            touch: TouchState::default(),
            cooldowns: Cooldowns::default(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.touch.is_dragging
    }

    /// Contacts reported by the most recent callback.
    pub fn active_contacts(&self) -> usize {
        self.touch.active
    }

    /// Earliest armed timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.touch
            .deadlines()
            .chain(self.cooldowns.scroll_latch_release_at)
            .min()
    }

    /// Fire every timer whose deadline is at or before `now`, oldest first.
    pub fn fire_due_timers(&mut self, now: Duration, out: &mut Vec<Intent>) {
        loop {
            let due = [
                (self.touch.click_arm_at, Timer::ClickArm),
                (self.touch.long_press_at, Timer::LongPress),
                (self.cooldowns.scroll_latch_release_at, Timer::ScrollLatchRelease),
            ]
            .into_iter()
            .filter_map(|(at, timer)| at.filter(|at| *at <= now).map(|at| (at, timer)))
            .min_by_key(|(at, _)| *at);

            let Some((_, timer)) = due else {
                return;
            };
            match timer {
                Timer::ClickArm => {
                    self.touch.click_arm_at = None;
                    self.touch.click_armed = true;
                }
                Timer::LongPress => {
                    self.touch.long_press_at = None;
                    if !self.touch.moved && !self.touch.is_dragging {
                        debug!("long press, entering drag mode");
                        self.touch.is_dragging = true;
                        self.touch.click_armed = false;
                        self.touch.click_arm_at = None;
                        out.push(Intent::DragStart);
                    }
                }
                Timer::ScrollLatchRelease => {
                    self.cooldowns.scroll_latch_release_at = None;
                    self.cooldowns.scroll_latched = false;
                }
            }
        }
    }

    pub fn touch_start(&mut self, now: Duration, contacts: &[Point], _out: &mut Vec<Intent>) {
        let Some(first) = contacts.first().copied() else {
            return;
        };
        if self.touch.active == 0 {
            self.touch = TouchState::default();
        }
        self.touch.active = contacts.len();
        self.touch.record_contacts(contacts);
        self.touch.moved = false;
        self.touch.click_armed = false;
        self.touch.click_arm_at = None;
        self.quantizer.reset(first);

        if let [a, b, ..] = contacts {
            let distance = a.distance_to(*b);
            trace!(distance, "two-finger touch start");
            self.touch.two_finger_start = true;
            self.touch.is_two_finger = true;
            self.touch.potential_right_click = true;
            self.touch.initial_pinch_distance = Some(distance);
            self.touch.last_zoom_distance = distance;
            self.touch.long_press_at = None;
            if !self.touch.has_scrolled {
                self.cooldowns.scroll_latched = false;
                self.cooldowns.scroll_latch_release_at = None;
            }
        } else {
            let cfg = &self.config;
            if !within(
                self.cooldowns.last_right_click_at,
                cfg.right_click_cooldown(),
                now,
            ) {
                self.touch.click_arm_at = Some(now + cfg.click_delay());
            }
            if !self.touch.is_two_finger {
                self.touch.long_press_at = Some(now + cfg.long_press());
            }
        }
    }

    pub fn touch_move(&mut self, now: Duration, contacts: &[Point], out: &mut Vec<Intent>) {
        let Some(first) = contacts.first().copied() else {
            return;
        };
        self.touch.active = contacts.len();

        if let [a, b, ..] = contacts {
            let pair = [*a, *b];
            self.touch.is_two_finger = true;
            self.touch.long_press_at = None;
            if self.touch.two_finger_start {
                if !self.touch.is_dragging {
                    self.classify_scroll(now, pair, out);
                    self.classify_zoom(now, pair, out);
                }
                self.detect_two_finger_movement(pair);
            }
            self.touch.contact_last = pair;
            return;
        }

        if self.touch.is_two_finger {
            // The survivor of a two-finger gesture starts fresh so its
            // first delta does not jump.
            self.touch.is_two_finger = false;
            self.touch.contact_start[0] = first;
            self.touch.contact_last[0] = first;
            self.quantizer.reset(first);
            return;
        }

        self.touch.contact_last[0] = first;
        let Some(delta) = self.quantizer.sample(first) else {
            return;
        };
        if delta.exceeds(self.config.move_threshold) {
            self.touch.moved = true;
            if !self.touch.is_dragging {
                self.touch.long_press_at = None;
            }
            self.touch.click_armed = false;
            self.touch.click_arm_at = None;
        }
        trace!(dx = delta.dx, dy = delta.dy, dragging = self.touch.is_dragging, "motion");
        out.push(if self.touch.is_dragging {
            Intent::Drag {
                dx: delta.dx,
                dy: delta.dy,
            }
        } else {
            Intent::Movement {
                dx: delta.dx,
                dy: delta.dy,
            }
        });
    }

    /// `remaining` is the set of contacts still down after the lift.
    pub fn touch_end(&mut self, now: Duration, remaining: &[Point], out: &mut Vec<Intent>) {
        self.touch.long_press_at = None;
        self.touch.active = remaining.len();
        if remaining.is_empty() {
            self.finish_episode(now, out);
        }
    }

    /// Close an episode that will never see its final touch-end, emitting
    /// the bracket ends it still owes.
    pub fn cancel(&mut self, now: Duration, out: &mut Vec<Intent>) {
        if self.touch.active == 0 {
            return;
        }
        debug!(dragging = self.touch.is_dragging, "cancelling gesture episode");
        self.close_brackets(now, out);
        self.touch = TouchState::default();
    }

    fn finish_episode(&mut self, now: Duration, out: &mut Vec<Intent>) {
        let cfg = &self.config;
        let touch = &self.touch;
        let cooldowns = &self.cooldowns;

        let left_click = !touch.moved
            && touch.click_armed
            && !touch.is_two_finger
            && !touch.potential_right_click
            && !touch.right_clicked
            && !touch.has_zoomed
            && !touch.has_scrolled
            && !cooldowns.scroll_latched
            && !touch.is_dragging
            && !within(cooldowns.last_scroll_end_at, cfg.scroll_cooldown(), now)
            && !within(cooldowns.last_right_click_at, cfg.right_click_cooldown(), now)
            && !within(
                cooldowns.last_two_finger_gesture_at,
                cfg.two_finger_click_suppression(),
                now,
            );
        if left_click {
            debug!("tap, left click");
            out.push(Intent::Click(ClickButton::Left));
        }

        if self.touch.two_finger_start {
            if !self.touch.moved
                && !self.touch.has_zoomed
                && !self.touch.has_scrolled
                && !self.touch.is_dragging
            {
                debug!("two-finger tap, right click");
                out.push(Intent::Click(ClickButton::Right));
                self.touch.right_clicked = true;
                self.cooldowns.last_right_click_at = Some(now);
            }
            self.cooldowns.last_two_finger_gesture_at = Some(now);
        }

        self.close_brackets(now, out);
        self.touch = TouchState::default();
    }

    fn close_brackets(&mut self, now: Duration, out: &mut Vec<Intent>) {
        if self.touch.has_scrolled {
            out.push(Intent::ScrollEnd);
            self.cooldowns.last_scroll_end_at = Some(now);
            self.cooldowns.scroll_latch_release_at = Some(now + self.config.scroll_cooldown());
        }
        if self.touch.is_dragging {
            debug!("drag released");
            out.push(Intent::DragEnd);
            self.touch.is_dragging = false;
        }
    }

    fn latch_scroll(&mut self) {
        self.touch.has_scrolled = true;
        self.cooldowns.scroll_latched = true;
        self.cooldowns.scroll_latch_release_at = None;
    }

    fn classify_scroll(&mut self, now: Duration, pair: [Point; 2], out: &mut Vec<Intent>) {
        let cfg = &self.config;
        let dy0 = pair[0].y - self.touch.contact_start[0].y;
        let dy1 = pair[1].y - self.touch.contact_start[1].y;
        let same_direction = (dy0 < 0.0 && dy1 < 0.0) || (dy0 > 0.0 && dy1 > 0.0);
        let zoom_quiet = !within(self.cooldowns.last_zoom_at, cfg.arbitration(), now);

        if dy0.abs() > cfg.scroll_threshold
            && dy1.abs() > cfg.scroll_threshold
            && !within(self.cooldowns.last_scroll_at, cfg.scroll_throttle(), now)
            && zoom_quiet
        {
            if !same_direction {
                return;
            }
            let direction = if dy0 < 0.0 {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            };
            let magnitude = round3(((dy0 + dy1) / 2.0).abs());
            debug!(%direction, magnitude, "scroll step");
            out.push(Intent::Scroll {
                direction,
                magnitude,
            });
            self.latch_scroll();
            self.cooldowns.last_scroll_at = Some(now);
            self.touch.contact_start[0].y = pair[0].y;
            self.touch.contact_start[1].y = pair[1].y;
        } else if dy0.abs() > cfg.scroll_intent_threshold
            && dy1.abs() > cfg.scroll_intent_threshold
            && zoom_quiet
            && same_direction
        {
            if !self.touch.has_scrolled {
                trace!(dy0, dy1, "scroll intent latched");
            }
            self.latch_scroll();
        }
    }

    fn classify_zoom(&mut self, now: Duration, pair: [Point; 2], out: &mut Vec<Intent>) {
        if self.touch.has_scrolled || self.touch.is_dragging {
            return;
        }
        if !matches!(self.touch.initial_pinch_distance, Some(d) if d > 0.0) {
            return;
        }
        let cfg = &self.config;
        if within(self.cooldowns.last_zoom_at, cfg.zoom_throttle(), now)
            || within(self.cooldowns.last_scroll_at, cfg.arbitration(), now)
        {
            return;
        }

        let current = pair[0].distance_to(pair[1]);
        let diff = current - self.touch.last_zoom_distance;
        if diff.abs() > cfg.zoom_threshold {
            let direction = if diff > 0.0 {
                ZoomDirection::In
            } else {
                ZoomDirection::Out
            };
            let magnitude = round3((diff.abs() / cfg.zoom_scale).min(cfg.max_zoom_magnitude));
            debug!(%direction, magnitude, "zoom step");
            out.push(Intent::Zoom {
                direction,
                magnitude,
            });
            self.touch.last_zoom_distance = current;
            self.touch.has_zoomed = true;
            self.cooldowns.last_zoom_at = Some(now);
        } else if diff.abs() > cfg.zoom_intent_threshold {
            self.touch.has_zoomed = true;
            self.touch.last_zoom_distance = current;
        }
    }

    fn detect_two_finger_movement(&mut self, pair: [Point; 2]) {
        let threshold = self.config.two_finger_move_threshold;
        let moved = pair
            .iter()
            .zip(self.touch.contact_start.iter())
            .any(|(now, start)| {
                (now.x - start.x).abs() > threshold || (now.y - start.y).abs() > threshold
            });
        if moved {
            self.touch.moved = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    /// Drives a classifier the way the engine does: due timers first.
    struct Harness {
        classifier: GestureClassifier,
        emitted: Vec<Intent>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                classifier: GestureClassifier::new(GestureConfig::default()),
                emitted: Vec::new(),
            }
        }

        fn start(&mut self, at: u64, contacts: &[Point]) -> &mut Self {
            self.classifier.fire_due_timers(ms(at), &mut self.emitted);
            self.classifier.touch_start(ms(at), contacts, &mut self.emitted);
            self
        }

        fn moved(&mut self, at: u64, contacts: &[Point]) -> &mut Self {
            self.classifier.fire_due_timers(ms(at), &mut self.emitted);
            self.classifier.touch_move(ms(at), contacts, &mut self.emitted);
            self
        }

        fn end(&mut self, at: u64, remaining: &[Point]) -> &mut Self {
            self.classifier.fire_due_timers(ms(at), &mut self.emitted);
            self.classifier.touch_end(ms(at), remaining, &mut self.emitted);
            self
        }

        fn take(&mut self) -> Vec<Intent> {
            std::mem::take(&mut self.emitted)
        }
    }

    #[test]
    fn still_tap_after_arm_delay_clicks_left() {
        let mut h = Harness::new();
        h.start(0, &[p(100.0, 100.0)])
            .moved(20, &[p(100.05, 100.02)])
            .end(60, &[]);
        assert_eq!(h.take(), vec![Intent::Click(ClickButton::Left)]);
    }

    #[test]
    fn tap_released_before_arm_delay_does_not_click() {
        let mut h = Harness::new();
        h.start(0, &[p(100.0, 100.0)])
            .moved(20, &[p(100.05, 100.02)])
            .end(40, &[]);
        assert!(h.take().is_empty());
    }

    #[test]
    fn tap_released_exactly_at_arm_deadline_clicks() {
        let mut h = Harness::new();
        h.start(0, &[p(10.0, 10.0)]).end(50, &[]);
        assert_eq!(h.take(), vec![Intent::Click(ClickButton::Left)]);
    }

    #[test]
    fn single_finger_motion_emits_movement_and_blocks_click() {
        let mut h = Harness::new();
        h.start(0, &[p(10.0, 10.0)])
            .moved(70, &[p(13.0, 8.5)])
            .moved(90, &[p(13.2, 8.5)])
            .end(120, &[]);
        assert_eq!(h.take(), vec![Intent::Movement { dx: 3.0, dy: -1.5 }]);
    }

    #[test]
    fn long_press_starts_drag_once_and_suppresses_click() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0)]);
        h.classifier.fire_due_timers(ms(500), &mut h.emitted);
        h.classifier.fire_due_timers(ms(700), &mut h.emitted);
        assert!(h.classifier.is_dragging());
        h.moved(750, &[p(55.0, 50.0)]).end(800, &[]);
        assert_eq!(
            h.take(),
            vec![
                Intent::DragStart,
                Intent::Drag { dx: 5.0, dy: 0.0 },
                Intent::DragEnd,
            ]
        );
        assert!(!h.classifier.is_dragging());
    }

    #[test]
    fn long_press_fires_before_late_touch_end() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0)]).end(650, &[]);
        assert_eq!(h.take(), vec![Intent::DragStart, Intent::DragEnd]);
    }

    #[test]
    fn movement_cancels_long_press() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0)])
            .moved(100, &[p(60.0, 50.0)])
            .end(900, &[]);
        assert_eq!(h.take(), vec![Intent::Movement { dx: 10.0, dy: 0.0 }]);
        assert_eq!(h.classifier.next_deadline(), None);
    }

    #[test]
    fn two_finger_vertical_swipe_scrolls_up_once() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .moved(60, &[p(50.0, 30.0), p(150.0, 30.0)]);
        assert_eq!(
            h.take(),
            vec![Intent::Scroll {
                direction: ScrollDirection::Up,
                magnitude: 20.0
            }]
        );
    }

    #[test]
    fn scroll_steps_respect_throttle_and_reanchor() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .moved(10, &[p(50.0, 70.0), p(150.0, 70.0)])
            // Inside the 100 ms throttle, travel is only latched.
            .moved(60, &[p(50.0, 90.0), p(150.0, 90.0)])
            .moved(110, &[p(50.0, 104.0), p(150.0, 102.0)]);
        assert_eq!(
            h.take(),
            vec![
                Intent::Scroll {
                    direction: ScrollDirection::Down,
                    magnitude: 20.0
                },
                Intent::Scroll {
                    direction: ScrollDirection::Down,
                    magnitude: 33.0
                },
            ]
        );
    }

    #[test]
    fn opposite_vertical_travel_does_not_scroll() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .moved(60, &[p(50.0, 30.0), p(150.0, 70.0)]);
        assert!(h
            .take()
            .iter()
            .all(|i| !matches!(i, Intent::Scroll { .. })));
    }

    #[test]
    fn pinch_apart_zooms_in_with_scaled_magnitude() {
        let mut h = Harness::new();
        h.start(0, &[p(100.0, 100.0), p(200.0, 100.0)])
            .moved(10, &[p(90.0, 100.0), p(210.0, 100.0)]);
        assert_eq!(
            h.take(),
            vec![Intent::Zoom {
                direction: ZoomDirection::In,
                magnitude: 4.0
            }]
        );
    }

    #[test]
    fn zoom_magnitude_is_capped() {
        let mut h = Harness::new();
        h.start(0, &[p(100.0, 100.0), p(200.0, 100.0)])
            .moved(10, &[p(20.0, 100.0), p(280.0, 100.0)]);
        assert_eq!(
            h.take(),
            vec![Intent::Zoom {
                direction: ZoomDirection::In,
                magnitude: 10.0
            }]
        );
    }

    #[test]
    fn pinch_together_zooms_out_and_respects_throttle() {
        let mut h = Harness::new();
        h.start(0, &[p(100.0, 100.0), p(200.0, 100.0)])
            .moved(10, &[p(110.0, 100.0), p(190.0, 100.0)])
            .moved(60, &[p(120.0, 100.0), p(180.0, 100.0)])
            .moved(140, &[p(125.0, 100.0), p(175.0, 100.0)]);
        assert_eq!(
            h.take(),
            vec![
                Intent::Zoom {
                    direction: ZoomDirection::Out,
                    magnitude: 4.0
                },
                Intent::Zoom {
                    direction: ZoomDirection::Out,
                    magnitude: 6.0
                },
            ]
        );
    }

    #[test]
    fn scroll_blocks_zoom_for_rest_of_episode() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .moved(10, &[p(50.0, 30.0), p(150.0, 30.0)])
            .moved(400, &[p(20.0, 30.0), p(180.0, 30.0)]);
        let emitted = h.take();
        assert_eq!(emitted.len(), 1);
        assert!(matches!(emitted[0], Intent::Scroll { .. }));
    }

    #[test]
    fn zoom_step_blocks_scroll_within_arbitration_window() {
        let mut h = Harness::new();
        h.start(0, &[p(100.0, 100.0), p(200.0, 100.0)])
            .moved(10, &[p(90.0, 100.0), p(210.0, 100.0)])
            .moved(100, &[p(90.0, 80.0), p(210.0, 80.0)]);
        let emitted = h.take();
        assert_eq!(emitted.len(), 1);
        assert!(matches!(emitted[0], Intent::Zoom { .. }));
    }

    #[test]
    fn scroll_resumes_once_zoom_window_passes() {
        let mut h = Harness::new();
        h.start(0, &[p(100.0, 100.0), p(200.0, 100.0)])
            .moved(10, &[p(90.0, 100.0), p(210.0, 100.0)])
            .moved(160, &[p(90.0, 70.0), p(210.0, 70.0)]);
        assert_eq!(
            h.take(),
            vec![
                Intent::Zoom {
                    direction: ZoomDirection::In,
                    magnitude: 4.0
                },
                Intent::Scroll {
                    direction: ScrollDirection::Up,
                    magnitude: 30.0
                },
            ]
        );
    }

    #[test]
    fn still_two_finger_tap_clicks_right_once() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .moved(30, &[p(51.0, 50.5), p(149.0, 50.0)])
            .end(80, &[p(149.0, 50.0)])
            .end(90, &[]);
        assert_eq!(h.take(), vec![Intent::Click(ClickButton::Right)]);
    }

    #[test]
    fn moved_two_finger_tap_does_not_right_click() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .moved(30, &[p(58.0, 50.0), p(158.0, 50.0)])
            .end(90, &[]);
        assert!(h.take().is_empty());
    }

    #[test]
    fn scrolled_episode_ends_with_single_scroll_end_and_no_click() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .moved(60, &[p(50.0, 30.0), p(150.0, 30.0)])
            .end(100, &[p(150.0, 30.0)])
            .end(110, &[]);
        let emitted = h.take();
        assert_eq!(emitted.last(), Some(&Intent::ScrollEnd));
        assert_eq!(emitted.iter().filter(|i| **i == Intent::ScrollEnd).count(), 1);
        assert!(emitted.iter().all(|i| !matches!(i, Intent::Click(_))));
    }

    #[test]
    fn tap_right_after_scroll_is_suppressed() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .moved(60, &[p(50.0, 30.0), p(150.0, 30.0)])
            .end(100, &[]);
        h.take();
        h.start(200, &[p(80.0, 80.0)]).end(300, &[]);
        assert!(h.take().is_empty());

        // Once the latch is released and the cooldown is over, taps click.
        h.start(450, &[p(80.0, 80.0)]).end(520, &[]);
        assert_eq!(h.take(), vec![Intent::Click(ClickButton::Left)]);
    }

    #[test]
    fn tap_inside_right_click_cooldown_is_suppressed() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)]).end(90, &[]);
        assert_eq!(h.take(), vec![Intent::Click(ClickButton::Right)]);

        h.start(190, &[p(80.0, 80.0)]).end(260, &[]);
        assert!(h.take().is_empty());

        h.start(400, &[p(80.0, 80.0)]).end(470, &[]);
        assert_eq!(h.take(), vec![Intent::Click(ClickButton::Left)]);
    }

    #[test]
    fn survivor_of_two_finger_gesture_is_reanchored() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0)])
            .end(40, &[p(150.0, 50.0)])
            // First single-contact move only re-anchors.
            .moved(60, &[p(150.0, 50.0)])
            .moved(80, &[p(153.0, 50.0)]);
        assert_eq!(h.take(), vec![Intent::Movement { dx: 3.0, dy: 0.0 }]);
    }

    #[test]
    fn third_finger_is_ignored() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0), p(150.0, 50.0), p(300.0, 300.0)])
            .moved(60, &[p(50.0, 30.0), p(150.0, 30.0), p(10.0, 10.0)]);
        assert_eq!(
            h.take(),
            vec![Intent::Scroll {
                direction: ScrollDirection::Up,
                magnitude: 20.0
            }]
        );
    }

    #[test]
    fn second_finger_cancels_long_press() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0)])
            .start(100, &[p(50.0, 50.0), p(150.0, 50.0)])
            .end(700, &[]);
        let emitted = h.take();
        assert!(!emitted.contains(&Intent::DragStart));
        assert_eq!(emitted, vec![Intent::Click(ClickButton::Right)]);
    }

    #[test]
    fn cancel_closes_open_drag() {
        let mut h = Harness::new();
        h.start(0, &[p(50.0, 50.0)]);
        h.classifier.fire_due_timers(ms(500), &mut h.emitted);
        h.classifier.cancel(ms(600), &mut h.emitted);
        assert_eq!(h.take(), vec![Intent::DragStart, Intent::DragEnd]);
        assert_eq!(h.classifier.active_contacts(), 0);

        h.classifier.cancel(ms(700), &mut h.emitted);
        assert!(h.take().is_empty());
    }

    #[test]
    fn next_deadline_tracks_armed_timers() {
        let mut h = Harness::new();
        assert_eq!(h.classifier.next_deadline(), None);
        h.start(1000, &[p(1.0, 1.0)]);
        assert_eq!(h.classifier.next_deadline(), Some(ms(1050)));
        h.classifier.fire_due_timers(ms(1050), &mut h.emitted);
        assert_eq!(h.classifier.next_deadline(), Some(ms(1500)));
    }
}

//! Per-episode touch state and the session-wide cooldown clock.

use std::time::Duration;

use padlink_types::Point;

/// Number of contacts the classifier ever looks at.
pub(crate) const TRACKED_CONTACTS: usize = 2;

/// Fields owned by one gesture episode. Replaced wholesale whenever the
/// contact count goes from zero to non-zero.
#[derive(Debug, Clone, Default)]
pub(crate) struct TouchState {
    /// Anchor of each tracked finger. The vertical component doubles as
    /// the scroll reference and is moved after every scroll step.
    pub contact_start: [Point; TRACKED_CONTACTS],
    /// Most recent position of each tracked finger.
    pub contact_last: [Point; TRACKED_CONTACTS],
    /// Contacts reported by the last callback.
    pub active: usize,
    pub moved: bool,
    pub is_dragging: bool,
    /// Two or more fingers are down, or were until the survivor moved.
    pub is_two_finger: bool,
    /// The episode had a two-contact touch-start, which makes it eligible
    /// for scroll, zoom and right-click classification.
    pub two_finger_start: bool,
    /// A two-contact touch-start happened, so a left click is off the table.
    pub potential_right_click: bool,
    pub click_armed: bool,
    pub click_arm_at: Option<Duration>,
    pub long_press_at: Option<Duration>,
    pub has_scrolled: bool,
    /// Set by a zoom step or a sub-threshold pinch.
    pub has_zoomed: bool,
    pub right_clicked: bool,
    pub initial_pinch_distance: Option<f64>,
    pub last_zoom_distance: f64,
}

impl TouchState {
    pub fn record_contacts(&mut self, contacts: &[Point]) {
        for (slot, contact) in contacts.iter().take(TRACKED_CONTACTS).enumerate() {
            self.contact_start[slot] = *contact;
            self.contact_last[slot] = *contact;
        }
    }

    /// Timer deadlines that are still armed, in no particular order.
    pub fn deadlines(&self) -> impl Iterator<Item = Duration> {
        [self.click_arm_at, self.long_press_at].into_iter().flatten()
    }
}

/// Timestamps that must outlive a single episode so a just-finished
/// two-finger gesture cannot turn into a stray tap.
#[derive(Debug, Clone, Default)]
pub(crate) struct Cooldowns {
    pub last_scroll_at: Option<Duration>,
    pub last_zoom_at: Option<Duration>,
    pub last_scroll_end_at: Option<Duration>,
    pub last_right_click_at: Option<Duration>,
    pub last_two_finger_gesture_at: Option<Duration>,
    /// Scrolling blocks taps until `scroll_latch_release_at`.
    pub scroll_latched: bool,
    pub scroll_latch_release_at: Option<Duration>,
}

/// `[start, start + window)` membership. A missing start never blocks.
pub(crate) fn within(start: Option<Duration>, window: Duration, now: Duration) -> bool {
    start.is_some_and(|start| now.saturating_sub(start) < window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_closed_open() {
        let start = Some(Duration::from_millis(100));
        let window = Duration::from_millis(300);
        assert!(within(start, window, Duration::from_millis(100)));
        assert!(within(start, window, Duration::from_millis(399)));
        assert!(!within(start, window, Duration::from_millis(400)));
        assert!(!within(None, window, Duration::from_millis(100)));
    }

    #[test]
    fn only_two_contacts_recorded() {
        let mut state = TouchState::default();
        state.record_contacts(&[
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 3.0),
        ]);
        assert_eq!(state.contact_start[1], Point::new(2.0, 2.0));
        assert_eq!(state.contact_last.len(), TRACKED_CONTACTS);
    }
}

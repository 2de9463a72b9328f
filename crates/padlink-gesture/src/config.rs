//! Gesture and throttle tunables.
//!
//! Distances are in touch-surface pixels, times in milliseconds. The
//! defaults are the values the phone client ships with.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureConfigError {
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidDistance { name: &'static str, value: f64 },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

/// Classifier thresholds, timer lengths and cooldown windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Single-finger displacement above which the touch counts as moved.
    pub move_threshold: f64,
    /// Deltas below this in both axes are treated as sensor noise.
    pub minimum_movement: f64,
    /// Delay after a single-finger touch-start before a tap may click.
    pub click_delay_ms: u64,
    /// Hold time that promotes a still finger to a drag.
    pub long_press_ms: u64,
    /// Two-finger displacement that rules out a right-click.
    pub two_finger_move_threshold: f64,
    /// Per-finger vertical travel required to emit a scroll step.
    pub scroll_threshold: f64,
    /// Per-finger vertical co-movement that marks scroll intent without
    /// emitting.
    pub scroll_intent_threshold: f64,
    /// Minimum spacing between scroll steps.
    pub scroll_throttle_ms: u64,
    /// Pinch distance change required to emit a zoom step.
    pub zoom_threshold: f64,
    /// Pinch distance change that marks zoom intent without emitting.
    pub zoom_intent_threshold: f64,
    /// Minimum spacing between zoom steps.
    pub zoom_throttle_ms: u64,
    /// Divisor applied to the pinch distance change.
    pub zoom_scale: f64,
    /// Upper bound on an emitted zoom magnitude.
    pub max_zoom_magnitude: f64,
    /// Window after a scroll (resp. zoom) step in which zoom (resp. scroll)
    /// detection is skipped.
    pub arbitration_ms: u64,
    /// Window after a scroll ends in which taps do not click.
    pub scroll_cooldown_ms: u64,
    /// Window after a right-click in which taps do not click.
    pub right_click_cooldown_ms: u64,
    /// Window after any two-finger episode in which taps do not click.
    pub two_finger_click_suppression_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            move_threshold: 0.1,
            minimum_movement: 0.5,
            click_delay_ms: 50,
            long_press_ms: 500,
            two_finger_move_threshold: 5.0,
            scroll_threshold: 10.0,
            scroll_intent_threshold: 5.0,
            scroll_throttle_ms: 100,
            zoom_threshold: 5.0,
            zoom_intent_threshold: 2.0,
            zoom_throttle_ms: 120,
            zoom_scale: 5.0,
            max_zoom_magnitude: 10.0,
            arbitration_ms: 150,
            scroll_cooldown_ms: 300,
            right_click_cooldown_ms: 300,
            two_finger_click_suppression_ms: 200,
        }
    }
}

impl GestureConfig {
    /// Check that every distance is usable and divisors are non-zero.
    pub fn validate(&self) -> Result<(), GestureConfigError> {
        let distances = [
            ("move_threshold", self.move_threshold),
            ("minimum_movement", self.minimum_movement),
            ("two_finger_move_threshold", self.two_finger_move_threshold),
            ("scroll_threshold", self.scroll_threshold),
            ("scroll_intent_threshold", self.scroll_intent_threshold),
            ("zoom_threshold", self.zoom_threshold),
            ("zoom_intent_threshold", self.zoom_intent_threshold),
            ("zoom_scale", self.zoom_scale),
            ("max_zoom_magnitude", self.max_zoom_magnitude),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(GestureConfigError::InvalidDistance { name, value });
            }
        }
        if self.zoom_scale <= 0.0 {
            return Err(GestureConfigError::Zero { name: "zoom_scale" });
        }
        Ok(())
    }

    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    pub fn zoom_throttle(&self) -> Duration {
        Duration::from_millis(self.zoom_throttle_ms)
    }

    pub fn arbitration(&self) -> Duration {
        Duration::from_millis(self.arbitration_ms)
    }

    pub fn scroll_cooldown(&self) -> Duration {
        Duration::from_millis(self.scroll_cooldown_ms)
    }

    pub fn right_click_cooldown(&self) -> Duration {
        Duration::from_millis(self.right_click_cooldown_ms)
    }

    pub fn two_finger_click_suppression(&self) -> Duration {
        Duration::from_millis(self.two_finger_click_suppression_ms)
    }
}

/// What the dispatch throttle does with motion that arrives between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThrottleMode {
    /// Fold dropped deltas into the next forwarded intent.
    #[default]
    Accumulate,
    /// Discard dropped deltas.
    Drop,
}

/// Dispatch throttle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub mode: ThrottleMode,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            mode: ThrottleMode::default(),
        }
    }
}

impl ThrottleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_interval_ms() -> u64 {
    32
}

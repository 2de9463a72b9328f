//! Motion quantizer: single-finger deltas with a noise floor.

use padlink_types::Point;

/// Fractional digits kept on every emitted delta.
const PRECISION: f64 = 1000.0;

/// Round to three decimal places so threshold comparisons give the same
/// answer on every platform.
pub(crate) fn round3(value: f64) -> f64 {
    (value * PRECISION).round() / PRECISION
}

/// A filtered relative motion vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDelta {
    pub dx: f64,
    pub dy: f64,
}

impl MotionDelta {
    /// Whether either axis exceeds `threshold` in absolute value.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.dx.abs() > threshold || self.dy.abs() > threshold
    }
}

/// Turns successive positions of one finger into rounded deltas.
///
/// The anchor advances on every sample, including suppressed ones, so a
/// stream of sub-threshold jitter never builds up into a spurious jump.
#[derive(Debug, Clone)]
pub struct MotionQuantizer {
    minimum_movement: f64,
    anchor: Option<Point>,
}

impl MotionQuantizer {
    pub fn new(minimum_movement: f64) -> Self {
        Self {
            minimum_movement,
            anchor: None,
        }
    }

    /// Set the reference position without producing a delta.
    pub fn reset(&mut self, anchor: Point) {
        self.anchor = Some(anchor);
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Feed the next position. Returns `None` for the first sample after
    /// construction and for deltas below the noise floor in both axes.
    pub fn sample(&mut self, position: Point) -> Option<MotionDelta> {
        let previous = self.anchor.replace(position)?;
        let delta = MotionDelta {
            dx: round3(position.x - previous.x),
            dy: round3(position.y - previous.y),
        };
        if delta.dx.abs() < self.minimum_movement && delta.dy.abs() < self.minimum_movement {
            return None;
        }
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_rounded_delta() {
        let mut q = MotionQuantizer::new(0.5);
        q.reset(Point::new(10.0, 10.0));
        let delta = q.sample(Point::new(12.123_456, 9.0)).unwrap();
        assert!((delta.dx - 2.123).abs() < 1e-9);
        assert!((delta.dy + 1.0).abs() < 1e-9);
    }

    #[test]
    fn suppresses_jitter_in_both_axes() {
        let mut q = MotionQuantizer::new(0.5);
        q.reset(Point::new(100.0, 100.0));
        assert_eq!(q.sample(Point::new(100.05, 100.02)), None);
    }

    #[test]
    fn one_large_axis_is_enough() {
        let mut q = MotionQuantizer::new(0.5);
        q.reset(Point::new(0.0, 0.0));
        let delta = q.sample(Point::new(0.1, 0.6)).unwrap();
        assert!((delta.dx - 0.1).abs() < 1e-9);
        assert!((delta.dy - 0.6).abs() < 1e-9);
    }

    #[test]
    fn suppressed_samples_still_advance_anchor() {
        let mut q = MotionQuantizer::new(0.5);
        q.reset(Point::new(0.0, 0.0));
        // Two identical sub-threshold steps must not add up to an emission.
        assert_eq!(q.sample(Point::new(0.3, 0.0)), None);
        assert_eq!(q.anchor(), Some(Point::new(0.3, 0.0)));
        assert_eq!(q.sample(Point::new(0.6, 0.0)), None);
        assert_eq!(q.anchor(), Some(Point::new(0.6, 0.0)));
    }

    #[test]
    fn first_sample_only_anchors() {
        let mut q = MotionQuantizer::new(0.5);
        assert_eq!(q.sample(Point::new(5.0, 5.0)), None);
        assert!(q.sample(Point::new(8.0, 5.0)).is_some());
    }

    #[test]
    fn threshold_comparison_uses_rounded_value() {
        let mut q = MotionQuantizer::new(0.5);
        q.reset(Point::new(0.0, 0.0));
        // 0.4996 rounds to 0.5, which is not below the floor.
        let delta = q.sample(Point::new(0.4996, 0.0)).unwrap();
        assert!((delta.dx - 0.5).abs() < 1e-12);
    }
}

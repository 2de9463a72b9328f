//! Screen and touch-surface geometry.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Size of the desktop screen in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamp a fractional cursor target into `[0, width-1] × [0, height-1]`
    /// and round it to a pixel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn clamp(&self, x: f64, y: f64) -> CursorPosition {
        let right = f64::from(self.width.saturating_sub(1));
        let bottom = f64::from(self.height.saturating_sub(1));
        CursorPosition {
            x: x.clamp(0.0, right).round() as i32,
            y: y.clamp(0.0, bottom).round() as i32,
        }
    }

    /// Centre of the screen.
    #[must_use]
    pub fn center(&self) -> CursorPosition {
        CursorPosition {
            x: i32::try_from(self.width / 2).unwrap_or(i32::MAX),
            y: i32::try_from(self.height / 2).unwrap_or(i32::MAX),
        }
    }
}

/// Absolute cursor position on the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
}

/// Size of the phone's touch surface in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A contact position on the touch surface, relative to its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two contacts.
    #[must_use]
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_inside_bounds() {
        let screen = ScreenSize::new(1920, 1080);
        assert_eq!(screen.clamp(-40.0, 50.4), CursorPosition { x: 0, y: 50 });
        assert_eq!(
            screen.clamp(5000.0, 2000.0),
            CursorPosition { x: 1919, y: 1079 }
        );
        assert_eq!(screen.clamp(10.5, 10.49), CursorPosition { x: 11, y: 10 });
    }

    #[test]
    fn clamp_on_degenerate_screen() {
        let screen = ScreenSize::new(0, 0);
        assert_eq!(screen.clamp(12.0, -3.0), CursorPosition { x: 0, y: 0 });
    }

    #[test]
    fn center_of_screen() {
        assert_eq!(
            ScreenSize::new(2560, 1440).center(),
            CursorPosition { x: 1280, y: 720 }
        );
    }

    #[test]
    fn distance_between_contacts() {
        let a = Point::new(50.0, 50.0);
        let b = Point::new(150.0, 50.0);
        assert!((a.distance_to(b) - 100.0).abs() < f64::EPSILON);
        assert!((Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }
}

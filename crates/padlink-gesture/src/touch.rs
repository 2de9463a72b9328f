//! Raw touch input.

use padlink_types::Point;
use serde::{Deserialize, Serialize};

/// Which native touch callback produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

/// One native touch callback.
///
/// `contacts` lists every finger still on the surface after the callback,
/// in slot order, positioned relative to the touch surface. For
/// [`TouchPhase::End`] that is the fingers that remain, so an empty list
/// means the gesture episode is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub contacts: Vec<Point>,
}

impl TouchEvent {
    pub fn start(contacts: impl Into<Vec<Point>>) -> Self {
        Self {
            phase: TouchPhase::Start,
            contacts: contacts.into(),
        }
    }

    pub fn moved(contacts: impl Into<Vec<Point>>) -> Self {
        Self {
            phase: TouchPhase::Move,
            contacts: contacts.into(),
        }
    }

    pub fn end(remaining: impl Into<Vec<Point>>) -> Self {
        Self {
            phase: TouchPhase::End,
            contacts: remaining.into(),
        }
    }
}

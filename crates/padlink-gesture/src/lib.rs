//! Gesture interpretation for padlink.
//!
//! Turns raw multi-touch samples from the phone into disambiguated
//! [`Intent`](padlink_types::Intent)s: pointer motion, tap clicks,
//! long-press drags, two-finger scroll and pinch zoom.
//!
//! Everything here is synchronous and clock-free. Callers pass the current
//! session time (elapsed since the session started) into every entry point,
//! and ask [`GestureEngine::next_deadline`] when the next timer is due.
//! This keeps the classifier deterministic under test and lets the client
//! crate drive it from a single tokio task.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod quantizer;
mod state;
pub mod throttle;
pub mod touch;

pub use classifier::GestureClassifier;
pub use config::{GestureConfig, GestureConfigError, ThrottleConfig, ThrottleMode};
pub use engine::GestureEngine;
pub use quantizer::{MotionDelta, MotionQuantizer};
pub use throttle::DispatchThrottle;
pub use touch::{TouchEvent, TouchPhase};

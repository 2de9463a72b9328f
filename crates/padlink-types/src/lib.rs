//! Shared types for padlink.
//!
//! This crate contains all types shared across the padlink workspace:
//! the intent vocabulary sent from the phone to the desktop, wire
//! messages, screen and touch geometry, and client identity.

pub mod client;
pub mod intent;
pub mod media;
pub mod message;
pub mod screen;

pub use client::ClientId;
pub use intent::{ClickButton, Intent, ScrollDirection, ZoomDirection};
pub use media::{MediaCommand, ParseMediaCommandError};
pub use message::{Message, ProtocolVersion, PROTOCOL_VERSION};
pub use screen::{CursorPosition, Dimensions, Point, ScreenSize};

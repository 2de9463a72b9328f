//! Desktop side of padlink.
//!
//! Accepts phone connections over QUIC, turns their intents into native
//! input through the [`CommandRouter`], runs system commands for `media`
//! intents, and answers LAN health probes.

pub mod commands;
pub mod config;
pub mod error;
pub mod health;
pub mod router;
pub mod server;
pub mod setup;

pub use commands::{CommandRunner, Platform, RecordingRunner, SystemRunner};
pub use config::Config;
pub use error::ReceiverError;
pub use router::CommandRouter;
pub use server::{Receiver, ReceiverEvent, ReceiverStatus};

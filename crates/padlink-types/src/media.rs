//! System and media command keys.

use std::str::FromStr;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A system/media action the phone can request from the desktop.
///
/// The receiver maps each key to a per-platform command descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub enum MediaCommand {
    Shutdown,
    VolumeUp,
    VolumeDown,
    PlayPause,
    Mute,
    PrevTrack,
    NextTrack,
    Lock,
    Sleep,
    TaskManager,
    Copy,
    Paste,
    Undo,
    Redo,
    RocketLeague,
}

impl MediaCommand {
    /// Every command key, in table order.
    pub const ALL: [Self; 15] = [
        Self::Shutdown,
        Self::VolumeUp,
        Self::VolumeDown,
        Self::PlayPause,
        Self::Mute,
        Self::PrevTrack,
        Self::NextTrack,
        Self::Lock,
        Self::Sleep,
        Self::TaskManager,
        Self::Copy,
        Self::Paste,
        Self::Undo,
        Self::Redo,
        Self::RocketLeague,
    ];

    /// Canonical camelCase key.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::VolumeUp => "volumeUp",
            Self::VolumeDown => "volumeDown",
            Self::PlayPause => "playPause",
            Self::Mute => "mute",
            Self::PrevTrack => "prevTrack",
            Self::NextTrack => "nextTrack",
            Self::Lock => "lock",
            Self::Sleep => "sleep",
            Self::TaskManager => "taskManager",
            Self::Copy => "copy",
            Self::Paste => "paste",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::RocketLeague => "rocketLeague",
        }
    }
}

impl std::fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown media command: {0}")]
pub struct ParseMediaCommandError(pub String);

impl FromStr for MediaCommand {
    type Err = ParseMediaCommandError;

    /// Accepts the camelCase key (`volumeUp`) as well as the kebab-case
    /// button name the phone UI uses (`volume-up`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.key().to_ascii_lowercase() == folded)
            .ok_or_else(|| ParseMediaCommandError(s.to_string()))
    }
}

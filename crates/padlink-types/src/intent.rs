//! Intent vocabulary.
//!
//! An intent is a discrete, named high-level action derived from raw touch
//! input on the phone. Intents are the only thing that crosses the wire
//! after the handshake: relative motion, clicks, the drag bracket, scroll
//! and zoom steps, and short keyboard/media actions.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::media::MediaCommand;
use crate::screen::Dimensions;

/// A high-level action produced by the gesture classifier (or by the
/// phone's keyboard/media buttons) and consumed by the command router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(tag = "intent", content = "payload", rename_all = "camelCase")]
pub enum Intent {
    /// Client viewport size. Informational only.
    Dimensions(Dimensions),

    /// Relative pointer motion with no button held.
    Movement { dx: f64, dy: f64 },

    /// Relative pointer motion inside a `DragStart`/`DragEnd` bracket.
    Drag { dx: f64, dy: f64 },

    /// Press and hold the primary button.
    DragStart,

    /// Release the primary button.
    DragEnd,

    /// Single click.
    Click(ClickButton),

    /// One two-finger scroll step. `magnitude` is the average vertical
    /// finger travel in touch pixels.
    Scroll {
        direction: ScrollDirection,
        magnitude: f64,
    },

    /// The scrolling episode is over.
    ScrollEnd,

    /// One pinch step. `magnitude` is already scaled and capped.
    Zoom {
        direction: ZoomDirection,
        magnitude: f64,
    },

    /// A typed character or one of the named special keys
    /// (`backspace`, `enter`, `tab`, `delete`, `escape`).
    Keyboard { key: String },

    /// A system/media action looked up in the receiver's command table.
    Media(MediaCommand),
}

impl Intent {
    /// Wire name of the intent, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dimensions(_) => "dimensions",
            Self::Movement { .. } => "movement",
            Self::Drag { .. } => "drag",
            Self::DragStart => "dragStart",
            Self::DragEnd => "dragEnd",
            Self::Click(_) => "click",
            Self::Scroll { .. } => "scroll",
            Self::ScrollEnd => "scrollEnd",
            Self::Zoom { .. } => "zoom",
            Self::Keyboard { .. } => "keyboard",
            Self::Media(_) => "media",
        }
    }

    /// Whether this is a relative-motion intent (`movement` or `drag`).
    ///
    /// Motion intents may be rate-limited and coalesced; every other
    /// intent is discrete and must be delivered as-is.
    #[must_use]
    pub fn is_motion(&self) -> bool {
        matches!(self, Self::Movement { .. } | Self::Drag { .. })
    }

    /// Whether the payload is usable. Motion, scroll and zoom values must be
    /// finite and keyboard keys non-empty.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Movement { dx, dy } | Self::Drag { dx, dy } => dx.is_finite() && dy.is_finite(),
            Self::Scroll { magnitude, .. } | Self::Zoom { magnitude, .. } => {
                magnitude.is_finite() && *magnitude >= 0.0
            }
            Self::Keyboard { key } => !key.is_empty(),
            Self::Dimensions(_)
            | Self::DragStart
            | Self::DragEnd
            | Self::Click(_)
            | Self::ScrollEnd
            | Self::Media(_) => true,
        }
    }
}

/// Which button a click intent presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "lowercase")]
pub enum ClickButton {
    Left,
    Right,
}

impl std::fmt::Display for ClickButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Vertical scroll direction. `Up` means both fingers moved towards the
/// top of the touch surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl std::fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Pinch direction. `In` means the fingers moved apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

impl std::fmt::Display for ZoomDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

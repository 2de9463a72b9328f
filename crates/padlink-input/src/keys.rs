//! Keys, modifiers and buttons understood by every backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mouse buttons the receiver drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
}

impl From<padlink_types::ClickButton> for MouseButton {
    fn from(button: padlink_types::ClickButton) -> Self {
        match button {
            padlink_types::ClickButton::Left => Self::Left,
            padlink_types::ClickButton::Right => Self::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Keys addressed by name rather than by the character they type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedKey {
    Backspace,
    Enter,
    Tab,
    Delete,
    Escape,
    /// The `=`/`+` key.
    Plus,
    Minus,
}

impl NamedKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backspace => "backspace",
            Self::Enter => "enter",
            Self::Tab => "tab",
            Self::Delete => "delete",
            Self::Escape => "escape",
            Self::Plus => "plus",
            Self::Minus => "minus",
        }
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a special key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a special key: {0:?}")]
pub struct NotSpecialKey(pub String);

impl FromStr for NamedKey {
    type Err = NotSpecialKey;

    /// Only the keys a phone keyboard sends by name are recognised, in any
    /// letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backspace" => Ok(Self::Backspace),
            "enter" => Ok(Self::Enter),
            "tab" => Ok(Self::Tab),
            "delete" => Ok(Self::Delete),
            "escape" => Ok(Self::Escape),
            _ => Err(NotSpecialKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Control,
    Shift,
    Alt,
    /// Command on macOS, Super elsewhere.
    Meta,
}

/// The non-modifier part of a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Named(NamedKey),
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(key) => key.fmt(f),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_keys_parse_case_insensitively() {
        assert_eq!("Enter".parse::<NamedKey>(), Ok(NamedKey::Enter));
        assert_eq!("BACKSPACE".parse::<NamedKey>(), Ok(NamedKey::Backspace));
        assert_eq!("escape".parse::<NamedKey>(), Ok(NamedKey::Escape));
    }

    #[test]
    fn characters_and_zoom_keys_are_not_special() {
        assert!("a".parse::<NamedKey>().is_err());
        assert!("plus".parse::<NamedKey>().is_err());
        assert!("".parse::<NamedKey>().is_err());
    }

    #[test]
    fn key_display() {
        assert_eq!(Key::Named(NamedKey::Tab).to_string(), "tab");
        assert_eq!(Key::Char('c').to_string(), "c");
    }
}

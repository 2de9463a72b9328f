//! Mapping from padlink keys to evdev codes (US layout).

use evdev::KeyCode as EvdevKey;

use crate::keys::{ButtonState, Modifier, MouseButton, NamedKey};

/// A key plus whether Shift must be held to produce the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub key: EvdevKey,
    pub shift: bool,
}

impl Stroke {
    pub const fn plain(key: EvdevKey) -> Self {
        Self { key, shift: false }
    }

    pub const fn shifted(key: EvdevKey) -> Self {
        Self { key, shift: true }
    }
}

pub fn named_key(key: NamedKey) -> EvdevKey {
    match key {
        NamedKey::Backspace => EvdevKey::KEY_BACKSPACE,
        NamedKey::Enter => EvdevKey::KEY_ENTER,
        NamedKey::Tab => EvdevKey::KEY_TAB,
        NamedKey::Delete => EvdevKey::KEY_DELETE,
        NamedKey::Escape => EvdevKey::KEY_ESC,
        NamedKey::Plus => EvdevKey::KEY_EQUAL,
        NamedKey::Minus => EvdevKey::KEY_MINUS,
    }
}

pub fn modifier(modifier: Modifier) -> EvdevKey {
    match modifier {
        Modifier::Control => EvdevKey::KEY_LEFTCTRL,
        Modifier::Shift => EvdevKey::KEY_LEFTSHIFT,
        Modifier::Alt => EvdevKey::KEY_LEFTALT,
        Modifier::Meta => EvdevKey::KEY_LEFTMETA,
    }
}

pub fn mouse_button(button: MouseButton) -> EvdevKey {
    match button {
        MouseButton::Left => EvdevKey::BTN_LEFT,
        MouseButton::Right => EvdevKey::BTN_RIGHT,
    }
}

pub fn button_value(state: ButtonState) -> i32 {
    match state {
        ButtonState::Pressed => 1,
        ButtonState::Released => 0,
    }
}

const LETTERS: [EvdevKey; 26] = [
    EvdevKey::KEY_A,
    EvdevKey::KEY_B,
    EvdevKey::KEY_C,
    EvdevKey::KEY_D,
    EvdevKey::KEY_E,
    EvdevKey::KEY_F,
    EvdevKey::KEY_G,
    EvdevKey::KEY_H,
    EvdevKey::KEY_I,
    EvdevKey::KEY_J,
    EvdevKey::KEY_K,
    EvdevKey::KEY_L,
    EvdevKey::KEY_M,
    EvdevKey::KEY_N,
    EvdevKey::KEY_O,
    EvdevKey::KEY_P,
    EvdevKey::KEY_Q,
    EvdevKey::KEY_R,
    EvdevKey::KEY_S,
    EvdevKey::KEY_T,
    EvdevKey::KEY_U,
    EvdevKey::KEY_V,
    EvdevKey::KEY_W,
    EvdevKey::KEY_X,
    EvdevKey::KEY_Y,
    EvdevKey::KEY_Z,
];

/// Digit row, `0` first.
const DIGITS: [EvdevKey; 10] = [
    EvdevKey::KEY_0,
    EvdevKey::KEY_1,
    EvdevKey::KEY_2,
    EvdevKey::KEY_3,
    EvdevKey::KEY_4,
    EvdevKey::KEY_5,
    EvdevKey::KEY_6,
    EvdevKey::KEY_7,
    EvdevKey::KEY_8,
    EvdevKey::KEY_9,
];

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGIT_CHARS: &str = "0123456789";
/// Shifted digit row symbols, `)` (over `0`) first.
const DIGIT_SYMBOLS: &str = ")!@#$%^&*(";

/// The stroke that types `c`, if the US layout has one.
pub fn char_stroke(c: char) -> Option<Stroke> {
    if let Some(i) = LOWERCASE.find(c) {
        return Some(Stroke::plain(LETTERS[i]));
    }
    if c.is_ascii_uppercase() {
        return LOWERCASE
            .find(c.to_ascii_lowercase())
            .map(|i| Stroke::shifted(LETTERS[i]));
    }
    if let Some(i) = DIGIT_CHARS.find(c) {
        return Some(Stroke::plain(DIGITS[i]));
    }
    if let Some(i) = DIGIT_SYMBOLS.find(c) {
        return Some(Stroke::shifted(DIGITS[i]));
    }
    let stroke = match c {
        ' ' => Stroke::plain(EvdevKey::KEY_SPACE),
        '\n' => Stroke::plain(EvdevKey::KEY_ENTER),
        '\t' => Stroke::plain(EvdevKey::KEY_TAB),
        '-' => Stroke::plain(EvdevKey::KEY_MINUS),
        '_' => Stroke::shifted(EvdevKey::KEY_MINUS),
        '=' => Stroke::plain(EvdevKey::KEY_EQUAL),
        '+' => Stroke::shifted(EvdevKey::KEY_EQUAL),
        '[' => Stroke::plain(EvdevKey::KEY_LEFTBRACE),
        '{' => Stroke::shifted(EvdevKey::KEY_LEFTBRACE),
        ']' => Stroke::plain(EvdevKey::KEY_RIGHTBRACE),
        '}' => Stroke::shifted(EvdevKey::KEY_RIGHTBRACE),
        '\\' => Stroke::plain(EvdevKey::KEY_BACKSLASH),
        '|' => Stroke::shifted(EvdevKey::KEY_BACKSLASH),
        ';' => Stroke::plain(EvdevKey::KEY_SEMICOLON),
        ':' => Stroke::shifted(EvdevKey::KEY_SEMICOLON),
        '\'' => Stroke::plain(EvdevKey::KEY_APOSTROPHE),
        '"' => Stroke::shifted(EvdevKey::KEY_APOSTROPHE),
        '`' => Stroke::plain(EvdevKey::KEY_GRAVE),
        '~' => Stroke::shifted(EvdevKey::KEY_GRAVE),
        ',' => Stroke::plain(EvdevKey::KEY_COMMA),
        '<' => Stroke::shifted(EvdevKey::KEY_COMMA),
        '.' => Stroke::plain(EvdevKey::KEY_DOT),
        '>' => Stroke::shifted(EvdevKey::KEY_DOT),
        '/' => Stroke::plain(EvdevKey::KEY_SLASH),
        '?' => Stroke::shifted(EvdevKey::KEY_SLASH),
        _ => return None,
    };
    Some(stroke)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_case() {
        assert_eq!(char_stroke('a'), Some(Stroke::plain(EvdevKey::KEY_A)));
        assert_eq!(char_stroke('Z'), Some(Stroke::shifted(EvdevKey::KEY_Z)));
    }

    #[test]
    fn digits_and_their_symbols() {
        assert_eq!(char_stroke('0'), Some(Stroke::plain(EvdevKey::KEY_0)));
        assert_eq!(char_stroke('7'), Some(Stroke::plain(EvdevKey::KEY_7)));
        assert_eq!(char_stroke('!'), Some(Stroke::shifted(EvdevKey::KEY_1)));
        assert_eq!(char_stroke(')'), Some(Stroke::shifted(EvdevKey::KEY_0)));
        assert_eq!(char_stroke('@'), Some(Stroke::shifted(EvdevKey::KEY_2)));
    }

    #[test]
    fn punctuation() {
        assert_eq!(char_stroke('?'), Some(Stroke::shifted(EvdevKey::KEY_SLASH)));
        assert_eq!(char_stroke(' '), Some(Stroke::plain(EvdevKey::KEY_SPACE)));
        assert_eq!(char_stroke('+'), Some(Stroke::shifted(EvdevKey::KEY_EQUAL)));
    }

    #[test]
    fn non_ascii_has_no_stroke() {
        assert_eq!(char_stroke('\u{f1}'), None);
        assert_eq!(char_stroke('\u{20ac}'), None);
    }

    #[test]
    fn zoom_keys_share_the_digit_row() {
        assert_eq!(named_key(NamedKey::Plus), EvdevKey::KEY_EQUAL);
        assert_eq!(named_key(NamedKey::Minus), EvdevKey::KEY_MINUS);
        assert_eq!(modifier(Modifier::Control), EvdevKey::KEY_LEFTCTRL);
        assert_eq!(mouse_button(MouseButton::Right), EvdevKey::BTN_RIGHT);
        assert_eq!(button_value(ButtonState::Pressed), 1);
    }
}

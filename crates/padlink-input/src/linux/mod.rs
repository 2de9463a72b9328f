//! uinput backend for Linux.
//!
//! One virtual device carries the pointer, the wheel and a keyboard. uinput
//! pointers are relative, so the backend keeps its own estimate of the
//! cursor position (starting at the screen centre) and emits the difference
//! on every absolute move. Moving the physical mouse makes the estimate
//! drift until the next clamp at a screen edge.

pub mod keymap;

use std::collections::HashSet;

use async_trait::async_trait;
use evdev::uinput::VirtualDevice;
use evdev::{AttributeSet, EventType, InputEvent, KeyCode as EvdevKey, RelativeAxisCode};
use padlink_types::{CursorPosition, ScreenSize};
use tracing::{debug, info, warn};

use crate::error::InputError;
use crate::keys::{ButtonState, Key, Modifier, MouseButton, NamedKey};
use crate::InputBackend;

use self::keymap::Stroke;

/// Highest ordinary keyboard code registered on the virtual device.
const MAX_KEY_CODE: u16 = 248;

pub struct UinputBackend {
    device: VirtualDevice,
    screen: ScreenSize,
    cursor: CursorPosition,
    held: HashSet<MouseButton>,
}

impl UinputBackend {
    /// Create the virtual device. `screen` bounds the tracked cursor.
    pub fn new(name: &str, screen: ScreenSize) -> Result<Self, InputError> {
        let mut keys = AttributeSet::<EvdevKey>::new();
        for code in 1..=MAX_KEY_CODE {
            keys.insert(EvdevKey(code));
        }
        keys.insert(EvdevKey::BTN_LEFT);
        keys.insert(EvdevKey::BTN_RIGHT);

        let mut axes = AttributeSet::<RelativeAxisCode>::new();
        axes.insert(RelativeAxisCode::REL_X);
        axes.insert(RelativeAxisCode::REL_Y);
        axes.insert(RelativeAxisCode::REL_WHEEL);

        let device = VirtualDevice::builder()
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?
            .name(name)
            .with_keys(&keys)
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?
            .with_relative_axes(&axes)
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?
            .build()
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?;

        info!(name, width = screen.width, height = screen.height, "created uinput device");
        Ok(Self {
            device,
            screen,
            cursor: screen.center(),
            held: HashSet::new(),
        })
    }

    fn emit(&mut self, events: &[InputEvent]) -> Result<(), InputError> {
        if events.is_empty() {
            return Ok(());
        }
        self.device
            .emit(events)
            .map_err(|e| InputError::Inject(e.to_string()))
    }
}

fn key_event(key: EvdevKey, value: i32) -> InputEvent {
    InputEvent::new(EventType::KEY.0, key.0, value)
}

fn rel_event(axis: RelativeAxisCode, value: i32) -> InputEvent {
    InputEvent::new(EventType::RELATIVE.0, axis.0, value)
}

/// Press and release `stroke`, wrapped in Shift when it needs it.
fn push_stroke(events: &mut Vec<InputEvent>, stroke: Stroke) {
    if stroke.shift {
        events.push(key_event(EvdevKey::KEY_LEFTSHIFT, 1));
    }
    events.push(key_event(stroke.key, 1));
    events.push(key_event(stroke.key, 0));
    if stroke.shift {
        events.push(key_event(EvdevKey::KEY_LEFTSHIFT, 0));
    }
}

#[async_trait]
impl InputBackend for UinputBackend {
    async fn screen_size(&mut self) -> Result<ScreenSize, InputError> {
        Ok(self.screen)
    }

    async fn cursor_position(&mut self) -> Result<CursorPosition, InputError> {
        Ok(self.cursor)
    }

    async fn move_cursor(&mut self, to: CursorPosition) -> Result<(), InputError> {
        let dx = to.x - self.cursor.x;
        let dy = to.y - self.cursor.y;
        let mut events = Vec::with_capacity(2);
        if dx != 0 {
            events.push(rel_event(RelativeAxisCode::REL_X, dx));
        }
        if dy != 0 {
            events.push(rel_event(RelativeAxisCode::REL_Y, dy));
        }
        self.emit(&events)?;
        self.cursor = to;
        Ok(())
    }

    async fn button(&mut self, button: MouseButton, state: ButtonState) -> Result<(), InputError> {
        self.emit(&[key_event(
            keymap::mouse_button(button),
            keymap::button_value(state),
        )])?;
        match state {
            ButtonState::Pressed => self.held.insert(button),
            ButtonState::Released => self.held.remove(&button),
        };
        Ok(())
    }

    async fn scroll(&mut self, amount: i32) -> Result<(), InputError> {
        self.emit(&[rel_event(RelativeAxisCode::REL_WHEEL, amount)])
    }

    async fn tap_key(&mut self, key: NamedKey) -> Result<(), InputError> {
        let mut events = Vec::with_capacity(2);
        push_stroke(&mut events, Stroke::plain(keymap::named_key(key)));
        self.emit(&events)
    }

    async fn type_text(&mut self, text: &str) -> Result<(), InputError> {
        let mut events = Vec::with_capacity(text.len() * 4);
        for c in text.chars() {
            let stroke = keymap::char_stroke(c).ok_or(InputError::UnsupportedChar(c))?;
            push_stroke(&mut events, stroke);
        }
        self.emit(&events)
    }

    async fn shortcut(&mut self, modifiers: &[Modifier], key: Key) -> Result<(), InputError> {
        let stroke = match key {
            Key::Named(named) => Stroke::plain(keymap::named_key(named)),
            Key::Char(c) => keymap::char_stroke(c).ok_or(InputError::UnsupportedChar(c))?,
        };
        let mut events = Vec::with_capacity(modifiers.len() * 2 + 4);
        for m in modifiers {
            events.push(key_event(keymap::modifier(*m), 1));
        }
        push_stroke(&mut events, stroke);
        for m in modifiers.iter().rev() {
            events.push(key_event(keymap::modifier(*m), 0));
        }
        debug!(?modifiers, %key, "shortcut");
        self.emit(&events)
    }

    async fn shutdown(&mut self) -> Result<(), InputError> {
        let held: Vec<MouseButton> = self.held.drain().collect();
        for button in held {
            warn!(?button, "releasing button held at shutdown");
            self.emit(&[key_event(keymap::mouse_button(button), 0)])?;
        }
        info!("uinput backend shut down");
        Ok(())
    }
}

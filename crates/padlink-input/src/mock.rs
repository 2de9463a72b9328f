//! Recording input backend for tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use padlink_types::{CursorPosition, ScreenSize};

use crate::error::InputError;
use crate::keys::{ButtonState, Key, Modifier, MouseButton, NamedKey};
use crate::InputBackend;

/// One native call, as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCall {
    MoveCursor(CursorPosition),
    Button {
        button: MouseButton,
        state: ButtonState,
    },
    Scroll(i32),
    TapKey(NamedKey),
    TypeText(String),
    Shortcut {
        modifiers: Vec<Modifier>,
        key: Key,
    },
}

#[derive(Debug)]
struct MockInputState {
    screen: ScreenSize,
    cursor: CursorPosition,
    pressed: HashSet<MouseButton>,
    calls: Vec<InputCall>,
    failing: bool,
    shutdown: bool,
}

fn lock(state: &Mutex<MockInputState>) -> MutexGuard<'_, MockInputState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory backend. The cursor starts at the centre of the screen.
pub struct MockInput {
    state: Arc<Mutex<MockInputState>>,
}

impl MockInput {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockInputState {
                screen,
                cursor: screen.center(),
                pressed: HashSet::new(),
                calls: Vec::new(),
                failing: false,
                shutdown: false,
            })),
        }
    }

    /// Clonable observer for the backend's state.
    pub fn handle(&self) -> MockInputHandle {
        MockInputHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn record(&self, call: InputCall) -> Result<(), InputError> {
        let mut state = lock(&self.state);
        if state.failing {
            return Err(InputError::Inject(format!("mock failure on {call:?}")));
        }
        match &call {
            InputCall::MoveCursor(to) => state.cursor = *to,
            InputCall::Button {
                button,
                state: ButtonState::Pressed,
            } => {
                state.pressed.insert(*button);
            }
            InputCall::Button {
                button,
                state: ButtonState::Released,
            } => {
                state.pressed.remove(button);
            }
            _ => {}
        }
        state.calls.push(call);
        Ok(())
    }
}

/// Lets tests inspect and steer a [`MockInput`] after it has been moved
/// into the receiver.
#[derive(Clone)]
pub struct MockInputHandle {
    state: Arc<Mutex<MockInputState>>,
}

impl MockInputHandle {
    pub fn calls(&self) -> Vec<InputCall> {
        lock(&self.state).calls.clone()
    }

    /// Remove and return the calls recorded so far.
    pub fn take_calls(&self) -> Vec<InputCall> {
        std::mem::take(&mut lock(&self.state).calls)
    }

    pub fn cursor(&self) -> CursorPosition {
        lock(&self.state).cursor
    }

    pub fn set_cursor(&self, to: CursorPosition) {
        lock(&self.state).cursor = to;
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        lock(&self.state).pressed.contains(&button)
    }

    /// Make every following call fail until reset.
    pub fn set_failing(&self, failing: bool) {
        lock(&self.state).failing = failing;
    }

    pub fn is_shutdown(&self) -> bool {
        lock(&self.state).shutdown
    }
}

#[async_trait]
impl InputBackend for MockInput {
    async fn screen_size(&mut self) -> Result<ScreenSize, InputError> {
        Ok(lock(&self.state).screen)
    }

    async fn cursor_position(&mut self) -> Result<CursorPosition, InputError> {
        Ok(lock(&self.state).cursor)
    }

    async fn move_cursor(&mut self, to: CursorPosition) -> Result<(), InputError> {
        self.record(InputCall::MoveCursor(to))
    }

    async fn button(&mut self, button: MouseButton, state: ButtonState) -> Result<(), InputError> {
        self.record(InputCall::Button { button, state })
    }

    async fn scroll(&mut self, amount: i32) -> Result<(), InputError> {
        self.record(InputCall::Scroll(amount))
    }

    async fn tap_key(&mut self, key: NamedKey) -> Result<(), InputError> {
        self.record(InputCall::TapKey(key))
    }

    async fn type_text(&mut self, text: &str) -> Result<(), InputError> {
        self.record(InputCall::TypeText(text.to_string()))
    }

    async fn shortcut(&mut self, modifiers: &[Modifier], key: Key) -> Result<(), InputError> {
        self.record(InputCall::Shortcut {
            modifiers: modifiers.to_vec(),
            key,
        })
    }

    async fn shutdown(&mut self) -> Result<(), InputError> {
        let mut state = lock(&self.state);
        state.pressed.clear();
        state.shutdown = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn click_presses_then_releases() {
        let mut input = MockInput::new(ScreenSize::new(800, 600));
        let handle = input.handle();
        input.click(MouseButton::Right).await.unwrap();
        assert_eq!(
            handle.calls(),
            vec![
                InputCall::Button {
                    button: MouseButton::Right,
                    state: ButtonState::Pressed
                },
                InputCall::Button {
                    button: MouseButton::Right,
                    state: ButtonState::Released
                },
            ]
        );
        assert!(!handle.is_pressed(MouseButton::Right));
    }

    #[tokio::test]
    async fn tracks_cursor_and_held_buttons() {
        let mut input = MockInput::new(ScreenSize::new(800, 600));
        let handle = input.handle();
        assert_eq!(input.cursor_position().await.unwrap(), CursorPosition { x: 400, y: 300 });

        input.move_cursor(CursorPosition { x: 10, y: 20 }).await.unwrap();
        input
            .button(MouseButton::Left, ButtonState::Pressed)
            .await
            .unwrap();
        assert_eq!(handle.cursor(), CursorPosition { x: 10, y: 20 });
        assert!(handle.is_pressed(MouseButton::Left));

        input.shutdown().await.unwrap();
        assert!(!handle.is_pressed(MouseButton::Left));
        assert!(handle.is_shutdown());
    }

    #[tokio::test]
    async fn failing_mode_rejects_calls() {
        let mut input = MockInput::new(ScreenSize::new(800, 600));
        let handle = input.handle();
        handle.set_failing(true);
        assert!(input.scroll(3).await.is_err());
        assert!(handle.calls().is_empty());

        handle.set_failing(false);
        input.scroll(3).await.unwrap();
        assert_eq!(handle.take_calls(), vec![InputCall::Scroll(3)]);
        assert!(handle.calls().is_empty());
    }
}

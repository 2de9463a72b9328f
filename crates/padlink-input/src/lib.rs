//! Native input injection for the padlink receiver.
//!
//! The receiver turns intents into calls on an [`InputBackend`]: absolute
//! cursor moves, button presses, wheel steps and key strokes. Backends are
//! selected by feature:
//!
//! - `linux`: a uinput virtual device (evdev)
//! - `mock`: an in-memory recorder for tests

use async_trait::async_trait;
use padlink_types::{CursorPosition, ScreenSize};

pub mod error;
pub mod keys;

#[cfg(all(target_os = "linux", feature = "linux"))]
pub mod linux;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::InputError;
pub use keys::{ButtonState, Key, Modifier, MouseButton, NamedKey, NotSpecialKey};

/// Operations the receiver needs from the host's input system.
#[async_trait]
pub trait InputBackend: Send + 'static {
    /// Size of the screen the cursor moves on.
    async fn screen_size(&mut self) -> Result<ScreenSize, InputError>;

    async fn cursor_position(&mut self) -> Result<CursorPosition, InputError>;

    /// Move the cursor to an absolute, already clamped, position.
    async fn move_cursor(&mut self, to: CursorPosition) -> Result<(), InputError>;

    async fn button(&mut self, button: MouseButton, state: ButtonState) -> Result<(), InputError>;

    async fn click(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.button(button, ButtonState::Pressed).await?;
        self.button(button, ButtonState::Released).await
    }

    /// Turn the wheel by `amount` notches; positive scrolls up.
    async fn scroll(&mut self, amount: i32) -> Result<(), InputError>;

    async fn tap_key(&mut self, key: NamedKey) -> Result<(), InputError>;

    /// Type `text` as if entered on a keyboard.
    async fn type_text(&mut self, text: &str) -> Result<(), InputError>;

    /// Hold `modifiers`, tap `key`, release the modifiers in reverse order.
    async fn shortcut(&mut self, modifiers: &[Modifier], key: Key) -> Result<(), InputError>;

    /// Release everything held and tear down native resources.
    async fn shutdown(&mut self) -> Result<(), InputError>;
}

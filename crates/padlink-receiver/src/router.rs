//! Command router: turns intents into native input calls.
//!
//! Motion is not applied as it arrives. `movement` and `drag` deltas are
//! summed and drained by [`CommandRouter::tick`], which turns the sum into
//! one absolute cursor move. Everything else maps to a single backend call
//! or a system command. Failures are logged here and never reach the phone.

use std::sync::Arc;

use padlink_input::{ButtonState, InputBackend, Key, MouseButton, NamedKey};
use padlink_types::{
    ClickButton, CursorPosition, Intent, MediaCommand, ScreenSize, ScrollDirection, ZoomDirection,
};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::commands::{self, Action, CommandRunner, Platform, Resolved};
use crate::config::PointerConfig;

/// Wheel notches for a scroll step: half the finger travel, at least one.
#[allow(clippy::cast_possible_truncation)]
pub fn scroll_amount(direction: ScrollDirection, magnitude: f64) -> i32 {
    let notches = (magnitude / 2.0).round().clamp(1.0, f64::from(i32::MAX)) as i32;
    match direction {
        ScrollDirection::Up => notches,
        ScrollDirection::Down => -notches,
    }
}

pub struct CommandRouter {
    backend: Box<dyn InputBackend>,
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
    screen: ScreenSize,
    sensitivity: f64,
    drag_sensitivity: f64,
    is_dragging: bool,
    /// Motion summed since the last tick.
    pending: Option<(f64, f64)>,
    commands: JoinSet<()>,
}

impl CommandRouter {
    pub fn new(
        backend: Box<dyn InputBackend>,
        runner: Arc<dyn CommandRunner>,
        platform: Platform,
        screen: ScreenSize,
        pointer: &PointerConfig,
    ) -> Self {
        Self {
            backend,
            runner,
            platform,
            screen,
            sensitivity: pointer.sensitivity,
            drag_sensitivity: pointer.drag_sensitivity,
            is_dragging: false,
            pending: None,
            commands: JoinSet::new(),
        }
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// Motion received since the last tick.
    pub fn pending_motion(&self) -> (f64, f64) {
        self.pending.unwrap_or((0.0, 0.0))
    }

    /// Apply one intent.
    pub async fn handle(&mut self, intent: Intent) {
        if !intent.is_well_formed() {
            debug!(intent = intent.name(), ?intent, "ignoring malformed intent");
            return;
        }

        match intent {
            Intent::Dimensions(dims) => {
                debug!(width = dims.width, height = dims.height, "client dimensions");
            }
            Intent::Movement { dx, dy } | Intent::Drag { dx, dy } => {
                debug!(dx, dy, dragging = self.is_dragging, "motion");
                let (x, y) = self.pending.get_or_insert((0.0, 0.0));
                *x += dx;
                *y += dy;
            }
            Intent::DragStart => self.drag_start().await,
            Intent::DragEnd => self.drag_end().await,
            Intent::Click(button) => self.click(button).await,
            Intent::Scroll {
                direction,
                magnitude,
            } => {
                let amount = scroll_amount(direction, magnitude);
                debug!(%direction, magnitude, amount, "scroll");
                if let Err(e) = self.backend.scroll(amount).await {
                    warn!(error = %e, amount, "failed to scroll");
                }
            }
            Intent::ScrollEnd => debug!("scroll ended"),
            Intent::Zoom { direction, .. } => self.zoom(direction).await,
            Intent::Keyboard { key } => self.keyboard(&key).await,
            Intent::Media(command) => self.media(command).await,
        }
    }

    /// Turn the motion collected since the last tick into one cursor move.
    pub async fn tick(&mut self) {
        let Some((dx, dy)) = self.pending.take() else {
            self.reap_commands();
            return;
        };

        let from = match self.backend.cursor_position().await {
            Ok(pos) => pos,
            Err(e) => {
                warn!(error = %e, "failed to read cursor position");
                return;
            }
        };
        let to = self.ballistics(from, dx, dy);
        if to != from {
            if let Err(e) = self.backend.move_cursor(to).await {
                warn!(error = %e, x = to.x, y = to.y, "failed to move cursor");
            }
        }
    }

    fn ballistics(&self, from: CursorPosition, dx: f64, dy: f64) -> CursorPosition {
        let gain = if self.is_dragging {
            self.drag_sensitivity
        } else {
            self.sensitivity
        };
        self.screen.clamp(
            f64::from(from.x) + dx * gain,
            f64::from(from.y) + dy * gain,
        )
    }

    /// Drop any held button. Used when the phone that held it goes away.
    pub async fn release(&mut self, reason: &str) {
        if !self.is_dragging {
            return;
        }
        self.tick().await;
        self.is_dragging = false;
        info!(reason, "releasing held button");
        if let Err(e) = self
            .backend
            .button(MouseButton::Left, ButtonState::Released)
            .await
        {
            warn!(error = %e, "failed to release button");
        }
    }

    /// Wait for every system command still running.
    pub async fn wait_for_commands(&mut self) {
        while self.commands.join_next().await.is_some() {}
    }

    /// Release held input and tear the backend down. Running system
    /// commands are left to finish on their own.
    pub async fn shutdown(&mut self) {
        self.release("shutdown").await;
        self.commands.detach_all();
        if let Err(e) = self.backend.shutdown().await {
            warn!(error = %e, "failed to shut down input backend");
        }
    }

    fn reap_commands(&mut self) {
        while self.commands.try_join_next().is_some() {}
    }

    async fn drag_start(&mut self) {
        // Land the press where the cursor should be.
        self.tick().await;
        if self.is_dragging {
            debug!("drag already in progress");
            return;
        }
        self.is_dragging = true;
        info!("drag started");
        if let Err(e) = self
            .backend
            .button(MouseButton::Left, ButtonState::Pressed)
            .await
        {
            warn!(error = %e, "failed to press button");
        }
    }

    async fn drag_end(&mut self) {
        self.tick().await;
        if !self.is_dragging {
            debug!("drag end without drag start");
            return;
        }
        self.is_dragging = false;
        info!("drag ended");
        if let Err(e) = self
            .backend
            .button(MouseButton::Left, ButtonState::Released)
            .await
        {
            warn!(error = %e, "failed to release button");
        }
    }

    async fn click(&mut self, button: ClickButton) {
        self.tick().await;
        info!(%button, "click");
        if let Err(e) = self.backend.click(button.into()).await {
            warn!(error = %e, %button, "failed to click");
        }
    }

    async fn zoom(&mut self, direction: ZoomDirection) {
        let key = match direction {
            ZoomDirection::In => NamedKey::Plus,
            ZoomDirection::Out => NamedKey::Minus,
        };
        debug!(%direction, "zoom");
        if let Err(e) = self
            .backend
            .shortcut(&[self.platform.primary_modifier()], Key::Named(key))
            .await
        {
            warn!(error = %e, %direction, "failed to zoom");
        }
    }

    async fn keyboard(&mut self, key: &str) {
        let result = match key.parse::<NamedKey>() {
            Ok(named) => {
                debug!(key = %named, "special key");
                self.backend.tap_key(named).await
            }
            Err(_) => {
                debug!(text = key, "typed text");
                self.backend.type_text(key).await
            }
        };
        if let Err(e) = result {
            warn!(error = %e, key, "failed to send key");
        }
    }

    async fn media(&mut self, command: MediaCommand) {
        let cmd = match commands::resolve(command, self.platform) {
            Resolved::Run(cmd) => cmd,
            Resolved::Unsupported => {
                info!(%command, platform = %self.platform, "command not supported on this platform");
                return;
            }
        };
        match cmd.action {
            Action::Shortcut { modifiers, key } => {
                match self.backend.shortcut(&modifiers, key).await {
                    Ok(()) => info!(%command, "{}", cmd.success),
                    Err(e) => warn!(%command, error = %e, "{}", cmd.error),
                }
            }
            Action::Process(process) => {
                info!(%command, "running system command");
                let runner = Arc::clone(&self.runner);
                self.commands.spawn(async move {
                    commands::execute(runner.as_ref(), command, &process, cmd.success, cmd.error).await;
                });
            }
        }
    }
}

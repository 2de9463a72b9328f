//! System command table for `media` intents.
//!
//! Every [`MediaCommand`] resolves, per [`Platform`], to either a
//! keyboard shortcut injected through the input backend or a process run
//! through a [`CommandRunner`]. Commands with no entry for the current
//! platform resolve to [`Resolved::Unsupported`].

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use padlink_input::{Key, Modifier, NamedKey};
use padlink_types::MediaCommand;
use tracing::{debug, info, warn};

use crate::error::ReceiverError;

/// Host operating system family, named the way the command table keys it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    /// Linux and every other Unix.
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "win32",
            Self::MacOs => "darwin",
            Self::Linux => "linux",
        }
    }

    /// The modifier that drives editing shortcuts.
    pub(crate) fn primary_modifier(self) -> Modifier {
        match self {
            Self::MacOs => Modifier::Meta,
            Self::Windows | Self::Linux => Modifier::Control,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A process to run for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Process {
    Shell(&'static [&'static str]),
    /// Run `check`; if its output does not mention `process`, run `launch`.
    LaunchUnlessRunning {
        check: &'static [&'static str],
        process: &'static str,
        launch: &'static [&'static str],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shortcut {
        modifiers: Vec<Modifier>,
        key: Key,
    },
    Process(Process),
}

/// A table entry resolved for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemCommand {
    pub key: MediaCommand,
    pub action: Action,
    /// Logged after the action succeeds.
    pub success: &'static str,
    /// Logged next to the failure cause.
    pub error: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Run(SystemCommand),
    Unsupported,
}

fn messages(command: MediaCommand) -> (&'static str, &'static str) {
    match command {
        MediaCommand::Shutdown => ("Shutting down", "Failed to shut down"),
        MediaCommand::VolumeUp => ("Volume increased", "Failed to increase volume"),
        MediaCommand::VolumeDown => ("Volume decreased", "Failed to decrease volume"),
        MediaCommand::PlayPause => ("Toggled playback", "Failed to toggle playback"),
        MediaCommand::Mute => ("Toggled mute", "Failed to toggle mute"),
        MediaCommand::PrevTrack => ("Skipped to previous track", "Failed to skip to previous track"),
        MediaCommand::NextTrack => ("Skipped to next track", "Failed to skip to next track"),
        MediaCommand::Lock => ("Screen locked", "Failed to lock screen"),
        MediaCommand::Sleep => ("Going to sleep", "Failed to sleep"),
        MediaCommand::TaskManager => ("Opened task manager", "Failed to open task manager"),
        MediaCommand::Copy => ("Copied", "Failed to copy"),
        MediaCommand::Paste => ("Pasted", "Failed to paste"),
        MediaCommand::Undo => ("Undone", "Failed to undo"),
        MediaCommand::Redo => ("Redone", "Failed to redo"),
        MediaCommand::RocketLeague => ("Rocket League launched", "Failed to launch Rocket League"),
    }
}

fn shell_action(command: MediaCommand, platform: Platform) -> Option<Process> {
    use MediaCommand as C;
    use Platform as P;

    let argv: &'static [&'static str] = match (command, platform) {
        (C::VolumeUp, P::Windows) => &["powershell", "-c", "(New-Object -COM WScript.Shell).SendKeys([char]175)"],
        (C::VolumeUp, P::MacOs) => &["osascript", "-e", "set volume output volume (output volume of (get volume settings) + 10)"],
        (C::VolumeUp, P::Linux) => &["amixer", "-q", "sset", "Master", "5%+"],
        (C::VolumeDown, P::Windows) => &["powershell", "-c", "(New-Object -COM WScript.Shell).SendKeys([char]174)"],
        (C::VolumeDown, P::MacOs) => &["osascript", "-e", "set volume output volume (output volume of (get volume settings) - 10)"],
        (C::VolumeDown, P::Linux) => &["amixer", "-q", "sset", "Master", "5%-"],
        (C::Mute, P::Windows) => &["powershell", "-c", "(New-Object -COM WScript.Shell).SendKeys([char]173)"],
        (C::Mute, P::MacOs) => &["osascript", "-e", "set volume with output muted"],
        (C::Mute, P::Linux) => &["amixer", "-q", "sset", "Master", "toggle"],
        (C::PlayPause, P::Windows) => &["powershell", "-c", "(New-Object -COM WScript.Shell).SendKeys([char]179)"],
        (C::PlayPause, P::MacOs) => &["osascript", "-e", "tell application \"System Events\" to key code 49"],
        (C::PlayPause, P::Linux) => &["xdotool", "key", "XF86AudioPlay"],
        (C::NextTrack, P::Windows) => &["powershell", "-c", "(New-Object -COM WScript.Shell).SendKeys([char]176)"],
        (C::NextTrack, P::MacOs) => &["osascript", "-e", "tell application \"System Events\" to key code 124 using {command down}"],
        (C::NextTrack, P::Linux) => &["xdotool", "key", "XF86AudioNext"],
        (C::PrevTrack, P::Windows) => &["powershell", "-c", "(New-Object -COM WScript.Shell).SendKeys([char]177)"],
        (C::PrevTrack, P::MacOs) => &["osascript", "-e", "tell application \"System Events\" to key code 123 using {command down}"],
        (C::PrevTrack, P::Linux) => &["xdotool", "key", "XF86AudioPrev"],
        (C::Lock, P::Windows) => &["rundll32.exe", "user32.dll,LockWorkStation"],
        (C::Lock, P::MacOs) => &["pmset", "displaysleepnow"],
        (C::Lock, P::Linux) => &["xdg-screensaver", "lock"],
        (C::Sleep, P::Windows) => &["rundll32.exe", "powrprof.dll,SetSuspendState", "0,1,0"],
        (C::Sleep, P::MacOs) => &["pmset", "sleepnow"],
        (C::Sleep, P::Linux) => &["systemctl", "suspend"],
        (C::Shutdown, P::Windows) => &["shutdown", "/s", "/t", "10", "/c", "Shutting down from remote control."],
        (C::Shutdown, P::MacOs) => &["osascript", "-e", "tell app \"System Events\" to shut down"],
        (C::Shutdown, P::Linux) => &["shutdown", "-h", "now"],
        (C::RocketLeague, P::Windows) => {
            return Some(Process::LaunchUnlessRunning {
                check: &["tasklist", "/FI", "IMAGENAME eq RocketLeague.exe"],
                process: "RocketLeague.exe",
                launch: &["cmd", "/C", "start", "steam://rungameid/252950"],
            })
        }
        _ => return None,
    };
    Some(Process::Shell(argv))
}

fn shortcut_action(command: MediaCommand, platform: Platform) -> Option<Action> {
    let primary = platform.primary_modifier();
    let (modifiers, key) = match (command, platform) {
        (MediaCommand::Copy, _) => (vec![primary], Key::Char('c')),
        (MediaCommand::Paste, _) => (vec![primary], Key::Char('v')),
        (MediaCommand::Undo, _) => (vec![primary], Key::Char('z')),
        (MediaCommand::Redo, Platform::MacOs) => (vec![primary, Modifier::Shift], Key::Char('z')),
        (MediaCommand::Redo, _) => (vec![primary], Key::Char('y')),
        (MediaCommand::TaskManager, Platform::Windows) => (
            vec![Modifier::Control, Modifier::Shift],
            Key::Named(NamedKey::Escape),
        ),
        _ => return None,
    };
    Some(Action::Shortcut { modifiers, key })
}

/// Look `command` up in the table for `platform`.
pub fn resolve(command: MediaCommand, platform: Platform) -> Resolved {
    let action = shortcut_action(command, platform)
        .or_else(|| shell_action(command, platform).map(Action::Process));
    match action {
        Some(action) => {
            let (success, error) = messages(command);
            Resolved::Run(SystemCommand {
                key: command,
                action,
                success,
                error,
            })
        }
        None => Resolved::Unsupported,
    }
}

/// Runs external programs.
#[async_trait]
pub trait CommandRunner: Send + Sync + 'static {
    /// Run `argv` to completion and return its output.
    async fn run(&self, argv: &[&str]) -> Result<String, ReceiverError>;
}

/// Spawns real processes with `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, argv: &[&str]) -> Result<String, ReceiverError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ReceiverError::Command {
                program: String::new(),
                reason: "empty command line".to_string(),
            });
        };
        let output = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ReceiverError::Command {
                program: (*program).to_string(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() && !stderr.trim().is_empty() {
            return Err(ReceiverError::Command {
                program: (*program).to_string(),
                reason: stderr.trim().to_string(),
            });
        }
        Ok(if stdout.is_empty() { stderr } else { stdout })
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    invocations: Vec<Vec<String>>,
    outputs: Vec<(String, String)>,
}

/// Records command lines instead of running them.
///
/// Clones share the same log, so one copy can go into the receiver and
/// another stay with the caller.
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every run of `program` print `output`.
    pub fn respond(&self, program: &str, output: &str) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .outputs
            .push((program.to_string(), output.to_string()));
    }

    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .invocations
            .clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, argv: &[&str]) -> Result<String, ReceiverError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .invocations
            .push(argv.iter().map(ToString::to_string).collect());
        let output = argv.first().and_then(|program| {
            state
                .outputs
                .iter()
                .find(|(p, _)| p == program)
                .map(|(_, out)| out.clone())
        });
        Ok(output.unwrap_or_default())
    }
}

/// Run a process-backed command and log how it went. Failures are logged
/// with the command's error string and go no further.
pub async fn execute(
    runner: &dyn CommandRunner,
    key: MediaCommand,
    process: &Process,
    success: &str,
    error: &str,
) {
    match process {
        Process::Shell(argv) => match runner.run(argv).await {
            Ok(output) => {
                info!(command = %key, "{success}");
                if !output.trim().is_empty() {
                    debug!(command = %key, output = %output.trim(), "command output");
                }
            }
            Err(e) => warn!(command = %key, error = %e, "{error}"),
        },
        Process::LaunchUnlessRunning {
            check,
            process,
            launch,
        } => {
            let running = match runner.run(check).await {
                Ok(output) => output.to_lowercase().contains(&process.to_lowercase()),
                Err(e) => {
                    warn!(command = %key, error = %e, "failed to check whether {process} is running");
                    return;
                }
            };
            if running {
                info!(command = %key, "{process} is already running");
                return;
            }
            debug!(command = %key, "{process} is not running, launching");
            match runner.run(launch).await {
                Ok(_) => info!(command = %key, "{success}"),
                Err(e) => warn!(command = %key, error = %e, "{error}"),
            }
        }
    }
}

//! Console command parsing and response formatting.
//!
//! The console stands in for the workout screen and the settings screen of
//! the app: each line typed by the user is either a `!rest` command or
//! ignored.
//!
//! # Flow
//!
//! ```text
//! console line ─► Commander::parse() ─► Command ─► App ─► TimerCommand / LifecycleEvent
//!                        │
//!                        └─► CommandParseError::InvalidCommand ─► printed
//! ```
//!
//! # Available Commands
//!
//! | Command | Arguments | Description |
//! |---------|-----------|-------------|
//! | `set` | `[seconds]` | Log a set and start the rest timer |
//! | `foreground` | None | The app became active |
//! | `background` | None | The app left the foreground |
//! | `ack` | None | The user opened the rest alert |
//! | `notifications` | `on` or `off` | Toggle the notifications preference |
//! | `status` | None | Show the rest timer state |
//! | `help` | None | Display help information |
//!
//! Without a duration, `set` uses the configured rest duration.
//!
//! # Module Organization
//!
//! - [`commander`] - Entry point turning lines into commands or error messages
//! - [`command`] - Command enum definitions and parsing logic
//! - [`response`] - Response formatting

pub mod command;
pub mod commander;
pub mod response;

pub use crate::commands::{command::Command, commander::Commander};

/// Errors that can occur during command parsing.
///
/// # Variants
///
/// * `NotForApp` - Line is not a `!rest` command. Ignored silently.
/// * `InvalidCommand` - Command syntax or arguments are invalid. Contains the
///   message to display.
#[derive(Debug)]
pub enum CommandParseError {
    /// Line is not for the app (silent error)
    NotForApp,
    /// Invalid command syntax with error message
    InvalidCommand(String),
}

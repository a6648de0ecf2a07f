//! Command parsing.
//!
//! This module converts console lines into structured [`Command`] enums that
//! the application forwards to the rest timer.

use command_parser::{Command as ParserCommand, Parser};
use log::debug;

use crate::commands::response::{
    format_invalid_notifications, format_invalid_set, format_unknown_command,
};

/// Name of the command, typed after the `!` prefix.
pub const COMMAND_NAME: &str = "rest";

/// A parsed console command.
#[derive(Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// Display help information
    Help,
    /// A set was logged
    ///
    /// # Fields
    ///
    /// * `Option<i64>` - Rest duration in seconds, the configured one if `None`
    SetLogged(Option<i64>),
    /// The app became active
    Foreground,
    /// The app left the foreground
    Background,
    /// The user opened the rest alert
    Acknowledge,
    /// Toggle the notifications preference
    Notifications(bool),
    /// Display the timer state
    Status,
}

/// Errors that can occur during command parsing.
#[derive(Debug)]
pub enum CommandParsingError {
    /// The line could not be parsed as a command
    UnableToParse,
    /// The command is not a `!rest` command
    NotRest,
    /// The subcommand is not recognized
    Unknown,
    /// The set command has an invalid duration
    InvalidSet,
    /// The notifications command is not `on` or `off`
    InvalidNotifications,
}

impl Command {
    /// Parses a console line into a Command.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The line is not a command - [`CommandParsingError::UnableToParse`]
    /// - The command is not `!rest` - [`CommandParsingError::NotRest`]
    /// - The subcommand is not recognized - [`CommandParsingError::Unknown`]
    /// - `set` has a non-integer duration - [`CommandParsingError::InvalidSet`]
    /// - `notifications` is not followed by `on` or `off` - [`CommandParsingError::InvalidNotifications`]
    pub fn parse(parser: &Parser, body: &str) -> Result<Self, CommandParsingError> {
        // For an unknown reason the parser ignores the last word, so we add a dummy word at the end
        let body = body.trim().to_string() + " dummy";

        // This is normal to fail if the line is not a command
        let command = match parser.parse(&body) {
            Ok(cmd) => cmd,
            Err(_) => return Err(CommandParsingError::UnableToParse),
        };

        if command.name != COMMAND_NAME {
            return Err(CommandParsingError::NotRest);
        }

        debug!("Parsing command: {:?}", command);

        if command.arguments.is_empty() {
            return Ok(Command::Help);
        }

        match command.arguments[0].as_str() {
            "help" => Ok(Command::Help),
            "set" => Ok(Command::SetLogged(Self::parse_set(&command)?)),
            "foreground" => Ok(Command::Foreground),
            "background" => Ok(Command::Background),
            "ack" => Ok(Command::Acknowledge),
            "notifications" => Ok(Command::Notifications(Self::parse_notifications(
                &command,
            )?)),
            "status" => Ok(Command::Status),
            _ => Err(CommandParsingError::Unknown),
        }
    }

    fn parse_set(command: &ParserCommand) -> Result<Option<i64>, CommandParsingError> {
        // set and an optional duration
        let Some(duration) = command.arguments.get(1) else {
            return Ok(None);
        };

        match duration.parse::<i64>() {
            Ok(duration) => {
                debug!("Parsed set command - duration: {}", duration);
                Ok(Some(duration))
            }
            Err(_) => Err(CommandParsingError::InvalidSet),
        }
    }

    fn parse_notifications(command: &ParserCommand) -> Result<bool, CommandParsingError> {
        match command.arguments.get(1).map(String::as_str) {
            Some("on") => Ok(true),
            Some("off") => Ok(false),
            _ => Err(CommandParsingError::InvalidNotifications),
        }
    }
}

/// Formats a command error into a user-friendly message.
///
/// # Returns
///
/// * `Some(String)` - A message for errors in `!rest` commands
/// * `None` - For lines that are not `!rest` commands
pub fn format_command_error(error: CommandParsingError) -> Option<String> {
    match error {
        CommandParsingError::Unknown => Some(format_unknown_command()),
        CommandParsingError::InvalidSet => Some(format_invalid_set()),
        CommandParsingError::InvalidNotifications => Some(format_invalid_notifications()),
        CommandParsingError::UnableToParse | CommandParsingError::NotRest => None,
    }
}

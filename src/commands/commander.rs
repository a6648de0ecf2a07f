//! Command parsing entry point.
//!
//! This module provides the [`Commander`] struct, which turns raw console
//! lines into [`Command`]s or into the error message to print.

use command_parser::Parser;

use crate::commands::{
    CommandParseError,
    command::{Command, format_command_error},
};

/// Parses console lines into commands.
///
/// All commands must start with the `!rest` prefix. Other lines are silently
/// ignored (returning [`CommandParseError::NotForApp`]).
pub struct Commander {
    parser: Parser,
}

impl Commander {
    /// Creates a Commander recognizing `!` as the command prefix and `-` as
    /// the option prefix.
    pub fn new() -> Self {
        let parser = Parser::new('!', '-');
        Commander { parser }
    }

    /// Parses a console line into a structured command.
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - Successfully parsed and validated command
    /// * `Err(CommandParseError::NotForApp)` - Line is not a `!rest` command
    /// * `Err(CommandParseError::InvalidCommand)` - Command syntax is invalid
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        Command::parse(&self.parser, body).map_err(|error| {
            // Stay silent unless the line was meant for us
            match format_command_error(error) {
                Some(message) => CommandParseError::InvalidCommand(message),
                None => CommandParseError::NotForApp,
            }
        })
    }
}

impl Default for Commander {
    fn default() -> Self {
        Self::new()
    }
}

//! Host surfaces simulated on the console.
//!
//! The rest timer only talks to the host through the traits of the
//! [`crate::timer`] module. This module implements them on top of the
//! terminal so the scheduler can run without a phone:
//!
//! - [`ConsoleAuthorizationCenter`]: permission state read from the configuration
//! - [`ConsoleAlertCenter`]: alerts delivered by tokio tasks and printed
//! - [`ConsoleSensoryOutput`]: vibration marker and terminal bell

mod console;

pub use crate::host::console::{ConsoleAlertCenter, ConsoleAuthorizationCenter, ConsoleSensoryOutput};

//! Console responses to commands.

use crate::timer::{TimerOutcome, TimerState, TimerStatus};

/// Formats the help message showing the available commands.
pub fn format_help() -> String {
    let body = "Commands:\n\
        - `!rest set [seconds]`: log a set and start the rest timer\n\
        - `!rest foreground`: bring the app to the foreground\n\
        - `!rest background`: send the app to the background\n\
        - `!rest ack`: acknowledge the rest alert\n\
        - `!rest notifications on|off`: allow or stop rest alerts\n\
        - `!rest status`: show the rest timer state\n\
        - `!rest help`: show this help message\n\n\
        When the rest is over you get a system alert if rest alerts are allowed, \
        and a vibration with a tone if the app is not in the foreground.";

    body.to_owned()
}

pub fn format_unknown_command() -> String {
    "Unknown command. Type `!rest help` for more information.".to_owned()
}

pub fn format_invalid_set() -> String {
    "Invalid set command. Usage: `!rest set [seconds]`".to_owned()
}

pub fn format_invalid_notifications() -> String {
    "Invalid notifications command. Usage: `!rest notifications on|off`".to_owned()
}

/// Formats what happened when a set was logged.
pub fn format_outcome(outcome: &TimerOutcome) -> String {
    let mut message = format!("Resting for {}s.", outcome.request.duration);

    match &outcome.alert {
        Some(alert) => message.push_str(&format!(" Rest alert {} scheduled.", alert.identifier)),
        None => message.push_str(" No rest alert scheduled, vibration and tone only."),
    }

    if outcome.notifications_disabled {
        message.push_str(" Rest alerts were refused, notifications are now off.");
    }

    message
}

/// Formats the result of a notifications toggle.
///
/// # Arguments
///
/// * `requested` - The value asked by the user
/// * `enabled` - The resulting preference
pub fn format_notifications(requested: bool, enabled: bool) -> String {
    match (requested, enabled) {
        (_, true) => "Notifications are on.".to_owned(),
        (true, false) => "Rest alerts are not allowed, notifications stay off.".to_owned(),
        (false, false) => "Notifications are off.".to_owned(),
    }
}

pub fn format_status(status: &TimerStatus) -> String {
    let state = match &status.state {
        TimerState::Idle => "idle".to_owned(),
        TimerState::Pending { alert: Some(alert) } => {
            format!("resting, rest alert {} scheduled", alert.identifier)
        }
        TimerState::Pending { alert: None } => "resting, no rest alert scheduled".to_owned(),
    };

    format!(
        "Timer: {}\nNotifications: {}\nRest duration: {}s\nApp: {}",
        state,
        if status.notifications_enabled { "on" } else { "off" },
        status.rest_duration_seconds,
        if status.foreground {
            "foreground"
        } else {
            "background"
        }
    )
}

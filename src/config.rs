//! Configuration file structures for restbell.
//!
//! The configuration is a YAML file split into three sections: the user
//! preferences, the alert text and the simulated host.
//!
//! # Configuration File Format
//!
//! ```yaml
//! settings:
//!   # Whether scheduled alerts may be used
//!   notifications_enabled: true
//!   # Rest period after each set, between 30 and 300 seconds
//!   rest_duration_seconds: 90
//!
//! alert:
//!   title: "Rest is over"
//!   body: "Time for your next set"
//!   # Group shared by every rest alert
//!   group_tag: "rest-timer"
//!
//! host:
//!   # Initial permission state: undetermined, denied or authorized
//!   authorization: undetermined
//!   # Answer given to the permission prompt
//!   grant_on_prompt: true
//!   # Whether the app starts in the foreground
//!   start_in_foreground: true
//! ```
//!
//! Every value can be overridden with a `RESTBELL_` environment variable,
//! nested keys being separated by `__`:
//!
//! ```bash
//! export RESTBELL_SETTINGS__REST_DURATION_SECONDS=120
//! export RESTBELL_HOST__AUTHORIZATION=denied
//! ```

use anyhow::bail;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::timer::{
    AuthorizationState,
    settings::{MAX_REST_DURATION_SECS, MIN_REST_DURATION_SECS},
};

/// Prefix of the environment variables overriding the file.
const ENV_PREFIX: &str = "RESTBELL_";

/// Root configuration structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// User preferences
    pub settings: Settings,
    /// Alert text and group
    pub alert: Alert,
    /// Simulated host behavior
    pub host: Host,
}

/// User preferences, normally owned by the settings screen.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether scheduled alerts may be used.
    pub notifications_enabled: bool,

    /// Rest period after each set, in seconds.
    ///
    /// Must be between 30 and 300.
    pub rest_duration_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            notifications_enabled: true,
            rest_duration_seconds: 90,
        }
    }
}

/// Text of the scheduled alerts.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub title: String,
    pub body: String,
    /// Group shared by every rest alert, used to sweep them in bulk.
    pub group_tag: String,
}

impl Default for Alert {
    fn default() -> Self {
        Alert {
            title: "Rest is over".to_owned(),
            body: "Time for your next set".to_owned(),
            group_tag: "rest-timer".to_owned(),
        }
    }
}

/// Behavior of the console host standing in for the phone.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Host {
    /// Permission state before any prompt.
    pub authorization: AuthorizationState,
    /// Answer given when the permission prompt is shown.
    pub grant_on_prompt: bool,
    /// Whether the app starts in the foreground.
    pub start_in_foreground: bool,
}

impl Default for Host {
    fn default() -> Self {
        Host {
            authorization: AuthorizationState::Undetermined,
            grant_on_prompt: true,
            start_in_foreground: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a YAML file and the environment.
    ///
    /// A missing file is not an error: defaults and environment variables
    /// are used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or a variable cannot be parsed, or if the
    /// rest duration is out of range.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let duration = self.settings.rest_duration_seconds;
        if !(MIN_REST_DURATION_SECS..=MAX_REST_DURATION_SECS).contains(&duration) {
            bail!(
                "rest_duration_seconds must be between {} and {}, got {}",
                MIN_REST_DURATION_SECS,
                MAX_REST_DURATION_SECS,
                duration
            );
        }

        if self.alert.group_tag.is_empty() {
            bail!("alert group_tag must not be empty");
        }

        Ok(())
    }
}

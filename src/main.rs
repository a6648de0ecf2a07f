//! Restbell - rest timer notification scheduler for a workout logging app.
//!
//! Each time the user logs a set, a rest period starts and the user must be
//! alerted exactly once when it is over, even if the app is in the background.
//!
//! # Overview
//!
//! Two alert channels are combined:
//!
//! - **Scheduled alerts**: one-shot system alerts registered with the host,
//!   used when the user allowed them. They are delivered even if the app is
//!   suspended.
//! - **Fallback alert**: an in-process countdown ending with a vibration and a
//!   tone, suppressed when the app is in the foreground at expiry.
//!
//! Logging a new set supersedes the running rest period: its alert is
//! cancelled before the new one is registered, so only the latest rest alert
//! is ever delivered.
//!
//! This binary runs the scheduler against a simulated host on the console:
//! system alerts are printed, the vibration and tone are a marker and the
//! terminal bell, and the app lifecycle is driven by commands.
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings (every key is optional):
//!
//! ```yaml
//! settings:
//!   notifications_enabled: true
//!   rest_duration_seconds: 90
//!
//! alert:
//!   title: "Rest is over"
//!   body: "Time for your next set"
//!   group_tag: "rest-timer"
//!
//! host:
//!   authorization: undetermined
//!   grant_on_prompt: true
//!   start_in_foreground: true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Override any configuration value using environment variables with the `RESTBELL_` prefix:
//!
//! ```bash
//! export RESTBELL_SETTINGS__REST_DURATION_SECONDS=120
//! export RESTBELL_HOST__AUTHORIZATION=authorized
//! ```
//!
//! # Usage
//!
//! ```bash
//! restbell --config config.yaml
//! ```
//!
//! # Commands
//!
//! - `!rest set [seconds]` - Log a set and start the rest timer
//! - `!rest foreground` / `!rest background` - Move the app in and out of the foreground
//! - `!rest ack` - Acknowledge the rest alert
//! - `!rest notifications on|off` - Toggle rest alerts
//! - `!rest status` - Show the rest timer state
//! - `!rest help` - Display help information
//!
//! # Architecture
//!
//! - [`app`] - Console front end wiring commands to the rest timer
//! - [`commands`] - Command parsing and response formatting
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`host`] - Console implementations of the host surfaces
//! - [`timer`] - Authorization gate, alert dispatcher, fallback alerter and controller
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//!   - Set to `debug` for verbose output, including the alert requests as JSON
//!   - Set to `warn` or `error` for minimal logging

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{app::App, config::Config};

mod app;
mod commands;
mod config;
mod host;
mod timer;

/// Command-line arguments for restbell.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// A missing file is not an error, the defaults are used.
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

/// Main entry point for restbell.
///
/// 1. **Logging Setup**: `info` level by default, overridden by `RUST_LOG`
/// 2. **Argument Parsing**: command-line arguments with `clap`
/// 3. **Configuration Loading**: YAML file merged with `RESTBELL_` variables
/// 4. **App Execution**: reads commands from stdin until it is closed
///
/// In-flight rest timers are not persisted: they are lost when the process
/// stops.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting restbell {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize restbell: {}", e);
            return;
        }
    };

    if let Err(e) = app.start().await {
        error!("restbell stopped: {:#}", e);
    }
}

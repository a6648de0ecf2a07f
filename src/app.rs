//! Application wiring the rest timer to the console.
//!
//! The [`App`] builds the console host, the rest timer controller and the
//! task owning it, then turns every console line into a [`TimerCommand`] or a
//! [`LifecycleEvent`].
//!
//! # Command Processing Flow
//!
//! ```text
//! stdin line → Commander::parse → TimerCommand ──► run_controller → reply → stdout
//!                              └→ LifecycleEvent ─┘
//! ```

use std::sync::Arc;

use anyhow::{Context, anyhow};
use log::{error, info};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, oneshot},
};

use crate::{
    commands::{
        Command, CommandParseError, Commander,
        response::{format_help, format_notifications, format_outcome, format_status},
    },
    config::Config,
    host::{ConsoleAlertCenter, ConsoleAuthorizationCenter, ConsoleSensoryOutput},
    timer::{
        AlertContent, AlertDispatcher, AppActivity, AuthorizationGate, FallbackAlerter,
        InMemorySettings, LifecycleEvent, LifecycleEventSource, LifecycleSender,
        RestTimerController, Settings, TimerCommand, run_controller,
    },
};

/// Capacity of the command channel between the console and the controller.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Console front end of the rest timer.
pub struct App {
    /// Parses console lines
    commander: Commander,
    /// Requests to the controller task
    commands: mpsc::Sender<TimerCommand>,
    /// Lifecycle events reported on behalf of the host
    events: LifecycleSender,
    /// User preferences, shared with the controller
    settings: Arc<InMemorySettings>,
    /// Group of every rest alert
    group_tag: String,
}

impl App {
    /// Builds the console host and starts the controller task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the lifecycle events already have a subscriber.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let source = LifecycleEventSource::new();
        let events_receiver = source
            .subscribe()
            .ok_or_else(|| anyhow!("lifecycle events already have a subscriber"))?;
        let events = source.sender();

        let settings = Arc::new(InMemorySettings::new(
            config.settings.notifications_enabled,
            config.settings.rest_duration_seconds,
        ));
        let activity = AppActivity::new(config.host.start_in_foreground);

        let gate = AuthorizationGate::new(Arc::new(ConsoleAuthorizationCenter::new(
            config.host.authorization,
            config.host.grant_on_prompt,
        )));
        let dispatcher = AlertDispatcher::new(
            Arc::new(ConsoleAlertCenter::new(events.clone())),
            AlertContent {
                title: config.alert.title,
                body: config.alert.body,
            },
        );
        let fallback = FallbackAlerter::new(Arc::new(ConsoleSensoryOutput));

        let controller = RestTimerController::new(
            gate,
            dispatcher,
            fallback,
            settings.clone(),
            activity,
            config.alert.group_tag.clone(),
        );

        let (commands, commands_receiver) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        tokio::spawn(run_controller(controller, commands_receiver, events_receiver));

        Ok(App {
            commander: Commander::new(),
            commands,
            events,
            settings,
            group_tag: config.alert.group_tag,
        })
    }

    /// Reads commands from stdin until it is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read.
    pub async fn start(self) -> anyhow::Result<()> {
        info!("type `!rest help` to list the commands");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
            match self.handle_line(&line).await {
                Ok(Some(response)) => println!("{}", response),
                Ok(None) => {}
                Err(e) => error!("failed to handle command: {:#}", e),
            }
        }

        info!("stdin closed, stopping");
        Ok(())
    }

    /// Handles one console line.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` - The response to print
    /// * `Ok(None)` - The line is not a `!rest` command
    /// * `Err(anyhow::Error)` - The controller task is gone
    pub async fn handle_line(&self, line: &str) -> anyhow::Result<Option<String>> {
        let command = match self.commander.parse(line) {
            Ok(command) => command,
            Err(CommandParseError::NotForApp) => return Ok(None),
            Err(CommandParseError::InvalidCommand(message)) => return Ok(Some(message)),
        };

        let response = match command {
            Command::Help => format_help(),
            Command::SetLogged(duration) => {
                let duration = duration.unwrap_or_else(|| {
                    i64::try_from(self.settings.rest_duration_seconds()).unwrap_or(i64::MAX)
                });
                let outcome = self
                    .request(|reply| TimerCommand::SetLogged {
                        duration,
                        reply: Some(reply),
                    })
                    .await?;
                format_outcome(&outcome)
            }
            Command::Foreground => {
                self.send_event(LifecycleEvent::Foreground)?;
                "App in foreground.".to_owned()
            }
            Command::Background => {
                self.send_event(LifecycleEvent::Background)?;
                "App in background.".to_owned()
            }
            Command::Acknowledge => {
                self.send_event(LifecycleEvent::AlertAcknowledged {
                    group_tag: self.group_tag.clone(),
                })?;
                "Rest alert acknowledged.".to_owned()
            }
            Command::Notifications(requested) => {
                let enabled = self
                    .request(|reply| TimerCommand::SetNotifications {
                        enabled: requested,
                        reply: Some(reply),
                    })
                    .await?;
                format_notifications(requested, enabled)
            }
            Command::Status => {
                let status = self
                    .request(|reply| TimerCommand::Status { reply })
                    .await?;
                format_status(&status)
            }
        };

        Ok(Some(response))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> TimerCommand,
    ) -> anyhow::Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| anyhow!("rest timer controller stopped"))?;
        response
            .await
            .context("rest timer controller dropped the request")
    }

    fn send_event(&self, event: LifecycleEvent) -> anyhow::Result<()> {
        self.events
            .send(event)
            .map_err(|_| anyhow!("rest timer controller stopped"))
    }
}

//! Lifecycle events and the task owning the rest timer controller.
//!
//! The host reports app activity changes and alert deliveries through a
//! [`LifecycleEventSource`]. The UI sends [`TimerCommand`]s. Both streams are
//! consumed by [`run_controller`], the single owner of the
//! [`RestTimerController`], so set-logged events and lifecycle hooks never
//! interleave.

use std::sync::{Mutex, PoisonError};

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};

use crate::timer::controller::{RestTimerController, TimerOutcome, TimerStatus};

/// Host event relevant to the rest timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The app became active
    Foreground,
    /// The app left the foreground
    Background,
    /// The host presented an alert
    AlertDelivered { identifier: String },
    /// The user opened or dismissed an alert of a group
    AlertAcknowledged { group_tag: String },
}

pub type LifecycleSender = mpsc::UnboundedSender<LifecycleEvent>;
pub type LifecycleReceiver = mpsc::UnboundedReceiver<LifecycleEvent>;

/// Process-wide source of lifecycle events.
///
/// Any number of hosts can send events, but only one subscriber ever
/// receives them.
pub struct LifecycleEventSource {
    sender: LifecycleSender,
    receiver: Mutex<Option<LifecycleReceiver>>,
}

impl LifecycleEventSource {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        LifecycleEventSource {
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Returns a sender for hosts to report events.
    pub fn sender(&self) -> LifecycleSender {
        self.sender.clone()
    }

    /// Takes the receiving side.
    ///
    /// # Returns
    ///
    /// The receiver on the first call, `None` afterwards.
    pub fn subscribe(&self) -> Option<LifecycleReceiver> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if receiver.is_none() {
            warn!("lifecycle events already have a subscriber");
        }
        receiver
    }
}

impl Default for LifecycleEventSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Request from the UI to the controller task.
#[derive(Debug)]
pub enum TimerCommand {
    /// A set was logged with the given rest duration in seconds
    SetLogged {
        duration: i64,
        reply: Option<oneshot::Sender<TimerOutcome>>,
    },
    /// The user toggled the notifications preference
    SetNotifications {
        enabled: bool,
        reply: Option<oneshot::Sender<bool>>,
    },
    /// Snapshot of the controller
    Status { reply: oneshot::Sender<TimerStatus> },
}

/// Applies a lifecycle event to the controller.
pub fn dispatch_event(controller: &mut RestTimerController, event: LifecycleEvent) {
    debug!("lifecycle event {:?}", event);

    match event {
        LifecycleEvent::Foreground => controller.on_app_foreground(),
        LifecycleEvent::Background => controller.on_app_background(),
        LifecycleEvent::AlertDelivered { identifier } => controller.on_alert_delivered(&identifier),
        LifecycleEvent::AlertAcknowledged { group_tag } => {
            controller.on_alert_acknowledged(&group_tag)
        }
    }
}

/// Applies a UI command to the controller and answers the caller.
pub async fn dispatch_command(controller: &mut RestTimerController, command: TimerCommand) {
    match command {
        TimerCommand::SetLogged { duration, reply } => {
            let outcome = controller.start_rest_timer(duration).await;
            if let Some(reply) = reply {
                // The caller may have stopped waiting
                let _ = reply.send(outcome);
            }
        }
        TimerCommand::SetNotifications { enabled, reply } => {
            let enabled = controller.set_notifications_enabled(enabled).await;
            if let Some(reply) = reply {
                let _ = reply.send(enabled);
            }
        }
        TimerCommand::Status { reply } => {
            let _ = reply.send(controller.status());
        }
    }
}

/// Runs the controller until the command channel closes.
///
/// # Arguments
///
/// * `controller` - The controller, owned by this task
/// * `commands` - Requests from the UI
/// * `events` - Lifecycle events from the host
pub async fn run_controller(
    mut controller: RestTimerController,
    mut commands: mpsc::Receiver<TimerCommand>,
    mut events: LifecycleReceiver,
) {
    info!("rest timer controller started");

    loop {
        // Pending lifecycle events are applied before the next command
        tokio::select! {
            biased;
            Some(event) = events.recv() => {
                dispatch_event(&mut controller, event);
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    info!("command channel closed, stopping rest timer controller");
                    break;
                };
                dispatch_command(&mut controller, command).await;
            }
        }
    }
}

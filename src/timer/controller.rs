//! Rest timer controller.
//!
//! This module provides the [`RestTimerController`] which decides, each time
//! a set is logged, which alert channels to use for the rest period:
//!
//! ```text
//! set logged ─► cancel tracked alert ─► notifications enabled? ──no──────────────┐
//!                                              │ yes                              │
//!                                              ▼                                  │
//!                                   authorization state                          │
//!                     Authorized ─► schedule alert ─────────────┐                │
//!                     Undetermined ─► prompt ─► granted? ─yes──►┤                │
//!                                                 │ no          │                │
//!                     Denied ─────────────────────┴─────────────┴─► fallback ◄───┘
//! ```
//!
//! The controller tracks at most one scheduled alert: the previous one is
//! always cancelled before a new one is registered.

use std::sync::Arc;

use log::{debug, info};
use tokio::time::Instant;

use crate::timer::{
    authorization::{AuthorizationGate, AuthorizationState, PromptOutcome},
    dispatcher::{AlertDispatcher, PendingAlertHandle},
    fallback::{AppActivity, FallbackAlerter},
    settings::Settings,
};

/// A rest period requested when a set was logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRequest {
    /// Rest duration in seconds, at least one
    pub duration: u64,
    /// When the set was logged
    pub requested_at: Instant,
}

impl TimerRequest {
    /// Creates a request, raising durations lower than one second to one.
    pub fn new(duration: i64) -> Self {
        TimerRequest {
            duration: duration.max(1).unsigned_abs(),
            requested_at: Instant::now(),
        }
    }
}

/// What [`RestTimerController::start_rest_timer`] did.
#[derive(Debug, Clone)]
pub struct TimerOutcome {
    /// The clamped request
    pub request: TimerRequest,
    /// The scheduled alert, if one was registered
    pub alert: Option<PendingAlertHandle>,
    /// Set when the user refused the permission prompt and the
    /// notifications preference was turned off
    pub notifications_disabled: bool,
}

/// State of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerState {
    /// No rest period running
    Idle,
    /// A rest period is running, with a scheduled alert if one was registered
    Pending { alert: Option<PendingAlertHandle> },
}

/// Snapshot of the controller and the preferences it reads.
#[derive(Debug, Clone)]
pub struct TimerStatus {
    pub state: TimerState,
    pub notifications_enabled: bool,
    pub rest_duration_seconds: u64,
    pub foreground: bool,
}

/// Orchestrates the scheduled alert and the fallback alert of a rest timer.
///
/// All methods take `&mut self`: the owner serializes set-logged events and
/// lifecycle hooks, which keeps the "at most one tracked alert" invariant.
pub struct RestTimerController {
    /// Permission checks
    gate: AuthorizationGate,
    /// Scheduled alerts
    dispatcher: AlertDispatcher,
    /// In-process countdown
    fallback: FallbackAlerter,
    /// User preferences
    settings: Arc<dyn Settings>,
    /// Foreground flag shared with the fallback suppression predicate
    activity: AppActivity,
    /// Group of every rest alert
    group_tag: String,
    /// Scheduled alert of the current rest period
    tracked: Option<PendingAlertHandle>,
}

impl RestTimerController {
    pub fn new(
        gate: AuthorizationGate,
        dispatcher: AlertDispatcher,
        fallback: FallbackAlerter,
        settings: Arc<dyn Settings>,
        activity: AppActivity,
        group_tag: String,
    ) -> Self {
        RestTimerController {
            gate,
            dispatcher,
            fallback,
            settings,
            activity,
            group_tag,
            tracked: None,
        }
    }

    /// Starts the rest period of a freshly logged set.
    ///
    /// # Arguments
    ///
    /// * `duration` - Rest duration in seconds; values lower than one become one
    ///
    /// # Behavior
    ///
    /// 1. Cancels the tracked alert of the previous rest period
    /// 2. If notifications are enabled and authorized (asking the user when
    ///    they were never asked), schedules a system alert
    /// 3. Always starts the fallback countdown, suppressed when the app is in
    ///    the foreground at expiry
    ///
    /// Nothing here fails: missing channels are logged and skipped.
    pub async fn start_rest_timer(&mut self, duration: i64) -> TimerOutcome {
        let request = TimerRequest::new(duration);
        info!("set logged, starting rest timer of {} seconds", request.duration);

        // The cancel must return before the next registration starts
        if let Some(previous) = self.tracked.take() {
            debug!("superseding alert {}", previous.identifier);
            self.dispatcher.cancel(&previous);
        }

        let mut notifications_disabled = false;
        if self.settings.notifications_enabled() {
            let authorized = match self.gate.query_state().await {
                AuthorizationState::Authorized => true,
                AuthorizationState::Denied => {
                    debug!("rest alerts denied, using fallback only");
                    false
                }
                AuthorizationState::Undetermined => match self.gate.request_if_needed().await {
                    PromptOutcome::Granted => true,
                    PromptOutcome::Refused => {
                        info!("rest alerts refused, turning notifications off");
                        self.settings.set_notifications_enabled(false);
                        notifications_disabled = true;
                        false
                    }
                    PromptOutcome::Unavailable => {
                        debug!("rest alerts unavailable, using fallback only");
                        false
                    }
                },
            };

            if authorized {
                let handle = self.dispatcher.schedule(request.duration, &self.group_tag);
                self.tracked = Some(handle);
            }
        } else {
            debug!("notifications disabled, using fallback only");
        }

        let activity = self.activity.clone();
        self.fallback
            .start_countdown(request.duration, move || activity.is_foreground());

        TimerOutcome {
            request,
            alert: self.tracked.clone(),
            notifications_disabled,
        }
    }

    /// Applies the user toggling the notifications preference.
    ///
    /// Turning it on asks for permission when the user was never asked. If
    /// permission is refused the preference stays off.
    ///
    /// # Returns
    ///
    /// The resulting preference value.
    pub async fn set_notifications_enabled(&mut self, enabled: bool) -> bool {
        if !enabled {
            self.settings.set_notifications_enabled(false);
            return false;
        }

        let granted = self.gate.request_if_needed().await.is_granted();
        self.settings.set_notifications_enabled(granted);
        if !granted {
            info!("rest alerts are not authorized, notifications stay off");
        }
        granted
    }

    /// Called when the app becomes active.
    ///
    /// Delivered rest alerts are removed from the user's alert list, and if the
    /// tracked alert is already due, every undelivered rest alert is swept so
    /// no late alert plays while the user is looking at the app.
    pub fn on_app_foreground(&mut self) {
        self.activity.set_foreground(true);
        self.dispatcher.clear_delivered(&self.group_tag);

        let now = Instant::now();
        if self
            .tracked
            .as_ref()
            .is_some_and(|handle| handle.has_elapsed(now))
        {
            info!("app in foreground after rest period, sweeping stale alerts");
            self.dispatcher.cancel_all_undelivered(&self.group_tag);
            self.tracked = None;
        }
    }

    /// Called when the app leaves the foreground.
    pub fn on_app_background(&mut self) {
        self.activity.set_foreground(false);
    }

    /// Called when the host delivered an alert.
    ///
    /// An alert delivered while the app is in the foreground is stale and is
    /// removed right away.
    pub fn on_alert_delivered(&mut self, identifier: &str) {
        self.dispatcher.mark_delivered(identifier);

        if self
            .tracked
            .as_ref()
            .is_some_and(|handle| handle.identifier == identifier)
        {
            debug!("tracked alert {} delivered", identifier);
            self.tracked = None;
        }

        if self.activity.is_foreground() {
            info!("alert {} delivered while in foreground, clearing it", identifier);
            self.dispatcher.clear_delivered(&self.group_tag);
        }
    }

    /// Called when the user acknowledged an alert of `group_tag`.
    pub fn on_alert_acknowledged(&mut self, group_tag: &str) {
        if group_tag != self.group_tag {
            debug!("ignoring acknowledgement for group {}", group_tag);
            return;
        }

        if let Some(handle) = self.tracked.take() {
            info!("rest alert {} acknowledged", handle.identifier);
            self.dispatcher.mark_delivered(&handle.identifier);
        }
    }

    pub fn state(&self) -> TimerState {
        if self.tracked.is_some() || self.fallback.is_running() {
            TimerState::Pending {
                alert: self.tracked.clone(),
            }
        } else {
            TimerState::Idle
        }
    }

    pub fn status(&self) -> TimerStatus {
        TimerStatus {
            state: self.state(),
            notifications_enabled: self.settings.notifications_enabled(),
            rest_duration_seconds: self.settings.rest_duration_seconds(),
            foreground: self.activity.is_foreground(),
        }
    }
}

//! Permission handling for user-visible alerts.
//!
//! This module provides the [`AuthorizationGate`], a thin layer over the host
//! [`AuthorizationCenter`] that answers two questions for the rest timer:
//! "may we schedule a system alert right now?" and "may we ask the user?".

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;
use log::{debug, error, info, warn};
use mockall::automock;
use serde::Deserialize;

/// Outcome of the host permission system.
///
/// The state is owned by the host and can change outside of the app (the user
/// may flip it in the system settings), so it is re-queried on every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationState {
    /// The user was never asked.
    #[default]
    Undetermined,
    /// The user refused alerts.
    Denied,
    /// The user accepted alerts.
    Authorized,
}

impl AuthorizationState {
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }

    pub const fn needs_request(self) -> bool {
        matches!(self, Self::Undetermined)
    }
}

/// Answer of [`AuthorizationGate::request_if_needed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Alerts are authorized, either already or after the prompt.
    Granted,
    /// The user answered "no" to the prompt just shown.
    Refused,
    /// Alerts cannot be used right now: denied earlier, prompt already
    /// shown, or the host failed.
    Unavailable,
}

impl PromptOutcome {
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Host permission system.
///
/// Implementations talk to the operating system. Both operations may need a
/// round-trip to the host and are therefore asynchronous.
#[automock]
pub trait AuthorizationCenter: Send + Sync {
    /// Current permission state as known by the host.
    fn status(&self) -> BoxFuture<'static, anyhow::Result<AuthorizationState>>;
    /// Shows the permission prompt and resolves with the user's answer.
    fn request(&self) -> BoxFuture<'static, anyhow::Result<bool>>;
}

/// Gate deciding whether scheduled alerts can be used.
///
/// The gate never caches the permission state: every call goes back to the
/// host. It only remembers whether it already prompted the user, so that two
/// overlapping requests never show two prompts.
pub struct AuthorizationGate {
    /// Host permission system
    center: Arc<dyn AuthorizationCenter>,
    /// Set once the prompt has been shown
    prompted: AtomicBool,
}

impl AuthorizationGate {
    /// Creates a new [`AuthorizationGate`] over the given host permission system.
    pub fn new(center: Arc<dyn AuthorizationCenter>) -> Self {
        AuthorizationGate {
            center,
            prompted: AtomicBool::new(false),
        }
    }

    /// Queries the host for the current permission state.
    ///
    /// A host failure is logged and reported as
    /// [`AuthorizationState::Undetermined`].
    pub async fn query_state(&self) -> AuthorizationState {
        match self.center.status().await {
            Ok(state) => {
                debug!("authorization state is {:?}", state);
                state
            }
            Err(e) => {
                warn!("failed to query authorization state: {}", e);
                AuthorizationState::Undetermined
            }
        }
    }

    /// Asks the user for permission if they were never asked.
    ///
    /// Only call this as a direct consequence of a user action (toggling the
    /// preference, logging a set). Host errors resolve to
    /// [`PromptOutcome::Unavailable`]; only an explicit "no" from the user is
    /// [`PromptOutcome::Refused`].
    pub async fn request_if_needed(&self) -> PromptOutcome {
        let state = match self.center.status().await {
            Ok(state) => state,
            Err(e) => {
                error!("failed to query authorization state before prompting: {}", e);
                return PromptOutcome::Unavailable;
            }
        };

        if !state.needs_request() {
            return if state.is_authorized() {
                PromptOutcome::Granted
            } else {
                PromptOutcome::Unavailable
            };
        }

        if self.prompted.swap(true, Ordering::SeqCst) {
            warn!("authorization prompt already shown, not asking again");
            return PromptOutcome::Unavailable;
        }

        info!("asking the user to authorize rest alerts");
        match self.center.request().await {
            Ok(true) => {
                info!("rest alerts authorization granted");
                PromptOutcome::Granted
            }
            Ok(false) => {
                info!("rest alerts authorization refused");
                PromptOutcome::Refused
            }
            Err(e) => {
                error!("authorization request failed: {}", e);
                PromptOutcome::Unavailable
            }
        }
    }
}

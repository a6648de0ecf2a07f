//! Console implementations of the host surfaces.

use std::{
    collections::HashMap,
    io::Write,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::{FutureExt, future::BoxFuture};
use log::{debug, info, warn};
use tokio::{task::JoinHandle, time};

use crate::timer::{
    AlertCenter, AlertRequest, AuthorizationCenter, AuthorizationState, LifecycleEvent,
    LifecycleSender, SensoryOutput,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Permission system answering the prompt from the configuration.
pub struct ConsoleAuthorizationCenter {
    state: Mutex<AuthorizationState>,
    grant_on_prompt: bool,
}

impl ConsoleAuthorizationCenter {
    /// # Arguments
    ///
    /// * `state` - Permission state before any prompt
    /// * `grant_on_prompt` - Answer given when the prompt is shown
    pub fn new(state: AuthorizationState, grant_on_prompt: bool) -> Self {
        ConsoleAuthorizationCenter {
            state: Mutex::new(state),
            grant_on_prompt,
        }
    }
}

impl AuthorizationCenter for ConsoleAuthorizationCenter {
    fn status(&self) -> BoxFuture<'static, anyhow::Result<AuthorizationState>> {
        let state = *lock(&self.state);
        futures::future::ready(Ok(state)).boxed()
    }

    fn request(&self) -> BoxFuture<'static, anyhow::Result<bool>> {
        let granted = self.grant_on_prompt;
        let mut state = lock(&self.state);

        // The host only shows the prompt once
        if *state != AuthorizationState::Undetermined {
            return futures::future::ready(Ok(state.is_authorized())).boxed();
        }

        info!(
            "permission prompt answered: {}",
            if granted { "allow" } else { "don't allow" }
        );
        *state = if granted {
            AuthorizationState::Authorized
        } else {
            AuthorizationState::Denied
        };
        futures::future::ready(Ok(granted)).boxed()
    }
}

/// A request waiting for its delay to elapse.
struct PendingDelivery {
    group_tag: String,
    handle: JoinHandle<()>,
}

/// Alert surface delivering requests with tokio timers.
///
/// Each pending request is a task sleeping for the request delay. When it
/// wakes up, the alert is printed, moved to the delivered list of its group
/// and reported as [`LifecycleEvent::AlertDelivered`].
pub struct ConsoleAlertCenter {
    events: LifecycleSender,
    pending: Arc<Mutex<HashMap<String, PendingDelivery>>>,
    delivered: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl ConsoleAlertCenter {
    pub fn new(events: LifecycleSender) -> Self {
        ConsoleAlertCenter {
            events,
            pending: Arc::new(Mutex::new(HashMap::new())),
            delivered: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Identifiers of the requests not delivered yet.
    #[cfg(test)]
    pub fn pending_identifiers(&self) -> Vec<String> {
        lock(&self.pending).keys().cloned().collect()
    }

    /// Identifiers of the delivered alerts still listed for a group.
    #[cfg(test)]
    pub fn delivered_identifiers(&self, group_tag: &str) -> Vec<String> {
        lock(&self.delivered)
            .get(group_tag)
            .cloned()
            .unwrap_or_default()
    }

    fn spawn_delivery(&self, request: AlertRequest) -> JoinHandle<()> {
        let events = self.events.clone();
        let pending = Arc::clone(&self.pending);
        let delivered = Arc::clone(&self.delivered);

        tokio::spawn(async move {
            time::sleep(request.deliver_after()).await;

            if lock(&pending).remove(&request.identifier).is_none() {
                debug!("alert {} removed before delivery", request.identifier);
                return;
            }

            println!("\n🔔 {}\n   {}", request.title, request.body);
            info!("alert {} delivered", request.identifier);

            lock(&delivered)
                .entry(request.group_tag.clone())
                .or_default()
                .push(request.identifier.clone());

            if events
                .send(LifecycleEvent::AlertDelivered {
                    identifier: request.identifier,
                })
                .is_err()
            {
                warn!("no subscriber for alert deliveries");
            }
        })
    }
}

impl AlertCenter for ConsoleAlertCenter {
    fn add(&self, request: AlertRequest) -> BoxFuture<'static, anyhow::Result<()>> {
        match serde_json::to_string(&request) {
            Ok(json) => debug!("alert request {}", json),
            Err(e) => warn!("unable to serialize alert request: {}", e),
        }

        let identifier = request.identifier.clone();
        let group_tag = request.group_tag.clone();

        // Registered before returning so a later removal always finds it
        let mut pending = lock(&self.pending);
        let handle = self.spawn_delivery(request);
        if let Some(previous) = pending.insert(identifier, PendingDelivery { group_tag, handle }) {
            previous.handle.abort();
        }

        futures::future::ready(Ok(())).boxed()
    }

    fn remove_pending(&self, identifiers: &[String]) {
        let mut pending = lock(&self.pending);
        for identifier in identifiers {
            if let Some(delivery) = pending.remove(identifier) {
                delivery.handle.abort();
                debug!("pending alert {} removed", identifier);
            }
        }
    }

    fn remove_all_pending(&self, group_tag: &str) {
        let mut pending = lock(&self.pending);
        let before = pending.len();
        pending.retain(|_, delivery| {
            if delivery.group_tag == group_tag {
                delivery.handle.abort();
                false
            } else {
                true
            }
        });

        let removed = before - pending.len();
        if removed > 0 {
            debug!("{} pending alerts of {} removed", removed, group_tag);
        }
    }

    fn remove_all_delivered(&self, group_tag: &str) {
        if let Some(identifiers) = lock(&self.delivered).remove(group_tag) {
            debug!(
                "{} delivered alerts of {} cleared",
                identifiers.len(),
                group_tag
            );
        }
    }
}

/// Vibration and tone rendered on the terminal.
#[derive(Debug, Default)]
pub struct ConsoleSensoryOutput;

impl SensoryOutput for ConsoleSensoryOutput {
    fn pulse(&self) {
        println!("\n*bzz*");
    }

    fn play_tone(&self) {
        print!("\x07");
        // The bell is useless if it stays in the buffer
        let _ = std::io::stdout().flush();
        info!("rest is over");
    }
}

//! Scheduled alert dispatcher.
//!
//! This module provides the [`AlertDispatcher`] which registers one-shot,
//! system-delivered alerts with the host [`AlertCenter`] and keeps enough
//! bookkeeping to cancel them idempotently.

use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use log::{debug, error, info};
use mockall::automock;
use serde::Serialize;
use tokio::time::Instant;
use uuid::Uuid;

/// Shortest delay accepted for a scheduled alert, in seconds.
pub const MIN_ALERT_DELAY_SECS: u64 = 1;

/// Expected delivery time used when `now + delay` is not representable.
const FAR_FUTURE_SECS: u64 = 86400 * 365 * 30;

/// Sound played by the host when presenting an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSound {
    /// The host default alert sound
    Default,
}

/// Registration request sent to the host alert surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRequest {
    /// Unique identifier used for later cancellation
    pub identifier: String,
    /// Alert title
    pub title: String,
    /// Alert body
    pub body: String,
    /// Sound played on delivery
    pub sound: AlertSound,
    /// Logical group used for bulk removal
    pub group_tag: String,
    /// Delay before delivery, in seconds
    pub deliver_after_secs: u64,
}

impl AlertRequest {
    pub fn deliver_after(&self) -> Duration {
        Duration::from_secs(self.deliver_after_secs)
    }
}

/// Text shown in every rest alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertContent {
    pub title: String,
    pub body: String,
}

/// Handle of a registered alert.
///
/// The handle is only bookkeeping: the alert itself lives in the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAlertHandle {
    /// Identifier of the host request
    pub identifier: String,
    /// Group the alert belongs to
    pub group_tag: String,
    /// When the host is expected to deliver the alert
    pub scheduled_for: Instant,
}

impl PendingAlertHandle {
    /// Whether the alert delay is over at `now`.
    pub fn has_elapsed(&self, now: Instant) -> bool {
        now >= self.scheduled_for
    }
}

/// Host alert delivery surface.
///
/// `add` must enqueue the request before returning; the returned future only
/// reports the host acknowledgement. Removal calls are fire-and-forget and
/// must ignore unknown identifiers.
#[automock]
pub trait AlertCenter: Send + Sync {
    /// Registers a request for delivery after its delay.
    fn add(&self, request: AlertRequest) -> BoxFuture<'static, anyhow::Result<()>>;
    /// Removes pending requests by identifier.
    fn remove_pending(&self, identifiers: &[String]);
    /// Removes every pending request of a group.
    fn remove_all_pending(&self, group_tag: &str);
    /// Removes every delivered alert of a group from the user's alert list.
    fn remove_all_delivered(&self, group_tag: &str);
}

/// Registers and cancels scheduled alerts.
///
/// # Examples
///
/// ```ignore
/// let mut dispatcher = AlertDispatcher::new(center, content);
/// let handle = dispatcher.schedule(90, "rest-timer");
/// assert!(dispatcher.cancel(&handle));
/// assert!(!dispatcher.cancel(&handle));
/// ```
pub struct AlertDispatcher {
    /// Host alert surface
    center: Arc<dyn AlertCenter>,
    /// Title and body of the alerts
    content: AlertContent,
    /// Identifiers registered and neither cancelled nor delivered, with their group
    live: HashMap<String, String>,
}

impl AlertDispatcher {
    /// Creates a new [`AlertDispatcher`].
    pub fn new(center: Arc<dyn AlertCenter>, content: AlertContent) -> Self {
        AlertDispatcher {
            center,
            content,
            live: HashMap::new(),
        }
    }

    /// Registers a one-shot alert delivered `duration` seconds from now.
    ///
    /// The handle is returned immediately. The host acknowledgement is awaited
    /// in a background task and a failure is only logged: scheduled alerts are
    /// best-effort.
    ///
    /// # Arguments
    ///
    /// * `duration` - Delay in seconds, raised to [`MIN_ALERT_DELAY_SECS`] if lower
    /// * `group_tag` - Group used for later bulk removal
    pub fn schedule(&mut self, duration: u64, group_tag: &str) -> PendingAlertHandle {
        let duration = duration.max(MIN_ALERT_DELAY_SECS);
        let identifier = Uuid::new_v4().to_string();
        let now = Instant::now();
        let scheduled_for = now
            .checked_add(Duration::from_secs(duration))
            .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS));

        let request = AlertRequest {
            identifier: identifier.clone(),
            title: self.content.title.clone(),
            body: self.content.body.clone(),
            sound: AlertSound::Default,
            group_tag: group_tag.to_owned(),
            deliver_after_secs: duration,
        };

        self.live.insert(identifier.clone(), group_tag.to_owned());
        let registration = self.center.add(request);

        let registered_identifier = identifier.clone();
        tokio::spawn(async move {
            match registration.await {
                Ok(()) => debug!("alert {} registered by the host", registered_identifier),
                Err(e) => error!("failed to register alert {}: {}", registered_identifier, e),
            }
        });

        info!(
            "scheduled alert {} in group {} for {} seconds",
            identifier, group_tag, duration
        );

        PendingAlertHandle {
            identifier,
            group_tag: group_tag.to_owned(),
            scheduled_for,
        }
    }

    /// Cancels a scheduled alert.
    ///
    /// # Returns
    ///
    /// `true` if a removal was sent to the host, `false` if the alert was
    /// already cancelled or delivered.
    pub fn cancel(&mut self, handle: &PendingAlertHandle) -> bool {
        if self.live.remove(&handle.identifier).is_none() {
            debug!("alert {} is not pending, nothing to cancel", handle.identifier);
            return false;
        }

        self.center
            .remove_pending(std::slice::from_ref(&handle.identifier));
        info!("cancelled alert {}", handle.identifier);
        true
    }

    /// Forgets a delivered alert so that a later cancel is a no-op.
    pub fn mark_delivered(&mut self, identifier: &str) {
        if self.live.remove(identifier).is_some() {
            debug!("alert {} delivered", identifier);
        }
    }

    /// Removes every alert of the group that was not delivered yet.
    pub fn cancel_all_undelivered(&mut self, group_tag: &str) {
        self.center.remove_all_pending(group_tag);
        self.live.retain(|_, group| group != group_tag);
        info!("cancelled all undelivered alerts of group {}", group_tag);
    }

    /// Removes every delivered alert of the group from the user's alert list.
    pub fn clear_delivered(&self, group_tag: &str) {
        self.center.remove_all_delivered(group_tag);
        debug!("cleared delivered alerts of group {}", group_tag);
    }

    /// Whether the alert with this identifier may still be delivered.
    #[cfg(test)]
    pub fn is_live(&self, identifier: &str) -> bool {
        self.live.contains_key(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Mutex;

    const GROUP: &str = "rest-timer";

    fn create_content() -> AlertContent {
        AlertContent {
            title: "Rest is over".to_string(),
            body: "Time for your next set".to_string(),
        }
    }

    fn accept_all(center: &mut MockAlertCenter) {
        center
            .expect_add()
            .returning(|_| futures::future::ready(Ok(())).boxed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_sends_request() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_clone = Arc::clone(&requests);

        let mut center = MockAlertCenter::new();
        center.expect_add().times(1).returning(move |request| {
            requests_clone.lock().unwrap().push(request);
            futures::future::ready(Ok(())).boxed()
        });

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let before = Instant::now();
        let handle = dispatcher.schedule(60, GROUP);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.identifier, handle.identifier);
        assert_eq!(request.title, "Rest is over");
        assert_eq!(request.body, "Time for your next set");
        assert_eq!(request.sound, AlertSound::Default);
        assert_eq!(request.group_tag, GROUP);
        assert_eq!(request.deliver_after(), Duration::from_secs(60));
        assert_eq!(handle.group_tag, GROUP);
        assert_eq!(handle.scheduled_for, before + Duration::from_secs(60));
        assert!(dispatcher.is_live(&handle.identifier));
    }

    #[tokio::test]
    async fn test_schedule_clamps_duration() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_clone = Arc::clone(&requests);

        let mut center = MockAlertCenter::new();
        center.expect_add().returning(move |request| {
            requests_clone.lock().unwrap().push(request.deliver_after_secs);
            futures::future::ready(Ok(())).boxed()
        });

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        dispatcher.schedule(0, GROUP);

        assert_eq!(*requests.lock().unwrap(), vec![MIN_ALERT_DELAY_SECS]);
    }

    #[tokio::test]
    async fn test_schedule_generates_unique_identifiers() {
        let mut center = MockAlertCenter::new();
        accept_all(&mut center);

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let first = dispatcher.schedule(30, GROUP);
        let second = dispatcher.schedule(30, GROUP);

        assert_ne!(first.identifier, second.identifier);
    }

    #[tokio::test]
    async fn test_schedule_registration_failure_is_swallowed() {
        let mut center = MockAlertCenter::new();
        center
            .expect_add()
            .returning(|_| futures::future::ready(Err(anyhow::anyhow!("host busy"))).boxed());

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let handle = dispatcher.schedule(30, GROUP);

        // Let the registration task observe the failure
        tokio::task::yield_now().await;
        assert!(dispatcher.is_live(&handle.identifier));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let mut center = MockAlertCenter::new();
        accept_all(&mut center);
        center.expect_remove_pending().times(1).return_const(());

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let handle = dispatcher.schedule(30, GROUP);

        assert!(dispatcher.cancel(&handle));
        assert!(!dispatcher.cancel(&handle));
        assert!(!dispatcher.is_live(&handle.identifier));
    }

    #[tokio::test]
    async fn test_cancel_sends_identifier() {
        let removed = Arc::new(Mutex::new(Vec::new()));
        let removed_clone = Arc::clone(&removed);

        let mut center = MockAlertCenter::new();
        accept_all(&mut center);
        center.expect_remove_pending().returning(move |identifiers| {
            removed_clone
                .lock()
                .unwrap()
                .extend(identifiers.iter().cloned());
        });

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let handle = dispatcher.schedule(30, GROUP);
        dispatcher.cancel(&handle);

        assert_eq!(*removed.lock().unwrap(), vec![handle.identifier]);
    }

    #[tokio::test]
    async fn test_cancel_after_delivery_is_noop() {
        let mut center = MockAlertCenter::new();
        accept_all(&mut center);
        center.expect_remove_pending().never();

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let handle = dispatcher.schedule(30, GROUP);
        dispatcher.mark_delivered(&handle.identifier);

        assert!(!dispatcher.cancel(&handle));
    }

    #[tokio::test]
    async fn test_cancel_all_undelivered_clears_live_alerts() {
        let mut center = MockAlertCenter::new();
        accept_all(&mut center);
        center
            .expect_remove_all_pending()
            .withf(|group_tag| group_tag == GROUP)
            .times(1)
            .return_const(());
        center.expect_remove_pending().never();

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let handle = dispatcher.schedule(30, GROUP);
        dispatcher.cancel_all_undelivered(GROUP);

        assert!(!dispatcher.is_live(&handle.identifier));
        assert!(!dispatcher.cancel(&handle));
    }

    #[tokio::test]
    async fn test_cancel_all_undelivered_keeps_other_groups() {
        let mut center = MockAlertCenter::new();
        accept_all(&mut center);
        center.expect_remove_all_pending().return_const(());
        center.expect_remove_pending().times(1).return_const(());

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let rest = dispatcher.schedule(30, GROUP);
        let other = dispatcher.schedule(30, "hydration");
        dispatcher.cancel_all_undelivered(GROUP);

        assert!(!dispatcher.is_live(&rest.identifier));
        assert!(dispatcher.is_live(&other.identifier));
        assert!(dispatcher.cancel(&other));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_huge_duration() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_clone = Arc::clone(&requests);

        let mut center = MockAlertCenter::new();
        center.expect_add().returning(move |request| {
            requests_clone.lock().unwrap().push(request.deliver_after_secs);
            futures::future::ready(Ok(())).boxed()
        });

        let mut dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        let now = Instant::now();
        let handle = dispatcher.schedule(u64::MAX, GROUP);

        assert_eq!(*requests.lock().unwrap(), vec![u64::MAX]);
        assert!(!handle.has_elapsed(now + Duration::from_secs(86400 * 365)));
        assert!(dispatcher.is_live(&handle.identifier));
    }

    #[tokio::test]
    async fn test_clear_delivered_forwards_group() {
        let mut center = MockAlertCenter::new();
        center
            .expect_remove_all_delivered()
            .withf(|group_tag| group_tag == GROUP)
            .times(1)
            .return_const(());

        let dispatcher = AlertDispatcher::new(Arc::new(center), create_content());
        dispatcher.clear_delivered(GROUP);
    }

    #[test]
    fn test_handle_has_elapsed() {
        let now = Instant::now();
        let handle = PendingAlertHandle {
            identifier: "id".to_string(),
            group_tag: GROUP.to_string(),
            scheduled_for: now + Duration::from_secs(10),
        };

        assert!(!handle.has_elapsed(now));
        assert!(handle.has_elapsed(now + Duration::from_secs(10)));
        assert!(handle.has_elapsed(now + Duration::from_secs(11)));
    }
}

//! User preferences consumed by the rest timer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::info;
use mockall::automock;

/// Shortest rest period the settings accept, in seconds.
pub const MIN_REST_DURATION_SECS: u64 = 30;
/// Longest rest period the settings accept, in seconds.
pub const MAX_REST_DURATION_SECS: u64 = 300;

/// Settings collaborator.
///
/// The rest timer reads the preferences and only writes
/// `notifications_enabled` when the user refuses the permission prompt.
#[automock]
pub trait Settings: Send + Sync {
    fn notifications_enabled(&self) -> bool;
    fn set_notifications_enabled(&self, enabled: bool);
    fn rest_duration_seconds(&self) -> u64;
}

/// Keeps a rest duration inside the accepted range.
pub fn clamp_rest_duration(seconds: u64) -> u64 {
    seconds.clamp(MIN_REST_DURATION_SECS, MAX_REST_DURATION_SECS)
}

/// Settings kept in memory for the lifetime of the process.
#[derive(Debug)]
pub struct InMemorySettings {
    notifications_enabled: AtomicBool,
    rest_duration_seconds: AtomicU64,
}

impl InMemorySettings {
    pub fn new(notifications_enabled: bool, rest_duration_seconds: u64) -> Self {
        InMemorySettings {
            notifications_enabled: AtomicBool::new(notifications_enabled),
            rest_duration_seconds: AtomicU64::new(clamp_rest_duration(rest_duration_seconds)),
        }
    }
}

impl Settings for InMemorySettings {
    fn notifications_enabled(&self) -> bool {
        self.notifications_enabled.load(Ordering::SeqCst)
    }

    fn set_notifications_enabled(&self, enabled: bool) {
        let previous = self.notifications_enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            info!("notifications preference set to {}", enabled);
        }
    }

    fn rest_duration_seconds(&self) -> u64 {
        self.rest_duration_seconds.load(Ordering::SeqCst)
    }
}

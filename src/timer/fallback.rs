//! In-process fallback alert.
//!
//! When scheduled alerts are not available, or as redundancy when they are,
//! the [`FallbackAlerter`] counts down inside the process and pulses the
//! haptic engine and plays a tone when the rest period is over.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use log::{debug, info};
use tokio::{task::JoinHandle, time};

/// Host haptic and audio surface.
pub trait SensoryOutput: Send + Sync {
    /// Fires one haptic impulse.
    fn pulse(&self);
    /// Plays one short system tone.
    fn play_tone(&self);
}

/// Whether the app is currently in the foreground.
///
/// Cloning shares the same flag.
#[derive(Debug, Clone)]
pub struct AppActivity {
    foreground: Arc<AtomicBool>,
}

impl AppActivity {
    pub fn new(foreground: bool) -> Self {
        AppActivity {
            foreground: Arc::new(AtomicBool::new(foreground)),
        }
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.store(foreground, Ordering::SeqCst);
    }
}

/// Best-effort countdown ending with a haptic pulse and a tone.
///
/// Only one countdown runs at a time: starting a new one aborts the previous
/// one, so a superseded rest timer never fires.
pub struct FallbackAlerter {
    /// Host haptic and audio surface
    output: Arc<dyn SensoryOutput>,
    /// Running countdown task, if any
    countdown: Option<JoinHandle<()>>,
}

impl FallbackAlerter {
    pub fn new(output: Arc<dyn SensoryOutput>) -> Self {
        FallbackAlerter {
            output,
            countdown: None,
        }
    }

    /// Starts a countdown of `duration` seconds.
    ///
    /// # Arguments
    ///
    /// * `duration` - Countdown length in seconds, at least one second
    /// * `suppress` - Evaluated at expiry; when it returns `true` nothing fires
    ///
    /// The wait happens in a detached task and never blocks the caller.
    pub fn start_countdown<F>(&mut self, duration: u64, suppress: F)
    where
        F: Fn() -> bool + Send + 'static,
    {
        self.cancel();

        let duration = duration.max(1);
        let output = Arc::clone(&self.output);

        debug!("starting fallback countdown of {} seconds", duration);
        let handle = tokio::spawn(async move {
            time::sleep(Duration::from_secs(duration)).await;

            if suppress() {
                info!("rest period over, fallback alert suppressed");
                return;
            }

            info!("rest period over, firing fallback alert");
            output.pulse();
            output.play_tone();
        });
        self.countdown = Some(handle);
    }

    /// Aborts the running countdown.
    ///
    /// # Returns
    ///
    /// `true` if a countdown was still running.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.countdown.take() else {
            return false;
        };

        let running = !handle.is_finished();
        handle.abort();
        if running {
            debug!("aborted running fallback countdown");
        }
        running
    }

    /// Whether a countdown is still waiting.
    pub fn is_running(&self) -> bool {
        self.countdown
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

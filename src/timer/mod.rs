//! Rest timer notification scheduler.
//!
//! Each time the user logs a set, a rest period starts and the user is alerted
//! exactly once when it is over. This module provides the pieces doing that:
//!
//! - [`AuthorizationGate`]: asks the host whether user-visible alerts are allowed
//! - [`AlertDispatcher`]: registers and cancels system-delivered alerts
//! - [`FallbackAlerter`]: in-process countdown ending with a vibration and a tone
//! - [`RestTimerController`]: picks the alert channels for each rest period
//! - [`lifecycle`]: host events and the task owning the controller
//!
//! # Architecture
//!
//! ```text
//!   UI ──TimerCommand──┐
//!                      ▼
//!              run_controller ──► RestTimerController ──► AuthorizationGate ──► host
//!                      ▲                    │        └──► AlertDispatcher ────► host
//!   host ─LifecycleEvent                    └───────────► FallbackAlerter ────► host
//! ```
//!
//! The host surfaces are traits ([`AuthorizationCenter`], [`AlertCenter`],
//! [`SensoryOutput`]) so that a platform, a console simulation or a mock can
//! stand behind them.

pub mod authorization;
pub mod controller;
pub mod dispatcher;
pub mod fallback;
pub mod lifecycle;
pub mod settings;

pub use crate::timer::authorization::{AuthorizationCenter, AuthorizationGate, AuthorizationState};
pub use crate::timer::controller::{RestTimerController, TimerOutcome, TimerState, TimerStatus};
pub use crate::timer::dispatcher::{AlertCenter, AlertContent, AlertDispatcher, AlertRequest};
pub use crate::timer::fallback::{AppActivity, FallbackAlerter, SensoryOutput};
pub use crate::timer::lifecycle::{
    LifecycleEvent, LifecycleEventSource, LifecycleSender, TimerCommand, run_controller,
};
pub use crate::timer::settings::{InMemorySettings, Settings};

//! Event activation subsystem.
//!
//! Decides which events are live, independent of any single request:
//!
//! - [`registry`] - authoritative map of live events, owner of the
//!   per-event rotation timers
//! - [`code`] - the rotating access code itself
//! - [`reconciler`] - periodic store/registry convergence
//! - [`bridge`] - immediate activation off the `event.created` bus event

pub mod bridge;
pub mod code;
pub mod reconciler;
pub mod registry;

pub use bridge::{ActivationBridge, ACTIVATION_EVENT_TYPES};
pub use code::AccessCode;
pub use reconciler::{ReconcileOutcome, ReconciliationLoop};
pub use registry::ActiveEventRegistry;

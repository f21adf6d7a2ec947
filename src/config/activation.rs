//! Event activation configuration
//!
//! Timing constants for the activation subsystem: the sliding active
//! window, the access-code rotation period, and the reconciliation
//! cadence. Defaults match the production values (15 minute buffer,
//! 30 second rotation, 60 second reconcile interval, 4-digit codes).

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Activation subsystem configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ActivationConfig {
    /// Minutes on either side of "now" that an event's schedule may
    /// intersect and still count as live
    #[serde(default = "default_buffer_mins")]
    pub window_buffer_mins: i64,

    /// Seconds between access-code rotations
    #[serde(default = "default_rotation_secs")]
    pub rotation_period_secs: u64,

    /// Seconds between reconciliation ticks against the store
    #[serde(default = "default_reconcile_secs")]
    pub reconcile_interval_secs: u64,

    /// Number of digits in the access code
    #[serde(default = "default_code_digits")]
    pub code_digits: u8,
}

impl ActivationConfig {
    /// Rotation period as a `Duration`
    pub fn rotation_period(&self) -> Duration {
        Duration::from_secs(self.rotation_period_secs)
    }

    /// Reconcile interval as a `Duration`
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }

    /// Validate activation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window_buffer_mins <= 0 {
            return Err(ValidationError::InvalidActivationWindow);
        }
        if self.rotation_period_secs == 0 || self.reconcile_interval_secs == 0 {
            return Err(ValidationError::InvalidActivationInterval);
        }
        if self.code_digits == 0 || self.code_digits > 9 {
            return Err(ValidationError::InvalidCodeDigits);
        }
        Ok(())
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            window_buffer_mins: default_buffer_mins(),
            rotation_period_secs: default_rotation_secs(),
            reconcile_interval_secs: default_reconcile_secs(),
            code_digits: default_code_digits(),
        }
    }
}

fn default_buffer_mins() -> i64 {
    15
}

fn default_rotation_secs() -> u64 {
    30
}

fn default_reconcile_secs() -> u64 {
    60
}

fn default_code_digits() -> u8 {
    4
}

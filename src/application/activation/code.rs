//! Rotating access codes.
//!
//! A code is a uniformly random fixed-width numeric string. There is no
//! collision avoidance and no history: only the latest code for an event
//! is valid, and validity ends at the next rotation.

use rand::Rng;
use std::fmt;

/// Short-lived numeric access code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCode(String);

impl AccessCode {
    /// Generates a uniformly random code of the given width.
    pub fn generate(digits: u8) -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..digits)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(code)
    }

    /// Builds a code from a known string, for tests.
    #[cfg(test)]
    pub fn from_str_unchecked(code: &str) -> Self {
        Self(code.to_string())
    }

    /// Exact comparison against a submitted code. No trimming, no
    /// normalization: `"0042"` and `"42"` are different codes.
    pub fn matches(&self, submitted: &str) -> bool {
        self.0 == submitted
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

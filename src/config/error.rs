//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Activation window buffer must be positive")]
    InvalidActivationWindow,

    #[error("Activation intervals must be non-zero")]
    InvalidActivationInterval,

    #[error("Access code length must be between 1 and 9 digits")]
    InvalidCodeDigits,

    #[error("JWT secret must be at least 32 bytes")]
    JwtSecretTooShort,
}

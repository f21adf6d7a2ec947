//! Event aggregate errors.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors raised by the event aggregate.
#[derive(Debug, Clone, Error)]
pub enum EventError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Event start must be before its end")]
    StartNotBeforeEnd,
}

impl From<EventError> for DomainError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation(v) => v.into(),
            EventError::StartNotBeforeEnd => {
                DomainError::new(ErrorCode::ValidationFailed, err.to_string())
            }
        }
    }
}

//! Foundation types shared across the domain.

mod auth;
mod errors;
mod events;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EnvelopeId, EventEnvelope, EventMetadata};
pub use ids::{EventId, UserId};
pub use timestamp::Timestamp;

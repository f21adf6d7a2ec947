//! JoinTokenStore port - single-use join tokens.
//!
//! The "join by link" flow mints a token that authorizes one check-in to
//! one event without a pre-existing account. Only these two entry points
//! are consumed here; completing the flow is deferred.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventId};

/// A single-use identity-minting credential tied to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinToken {
    pub token: String,
    pub email: String,
    pub event: EventId,
}

/// Port over the join-token collaborator.
#[async_trait]
pub trait JoinTokenStore: Send + Sync {
    /// Look up a token by its opaque value, `None` when missing.
    async fn find(&self, token: &str) -> Result<Option<JoinToken>, DomainError>;

    /// True when a token already exists for the email/event pair.
    async fn exists(&self, email: &str, event: &EventId) -> Result<bool, DomainError>;

    /// Mint a new token for the email/event pair.
    async fn mint(&self, email: &str, event: &EventId) -> Result<JoinToken, DomainError>;
}

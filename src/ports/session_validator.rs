//! Session validation port.
//!
//! Credential issuance lives with an external collaborator; this port is
//! the single seam through which a connection credential becomes an
//! identity. The gateway calls it once per connection, before upgrade.

use async_trait::async_trait;

use crate::domain::foundation::{AuthenticatedUser, AuthError};

/// Resolves a connection credential into an authenticated user.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature and standard claims
/// - Return `AuthError::InvalidToken` for malformed/bad-signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a session token and return the authenticated user.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

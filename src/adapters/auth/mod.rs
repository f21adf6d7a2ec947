//! Session validator adapters.
//!
//! - `jwt` - validates HS256 session tokens minted by the credential issuer
//! - `mock` - configurable validator for tests

mod jwt;
mod mock;

pub use jwt::JwtSessionValidator;
pub use mock::MockSessionValidator;

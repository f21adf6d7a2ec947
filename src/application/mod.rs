//! Application layer - use cases and background services.

pub mod activation;
pub mod handlers;

//! Event store adapters.
//!
//! The persistent store is an external collaborator; the in-memory
//! implementations here are the reference adapters used by tests and
//! single-process deployments.

mod in_memory;

pub use in_memory::{InMemoryEventStore, InMemoryJoinTokenStore};

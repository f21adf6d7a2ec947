//! Rollcall - Real-time event attendance backend.
//!
//! Organizers schedule events, attendees check in against a rotating
//! short-lived code, and both sides share a live chat room while the
//! event runs.

pub mod adapters;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;

//! Client connection state machine.
//!
//! Drives a connecting participant from `Loading` to a role-specific
//! view. Two independent asynchronous sources feed it - the one-shot
//! eligibility fetch against the store and the gateway's events - and
//! either may resolve first. The machine is a single reducer over a
//! tagged union of inputs, so there is no re-render race to lose: every
//! transition is a pure function of (state, input).

mod reducer;
mod state;

pub use reducer::ConnectionStateMachine;
pub use state::{Command, Eligibility, Input, Notice, NoticeKind, Role, ViewState};

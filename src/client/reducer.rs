//! The connection reducer.
//!
//! Gateway events arriving before the role is known are cached and
//! replayed after `EligibilityResolved`; nothing is acted on early, so
//! the view never flickers through a wrong state regardless of which
//! source resolves first.

use super::state::{Command, Eligibility, Input, Notice, Role, ViewState};

/// Reducer-driven state machine for one event-page session.
#[derive(Debug)]
pub struct ConnectionStateMachine {
    view: ViewState,
    eligibility: Option<Eligibility>,
    /// Gateway inputs that arrived before the role was known.
    pending: Vec<Input>,
    /// One-shot guard for the codeless auto-join. Never re-armed, so a
    /// re-applied eligibility result cannot double-submit.
    auto_join_emitted: bool,
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self {
            view: ViewState::Loading,
            eligibility: None,
            pending: Vec::new(),
            auto_join_emitted: false,
        }
    }

    /// The view to render right now.
    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Commands to run when the channel first opens: probe activity
    /// before anything else.
    pub fn on_connected(&self) -> Vec<Command> {
        vec![Command::EmitIsActive]
    }

    /// Apply one input and return the effects to perform.
    pub fn apply(&mut self, input: Input) -> Vec<Command> {
        // Terminal states ignore everything; only a full reload builds
        // a fresh machine.
        if self.view.is_terminal() {
            return Vec::new();
        }

        match input {
            Input::EligibilityResolved(eligibility) => self.resolve_eligibility(eligibility),
            gateway_input => {
                if self.eligibility.is_none() {
                    // Role unknown: cache, act later.
                    self.pending.push(gateway_input);
                    return Vec::new();
                }
                self.apply_gateway(gateway_input)
            }
        }
    }

    fn resolve_eligibility(&mut self, eligibility: Eligibility) -> Vec<Command> {
        let first_resolution = self.eligibility.is_none();
        self.eligibility = Some(eligibility);

        let mut commands = Vec::new();

        match eligibility.role {
            Role::Unauthorized => {
                self.view = ViewState::RedirectSignup;
                self.pending.clear();
                return commands;
            }
            Role::EventMissing => {
                self.view = ViewState::RedirectHome;
                self.pending.clear();
                return commands;
            }
            Role::Creator => {
                self.view = ViewState::Creator;
                if first_resolution {
                    commands.push(Command::EmitJoinCreator);
                }
            }
            Role::Attendee => {
                self.view = ViewState::AttendeeLobby;
                if eligibility.already_checked_in {
                    // Presence was already proven; re-entry needs no code.
                    if first_resolution {
                        commands.push(Command::EmitRejoin);
                    }
                } else if !eligibility.requires_code && !self.auto_join_emitted {
                    self.auto_join_emitted = true;
                    commands.push(Command::EmitCheckInNoCode);
                }
            }
        }

        // Replay whatever the gateway said while the role was unknown,
        // in arrival order.
        for input in std::mem::take(&mut self.pending) {
            commands.extend(self.apply_gateway(input));
            if self.view.is_terminal() {
                break;
            }
        }

        commands
    }

    fn apply_gateway(&mut self, input: Input) -> Vec<Command> {
        match input {
            Input::GatewayNotActive | Input::GatewayEventEnded => {
                self.view = ViewState::NotActive;
                Vec::new()
            }
            Input::GatewaySuccessJoin => {
                if self.view != ViewState::Creator {
                    self.view = ViewState::AttendeeChat;
                }
                vec![Command::Notify(Notice::success("Connection successful!"))]
            }
            Input::GatewayError(message) => {
                // Recoverable: notice only, prior view and room state stay.
                vec![Command::Notify(Notice::error(format!(
                    "Connection failed: {message}"
                )))]
            }
            Input::EligibilityResolved(_) => unreachable!("handled in apply"),
        }
    }
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

//! State, input, and command types for the connection state machine.

/// What the eligibility fetch resolved the user to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Creator,
    Attendee,
    /// No valid session; navigate to sign-up.
    Unauthorized,
    /// The event does not exist; navigate home.
    EventMissing,
}

/// Result of the one-shot eligibility fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    pub role: Role,
    pub requires_code: bool,
    pub already_checked_in: bool,
}

/// The view the machine wants rendered.
///
/// `NotActive` is terminal except via a full reload: there is no soft
/// "reconnect and retry" transition out of it. The two redirect states
/// are navigational exits and equally terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Creator,
    AttendeeLobby,
    AttendeeChat,
    NotActive,
    RedirectHome,
    RedirectSignup,
}

impl ViewState {
    /// True when no further input can change the view.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ViewState::NotActive | ViewState::RedirectHome | ViewState::RedirectSignup
        )
    }
}

/// Everything that can happen to the machine, from either source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The eligibility fetch resolved.
    EligibilityResolved(Eligibility),
    /// Gateway answered the `is_active` probe negatively.
    GatewayNotActive,
    /// Gateway granted chat membership.
    GatewaySuccessJoin,
    /// Gateway rejected an operation.
    GatewayError(String),
    /// Gateway announced the event's end.
    GatewayEventEnded,
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A dismissible notice; the recoverable half of the error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Effects the caller must perform; the machine itself never talks to
/// the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Probe whether the event is live.
    EmitIsActive,
    /// Join the creator code feed.
    EmitJoinCreator,
    /// Auto check-in for codeless events. Emitted at most once per
    /// machine, guarded against re-renders.
    EmitCheckInNoCode,
    /// Re-enter chat after a reconnect.
    EmitRejoin,
    /// Show a dismissible notice.
    Notify(Notice),
}

//! Session state machine.

use std::fmt;

/// Lifecycle state of the single television session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No connection attempt has been made (or the session was shut down).
    #[default]
    Idle,
    /// Opening the transport.
    Connecting,
    /// The device rejected us as untrusted; pairing is about to start.
    PairingRequired,
    /// A pairing code is displayed on the TV and we wait for the user.
    Pairing,
    /// Transport up and trusted.
    Connected,
    /// The last attempt failed.
    Failed(String),
}

impl SessionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - any -> Connecting (new attempt) and any -> Idle (shutdown)
    /// - Connecting -> Connected | PairingRequired | Failed
    /// - PairingRequired -> Pairing | Failed
    /// - Pairing -> Connected | Failed
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (_, Connecting)
                | (_, Idle)
                | (Connecting, Connected)
                | (Connecting, PairingRequired)
                | (Connecting, Failed(_))
                | (PairingRequired, Pairing)
                | (PairingRequired, Failed(_))
                | (Pairing, Connected)
                | (Pairing, Failed(_))
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: SessionState) -> crate::Result<()> {
        if self.can_transition_to(&target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::RemoteError::InvalidStateTransition {
                from: self.clone(),
                to: target,
            })
        }
    }

    /// Whether an attempt is underway (connecting or waiting on pairing).
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Connecting | SessionState::PairingRequired | SessionState::Pairing
        )
    }

    /// Whether the pairing flow is active.
    pub fn is_pairing(&self) -> bool {
        matches!(self, SessionState::PairingRequired | SessionState::Pairing)
    }

    /// Reason of the last failure, if in `Failed`.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            SessionState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Stable snake_case name for the HTTP surface.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::PairingRequired => "pairing_required",
            SessionState::Pairing => "pairing",
            SessionState::Connected => "connected",
            SessionState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Failed(reason) => write!(f, "failed ({})", reason),
            other => f.write_str(other.name()),
        }
    }
}

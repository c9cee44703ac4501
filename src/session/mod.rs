//! Television session management.
//!
//! This module provides the session state machine, the pairing code
//! handoff, and the controller that drives the device link through
//! connect, pairing and reconnect.

mod controller;
mod handoff;
mod state;

pub use controller::{
    Outcome, SessionController, SessionStatus, DEFAULT_ENTER_DELAY, ENTER_KEY,
};
pub use handoff::{HandoffResult, PairingHandoff, PendingCode, PAIRING_TIMEOUT};
pub use state::SessionState;

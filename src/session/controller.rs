//! Session lifecycle controller.
//!
//! Drives the device link through connect, pairing and reconnect, and is
//! the only component allowed to call the link's mutating operations.
//!
//! All mutable session data (state, pending handoff, attempt counter) sits
//! behind one mutex that is never held across an await. Every attempt is
//! numbered; a forced trigger starts a new number, and an older attempt
//! that resumes afterwards finds its number stale and leaves state alone.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::handoff::{HandoffResult, PairingHandoff, PAIRING_TIMEOUT};
use super::SessionState;
use crate::error::RemoteError;
use crate::link::{DeviceLink, InboundHook, LinkError};
use crate::Result;

/// Key sent after text when the caller asks for a trailing ENTER.
pub const ENTER_KEY: &str = "KEYCODE_ENTER";

/// Pause between text and the trailing ENTER so the TV applies the text first.
pub const DEFAULT_ENTER_DELAY: Duration = Duration::from_millis(500);

/// Result of one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Connected,
    /// Another non-forced attempt is already running; nothing was done.
    AlreadyInProgress,
    /// No pairing code arrived in time.
    Timeout,
    /// A forced trigger or shutdown took over while this attempt was running.
    Superseded,
    Error(String),
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    /// Cached state is `Connected` and the link reports a live transport.
    pub connected: bool,
    pub connecting: bool,
    pub pairing_in_progress: bool,
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    handoff: Option<PairingHandoff>,
    attempt: u64,
}

impl Inner {
    fn move_to(&mut self, target: SessionState) {
        if let Err(e) = self.state.transition_to(target) {
            warn!("{}", e);
        }
    }
}

/// Process-wide owner of the television session.
pub struct SessionController {
    link: Arc<dyn DeviceLink>,
    inner: Mutex<Inner>,
    pairing_timeout: Duration,
    enter_delay: Duration,
}

impl SessionController {
    pub fn new(link: Arc<dyn DeviceLink>) -> Self {
        Self {
            link,
            inner: Mutex::new(Inner::default()),
            pairing_timeout: PAIRING_TIMEOUT,
            enter_delay: DEFAULT_ENTER_DELAY,
        }
    }

    pub fn with_pairing_timeout(mut self, timeout: Duration) -> Self {
        self.pairing_timeout = timeout;
        self
    }

    pub fn with_enter_delay(mut self, delay: Duration) -> Self {
        self.enter_delay = delay;
        self
    }

    /// Install the hook that sees every inbound frame.
    pub fn install_inbound_hook(&self, hook: Arc<dyn InboundHook>) {
        self.link.set_inbound_hook(Some(hook));
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim a new attempt number, or `None` if a non-forced trigger hits a
    /// busy session.
    fn begin(&self, force: bool) -> Option<u64> {
        let mut inner = self.inner();
        if !force && inner.state.is_busy() {
            info!("Connection or pairing already in progress, skipping");
            return None;
        }
        if inner.handoff.take().is_some() {
            info!("Discarding pending pairing handoff");
        }
        inner.attempt += 1;
        inner.move_to(SessionState::Connecting);
        Some(inner.attempt)
    }

    /// Run a connection attempt to completion.
    pub async fn trigger(&self, force: bool) -> Outcome {
        match self.begin(force) {
            Some(attempt) => self.run_attempt(attempt).await,
            None => Outcome::AlreadyInProgress,
        }
    }

    /// Start a connection attempt in the background.
    ///
    /// The busy check and the move to `Connecting` happen before this
    /// returns; `None` means a non-forced trigger found an attempt running.
    pub fn spawn_trigger(self: &Arc<Self>, force: bool) -> Option<JoinHandle<Outcome>> {
        let attempt = self.begin(force)?;
        let controller = Arc::clone(self);
        Some(tokio::spawn(
            async move { controller.run_attempt(attempt).await },
        ))
    }

    async fn run_attempt(&self, attempt: u64) -> Outcome {
        info!(attempt, "Connecting to TV");

        let outcome = match self.link.connect().await {
            Ok(()) => self.finish(attempt, SessionState::Connected, Outcome::Connected),
            Err(e) if e.is_auth_required() => self.pair(attempt).await,
            Err(e) => self.fail(attempt, &e),
        };

        match &outcome {
            Outcome::Connected => info!(attempt, "Successfully connected to TV"),
            Outcome::Superseded => debug!(attempt, "Connection attempt superseded"),
            other => debug!(attempt, outcome = ?other, "Connection attempt ended"),
        }
        outcome
    }

    async fn pair(&self, attempt: u64) -> Outcome {
        if !self.settle(attempt, SessionState::PairingRequired) {
            return Outcome::Superseded;
        }
        info!(attempt, "Pairing required, starting pairing process");

        if let Err(e) = self.link.start_pairing().await {
            return self.fail(attempt, &e);
        }

        let pending = {
            let mut inner = self.inner();
            if inner.attempt != attempt {
                return Outcome::Superseded;
            }
            let (handoff, pending) = PairingHandoff::new();
            inner.handoff = Some(handoff);
            inner.move_to(SessionState::Pairing);
            pending
        };
        info!(attempt, "Waiting for pairing code from client");

        match pending.wait(self.pairing_timeout).await {
            HandoffResult::Code(code) => {
                debug!(attempt, "Received pairing code from client");
                self.complete_pairing(attempt, &code).await
            }
            HandoffResult::Expired => {
                error!(
                    attempt,
                    "Pairing code timeout - no code received within {:?}", self.pairing_timeout
                );
                let mut inner = self.inner();
                if inner.attempt != attempt {
                    return Outcome::Superseded;
                }
                inner.handoff = None;
                inner.move_to(SessionState::Failed("pairing timeout".into()));
                Outcome::Timeout
            }
            HandoffResult::Abandoned => Outcome::Superseded,
        }
    }

    async fn complete_pairing(&self, attempt: u64, code: &str) -> Outcome {
        if let Err(e) = self.link.finish_pairing(code).await {
            return self.fail(attempt, &e);
        }
        info!(attempt, "Pairing successful, attempting to connect");

        match self.link.connect().await {
            Ok(()) => self.finish(attempt, SessionState::Connected, Outcome::Connected),
            Err(e) => self.fail(attempt, &e),
        }
    }

    /// Apply `state` if `attempt` is still current.
    fn settle(&self, attempt: u64, state: SessionState) -> bool {
        let mut inner = self.inner();
        if inner.attempt != attempt {
            return false;
        }
        inner.move_to(state);
        true
    }

    fn finish(&self, attempt: u64, state: SessionState, outcome: Outcome) -> Outcome {
        if self.settle(attempt, state) {
            outcome
        } else {
            Outcome::Superseded
        }
    }

    fn fail(&self, attempt: u64, err: &LinkError) -> Outcome {
        let reason = err.to_string();
        if err.is_transport() {
            warn!(attempt, "TV unreachable: {}", reason);
        } else {
            error!(attempt, "Failed to connect to TV: {}", reason);
        }
        self.finish(
            attempt,
            SessionState::Failed(reason.clone()),
            Outcome::Error(reason),
        )
    }

    /// Hand a user-supplied pairing code to the waiting attempt.
    ///
    /// Returns false, changing nothing, when no attempt is waiting.
    pub fn submit_pairing_code(&self, code: &str) -> bool {
        let handoff = self.inner().handoff.take();
        match handoff {
            Some(handoff) => {
                if handoff.fulfil(code.to_string()) {
                    info!("Pairing code handed to waiting attempt");
                    true
                } else {
                    warn!("Received pairing code but the pairing attempt already ended");
                    false
                }
            }
            None => {
                warn!("Received pairing code but no pairing is waiting");
                false
            }
        }
    }

    /// Current cached state.
    pub fn state(&self) -> SessionState {
        self.inner().state.clone()
    }

    /// Current status, re-probing the live transport.
    pub fn status(&self) -> SessionStatus {
        let state = self.state();
        let connected = state == SessionState::Connected && self.link.is_connected();
        SessionStatus {
            connecting: state == SessionState::Connecting,
            pairing_in_progress: state.is_pairing(),
            connected,
            state,
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.status().connected {
            Ok(())
        } else {
            Err(RemoteError::NotConnected)
        }
    }

    /// Send a key press.
    pub fn send_key(&self, key_code: &str) -> Result<()> {
        self.ensure_connected()?;
        self.link.send_key(key_code).map_err(command_error)?;
        debug!("Sent key: {}", key_code);
        Ok(())
    }

    /// Launch an app.
    pub fn launch_app(&self, app_link: &str) -> Result<()> {
        self.ensure_connected()?;
        self.link.launch_app(app_link).map_err(command_error)?;
        info!("Launched app: {}", app_link);
        Ok(())
    }

    /// Send text, optionally followed by ENTER after a short pause.
    pub async fn send_text(&self, text: &str, send_enter: bool) -> Result<()> {
        self.ensure_connected()?;
        if text.is_empty() {
            return Err(RemoteError::Validation("No text provided".into()));
        }

        info!(len = text.len(), send_enter, "Sending text to TV");
        self.link.send_text(text).map_err(command_error)?;

        if send_enter {
            tokio::time::sleep(self.enter_delay).await;
            debug!("Sending trailing ENTER key");
            self.link.send_key(ENTER_KEY).map_err(command_error)?;
        }
        Ok(())
    }

    /// Abandon any attempt, forget pending pairing and close the link.
    pub fn shutdown(&self) {
        {
            let mut inner = self.inner();
            inner.attempt += 1;
            inner.handoff = None;
            inner.move_to(SessionState::Idle);
        }
        self.link.disconnect();
        info!("Device link disconnected");
    }
}

/// A closed transport means "not connected" to callers, not a server fault.
fn command_error(err: LinkError) -> RemoteError {
    match err {
        LinkError::LinkClosed => RemoteError::NotConnected,
        other => RemoteError::Link(other),
    }
}

//! Pairing code handoff.
//!
//! The pairing task parks on a [`PendingCode`] while the TV shows a code;
//! the HTTP request that carries the code fulfils the matching
//! [`PairingHandoff`]. Each side is single-use.

use std::time::Duration;

use tokio::sync::oneshot;

/// How long the user has to type the code shown on the TV.
pub const PAIRING_TIMEOUT: Duration = Duration::from_secs(120);

/// Sending half, held by the controller until a code arrives.
#[derive(Debug)]
pub struct PairingHandoff {
    tx: oneshot::Sender<String>,
}

/// Receiving half, awaited by the pairing task.
#[derive(Debug)]
pub struct PendingCode {
    rx: oneshot::Receiver<String>,
}

/// How a pending code wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffResult {
    /// The user submitted a code.
    Code(String),
    /// The deadline passed first.
    Expired,
    /// The handoff was discarded before any code arrived.
    Abandoned,
}

impl PairingHandoff {
    pub fn new() -> (Self, PendingCode) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, PendingCode { rx })
    }

    /// Deliver the code. False when the waiting side is already gone.
    pub fn fulfil(self, code: String) -> bool {
        self.tx.send(code).is_ok()
    }
}

impl PendingCode {
    /// Wait for the code, at most `deadline`.
    ///
    /// A code that was accepted by [`PairingHandoff::fulfil`] is always
    /// returned, even when it landed as the deadline fired.
    pub async fn wait(mut self, deadline: Duration) -> HandoffResult {
        match tokio::time::timeout(deadline, &mut self.rx).await {
            Ok(Ok(code)) => HandoffResult::Code(code),
            Ok(Err(_)) => HandoffResult::Abandoned,
            Err(_) => {
                // Closing first means any later fulfil fails, so the caller
                // who submitted sees the rejection.
                self.rx.close();
                match self.rx.try_recv() {
                    Ok(code) => HandoffResult::Code(code),
                    Err(_) => HandoffResult::Expired,
                }
            }
        }
    }
}

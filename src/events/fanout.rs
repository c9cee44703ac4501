//! Broadcast-and-clear waiter registry.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use super::WaiterId;

/// How long a long-poll request is held before answering with a keepalive.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Event type returned when a wait times out.
pub const KEEPALIVE_EVENT: &str = "keepalive";

/// A discrete event delivered to long-poll observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanoutEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl FanoutEvent {
    pub fn new(event_type: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    pub fn keepalive() -> Self {
        Self::new(KEEPALIVE_EVENT, None)
    }
}

struct Waiter {
    id: WaiterId,
    tx: oneshot::Sender<FanoutEvent>,
}

/// Registry of parked long-poll requests.
///
/// Registration and the broadcast's snapshot-and-clear take the same lock,
/// so a waiter is either in the snapshot of a concurrent broadcast or
/// registered after it; never lost in between.
#[derive(Default)]
pub struct EventFanout {
    waiters: Mutex<Vec<Waiter>>,
}

/// Removes its waiter from the registry when dropped, so an abandoned
/// long-poll (client hung up) does not linger until the next broadcast.
struct Registration<'a> {
    fanout: &'a EventFanout,
    id: WaiterId,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.fanout.deregister(self.id);
    }
}

impl EventFanout {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Vec<Waiter>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self) -> (Registration<'_>, oneshot::Receiver<FanoutEvent>) {
        let (tx, rx) = oneshot::channel();
        let id = WaiterId::next();
        self.registry().push(Waiter { id, tx });
        trace!(waiter = %id, "long-poll waiter registered");
        (Registration { fanout: self, id }, rx)
    }

    fn deregister(&self, id: WaiterId) {
        self.registry().retain(|w| w.id != id);
    }

    /// Park until the next broadcast or until `timeout` elapses.
    ///
    /// Returns the broadcast event, or a keepalive event on timeout. The
    /// waiter is out of the registry by the time this returns.
    pub async fn wait(&self, timeout: Duration) -> FanoutEvent {
        let (registration, mut rx) = self.register();

        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(event)) => event,
            Ok(Err(_)) => FanoutEvent::keepalive(),
            Err(_) => {
                let id = registration.id;
                drop(registration);
                // A broadcast may have taken this waiter between the deadline
                // firing and deregistration; its event is already in the slot.
                match rx.try_recv() {
                    Ok(event) => event,
                    Err(_) => {
                        trace!(waiter = %id, "long-poll waiter timed out");
                        FanoutEvent::keepalive()
                    }
                }
            }
        }
    }

    /// Resolve every registered waiter with the same event and clear the
    /// registry. Returns how many waiters received it.
    pub fn broadcast<T: Serialize>(&self, event_type: &str, payload: &T) -> usize {
        let data = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to serialize {} payload: {}", event_type, e);
                return 0;
            }
        };
        self.broadcast_event(FanoutEvent::new(event_type, Some(data)))
    }

    /// Broadcast a pre-built event.
    pub fn broadcast_event(&self, event: FanoutEvent) -> usize {
        let waiters = std::mem::take(&mut *self.registry());

        let delivered = waiters
            .into_iter()
            .filter_map(|w| w.tx.send(event.clone()).ok())
            .count();

        debug!(
            event = %event.event_type,
            delivered,
            "event broadcast to long-poll waiters"
        );
        delivered
    }

    /// Number of currently parked waiters.
    pub fn waiter_count(&self) -> usize {
        self.registry().len()
    }
}

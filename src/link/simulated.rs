//! In-process television simulator.
//!
//! Behaves like a paired-or-not Android TV: it refuses connections from an
//! untrusted client, displays a pairing code, accepts commands only while
//! the transport is up, and speaks a JSON encoding of [`RemoteMessage`].
//! Every call is journaled so callers can assert on exactly what the link
//! was asked to do.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, trace};

use super::{dispatch_inbound, DeviceLink, InboundHook, LinkError, MessageSink, RemoteMessage};

/// Simulator behaviour.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Code the simulated screen displays during pairing.
    pub pairing_code: String,
    /// Whether the client starts out untrusted.
    pub require_pairing: bool,
    /// Artificial latency of `connect`.
    pub connect_delay: Duration,
    /// Refuse every connection attempt.
    pub unreachable: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            pairing_code: "A1B2C3".to_string(),
            require_pairing: true,
            connect_delay: Duration::ZERO,
            unreachable: false,
        }
    }
}

impl SimulatorConfig {
    /// A device that already trusts this client.
    pub fn paired() -> Self {
        Self {
            require_pairing: false,
            ..Default::default()
        }
    }
}

/// One journaled interaction with the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCall {
    Connect,
    StartPairing,
    FinishPairing(String),
    SendText(String),
    Sent(RemoteMessage),
    Delivered(Vec<u8>),
    Disconnect,
}

#[derive(Debug, Default)]
struct Device {
    paired: bool,
    live: bool,
    pairing_open: bool,
    unreachable: bool,
    journal: Vec<LinkCall>,
}

/// Simulated television implementing [`DeviceLink`].
pub struct SimulatedTv {
    config: SimulatorConfig,
    device: Mutex<Device>,
    hook: RwLock<Option<Arc<dyn InboundHook>>>,
}

impl SimulatedTv {
    pub fn new(config: SimulatorConfig) -> Self {
        let device = Device {
            paired: !config.require_pairing,
            unreachable: config.unreachable,
            ..Default::default()
        };
        Self {
            config,
            device: Mutex::new(device),
            hook: RwLock::new(None),
        }
    }

    fn device(&self) -> MutexGuard<'_, Device> {
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the call journal, oldest first.
    pub fn calls(&self) -> Vec<LinkCall> {
        self.device().journal.clone()
    }

    /// Number of journaled calls matching a predicate.
    pub fn count_calls<F>(&self, predicate: F) -> usize
    where
        F: Fn(&LinkCall) -> bool,
    {
        self.device().journal.iter().filter(|c| predicate(c)).count()
    }

    /// Whether the simulated device trusts this client.
    pub fn is_paired(&self) -> bool {
        self.device().paired
    }

    /// Kill the transport without telling anyone, like a TV going to sleep.
    pub fn drop_connection(&self) {
        self.device().live = false;
    }

    /// Make subsequent connection attempts fail (or succeed again).
    pub fn set_unreachable(&self, unreachable: bool) {
        self.device().unreachable = unreachable;
    }

    /// Encode a message in the simulator's wire format.
    pub fn encode(message: &RemoteMessage) -> Vec<u8> {
        serde_json::to_vec(message).unwrap_or_default()
    }

    /// Feed a raw frame as if the television had sent it.
    pub fn inject(&self, raw: &[u8]) {
        let hook = self
            .hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        dispatch_inbound(hook.as_deref(), self, raw, |raw| self.deliver(raw));
    }

    /// Default handling of an inbound frame: journal it and answer pings.
    fn deliver(&self, raw: &[u8]) {
        trace!("simulated link: default handling of {} bytes", raw.len());
        self.device().journal.push(LinkCall::Delivered(raw.to_vec()));

        if let Ok(RemoteMessage::Ping { val }) = self.decode(raw) {
            if let Err(e) = self.send_message(RemoteMessage::Pong { val }) {
                debug!("simulated link: pong not sent: {}", e);
            }
        }
    }

    /// Feed a message as if the television had sent it.
    pub fn inject_message(&self, message: &RemoteMessage) {
        self.inject(&Self::encode(message));
    }

    fn record_command(&self, call: LinkCall) -> Result<(), LinkError> {
        let mut device = self.device();
        if !device.live {
            return Err(LinkError::LinkClosed);
        }
        device.journal.push(call);
        Ok(())
    }
}

impl Default for SimulatedTv {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl MessageSink for SimulatedTv {
    fn decode(&self, raw: &[u8]) -> Result<RemoteMessage, LinkError> {
        serde_json::from_slice(raw).map_err(|e| LinkError::Protocol(e.to_string()))
    }

    fn send_message(&self, message: RemoteMessage) -> Result<(), LinkError> {
        trace!(kind = message.kind(), "simulated link: message sent");
        self.record_command(LinkCall::Sent(message))
    }
}

#[async_trait]
impl DeviceLink for SimulatedTv {
    async fn connect(&self) -> Result<(), LinkError> {
        self.device().journal.push(LinkCall::Connect);

        if !self.config.connect_delay.is_zero() {
            tokio::time::sleep(self.config.connect_delay).await;
        }

        let mut device = self.device();
        if device.unreachable {
            return Err(LinkError::CannotConnect("host unreachable".into()));
        }
        if !device.paired {
            return Err(LinkError::AuthRequired);
        }
        device.live = true;
        debug!("simulated link: transport up");
        Ok(())
    }

    async fn start_pairing(&self) -> Result<(), LinkError> {
        let mut device = self.device();
        device.journal.push(LinkCall::StartPairing);
        if device.unreachable {
            return Err(LinkError::CannotConnect("host unreachable".into()));
        }
        device.pairing_open = true;
        info!(
            "simulated TV displays pairing code {}",
            self.config.pairing_code
        );
        Ok(())
    }

    async fn finish_pairing(&self, code: &str) -> Result<(), LinkError> {
        let mut device = self.device();
        device.journal.push(LinkCall::FinishPairing(code.to_string()));
        if !device.pairing_open {
            return Err(LinkError::Pairing("no pairing in progress".into()));
        }
        device.pairing_open = false;
        if !code.eq_ignore_ascii_case(&self.config.pairing_code) {
            return Err(LinkError::Pairing("invalid pairing code".into()));
        }
        device.paired = true;
        Ok(())
    }

    fn send_key(&self, key_code: &str) -> Result<(), LinkError> {
        self.send_message(RemoteMessage::key(key_code))
    }

    fn send_text(&self, text: &str) -> Result<(), LinkError> {
        self.record_command(LinkCall::SendText(text.to_string()))
    }

    fn launch_app(&self, app_link: &str) -> Result<(), LinkError> {
        self.send_message(RemoteMessage::app_link(app_link))
    }

    fn disconnect(&self) {
        let mut device = self.device();
        device.live = false;
        device.journal.push(LinkCall::Disconnect);
    }

    fn is_connected(&self) -> bool {
        self.device().live
    }

    fn set_inbound_hook(&self, hook: Option<Arc<dyn InboundHook>>) {
        *self.hook.write().unwrap_or_else(PoisonError::into_inner) = hook;
    }
}

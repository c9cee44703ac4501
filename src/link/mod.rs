//! Device link abstraction.
//!
//! The device link owns the transport to the television: connection setup,
//! the pairing exchange, the message codec and the outbound command channel.
//! The session controller drives it through the [`DeviceLink`] trait; the
//! message interceptor sees inbound traffic through an [`InboundHook`].
//!
//! Connection and pairing are async because they involve round trips.
//! Command sends are synchronous: they queue a frame on an open transport
//! and fail fast with [`LinkError::LinkClosed`] when there is none.

mod message;
mod simulated;

pub use message::{ImeAckContext, ImeBatchEdit, ImeEdit, RemoteMessage, TextFieldStatus};
pub use simulated::{LinkCall, SimulatedTv, SimulatorConfig};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a device link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The device does not trust this client; pairing is needed.
    #[error("authentication required")]
    AuthRequired,

    /// The transport was closed by either side.
    #[error("connection closed")]
    LinkClosed,

    /// The device could not be reached.
    #[error("cannot connect: {0}")]
    CannotConnect(String),

    /// The pairing exchange was rejected.
    #[error("pairing failed: {0}")]
    Pairing(String),

    /// A message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl LinkError {
    /// Whether this failure should start the pairing flow.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// Whether this failure means the transport is gone.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::LinkClosed | Self::CannotConnect(_))
    }
}

/// Message schema and outbound channel of a link.
///
/// This is the narrow view handed to inbound hooks: enough to understand a
/// message and answer it, nothing that changes the session.
pub trait MessageSink: Send + Sync {
    /// Decode one raw inbound frame.
    fn decode(&self, raw: &[u8]) -> Result<RemoteMessage, LinkError>;

    /// Encode and queue one protocol message.
    fn send_message(&self, message: RemoteMessage) -> Result<(), LinkError>;
}

/// Remote-control capability of a single television.
#[async_trait]
pub trait DeviceLink: MessageSink {
    /// Open the transport. Fails with [`LinkError::AuthRequired`] when the
    /// device has not paired with this client.
    async fn connect(&self) -> Result<(), LinkError>;

    /// Ask the device to display a pairing code.
    async fn start_pairing(&self) -> Result<(), LinkError>;

    /// Complete pairing with the code the user read off the screen.
    async fn finish_pairing(&self, code: &str) -> Result<(), LinkError>;

    /// Send a key press, e.g. `KEYCODE_HOME`.
    fn send_key(&self, key_code: &str) -> Result<(), LinkError>;

    /// Send text to the focused input field.
    fn send_text(&self, text: &str) -> Result<(), LinkError>;

    /// Launch an app by package name or deep link.
    fn launch_app(&self, app_link: &str) -> Result<(), LinkError>;

    /// Close the transport. Idempotent.
    fn disconnect(&self);

    /// Probe the live transport rather than any cached flag.
    fn is_connected(&self) -> bool;

    /// Install (or clear) the hook run on every inbound frame.
    fn set_inbound_hook(&self, hook: Option<Arc<dyn InboundHook>>);
}

/// Observer of raw inbound frames, run before the link's own handling.
pub trait InboundHook: Send + Sync {
    fn on_inbound(&self, sink: &dyn MessageSink, raw: &[u8]);
}

/// Run the inbound hook, then the link's default handling, for one frame.
///
/// Link implementations route every received frame through this so the
/// default handler always sees the frame, whatever the hook did with it.
pub fn dispatch_inbound<F>(
    hook: Option<&dyn InboundHook>,
    sink: &dyn MessageSink,
    raw: &[u8],
    default: F,
) where
    F: FnOnce(&[u8]),
{
    if let Some(hook) = hook {
        hook.on_inbound(sink, raw);
    }
    default(raw);
}

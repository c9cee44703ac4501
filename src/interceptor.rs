//! Inbound message interception.
//!
//! When a text field gains focus the television sends a keyboard-show
//! request. Unless some client answers it, the TV pops up its own "use your
//! phone as a keyboard" prompt. The interceptor tells long-poll observers
//! about the request and answers it with an empty edit so the session
//! stays ours.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::events::EventFanout;
use crate::link::{
    ImeAckContext, ImeBatchEdit, InboundHook, MessageSink, RemoteMessage, TextFieldStatus,
};

/// Event type broadcast for keyboard-show requests.
pub const IME_SHOW_EVENT: &str = "ime_show";

/// Payload of an [`IME_SHOW_EVENT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImeShowPayload {
    pub value: String,
    pub label: String,
    pub start: i32,
    pub end: i32,
}

impl From<&TextFieldStatus> for ImeShowPayload {
    fn from(field: &TextFieldStatus) -> Self {
        Self {
            value: field.value.clone(),
            label: field.label.clone(),
            start: field.start,
            end: field.end,
        }
    }
}

/// Inbound hook that claims on-device keyboard sessions.
pub struct ImeInterceptor {
    fanout: Arc<EventFanout>,
}

impl ImeInterceptor {
    pub fn new(fanout: Arc<EventFanout>) -> Self {
        Self { fanout }
    }

    fn claim_keyboard(&self, sink: &dyn MessageSink, field: &TextFieldStatus) {
        // Observers hear about the request even if the ack below fails.
        let notified = self
            .fanout
            .broadcast(IME_SHOW_EVENT, &ImeShowPayload::from(field));
        info!(
            counter = field.counter,
            label = %field.label,
            notified,
            "TV requested keyboard input"
        );

        let ack = ImeBatchEdit::acknowledge(ImeAckContext::from(field));
        if let Err(e) = sink.send_message(RemoteMessage::ImeBatchEdit(ack)) {
            warn!(counter = field.counter, "Failed to acknowledge keyboard request: {}", e);
        }
    }
}

impl InboundHook for ImeInterceptor {
    fn on_inbound(&self, sink: &dyn MessageSink, raw: &[u8]) {
        let message = match sink.decode(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!("Could not inspect inbound message ({} bytes): {}", raw.len(), e);
                return;
            }
        };

        if let RemoteMessage::ImeShowRequest { field } = message {
            self.claim_keyboard(sink, &field);
        }
    }
}

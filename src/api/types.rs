//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::config::AppShortcut;
use crate::session::SessionStatus;

/// Response for `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Session state name (e.g. "pairing").
    pub state: String,
    /// Live connection (cached state confirmed by the transport).
    pub connected: bool,
    pub pairing_in_progress: bool,
    pub connecting: bool,
    /// Reason of the last failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tv_name: String,
    pub apps: Vec<AppShortcut>,
}

impl StatusResponse {
    pub fn new(status: &SessionStatus, tv_name: String, apps: Vec<AppShortcut>) -> Self {
        Self {
            state: status.state.name().to_string(),
            connected: status.connected,
            pairing_in_progress: status.pairing_in_progress,
            connecting: status.connecting,
            error: status.state.failure_reason().map(str::to_string),
            tv_name,
            apps,
        }
    }
}

/// Simple `{"status": ...}` acknowledgment.
#[derive(Debug, Clone, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
}

impl StatusMessage {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }

    pub fn connecting() -> Self {
        Self {
            status: "connecting",
        }
    }

    pub fn submitted() -> Self {
        Self {
            status: "submitted",
        }
    }
}

/// Request to submit a pairing code.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PairingCodeRequest {
    #[serde(default)]
    pub code: Option<String>,
}

/// Request to send a key press.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SendKeyRequest {
    /// Key code name, e.g. `KEYCODE_DPAD_UP`.
    #[serde(default)]
    pub key: Option<String>,
}

/// Request to send text.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SendTextRequest {
    #[serde(default)]
    pub text: String,
    /// Press ENTER after the text.
    #[serde(default)]
    pub enter: bool,
}

/// Request to launch an app.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LaunchAppRequest {
    /// Package name or deep link.
    #[serde(default)]
    pub app_id: Option<String>,
}

/// API error response: `{"error": ...}`, with `"type"` for server faults.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error category, set for internal errors.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: None,
        }
    }

    pub fn not_connected() -> Self {
        Self::new("Not connected to TV")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            kind: Some("internal_error".to_string()),
        }
    }
}

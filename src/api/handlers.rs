//! REST API handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

use super::types::{
    ErrorResponse, LaunchAppRequest, PairingCodeRequest, SendKeyRequest, SendTextRequest,
    StatusMessage, StatusResponse,
};
use crate::config::{Config, TvSection, TvSource};
use crate::error::RemoteError;
use crate::events::{EventFanout, FanoutEvent, DEFAULT_WAIT_TIMEOUT};
use crate::interceptor::ImeInterceptor;
use crate::link::DeviceLink;
use crate::session::{SessionController, DEFAULT_ENTER_DELAY, PAIRING_TIMEOUT};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Tunables for the shared state.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub pairing_timeout: Duration,
    /// How long `GET /api/events` is held before a keepalive.
    pub event_timeout: Duration,
    pub enter_delay: Duration,
    pub tv: TvSource,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            pairing_timeout: PAIRING_TIMEOUT,
            event_timeout: DEFAULT_WAIT_TIMEOUT,
            enter_delay: DEFAULT_ENTER_DELAY,
            tv: TvSource::fixed(TvSection::default()),
        }
    }
}

impl AppSettings {
    /// Settings from a loaded config. With `config_path` the `tv` section is
    /// re-read on every status request.
    pub fn from_config(config: &Config, config_path: Option<PathBuf>) -> Self {
        let tv = match config_path {
            Some(path) => TvSource::file(path, config.tv.clone()),
            None => TvSource::fixed(config.tv.clone()),
        };
        Self {
            pairing_timeout: config.timeouts.pairing(),
            event_timeout: config.timeouts.event_poll(),
            enter_delay: config.timeouts.enter_delay(),
            tv,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub fanout: Arc<EventFanout>,
    pub tv: Arc<TvSource>,
    pub event_timeout: Duration,
}

impl AppState {
    pub fn new(link: Arc<dyn DeviceLink>) -> Self {
        Self::with_settings(link, AppSettings::default())
    }

    /// Build the controller and event fanout, and wire the IME interceptor
    /// into the link.
    pub fn with_settings(link: Arc<dyn DeviceLink>, settings: AppSettings) -> Self {
        let fanout = Arc::new(EventFanout::new());
        let controller = SessionController::new(link)
            .with_pairing_timeout(settings.pairing_timeout)
            .with_enter_delay(settings.enter_delay);
        controller.install_inbound_hook(Arc::new(ImeInterceptor::new(Arc::clone(&fanout))));

        Self {
            controller: Arc::new(controller),
            fanout,
            tv: Arc::new(settings.tv),
            event_timeout: settings.event_timeout,
        }
    }
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(message)),
    )
}

fn request_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| bad_request(&rejection.body_text()))
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| bad_request(message))
}

fn map_error(err: RemoteError) -> ApiError {
    if !err.is_client_error() {
        error!("Request failed: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error(err.to_string())),
        );
    }
    match err {
        RemoteError::Validation(message) => bad_request(&message),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::not_connected()),
        ),
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// Session status plus the current TV name and app shortcuts.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.controller.status();
    let tv = state.tv.current().await;
    Json(StatusResponse::new(&session, tv.name, tv.apps))
}

/// Force a fresh connection attempt in the background.
pub async fn connect(State(state): State<AppState>) -> Json<StatusMessage> {
    info!("Connection requested");
    state.controller.spawn_trigger(true);
    Json(StatusMessage::connecting())
}

/// Hand a pairing code to the waiting attempt.
pub async fn pairing_code(
    State(state): State<AppState>,
    body: Result<Json<PairingCodeRequest>, JsonRejection>,
) -> Result<Json<StatusMessage>, ApiError> {
    let req = request_body(body)?;
    let code = required(req.code, "No pairing code provided")?;

    if state.controller.submit_pairing_code(&code) {
        Ok(Json(StatusMessage::submitted()))
    } else {
        Err(bad_request("Not waiting for pairing code"))
    }
}

/// Send a single key press.
pub async fn send_key(
    State(state): State<AppState>,
    body: Result<Json<SendKeyRequest>, JsonRejection>,
) -> Result<Json<StatusMessage>, ApiError> {
    let req = request_body(body)?;
    let key = required(req.key, "No key provided")?;

    state.controller.send_key(&key).map_err(map_error)?;
    Ok(Json(StatusMessage::ok()))
}

/// Type text, optionally followed by ENTER.
pub async fn send_text(
    State(state): State<AppState>,
    body: Result<Json<SendTextRequest>, JsonRejection>,
) -> Result<Json<StatusMessage>, ApiError> {
    let req = request_body(body)?;

    state
        .controller
        .send_text(&req.text, req.enter)
        .await
        .map_err(map_error)?;
    Ok(Json(StatusMessage::ok()))
}

/// Launch an app by package name or deep link.
pub async fn launch_app(
    State(state): State<AppState>,
    body: Result<Json<LaunchAppRequest>, JsonRejection>,
) -> Result<Json<StatusMessage>, ApiError> {
    let req = request_body(body)?;
    let app_id = required(req.app_id, "No app_id provided")?;

    state.controller.launch_app(&app_id).map_err(map_error)?;
    Ok(Json(StatusMessage::ok()))
}

/// Long-poll for the next event; answers with a keepalive on timeout.
pub async fn events(State(state): State<AppState>) -> Json<FanoutEvent> {
    Json(state.fanout.wait(state.event_timeout).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkError;

    #[test]
    fn test_map_error_client_errors() {
        let (status, Json(body)) = map_error(RemoteError::NotConnected);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Not connected to TV");
        assert!(body.kind.is_none());

        let (status, Json(body)) = map_error(RemoteError::Validation("No text provided".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "No text provided");
    }

    #[test]
    fn test_map_error_internal() {
        let err = RemoteError::Link(LinkError::Protocol("bad frame".into()));
        let (status, Json(body)) = map_error(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.kind.as_deref(), Some("internal_error"));
        assert!(body.error.contains("bad frame"));
    }

    #[test]
    fn test_required_rejects_empty() {
        assert!(required(None, "No key provided").is_err());
        assert!(required(Some(String::new()), "No key provided").is_err());
        assert_eq!(
            required(Some("KEYCODE_HOME".into()), "No key provided").unwrap(),
            "KEYCODE_HOME"
        );
    }

    #[tokio::test]
    async fn test_settings_from_config() {
        let mut config = Config::default();
        config.timeouts.pairing_secs = 5;
        config.timeouts.enter_delay_ms = 10;
        config.tv.name = "Den".into();

        let settings = AppSettings::from_config(&config, None);
        assert_eq!(settings.pairing_timeout, Duration::from_secs(5));
        assert_eq!(settings.enter_delay, Duration::from_millis(10));
        assert_eq!(settings.event_timeout, Duration::from_secs(30));
        assert_eq!(settings.tv.current().await.name, "Den");
    }
}

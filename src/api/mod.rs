//! HTTP API for droidtv-remote.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/status` - Session state, TV name and app shortcuts
//! - `POST /api/connect` - Force a fresh connection attempt
//! - `POST /api/pairing_code` - Submit the code shown on the TV
//! - `POST /api/send_key` - Send a key press
//! - `POST /api/send_text` - Type text, optionally followed by ENTER
//! - `POST /api/launch_app` - Launch an app
//! - `GET /api/events` - Long-poll for the next event (keyboard requests)
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use droidtv_remote::api::{serve, AppState, ServerConfig};
//! use droidtv_remote::link::{SimulatedTv, SimulatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> droidtv_remote::Result<()> {
//!     let link = Arc::new(SimulatedTv::new(SimulatorConfig::default()));
//!     let config = ServerConfig::new("127.0.0.1", 7503);
//!     serve(config, AppState::new(link)).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::{AppSettings, AppState};
pub use router::{create_router, serve, ServerConfig};
pub use types::{
    ErrorResponse, LaunchAppRequest, PairingCodeRequest, SendKeyRequest, SendTextRequest,
    StatusMessage, StatusResponse,
};

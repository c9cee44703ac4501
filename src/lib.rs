//! # droidtv-remote
//!
//! Local HTTP remote control for a single Android TV.
//!
//! One [`SessionController`] owns the connection to the television. It
//! drives connect and pairing, reconnects on demand, and hands the pairing
//! code typed into the web UI to the attempt that is waiting for it.
//! Keyboard requests from the TV are acknowledged right away and
//! announced to every client long-polling `/api/events`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use droidtv_remote::{AppState, Outcome, SimulatedTv, SimulatorConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tv = Arc::new(SimulatedTv::new(SimulatorConfig::paired()));
//!     let state = AppState::new(tv);
//!
//!     assert_eq!(state.controller.trigger(false).await, Outcome::Connected);
//!     state.controller.send_key("KEYCODE_HOME").ok();
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod interceptor;
pub mod link;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use api::{AppSettings, AppState, ServerConfig};
pub use config::{AppShortcut, Config, TvSection, TvSource};
pub use error::{RemoteError, Result};
pub use events::{EventFanout, FanoutEvent};
pub use interceptor::ImeInterceptor;
pub use link::{DeviceLink, InboundHook, LinkError, MessageSink, SimulatedTv, SimulatorConfig};
pub use session::{Outcome, SessionController, SessionState, SessionStatus};

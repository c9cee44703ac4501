//! Logging initialization.

use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

const DEFAULT_FILTER: &str = "droidtv_remote=info";

/// Install the global subscriber for a configured level.
///
/// A bare level such as `debug` applies to this crate and to HTTP request
/// tracing; anything containing `=` or `,` is used as a full filter
/// directive. An unparsable directive falls back to `droidtv_remote=info`.
///
/// Fails if a global subscriber is already installed.
pub fn init_with_level(level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

fn filter_for(level: &str) -> EnvFilter {
    let directive = if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("droidtv_remote={level},tower_http={level}")
    };
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

//! droidtv-remote binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use droidtv_remote::{
    api, cli, logging, AppSettings, AppState, Config, SimulatedTv, SimulatorConfig,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'droidtv-remote --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_with_level(config.log_filter()) {
        eprintln!("warning: logging already initialized: {}", e);
    }

    info!("droidtv-remote v{}", env!("CARGO_PKG_VERSION"));

    let server_config = match config.to_server_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            error!("Invalid server configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut simulator = SimulatorConfig::default();
    if let Some(code) = args.pairing_code.clone() {
        simulator.pairing_code = code;
    }
    warn!(
        tv = %config.tv.name,
        ip = %config.tv.ip,
        "Using the simulated TV link; pairing code is {}",
        simulator.pairing_code
    );
    let link = Arc::new(SimulatedTv::new(simulator));

    let settings = AppSettings::from_config(&config, args.config.clone());
    let state = AppState::with_settings(link, settings);
    let controller = Arc::clone(&state.controller);

    if config.tv.auto_connect {
        info!("Starting initial connection attempt");
        controller.spawn_trigger(false);
    }

    let result = api::serve(server_config, state).await;
    controller.shutdown();

    match result {
        Ok(()) => {
            info!("droidtv-remote stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

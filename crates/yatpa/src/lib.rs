//! # yatpa - Host Entry Point
//!
//! Runs the teleport engine against a built-in flat world. This entry point
//! handles CLI parsing, configuration loading, logging and the application
//! lifecycle.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration
//! yatpa
//!
//! # Specify custom configuration and player data file
//! yatpa --config production.toml --store /var/lib/yatpa/players.json
//!
//! # Watch a scripted request, countdown and landing
//! yatpa --demo --log-level debug
//!
//! # JSON logging for production
//! yatpa --json-logs
//! ```
//!
//! ## Configuration
//!
//! The host loads configuration from a TOML file (default: `yatpa.toml`).
//! If the file doesn't exist, a default configuration will be created.
//!
//! ## Signal Handling
//!
//! The host shuts down gracefully on SIGINT (Ctrl+C) and SIGTERM (Unix),
//! flushing player data before it exits.

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod runtime;
pub mod signals;
pub mod store;
pub mod world;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Parses arguments, sets up logging, then builds and runs the application.
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, configuration, or runtime
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use config::{EffectSettings, LoggingSettings, ServerSettings, WorldSettings};
pub use error::AppError;

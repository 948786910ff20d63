//! Logging system setup and configuration.
//!
//! Console output is human-readable or JSON. When `logging.file_path` is set,
//! the same events are appended to that file without ANSI colours.

use crate::config::LoggingSettings;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initializes the logging system with the specified configuration.
///
/// `RUST_LOG` takes precedence over the configured level. `json_format` is the
/// CLI override and wins over the file setting when set.
pub fn setup_logging(config: &LoggingSettings, json_format: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let layers = build_layers(config, json_format || config.json_format)?;

    tracing_subscriber::registry().with(layers).with(filter).try_init()?;

    info!("🔧 Logging initialized with level: {}", config.level);
    if let Some(path) = &config.file_path {
        info!("📝 Also logging to {}", path);
    }
    Ok(())
}

/// Console layer plus an optional file layer.
fn build_layers(config: &LoggingSettings, json: bool) -> io::Result<Vec<BoxedLayer>> {
    let mut layers = vec![formatted(fmt::layer().with_ansi(!json), json)];

    if let Some(path) = config.file_path.as_deref().filter(|p| !p.trim().is_empty()) {
        let file = open_log_file(Path::new(path))?;
        layers.push(formatted(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)), json));
    }
    Ok(layers)
}

fn formatted<W>(layer: fmt::Layer<Registry, fmt::format::DefaultFields, fmt::format::Format, W>, json: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = layer.with_file(false).with_line_number(false).with_thread_ids(true).with_thread_names(true);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Opens `path` for appending, creating parent directories as needed.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Displays the startup banner using proper logging.
pub fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║              🌀 YATPA v{:<8}          ║", version);
    info!("║                                          ║");
    info!("║  Teleport requests and delayed travel    ║");
    info!("║                                          ║");
    info!("║  📨 Request broker with cooldowns        ║");
    info!("║  ⏳ Cancellable countdowns               ║");
    info!("║  🛟 Safe landing resolution              ║");
    info!("║  🏠 Homes, random and spawn teleports    ║");
    info!("║                                          ║");
    info!("╚══════════════════════════════════════════╝");
}

//! Configuration management for the yatpa host.
//!
//! This module handles loading and validation of the TOML configuration file.
//! The `[teleport]` table is the core's [`TeleportSettings`] verbatim; the
//! remaining tables describe the host itself.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use yatpa_core::{Effect, MessageKey, TeleportSettings};

/// Default tick interval for serde deserialization
fn default_tick_interval() -> u64 {
    50 // 20 ticks per second
}

fn default_purge_interval() -> u64 { 1000 }
fn default_store_path() -> String { "data/players.json".to_string() }
fn default_realm() -> String { "overworld".to_string() }
fn default_ground_height() -> i32 { 63 }
fn default_min_build_height() -> i32 { -64 }
fn default_max_build_height() -> i32 { 320 }
fn default_border_radius() -> i32 { 30_000 }
fn default_spawn_y() -> i32 { 64 }
fn default_log_level() -> String { "info".to_string() }

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub world: WorldSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub teleport: TeleportSettings,
    /// Message template overrides keyed by message key
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    /// Sound and particle names keyed by effect key
    #[serde(default)]
    pub effects: BTreeMap<String, EffectSettings>,
}

/// Host loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Scheduler tick interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// How often expired requests are purged, in milliseconds
    #[serde(default = "default_purge_interval")]
    pub purge_interval_ms: u64,
    /// Player data file
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Run the scripted scenario instead of waiting for a shutdown signal
    #[serde(default)]
    pub demo: bool,
}

/// Parameters of the built-in flat world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSettings {
    #[serde(default = "default_realm")]
    pub realm: String,
    /// Every block at or below this height is solid ground
    #[serde(default = "default_ground_height")]
    pub ground_height: i32,
    #[serde(default = "default_min_build_height")]
    pub min_build_height: i32,
    /// Exclusive upper build limit
    #[serde(default = "default_max_build_height")]
    pub max_build_height: i32,
    /// Half the side of the square world border, centred on 0,0
    #[serde(default = "default_border_radius")]
    pub border_radius: i32,
    #[serde(default)]
    pub spawn_x: i32,
    #[serde(default = "default_spawn_y")]
    pub spawn_y: i32,
    #[serde(default)]
    pub spawn_z: i32,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
    /// Log file appended to alongside stdout (None means stdout only)
    #[serde(default)]
    pub file_path: Option<String>,
}

/// What plays when an effect fires. Empty names play nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particle: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            purge_interval_ms: default_purge_interval(),
            store_path: default_store_path(),
            demo: false,
        }
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            ground_height: default_ground_height(),
            min_build_height: default_min_build_height(),
            max_build_height: default_max_build_height(),
            border_radius: default_border_radius(),
            spawn_x: 0,
            spawn_y: default_spawn_y(),
            spawn_z: 0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: default_log_level(), json_format: false, file_path: None }
    }
}

fn default_effects() -> BTreeMap<String, EffectSettings> {
    let entry = |sound: &str, particle: &str| EffectSettings {
        sound: Some(sound.to_string()),
        particle: Some(particle.to_string()),
    };
    BTreeMap::from([
        (Effect::RequestSent.as_str().to_string(), entry("UI_BUTTON_CLICK", "NOTE")),
        (Effect::RequestReceived.as_str().to_string(), entry("BLOCK_NOTE_BLOCK_PLING", "NOTE")),
        (Effect::Countdown.as_str().to_string(), entry("BLOCK_NOTE_BLOCK_HAT", "PORTAL")),
        (Effect::Success.as_str().to_string(), entry("ENTITY_ENDERMAN_TELEPORT", "PORTAL")),
        (Effect::Cancelled.as_str().to_string(), entry("BLOCK_NOTE_BLOCK_BASS", "SMOKE")),
    ])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            world: WorldSettings::default(),
            logging: LoggingSettings::default(),
            teleport: TeleportSettings::default(),
            messages: BTreeMap::new(),
            effects: default_effects(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the specified path
    /// and returns the default configuration.
    pub async fn load_from_file(path: &Path) -> Result<Self, AppError> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.server.store_path)
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.tick_interval_ms == 0 {
            return Err("server.tick_interval_ms must be greater than 0".to_string());
        }

        if self.server.purge_interval_ms == 0 {
            return Err("server.purge_interval_ms must be greater than 0".to_string());
        }

        if self.server.store_path.trim().is_empty() {
            return Err("server.store_path cannot be empty".to_string());
        }

        if self.world.realm.trim().is_empty() {
            return Err("world.realm cannot be empty".to_string());
        }

        if self.world.min_build_height >= self.world.max_build_height {
            return Err("world.min_build_height must be less than world.max_build_height".to_string());
        }

        if self.world.ground_height < self.world.min_build_height
            || self.world.ground_height >= self.world.max_build_height
        {
            return Err(format!(
                "world.ground_height ({}) must lie within the build limits",
                self.world.ground_height
            ));
        }

        if self.world.border_radius <= 0 {
            return Err("world.border_radius must be greater than 0".to_string());
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        if self.logging.file_path.as_deref().is_some_and(|path| path.trim().is_empty()) {
            return Err("logging.file_path cannot be empty; omit it to log to stdout only".to_string());
        }

        // Countdown seconds are counted in ticks, so the tick loop must run at
        // the configured rate (10% slack).
        let expected_ms = 1000 / u64::from(self.teleport.ticks_per_second.max(1));
        if self.server.tick_interval_ms.abs_diff(expected_ms) * 10 > expected_ms {
            return Err(format!(
                "server.tick_interval_ms ({}) does not match teleport.ticks_per_second ({}); expected about {}ms",
                self.server.tick_interval_ms, self.teleport.ticks_per_second, expected_ms
            ));
        }

        if let Some(unknown) = self
            .messages
            .keys()
            .find(|key| !MessageKey::ALL.iter().any(|known| known.as_str() == key.as_str()))
        {
            return Err(format!("Unknown message key: {unknown}"));
        }

        if let Some(unknown) = self
            .effects
            .keys()
            .find(|key| !Effect::ALL.iter().any(|known| known.as_str() == key.as_str()))
        {
            return Err(format!("Unknown effect key: {unknown}"));
        }

        self.teleport.validate()
    }
}

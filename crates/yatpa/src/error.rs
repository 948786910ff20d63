//! Host-level failures: configuration, IO and persistence.

use thiserror::Error;
use yatpa_core::{StoreError, TeleportError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Teleport error: {0}")]
    Teleport(#[from] TeleportError),

    #[error("Demo failed: {0}")]
    Demo(String),
}

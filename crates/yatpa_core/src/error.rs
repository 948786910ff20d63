//! Error types for teleport operations and player persistence.

use crate::config::Feature;
use crate::notice::{MessageKey, Substitutions};
use crate::types::ActorId;
use thiserror::Error;

/// Every locally recoverable failure a teleport operation can produce.
///
/// Each variant maps to a message key so the initiating actor can be told
/// what went wrong; see [`TeleportError::message_key`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeleportError {
    #[error("No pending teleport request")]
    NoSuchRequest,

    #[error("A request to this actor is already outstanding")]
    DuplicateRequest,

    #[error("Insufficient resources: {required} required")]
    InsufficientResource { required: String },

    #[error("Actor {0} is not available")]
    ActorUnavailable(ActorId),

    #[error("No online actor named {0}")]
    UnknownName(String),

    #[error("Destination could not be resolved")]
    DestinationUnresolved,

    #[error("No safe location found")]
    UnsafeDestinationNotFound,

    #[error("Cannot target yourself")]
    SelfTarget,

    #[error("Request cooldown: {0}s remaining")]
    RequestCooldown(u64),

    #[error("Random teleport cooldown: {0}s remaining")]
    RandomTeleportCooldown(u64),

    #[error("{0} is not accepting requests")]
    NotAccepting(String),

    #[error("Blocked by the receiver")]
    Blocked,

    #[error("Feature disabled: {0}")]
    FeatureDisabled(Feature),

    #[error("Home limit of {0} reached")]
    HomeLimit(u32),

    #[error("Home '{0}' not found")]
    HomeMissing(String),

    #[error("No offline location recorded for {0}")]
    OfflineLocationMissing(String),

    #[error("Position change was rejected")]
    MoveFailed,

    #[error("Store error: {0}")]
    Store(String),
}

impl TeleportError {
    /// Message template reported to the initiating actor.
    pub fn message_key(&self) -> MessageKey {
        match self {
            TeleportError::NoSuchRequest => MessageKey::RequestNone,
            TeleportError::DuplicateRequest => MessageKey::RequestExists,
            TeleportError::InsufficientResource { .. } => MessageKey::CostFailed,
            TeleportError::ActorUnavailable(_) | TeleportError::UnknownName(_) => MessageKey::PlayerNotOnline,
            TeleportError::DestinationUnresolved => MessageKey::TeleportFailed,
            TeleportError::UnsafeDestinationNotFound => MessageKey::TeleportFailed,
            TeleportError::SelfTarget => MessageKey::SelfTarget,
            TeleportError::RequestCooldown(_) => MessageKey::RequestCooldown,
            TeleportError::RandomTeleportCooldown(_) => MessageKey::RtpCooldown,
            TeleportError::NotAccepting(_) => MessageKey::TargetNotAccepting,
            TeleportError::Blocked => MessageKey::YouAreBlocked,
            TeleportError::FeatureDisabled(feature) => feature.disabled_key(),
            TeleportError::HomeLimit(_) => MessageKey::HomeLimit,
            TeleportError::HomeMissing(_) => MessageKey::HomeMissing,
            TeleportError::OfflineLocationMissing(_) => MessageKey::OfflineMissing,
            TeleportError::MoveFailed => MessageKey::TeleportFailed,
            TeleportError::Store(_) => MessageKey::InternalError,
        }
    }

    /// Placeholder values for the message template.
    pub fn substitutions(&self) -> Substitutions {
        match self {
            TeleportError::InsufficientResource { required } => vec![("required", required.clone())],
            TeleportError::RequestCooldown(seconds) | TeleportError::RandomTeleportCooldown(seconds) => {
                vec![("seconds", seconds.to_string())]
            }
            TeleportError::NotAccepting(name) => vec![("target", name.clone())],
            TeleportError::HomeLimit(limit) => vec![("limit", limit.to_string())],
            TeleportError::HomeMissing(name) => vec![("name", name.clone())],
            TeleportError::OfflineLocationMissing(name) => vec![("target", name.clone())],
            _ => Vec::new(),
        }
    }

    /// Whether the failure is reported to the actor at all.
    ///
    /// An unresolved destination aborts without telling anyone.
    pub fn is_silent(&self) -> bool {
        matches!(self, TeleportError::DestinationUnresolved)
    }
}

impl From<StoreError> for TeleportError {
    fn from(err: StoreError) -> Self {
        TeleportError::Store(err.to_string())
    }
}

/// Persistence failures raised by [`crate::PlayerStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

//! Message keys and effect keys handed to the [`crate::Notifier`].
//!
//! The core never renders text. It names what happened and supplies the
//! substitutions; hosts map keys to templates, sounds and particles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a user-facing message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    RequestSent,
    RequestReceived,
    RequestAccepted,
    RequestAcceptedSender,
    RequestDenied,
    RequestNone,
    RequestExists,
    RequestSenderExpired,
    RequestReceiverExpired,
    RequestCooldown,
    SelfTarget,
    PlayerNotOnline,
    TargetNotAccepting,
    YouAreBlocked,
    BlockedTarget,
    UnblockedTarget,
    ToggleOn,
    ToggleOff,
    Countdown,
    CancelledMove,
    CancelledDamage,
    TeleportSuccess,
    TeleportFailed,
    CostFailed,
    RtpCooldown,
    AppDisabled,
    FeatureTpaDisabled,
    FeatureTpaHereDisabled,
    FeatureHomesDisabled,
    FeatureRtpDisabled,
    HomeSet,
    HomeDeleted,
    HomeMissing,
    HomeLimit,
    HomeList,
    HomeDefaultSet,
    HomeLimitSet,
    OfflineMissing,
    InternalError,
}

impl MessageKey {
    pub const ALL: [MessageKey; 39] = [
        MessageKey::RequestSent,
        MessageKey::RequestReceived,
        MessageKey::RequestAccepted,
        MessageKey::RequestAcceptedSender,
        MessageKey::RequestDenied,
        MessageKey::RequestNone,
        MessageKey::RequestExists,
        MessageKey::RequestSenderExpired,
        MessageKey::RequestReceiverExpired,
        MessageKey::RequestCooldown,
        MessageKey::SelfTarget,
        MessageKey::PlayerNotOnline,
        MessageKey::TargetNotAccepting,
        MessageKey::YouAreBlocked,
        MessageKey::BlockedTarget,
        MessageKey::UnblockedTarget,
        MessageKey::ToggleOn,
        MessageKey::ToggleOff,
        MessageKey::Countdown,
        MessageKey::CancelledMove,
        MessageKey::CancelledDamage,
        MessageKey::TeleportSuccess,
        MessageKey::TeleportFailed,
        MessageKey::CostFailed,
        MessageKey::RtpCooldown,
        MessageKey::AppDisabled,
        MessageKey::FeatureTpaDisabled,
        MessageKey::FeatureTpaHereDisabled,
        MessageKey::FeatureHomesDisabled,
        MessageKey::FeatureRtpDisabled,
        MessageKey::HomeSet,
        MessageKey::HomeDeleted,
        MessageKey::HomeMissing,
        MessageKey::HomeLimit,
        MessageKey::HomeList,
        MessageKey::HomeDefaultSet,
        MessageKey::HomeLimitSet,
        MessageKey::OfflineMissing,
        MessageKey::InternalError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::RequestSent => "request_sent",
            MessageKey::RequestReceived => "request_received",
            MessageKey::RequestAccepted => "request_accepted",
            MessageKey::RequestAcceptedSender => "request_accepted_sender",
            MessageKey::RequestDenied => "request_denied",
            MessageKey::RequestNone => "request_none",
            MessageKey::RequestExists => "request_exists",
            MessageKey::RequestSenderExpired => "request_sender_expired",
            MessageKey::RequestReceiverExpired => "request_receiver_expired",
            MessageKey::RequestCooldown => "request_cooldown",
            MessageKey::SelfTarget => "self_target",
            MessageKey::PlayerNotOnline => "player_not_online",
            MessageKey::TargetNotAccepting => "target_not_accepting",
            MessageKey::YouAreBlocked => "you_are_blocked",
            MessageKey::BlockedTarget => "blocked_target",
            MessageKey::UnblockedTarget => "unblocked_target",
            MessageKey::ToggleOn => "toggle_on",
            MessageKey::ToggleOff => "toggle_off",
            MessageKey::Countdown => "countdown",
            MessageKey::CancelledMove => "cancelled_move",
            MessageKey::CancelledDamage => "cancelled_damage",
            MessageKey::TeleportSuccess => "teleport_success",
            MessageKey::TeleportFailed => "teleport_failed",
            MessageKey::CostFailed => "cost_failed",
            MessageKey::RtpCooldown => "rtp_cooldown",
            MessageKey::AppDisabled => "app_disabled",
            MessageKey::FeatureTpaDisabled => "feature_tpa_disabled",
            MessageKey::FeatureTpaHereDisabled => "feature_tpahere_disabled",
            MessageKey::FeatureHomesDisabled => "feature_homes_disabled",
            MessageKey::FeatureRtpDisabled => "feature_rtp_disabled",
            MessageKey::HomeSet => "home_set",
            MessageKey::HomeDeleted => "home_deleted",
            MessageKey::HomeMissing => "home_missing",
            MessageKey::HomeLimit => "home_limit",
            MessageKey::HomeList => "home_list",
            MessageKey::HomeDefaultSet => "home_default_set",
            MessageKey::HomeLimitSet => "home_limit_set",
            MessageKey::OfflineMissing => "offline_missing",
            MessageKey::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio-visual cue played at an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    RequestSent,
    RequestReceived,
    Countdown,
    Success,
    Cancelled,
}

impl Effect {
    pub const ALL: [Effect; 5] = [
        Effect::RequestSent,
        Effect::RequestReceived,
        Effect::Countdown,
        Effect::Success,
        Effect::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Effect::RequestSent => "request_sent",
            Effect::RequestReceived => "request_received",
            Effect::Countdown => "countdown",
            Effect::Success => "success",
            Effect::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template substitutions, rendered by hosts as `%name%` placeholders.
pub type Substitutions = Vec<(&'static str, String)>;

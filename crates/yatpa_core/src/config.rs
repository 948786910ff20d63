//! Teleport settings and their defaults.
//!
//! Every field carries a serde default so partial configuration files load
//! cleanly; anything left out keeps the stock behavior.

use crate::error::TeleportError;
use crate::notice::MessageKey;
use crate::types::TeleportKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

fn default_true() -> bool { true }
fn default_delay_seconds() -> u32 { 5 }
fn default_ticks_per_second() -> u32 { 20 }
fn default_request_timeout() -> u64 { 60 }
fn default_request_cooldown() -> u64 { 30 }
fn default_rtp_cooldown() -> u64 { 300 }
fn default_rtp_min_distance() -> i32 { 64 }
fn default_rtp_max_distance() -> i32 { 2500 }
fn default_spawn_radius() -> i32 { 50 }
fn default_max_homes() -> u32 { 3 }
fn default_random_offset_max() -> i32 { 4 }
fn default_cost_item() -> String { "ENDER_PEARL".to_string() }
fn default_search_radius() -> i32 { 48 }
fn default_vertical_range() -> i32 { 64 }

/// Behavior of the teleport core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleportSettings {
    /// Countdown before a teleport commits (0 teleports immediately)
    #[serde(default = "default_delay_seconds")]
    pub teleport_delay_seconds: u32,
    /// Rate at which the host drives [`crate::TeleportScheduler::tick`]
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
    #[serde(default = "default_true")]
    pub cancel_on_move: bool,
    #[serde(default = "default_true")]
    pub cancel_on_damage: bool,
    /// Seconds before an unanswered request expires
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Seconds between requests sent by the same actor
    #[serde(default = "default_request_cooldown")]
    pub request_cooldown_seconds: u64,
    /// Seconds between completed random teleports
    #[serde(default = "default_rtp_cooldown")]
    pub rtp_cooldown_seconds: u64,
    #[serde(default = "default_rtp_min_distance")]
    pub rtp_min_distance: i32,
    #[serde(default = "default_rtp_max_distance")]
    pub rtp_max_distance: i32,
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: i32,
    #[serde(default = "default_max_homes")]
    pub max_homes_default: u32,
    #[serde(default)]
    pub landing: LandingSettings,
    #[serde(default)]
    pub features: FeatureSettings,
    #[serde(default)]
    pub costs: CostSettings,
    #[serde(default)]
    pub resolver: ResolverSettings,
}

impl Default for TeleportSettings {
    fn default() -> Self {
        Self {
            teleport_delay_seconds: default_delay_seconds(),
            ticks_per_second: default_ticks_per_second(),
            cancel_on_move: true,
            cancel_on_damage: true,
            request_timeout_seconds: default_request_timeout(),
            request_cooldown_seconds: default_request_cooldown(),
            rtp_cooldown_seconds: default_rtp_cooldown(),
            rtp_min_distance: default_rtp_min_distance(),
            rtp_max_distance: default_rtp_max_distance(),
            spawn_radius: default_spawn_radius(),
            max_homes_default: default_max_homes(),
            landing: LandingSettings::default(),
            features: FeatureSettings::default(),
            costs: CostSettings::default(),
            resolver: ResolverSettings::default(),
        }
    }
}

impl TeleportSettings {
    /// Countdown length in scheduler ticks.
    pub fn delay_ticks(&self) -> u32 {
        self.teleport_delay_seconds.saturating_mul(self.ticks_per_second)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn request_cooldown(&self) -> Duration {
        Duration::from_secs(self.request_cooldown_seconds)
    }

    pub fn rtp_cooldown(&self) -> Duration {
        Duration::from_secs(self.rtp_cooldown_seconds)
    }

    /// Validates the settings for consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.ticks_per_second == 0 {
            return Err("ticks_per_second must be greater than 0".to_string());
        }

        if self.rtp_min_distance < 0 || self.rtp_max_distance < 0 {
            return Err("Random teleport distances cannot be negative".to_string());
        }

        if self.rtp_min_distance > self.rtp_max_distance {
            return Err(format!(
                "rtp_min_distance ({}) exceeds rtp_max_distance ({})",
                self.rtp_min_distance, self.rtp_max_distance
            ));
        }

        if self.spawn_radius < 0 {
            return Err("spawn_radius cannot be negative".to_string());
        }

        if self.landing.random_offset_max < 0 {
            return Err("landing.random_offset_max cannot be negative".to_string());
        }

        if self.resolver.max_horizontal_radius < 0 || self.resolver.vertical_range < 0 {
            return Err("Resolver search bounds cannot be negative".to_string());
        }

        if self.costs.enabled && self.costs.mode == CostMode::Item && self.costs.item.trim().is_empty() {
            return Err("costs.item must name an item when item costs are enabled".to_string());
        }

        Ok(())
    }
}

/// How the final landing spot relates to the requested destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LandingMode {
    #[default]
    Exact,
    RandomOffset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingSettings {
    #[serde(default)]
    pub mode: LandingMode,
    /// Largest x/z jitter in blocks for [`LandingMode::RandomOffset`]
    #[serde(default = "default_random_offset_max")]
    pub random_offset_max: i32,
}

impl Default for LandingSettings {
    fn default() -> Self {
        Self { mode: LandingMode::Exact, random_offset_max: default_random_offset_max() }
    }
}

/// Switchable features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Master switch for every command-level operation
    App,
    Tpa,
    TpaHere,
    Homes,
    Rtp,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::App => "app",
            Feature::Tpa => "tpa",
            Feature::TpaHere => "tpahere",
            Feature::Homes => "homes",
            Feature::Rtp => "rtp",
        }
    }

    pub fn disabled_key(self) -> MessageKey {
        match self {
            Feature::App => MessageKey::AppDisabled,
            Feature::Tpa => MessageKey::FeatureTpaDisabled,
            Feature::TpaHere => MessageKey::FeatureTpaHereDisabled,
            Feature::Homes => MessageKey::FeatureHomesDisabled,
            Feature::Rtp => MessageKey::FeatureRtpDisabled,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub tpa: bool,
    #[serde(default = "default_true")]
    pub tpahere: bool,
    #[serde(default = "default_true")]
    pub homes: bool,
    #[serde(default = "default_true")]
    pub rtp: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self { enabled: true, tpa: true, tpahere: true, homes: true, rtp: true }
    }
}

impl FeatureSettings {
    /// Fails with the master switch first, then the individual feature.
    pub fn check(&self, feature: Feature) -> Result<(), TeleportError> {
        if !self.enabled {
            return Err(TeleportError::FeatureDisabled(Feature::App));
        }
        let on = match feature {
            Feature::App => true,
            Feature::Tpa => self.tpa,
            Feature::TpaHere => self.tpahere,
            Feature::Homes => self.homes,
            Feature::Rtp => self.rtp,
        };
        if on {
            Ok(())
        } else {
            Err(TeleportError::FeatureDisabled(feature))
        }
    }
}

/// Resource charged for a teleport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CostMode {
    #[default]
    None,
    XpLevels,
    Item,
}

/// Per-kind amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindCosts {
    #[serde(default)]
    pub tpa: u32,
    #[serde(default)]
    pub tpahere: u32,
    #[serde(default)]
    pub home: u32,
    #[serde(default)]
    pub rtp: u32,
    #[serde(default)]
    pub spawn: u32,
}

impl KindCosts {
    /// Operator teleports are always free.
    pub fn for_kind(&self, kind: TeleportKind) -> u32 {
        match kind {
            TeleportKind::Tpa => self.tpa,
            TeleportKind::TpaHere => self.tpahere,
            TeleportKind::Home => self.home,
            TeleportKind::Rtp => self.rtp,
            TeleportKind::Spawn => self.spawn,
            TeleportKind::Operator => 0,
        }
    }

    fn default_xp() -> Self {
        Self { tpa: 4, tpahere: 4, home: 16, rtp: 30, spawn: 8 }
    }

    fn default_items() -> Self {
        Self { tpa: 2, tpahere: 2, home: 20, rtp: 50, spawn: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: CostMode,
    /// Item identifier, optionally namespaced (`minecraft:ender_pearl`)
    #[serde(default = "default_cost_item")]
    pub item: String,
    #[serde(default = "KindCosts::default_xp")]
    pub xp_levels: KindCosts,
    #[serde(default = "KindCosts::default_items")]
    pub items: KindCosts,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: CostMode::None,
            item: default_cost_item(),
            xp_levels: KindCosts::default_xp(),
            items: KindCosts::default_items(),
        }
    }
}

/// Bounds of the safe landing search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "default_search_radius")]
    pub max_horizontal_radius: i32,
    #[serde(default = "default_vertical_range")]
    pub vertical_range: i32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_horizontal_radius: default_search_radius(),
            vertical_range: default_vertical_range(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_behavior() {
        let settings = TeleportSettings::default();
        assert_eq!(settings.delay_ticks(), 100);
        assert_eq!(settings.request_timeout(), Duration::from_secs(60));
        assert_eq!(settings.costs.xp_levels.for_kind(TeleportKind::Rtp), 30);
        assert_eq!(settings.costs.items.for_kind(TeleportKind::Home), 20);
        assert_eq!(settings.costs.items.for_kind(TeleportKind::Operator), 0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: TeleportSettings =
            serde_json::from_str(r#"{"teleport_delay_seconds": 0, "costs": {"enabled": true, "mode": "xp_levels"}}"#)
                .expect("parse settings");
        assert_eq!(settings.delay_ticks(), 0);
        assert_eq!(settings.costs.mode, CostMode::XpLevels);
        assert_eq!(settings.costs.xp_levels.tpa, 4);
        assert_eq!(settings.resolver.max_horizontal_radius, 48);
        assert!(settings.cancel_on_move);
    }

    #[test]
    fn validate_rejects_inverted_rtp_range() {
        let settings = TeleportSettings { rtp_min_distance: 100, rtp_max_distance: 10, ..Default::default() };
        assert!(settings.validate().is_err());

        let settings = TeleportSettings { ticks_per_second: 0, ..Default::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn master_switch_wins_over_feature_flags() {
        let mut features = FeatureSettings { rtp: false, ..Default::default() };
        assert_eq!(features.check(Feature::Rtp), Err(TeleportError::FeatureDisabled(Feature::Rtp)));
        assert!(features.check(Feature::Tpa).is_ok());

        features.enabled = false;
        assert_eq!(features.check(Feature::Tpa), Err(TeleportError::FeatureDisabled(Feature::App)));
    }
}

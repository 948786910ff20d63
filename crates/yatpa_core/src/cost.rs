//! Teleport costs.

use crate::config::{CostMode, CostSettings};
use crate::error::TeleportError;
use crate::ports::Wallet;
use crate::types::{ActorId, TeleportKind};
use std::sync::Arc;
use tracing::debug;

/// Validates and debits the cost of a teleport.
///
/// A charge either succeeds completely or leaves the actor untouched and
/// reports what would have been required.
pub trait CostGate: Send + Sync {
    fn charge(&self, actor: ActorId, kind: TeleportKind) -> Result<(), TeleportError>;
}

/// Every teleport is free.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeCostGate;

impl CostGate for FreeCostGate {
    fn charge(&self, _actor: ActorId, _kind: TeleportKind) -> Result<(), TeleportError> {
        Ok(())
    }
}

/// Charges experience levels or items according to [`CostSettings`].
pub struct ConfiguredCostGate {
    settings: CostSettings,
    wallet: Arc<dyn Wallet>,
}

impl ConfiguredCostGate {
    pub fn new(settings: CostSettings, wallet: Arc<dyn Wallet>) -> Self {
        Self { settings, wallet }
    }

    fn charge_levels(&self, actor: ActorId, cost: u32) -> Result<(), TeleportError> {
        let required = || TeleportError::InsufficientResource {
            required: format!("{} XP level{}", cost, if cost == 1 { "" } else { "s" }),
        };
        if self.wallet.experience_level(actor) < cost || !self.wallet.take_levels(actor, cost) {
            return Err(required());
        }
        debug!("💰 Charged {} {} XP level(s)", actor, cost);
        Ok(())
    }

    fn charge_items(&self, actor: ActorId, amount: u32) -> Result<(), TeleportError> {
        let item = self.settings.item.as_str();
        let required = || TeleportError::InsufficientResource {
            required: format!("{} {}", amount, display_material(item)),
        };
        if self.wallet.count_item(actor, item) < amount || !self.wallet.take_items(actor, item, amount) {
            return Err(required());
        }
        debug!("💰 Charged {} {} x {}", actor, amount, item);
        Ok(())
    }
}

impl CostGate for ConfiguredCostGate {
    fn charge(&self, actor: ActorId, kind: TeleportKind) -> Result<(), TeleportError> {
        if !self.settings.enabled {
            return Ok(());
        }
        match self.settings.mode {
            CostMode::None => Ok(()),
            CostMode::XpLevels => match self.settings.xp_levels.for_kind(kind) {
                0 => Ok(()),
                cost => self.charge_levels(actor, cost),
            },
            CostMode::Item => match self.settings.items.for_kind(kind) {
                0 => Ok(()),
                amount => self.charge_items(actor, amount),
            },
        }
    }
}

/// Human-readable plural of an item identifier.
///
/// `minecraft:ender_pearl` and `ENDER_PEARL` both become `Ender Pearls`.
pub fn display_material(item: &str) -> String {
    let bare = item.rsplit(':').next().unwrap_or(item).to_lowercase();
    let singular = bare
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if singular.ends_with('s') {
        singular
    } else {
        format!("{}s", singular)
    }
}

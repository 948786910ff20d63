//! Message rendering and delivery.
//!
//! The core hands over a [`MessageKey`] and substitutions; the catalog turns
//! them into text with `%placeholder%` templates, and [`LogNotifier`] delivers
//! the result through `tracing`. A short per-actor history is kept so the demo
//! and the tests can see what an actor was told.

use crate::config::EffectSettings;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use yatpa_core::{ActorDirectory, ActorId, Effect, MessageKey, Notifier};

const HISTORY_LIMIT: usize = 32;

fn default_template(key: MessageKey) -> &'static str {
    match key {
        MessageKey::RequestSent => "Teleport request sent to %target%.",
        MessageKey::RequestReceived => "%player% wants to teleport. Type /tpaccept or /tpdeny.",
        MessageKey::RequestAccepted => "You accepted the request from %player%.",
        MessageKey::RequestAcceptedSender => "%player% accepted your teleport request.",
        MessageKey::RequestDenied => "Teleport request with %player% was denied.",
        MessageKey::RequestNone => "You have no pending teleport request.",
        MessageKey::RequestExists => "You already have a pending request.",
        MessageKey::RequestSenderExpired => "Your teleport request to %target% expired.",
        MessageKey::RequestReceiverExpired => "The teleport request from %player% expired.",
        MessageKey::RequestCooldown => "Wait %seconds%s before sending another request.",
        MessageKey::SelfTarget => "You cannot target yourself.",
        MessageKey::PlayerNotOnline => "That player is not online.",
        MessageKey::TargetNotAccepting => "%target% is not accepting teleport requests.",
        MessageKey::YouAreBlocked => "That player has blocked your requests.",
        MessageKey::BlockedTarget => "You blocked %target%.",
        MessageKey::UnblockedTarget => "You unblocked %target%.",
        MessageKey::ToggleOn => "You are now accepting teleport requests.",
        MessageKey::ToggleOff => "You are no longer accepting teleport requests.",
        MessageKey::Countdown => "Teleporting in %seconds%...",
        MessageKey::CancelledMove => "Teleport cancelled because you moved.",
        MessageKey::CancelledDamage => "Teleport cancelled because you took damage.",
        MessageKey::TeleportSuccess => "Teleported.",
        MessageKey::TeleportFailed => "Teleport failed.",
        MessageKey::CostFailed => "You need %required% to teleport.",
        MessageKey::RtpCooldown => "Random teleport is on cooldown for %seconds%s.",
        MessageKey::AppDisabled => "Teleporting is disabled.",
        MessageKey::FeatureTpaDisabled => "Teleport requests are disabled.",
        MessageKey::FeatureTpaHereDisabled => "Teleport-here requests are disabled.",
        MessageKey::FeatureHomesDisabled => "Homes are disabled.",
        MessageKey::FeatureRtpDisabled => "Random teleport is disabled.",
        MessageKey::HomeSet => "Home %name% set.",
        MessageKey::HomeDeleted => "Home %name% deleted.",
        MessageKey::HomeMissing => "Home %name% does not exist.",
        MessageKey::HomeLimit => "You cannot set more than %limit% homes.",
        MessageKey::HomeList => "Homes: %homes%",
        MessageKey::HomeDefaultSet => "Default home set to %name%.",
        MessageKey::HomeLimitSet => "%player% may now set %limit% homes.",
        MessageKey::OfflineMissing => "No offline location recorded for %target%.",
        MessageKey::InternalError => "Something went wrong. Try again later.",
    }
}

/// Templates for every message key, with configured overrides applied.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    templates: HashMap<MessageKey, String>,
}

impl MessageCatalog {
    /// Builds the catalog; unknown override keys are ignored with a warning.
    pub fn new(overrides: &BTreeMap<String, String>) -> Self {
        let mut templates: HashMap<MessageKey, String> = MessageKey::ALL
            .iter()
            .map(|key| (*key, default_template(*key).to_string()))
            .collect();

        for (name, template) in overrides {
            match MessageKey::ALL.iter().find(|key| key.as_str() == name.as_str()) {
                Some(key) => {
                    templates.insert(*key, template.clone());
                }
                None => warn!("⚠️ Ignoring template for unknown message key '{}'", name),
            }
        }

        Self { templates }
    }

    /// Renders `key`, replacing every `%name%` with its substitution.
    /// A key without a template renders as its own name.
    pub fn render(&self, key: MessageKey, substitutions: &[(&'static str, String)]) -> String {
        let mut text = self
            .templates
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.as_str().to_string());
        for (name, value) in substitutions {
            text = text.replace(&format!("%{name}%"), value);
        }
        text
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

/// Delivers rendered messages to the log.
pub struct LogNotifier {
    catalog: MessageCatalog,
    effects: HashMap<Effect, EffectSettings>,
    directory: Arc<dyn ActorDirectory>,
    history: DashMap<ActorId, VecDeque<String>>,
}

impl LogNotifier {
    pub fn new(
        catalog: MessageCatalog,
        effects: &BTreeMap<String, EffectSettings>,
        directory: Arc<dyn ActorDirectory>,
    ) -> Self {
        let effects = Effect::ALL
            .iter()
            .filter_map(|effect| effects.get(effect.as_str()).map(|settings| (*effect, settings.clone())))
            .collect();
        Self { catalog, effects, directory, history: DashMap::new() }
    }

    /// The most recent messages delivered to `actor`, oldest first.
    pub fn history(&self, actor: ActorId) -> Vec<String> {
        self.history
            .get(&actor)
            .map(|messages| messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drops the history of an actor that left.
    pub fn forget(&self, actor: ActorId) {
        self.history.remove(&actor);
    }

    fn recipient(&self, actor: ActorId) -> String {
        self.directory.display_name(actor).unwrap_or_else(|| actor.to_string())
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, actor: ActorId, key: MessageKey, substitutions: &[(&'static str, String)]) {
        let text = self.catalog.render(key, substitutions);
        info!(key = key.as_str(), "💬 [{}] {}", self.recipient(actor), text);

        let mut messages = self.history.entry(actor).or_default();
        if messages.len() == HISTORY_LIMIT {
            messages.pop_front();
        }
        messages.push_back(text);
    }

    fn play_effect(&self, actor: ActorId, effect: Effect) {
        let Some(settings) = self.effects.get(&effect) else {
            return;
        };
        let sound = settings.sound.as_deref().filter(|name| !name.is_empty());
        let particle = settings.particle.as_deref().filter(|name| !name.is_empty());
        if sound.is_none() && particle.is_none() {
            return;
        }
        debug!(
            "🔊 [{}] {} (sound: {}, particle: {})",
            self.recipient(actor),
            effect.as_str(),
            sound.unwrap_or("-"),
            particle.unwrap_or("-")
        );
    }
}

//! # Teleport Service
//!
//! Command-level operations built on the broker, the scheduler and the
//! collaborator traits. Hosts parse commands and events, then call into this
//! façade; it performs every check, reports failures to the initiating actor
//! through the [`Notifier`] and returns them as [`TeleportError`]s.
//!
//! ## Operations
//!
//! - Lookup: [`find_actor`]
//! - Requests: [`send_request`], [`accept`], [`deny`], [`purge_expired_requests`]
//! - Preferences: [`toggle_requests`], [`block`], [`unblock`]
//! - Direct teleports: [`random_teleport`], [`spawn_teleport`], [`home_teleport`]
//! - Homes: [`set_home`], [`delete_home`], [`list_homes`], [`set_default_home`],
//!   [`set_home_limit`]
//! - Operator teleports: [`operator_teleport`], [`offline_teleport`]
//! - Lifecycle hooks: [`on_move`], [`on_damage`], [`on_respawn`], [`on_disconnect`]
//!
//! [`find_actor`]: TeleportService::find_actor
//! [`send_request`]: TeleportService::send_request
//! [`accept`]: TeleportService::accept
//! [`deny`]: TeleportService::deny
//! [`purge_expired_requests`]: TeleportService::purge_expired_requests
//! [`toggle_requests`]: TeleportService::toggle_requests
//! [`block`]: TeleportService::block
//! [`unblock`]: TeleportService::unblock
//! [`random_teleport`]: TeleportService::random_teleport
//! [`spawn_teleport`]: TeleportService::spawn_teleport
//! [`home_teleport`]: TeleportService::home_teleport
//! [`set_home`]: TeleportService::set_home
//! [`delete_home`]: TeleportService::delete_home
//! [`list_homes`]: TeleportService::list_homes
//! [`set_default_home`]: TeleportService::set_default_home
//! [`set_home_limit`]: TeleportService::set_home_limit
//! [`operator_teleport`]: TeleportService::operator_teleport
//! [`offline_teleport`]: TeleportService::offline_teleport
//! [`on_move`]: TeleportService::on_move
//! [`on_damage`]: TeleportService::on_damage
//! [`on_respawn`]: TeleportService::on_respawn
//! [`on_disconnect`]: TeleportService::on_disconnect

use crate::broker::{RequestBroker, TeleportRequest};
use crate::clock::Clock;
use crate::config::{Feature, LandingMode, TeleportSettings};
use crate::cooldown::CooldownTracker;
use crate::cost::CostGate;
use crate::destination::{fixed, random_surface_position, Destination, LandingJitter};
use crate::error::TeleportError;
use crate::notice::{Effect, MessageKey};
use crate::ports::{ActorDirectory, Notifier, RandomSource, WorldAdapter};
use crate::scheduler::{EnqueueOutcome, TeleportScheduler, TickSummary};
use crate::store::{normalize, PlayerStore};
use crate::types::{ActorId, Position, RequestKind, TeleportKind};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Home used when none is named and no default was chosen.
pub const FALLBACK_HOME: &str = "default";

/// Everything the service needs from its host.
#[derive(Clone)]
pub struct Collaborators {
    pub world: Arc<dyn WorldAdapter>,
    pub directory: Arc<dyn ActorDirectory>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn RandomSource>,
    pub cost: Arc<dyn CostGate>,
    pub store: Arc<dyn PlayerStore>,
}

/// Where an operator teleport goes.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorTarget {
    /// The live position of another online actor.
    Actor(ActorId),
    /// Fixed coordinates; the issuer keeps their facing.
    Coordinates(Position),
}

pub struct TeleportService {
    settings: TeleportSettings,
    broker: RequestBroker,
    scheduler: TeleportScheduler,
    rtp_cooldowns: Arc<CooldownTracker>,
    world: Arc<dyn WorldAdapter>,
    directory: Arc<dyn ActorDirectory>,
    notifier: Arc<dyn Notifier>,
    random: Arc<dyn RandomSource>,
    store: Arc<dyn PlayerStore>,
}

impl TeleportService {
    pub fn new(settings: TeleportSettings, collaborators: Collaborators) -> Self {
        let Collaborators { world, directory, notifier, clock, random, cost, store } = collaborators;
        let broker = RequestBroker::new(settings.request_timeout(), settings.request_cooldown(), clock.clone());
        let rtp_cooldowns = Arc::new(CooldownTracker::new(settings.rtp_cooldown(), clock));
        let scheduler = TeleportScheduler::new(&settings, world.clone(), directory.clone(), notifier.clone(), cost);

        info!(
            "🧭 Teleport service ready: {}s delay, {}s request timeout, landing {:?}",
            settings.teleport_delay_seconds, settings.request_timeout_seconds, settings.landing.mode
        );

        Self { settings, broker, scheduler, rtp_cooldowns, world, directory, notifier, random, store }
    }

    pub fn settings(&self) -> &TeleportSettings {
        &self.settings
    }

    pub fn broker(&self) -> &RequestBroker {
        &self.broker
    }

    pub fn scheduler(&self) -> &TeleportScheduler {
        &self.scheduler
    }

    /// Advances pending teleports; the host calls this once per tick.
    pub fn tick(&self) -> TickSummary {
        self.scheduler.tick()
    }

    // ---- requests -------------------------------------------------------

    /// Sends a request from `sender` to `receiver`.
    pub fn send_request(&self, sender: ActorId, receiver: ActorId, kind: RequestKind) -> Result<(), TeleportError> {
        let result = self.try_send_request(sender, receiver, kind);
        self.reported(sender, result)
    }

    fn try_send_request(&self, sender: ActorId, receiver: ActorId, kind: RequestKind) -> Result<(), TeleportError> {
        self.settings.features.check(Feature::App)?;
        self.settings.features.check(request_feature(kind))?;

        if sender == receiver {
            return Err(TeleportError::SelfTarget);
        }
        if !self.directory.is_online(receiver) {
            return Err(TeleportError::ActorUnavailable(receiver));
        }

        let cooldown = self.broker.cooldown_remaining(sender).as_secs();
        if cooldown > 0 {
            return Err(TeleportError::RequestCooldown(cooldown));
        }

        let prefs = self.store.player(receiver);
        if !prefs.accepting {
            return Err(TeleportError::NotAccepting(self.name_of(receiver)));
        }
        if prefs.blocked.contains(&sender) {
            return Err(TeleportError::Blocked);
        }

        if !self.broker.create(sender, receiver, kind) {
            return Err(TeleportError::DuplicateRequest);
        }

        self.notifier.notify(sender, MessageKey::RequestSent, &[("target", self.name_of(receiver))]);
        self.notifier.notify(receiver, MessageKey::RequestReceived, &[("player", self.name_of(sender))]);
        self.notifier.play_effect(sender, Effect::RequestSent);
        self.notifier.play_effect(receiver, Effect::RequestReceived);
        info!("📨 {} sent a {:?} request to {}", sender, kind, receiver);
        Ok(())
    }

    /// Accepts the request addressed to `receiver` and arms the teleport.
    ///
    /// For [`RequestKind::Tpa`] the sender travels to the receiver, for
    /// [`RequestKind::TpaHere`] the receiver travels to the sender. The
    /// destination is the other party's live position when the countdown ends.
    pub fn accept(&self, receiver: ActorId) -> Result<EnqueueOutcome, TeleportError> {
        let live = self.broker.pending_for(receiver).ok_or(TeleportError::NoSuchRequest);
        let request = match live.and_then(|_| self.take_request(receiver)) {
            Ok(request) => request,
            Err(err) => return self.reported(receiver, Err(err)),
        };
        let sender = request.sender;

        if !self.directory.is_online(sender) {
            return self.reported(receiver, Err(TeleportError::ActorUnavailable(sender)));
        }

        if let Err(err) = self.settings.features.check(request_feature(request.kind)) {
            self.notifier.notify(sender, MessageKey::RequestDenied, &[("player", self.name_of(receiver))]);
            return self.reported(receiver, Err(err));
        }

        let (traveller, anchor) = match request.kind {
            RequestKind::Tpa => (sender, receiver),
            RequestKind::TpaHere => (receiver, sender),
        };
        let facing = self.directory.position(traveller).map(|p| (p.yaw, p.pitch)).unwrap_or_default();
        let directory = self.directory.clone();
        let destination = move || directory.position(anchor).map(|p| p.facing(facing.0, facing.1));

        let outcome =
            self.scheduler
                .enqueue(traveller, request.kind.teleport_kind(), self.landing(Box::new(destination)), None)?;

        self.notifier.notify(receiver, MessageKey::RequestAccepted, &[("player", self.name_of(sender))]);
        self.notifier.notify(sender, MessageKey::RequestAcceptedSender, &[("player", self.name_of(receiver))]);
        info!("✅ {} accepted {:?} request from {}", receiver, request.kind, sender);
        Ok(outcome)
    }

    /// Denies the request addressed to `receiver`, even one past its timeout
    /// that has not been purged yet.
    pub fn deny(&self, receiver: ActorId) -> Result<TeleportRequest, TeleportError> {
        let request = match self.take_request(receiver) {
            Ok(request) => request,
            Err(err) => return self.reported(receiver, Err(err)),
        };

        if self.directory.is_online(request.sender) {
            self.notifier.notify(request.sender, MessageKey::RequestDenied, &[("player", self.name_of(receiver))]);
        }
        self.notifier.notify(receiver, MessageKey::RequestDenied, &[("player", self.name_of(request.sender))]);
        debug!("❌ {} denied request from {}", receiver, request.sender);
        Ok(request)
    }

    fn take_request(&self, receiver: ActorId) -> Result<TeleportRequest, TeleportError> {
        self.settings.features.check(Feature::App)?;
        self.broker.remove_for(receiver).ok_or(TeleportError::NoSuchRequest)
    }

    /// Drops expired requests and tells whichever party is still online.
    pub fn purge_expired_requests(&self) -> Vec<TeleportRequest> {
        let expired = self.broker.purge_expired();
        for request in &expired {
            if self.directory.is_online(request.sender) {
                self.notifier.notify(
                    request.sender,
                    MessageKey::RequestSenderExpired,
                    &[("target", self.name_of(request.receiver))],
                );
            }
            if self.directory.is_online(request.receiver) {
                self.notifier.notify(
                    request.receiver,
                    MessageKey::RequestReceiverExpired,
                    &[("player", self.name_of(request.sender))],
                );
            }
        }
        self.rtp_cooldowns.cleanup_expired();
        expired
    }

    // ---- preferences ----------------------------------------------------

    /// Flips whether `actor` accepts requests; returns the new state.
    pub fn toggle_requests(&self, actor: ActorId) -> Result<bool, TeleportError> {
        let result = self.settings.features.check(Feature::App).and_then(|_| {
            let mut record = self.store.player(actor);
            record.accepting = !record.accepting;
            let accepting = record.accepting;
            self.store.save_player(actor, record)?;
            Ok(accepting)
        });
        let accepting = self.reported(actor, result)?;
        let key = if accepting { MessageKey::ToggleOn } else { MessageKey::ToggleOff };
        self.notifier.notify(actor, key, &[]);
        Ok(accepting)
    }

    /// Resolves a typed player name to an online actor on behalf of `requester`.
    pub fn find_actor(&self, requester: ActorId, name: &str) -> Result<ActorId, TeleportError> {
        let found = self.directory.find_by_name(name.trim()).ok_or_else(|| TeleportError::UnknownName(name.to_string()));
        self.reported(requester, found)
    }

    /// Refuses future requests from `target`.
    pub fn block(&self, owner: ActorId, target: ActorId) -> Result<(), TeleportError> {
        let result = self.update_block_list(owner, target, true);
        self.reported(owner, result)?;
        self.notifier.notify(owner, MessageKey::BlockedTarget, &[("target", self.name_of(target))]);
        Ok(())
    }

    pub fn unblock(&self, owner: ActorId, target: ActorId) -> Result<(), TeleportError> {
        let result = self.update_block_list(owner, target, false);
        self.reported(owner, result)?;
        self.notifier.notify(owner, MessageKey::UnblockedTarget, &[("target", self.name_of(target))]);
        Ok(())
    }

    fn update_block_list(&self, owner: ActorId, target: ActorId, blocked: bool) -> Result<(), TeleportError> {
        self.settings.features.check(Feature::App)?;
        if owner == target {
            return Err(TeleportError::SelfTarget);
        }
        let mut record = self.store.player(owner);
        if blocked {
            record.blocked.insert(target);
        } else {
            record.blocked.remove(&target);
        }
        self.store.save_player(owner, record)?;
        Ok(())
    }

    // ---- direct teleports -----------------------------------------------

    /// Teleports `actor` to a random surface spot in the configured annulus.
    ///
    /// The random-teleport cooldown starts only when the teleport completes.
    pub fn random_teleport(&self, actor: ActorId) -> Result<EnqueueOutcome, TeleportError> {
        let prepared = self.prepare_random_teleport(actor);
        let destination = self.reported(actor, prepared)?;

        let cooldowns = self.rtp_cooldowns.clone();
        let on_success: Box<dyn FnOnce() + Send + Sync> = Box::new(move || cooldowns.mark(actor));
        self.scheduler.enqueue(actor, TeleportKind::Rtp, self.landing(Box::new(fixed(destination))), Some(on_success))
    }

    fn prepare_random_teleport(&self, actor: ActorId) -> Result<Position, TeleportError> {
        self.settings.features.check(Feature::Rtp)?;
        let remaining = self.rtp_cooldowns.remaining_secs(actor);
        if remaining > 0 {
            return Err(TeleportError::RandomTeleportCooldown(remaining));
        }
        let current = self.directory.position(actor).ok_or(TeleportError::ActorUnavailable(actor))?;
        let destination = random_surface_position(
            self.world.as_ref(),
            self.random.as_ref(),
            &current.realm,
            current.x,
            current.z,
            self.settings.rtp_min_distance,
            self.settings.rtp_max_distance,
        );
        Ok(destination.facing(current.yaw, current.pitch))
    }

    /// Teleports `actor` to a random spot near the spawn of their realm.
    pub fn spawn_teleport(&self, actor: ActorId) -> Result<EnqueueOutcome, TeleportError> {
        let prepared = self.settings.features.check(Feature::App).and_then(|_| {
            let current = self.directory.position(actor).ok_or(TeleportError::ActorUnavailable(actor))?;
            let spawn = self.world.spawn_point(&current.realm);
            let destination = random_surface_position(
                self.world.as_ref(),
                self.random.as_ref(),
                &current.realm,
                spawn.x,
                spawn.z,
                0,
                self.settings.spawn_radius,
            );
            Ok(destination.facing(current.yaw, current.pitch))
        });
        let destination = self.reported(actor, prepared)?;
        self.scheduler.enqueue(actor, TeleportKind::Spawn, self.landing(Box::new(fixed(destination))), None)
    }

    /// Teleports `actor` to a named home, their default home, or `"default"`.
    ///
    /// The home is looked up again when the countdown ends, so deleting it in
    /// the meantime aborts the teleport silently.
    pub fn home_teleport(&self, actor: ActorId, name: Option<&str>) -> Result<EnqueueOutcome, TeleportError> {
        let prepared = self.settings.features.check(Feature::Homes).and_then(|_| {
            let record = self.store.player(actor);
            let id = match name {
                Some(name) => normalize(name),
                None => record.default_home.clone().unwrap_or_else(|| FALLBACK_HOME.to_string()),
            };
            if record.home(&id).is_none() {
                return Err(TeleportError::HomeMissing(id));
            }
            Ok(id)
        });
        let id = self.reported(actor, prepared)?;

        let store = self.store.clone();
        let destination = move || store.player(actor).home(&id).cloned();
        self.scheduler.enqueue(actor, TeleportKind::Home, self.landing(Box::new(destination)), None)
    }

    // ---- homes ----------------------------------------------------------

    /// Saves the actor's current position as a home.
    ///
    /// Overwriting an existing home never counts against the limit. The first
    /// home becomes the default when none is set.
    pub fn set_home(&self, actor: ActorId, name: &str) -> Result<String, TeleportError> {
        let result = self.settings.features.check(Feature::Homes).and_then(|_| {
            let position = self.directory.position(actor).ok_or(TeleportError::ActorUnavailable(actor))?;
            let id = normalize(name);
            let mut record = self.store.player(actor);
            let limit = record.home_limit_or(self.settings.max_homes_default);
            if !record.homes.contains_key(&id) && record.homes.len() >= limit as usize {
                return Err(TeleportError::HomeLimit(limit));
            }
            record.homes.insert(id.clone(), position);
            if record.default_home.is_none() && record.homes.len() == 1 {
                record.default_home = Some(id.clone());
            }
            self.store.save_player(actor, record)?;
            Ok(id)
        });
        let id = self.reported(actor, result)?;
        self.notifier.notify(actor, MessageKey::HomeSet, &[("name", id.clone())]);
        Ok(id)
    }

    pub fn delete_home(&self, actor: ActorId, name: &str) -> Result<Position, TeleportError> {
        let result = self.settings.features.check(Feature::Homes).and_then(|_| {
            let id = normalize(name);
            let mut record = self.store.player(actor);
            let removed = record.homes.remove(&id).ok_or_else(|| TeleportError::HomeMissing(id.clone()))?;
            self.store.save_player(actor, record)?;
            Ok((id, removed))
        });
        let (id, removed) = self.reported(actor, result)?;
        self.notifier.notify(actor, MessageKey::HomeDeleted, &[("name", id)]);
        Ok(removed)
    }

    /// Home names in order; also sent to the actor as `home_list`.
    pub fn list_homes(&self, actor: ActorId) -> Result<Vec<String>, TeleportError> {
        self.reported(actor, self.settings.features.check(Feature::Homes))?;
        let names: Vec<String> = self.store.player(actor).homes.keys().cloned().collect();
        let listing = if names.is_empty() { "none".to_string() } else { names.join(", ") };
        self.notifier.notify(actor, MessageKey::HomeList, &[("homes", listing)]);
        Ok(names)
    }

    /// Chooses the home used by [`TeleportService::home_teleport`] without a name.
    pub fn set_default_home(&self, actor: ActorId, name: &str) -> Result<(), TeleportError> {
        let result = self.settings.features.check(Feature::Homes).and_then(|_| {
            let id = normalize(name);
            let mut record = self.store.player(actor);
            record.default_home = Some(id.clone());
            self.store.save_player(actor, record)?;
            Ok(id)
        });
        let id = self.reported(actor, result)?;
        self.notifier.notify(actor, MessageKey::HomeDefaultSet, &[("name", id)]);
        Ok(())
    }

    /// Operator override of how many homes `target` may keep.
    pub fn set_home_limit(&self, issuer: ActorId, target: ActorId, limit: u32) -> Result<(), TeleportError> {
        let result = self.settings.features.check(Feature::App).and_then(|_| {
            let mut record = self.store.player(target);
            record.home_limit = Some(limit);
            self.store.save_player(target, record)?;
            Ok(())
        });
        self.reported(issuer, result)?;
        self.notifier.notify(
            issuer,
            MessageKey::HomeLimitSet,
            &[("player", self.name_of(target)), ("limit", limit.to_string())],
        );
        Ok(())
    }

    // ---- operator teleports ---------------------------------------------

    /// Immediate, free teleport to another actor or to coordinates.
    pub fn operator_teleport(&self, actor: ActorId, target: OperatorTarget) -> Result<EnqueueOutcome, TeleportError> {
        let prepared = self.settings.features.check(Feature::App).and_then(|_| {
            let current = self.directory.position(actor).ok_or(TeleportError::ActorUnavailable(actor))?;
            let destination = match target {
                OperatorTarget::Actor(other) => {
                    self.directory.position(other).ok_or(TeleportError::ActorUnavailable(other))?
                }
                OperatorTarget::Coordinates(position) => position,
            };
            Ok(destination.facing(current.yaw, current.pitch))
        });
        let destination = self.reported(actor, prepared)?;
        self.scheduler.enqueue(actor, TeleportKind::Operator, Box::new(fixed(destination)), None)
    }

    /// Immediate, free teleport to where an actor last logged out.
    pub fn offline_teleport(&self, actor: ActorId, name: &str) -> Result<EnqueueOutcome, TeleportError> {
        let prepared = self.settings.features.check(Feature::App).and_then(|_| {
            self.store
                .offline_location(name)
                .ok_or_else(|| TeleportError::OfflineLocationMissing(normalize(name)))
        });
        let destination = self.reported(actor, prepared)?;
        self.scheduler.enqueue(actor, TeleportKind::Operator, Box::new(fixed(destination)), None)
    }

    // ---- lifecycle hooks ------------------------------------------------

    pub fn on_move(&self, actor: ActorId, position: &Position) -> bool {
        self.scheduler.on_move(actor, position)
    }

    pub fn on_damage(&self, actor: ActorId) -> bool {
        self.scheduler.on_damage(actor)
    }

    /// Respawning silently drops a pending teleport.
    pub fn on_respawn(&self, actor: ActorId) -> bool {
        self.scheduler.cancel(actor)
    }

    /// Call before the host forgets the actor: drops any pending teleport and
    /// records where the actor left.
    pub fn on_disconnect(&self, actor: ActorId) {
        self.scheduler.cancel(actor);

        let (Some(name), Some(position)) = (self.directory.display_name(actor), self.directory.position(actor)) else {
            debug!("👋 {} disconnected without a known name or position", actor);
            return;
        };
        if let Err(err) = self.store.set_offline_location(&name, position) {
            warn!("⚠️ Failed to record offline location for {}: {}", name, err);
        }
    }

    // ---- helpers --------------------------------------------------------

    fn landing(&self, destination: Box<dyn Destination>) -> Box<dyn Destination> {
        match self.settings.landing.mode {
            LandingMode::Exact => destination,
            LandingMode::RandomOffset => Box::new(LandingJitter::new(
                destination,
                self.world.clone(),
                self.random.clone(),
                self.settings.landing.random_offset_max,
            )),
        }
    }

    fn name_of(&self, actor: ActorId) -> String {
        self.directory.display_name(actor).unwrap_or_else(|| actor.to_string())
    }

    /// Tells `actor` about a failure before handing it back.
    fn reported<T>(&self, actor: ActorId, result: Result<T, TeleportError>) -> Result<T, TeleportError> {
        if let Err(err) = &result {
            if !err.is_silent() {
                debug!("🚫 {}: {}", actor, err);
                self.notifier.notify(actor, err.message_key(), &err.substitutions());
            }
        }
        result
    }
}

fn request_feature(kind: RequestKind) -> Feature {
    match kind {
        RequestKind::Tpa => Feature::Tpa,
        RequestKind::TpaHere => Feature::TpaHere,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::FeatureSettings;
    use crate::store::MemoryPlayerStore;
    use crate::test_support::{GridWorld, RecordingNotifier, ScriptedCostGate, SequenceRandom};
    use crate::types::Timestamp;
    use std::time::Duration;

    struct Harness {
        world: Arc<GridWorld>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<ManualClock>,
        cost: Arc<ScriptedCostGate>,
        store: Arc<MemoryPlayerStore>,
        service: TeleportService,
    }

    fn harness_with(settings: TeleportSettings) -> Harness {
        let world = Arc::new(GridWorld::new().with_ground(63));
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::new(Timestamp::from_secs(1_000)));
        let cost = Arc::new(ScriptedCostGate::default());
        let store = Arc::new(MemoryPlayerStore::new());
        let service = TeleportService::new(
            settings,
            Collaborators {
                world: world.clone(),
                directory: world.clone(),
                notifier: notifier.clone(),
                clock: clock.clone(),
                random: Arc::new(SequenceRandom::new(vec![0.0])),
                cost: cost.clone(),
                store: store.clone(),
            },
        );
        Harness { world, notifier, clock, cost, store, service }
    }

    fn harness() -> Harness {
        harness_with(TeleportSettings { teleport_delay_seconds: 1, ..Default::default() })
    }

    fn run_ticks(h: &Harness, ticks: usize) {
        for _ in 0..ticks {
            h.service.tick();
        }
    }

    #[test]
    fn tpa_moves_sender_to_receivers_live_position() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 30.5, 64.0, 30.5);

        h.service.send_request(alice, bob, RequestKind::Tpa).expect("send");
        assert_eq!(h.notifier.substitutions_for(alice, MessageKey::RequestSent), vec![vec![("target", "Bob".to_string())]]);
        assert_eq!(h.notifier.substitutions_for(bob, MessageKey::RequestReceived), vec![vec![("player", "Alice".to_string())]]);
        assert_eq!(h.notifier.effects_for(bob), vec![Effect::RequestReceived]);

        let outcome = h.service.accept(bob).expect("accept");
        assert_eq!(outcome, EnqueueOutcome::Armed { ticks: 20 });
        assert!(h.notifier.keys_for(alice).contains(&MessageKey::RequestAcceptedSender));

        // Bob walks away during the countdown; Alice follows him there.
        h.world.place_actor(bob, 40.5, 64.0, 40.5);
        run_ticks(&h, 20);

        let landed = h.world.position_of(alice).expect("alice online");
        assert_eq!((landed.x, landed.y, landed.z), (40.5, 64.0, 40.5));
        assert!(h.service.broker().is_empty());
    }

    #[test]
    fn tpahere_moves_receiver_to_sender() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 30.5, 64.0, 30.5);

        h.service.send_request(alice, bob, RequestKind::TpaHere).expect("send");
        h.service.accept(bob).expect("accept");
        assert!(h.service.scheduler().is_pending(bob));
        run_ticks(&h, 20);

        let landed = h.world.position_of(bob).expect("bob online");
        assert_eq!((landed.x, landed.z), (0.5, 0.5));
    }

    #[test]
    fn request_checks_are_reported_to_sender() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);

        assert_eq!(h.service.send_request(alice, alice, RequestKind::Tpa), Err(TeleportError::SelfTarget));

        let ghost = ActorId::new();
        assert_eq!(
            h.service.send_request(alice, ghost, RequestKind::Tpa),
            Err(TeleportError::ActorUnavailable(ghost))
        );

        h.service.send_request(alice, bob, RequestKind::Tpa).expect("first");
        assert_eq!(h.service.send_request(alice, bob, RequestKind::Tpa), Err(TeleportError::RequestCooldown(30)));

        h.clock.advance(Duration::from_secs(30));
        assert_eq!(h.service.send_request(alice, bob, RequestKind::Tpa), Err(TeleportError::DuplicateRequest));

        let keys = h.notifier.keys_for(alice);
        for key in [MessageKey::SelfTarget, MessageKey::PlayerNotOnline, MessageKey::RequestCooldown, MessageKey::RequestExists] {
            assert!(keys.contains(&key), "missing {}", key);
        }
    }

    #[test]
    fn toggled_off_and_blocked_receivers_refuse_requests() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);
        let carol = h.world.spawn_actor("Carol", 6.5, 64.0, 6.5);

        assert_eq!(h.service.toggle_requests(bob), Ok(false));
        assert_eq!(
            h.service.send_request(alice, bob, RequestKind::Tpa),
            Err(TeleportError::NotAccepting("Bob".to_string()))
        );
        assert_eq!(h.service.toggle_requests(bob), Ok(true));
        assert_eq!(h.notifier.keys_for(bob), vec![MessageKey::ToggleOff, MessageKey::ToggleOn]);

        h.service.block(bob, carol).expect("block");
        assert_eq!(h.service.send_request(carol, bob, RequestKind::Tpa), Err(TeleportError::Blocked));
        h.service.unblock(bob, carol).expect("unblock");
        assert!(h.service.send_request(carol, bob, RequestKind::Tpa).is_ok());
        assert!(h.notifier.keys_for(carol).contains(&MessageKey::YouAreBlocked));
    }

    #[test]
    fn deny_notifies_both_parties() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);

        h.service.send_request(alice, bob, RequestKind::Tpa).expect("send");
        let denied = h.service.deny(bob).expect("deny");
        assert_eq!(denied.sender, alice);
        assert!(h.notifier.keys_for(alice).contains(&MessageKey::RequestDenied));
        assert!(h.notifier.keys_for(bob).contains(&MessageKey::RequestDenied));

        assert_eq!(h.service.deny(bob).map(|r| r.sender), Err(TeleportError::NoSuchRequest));
        assert_eq!(h.notifier.keys_for(bob).last(), Some(&MessageKey::RequestNone));
    }

    #[test]
    fn find_actor_matches_names_case_insensitively() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);

        assert_eq!(h.service.find_actor(alice, " bob "), Ok(bob));
        assert_eq!(h.service.find_actor(alice, "Mallory"), Err(TeleportError::UnknownName("Mallory".to_string())));
        assert_eq!(h.notifier.keys_for(alice), vec![MessageKey::PlayerNotOnline]);
    }

    #[test]
    fn deny_removes_expired_request_before_purge() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);

        h.service.send_request(alice, bob, RequestKind::Tpa).expect("send");
        h.clock.advance(Duration::from_secs(61));

        let denied = h.service.deny(bob).expect("deny past timeout");
        assert_eq!(denied.sender, alice);
        assert!(h.notifier.keys_for(alice).contains(&MessageKey::RequestDenied));
        assert!(h.service.broker().is_empty());
        assert!(h.service.purge_expired_requests().is_empty());
    }

    #[test]
    fn accept_with_offline_sender_consumes_request() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);
        h.service.send_request(alice, bob, RequestKind::Tpa).expect("send");

        h.world.remove_actor(alice);
        assert_eq!(h.service.accept(bob), Err(TeleportError::ActorUnavailable(alice)));
        assert!(h.service.broker().is_empty());
    }

    #[test]
    fn expired_request_cannot_be_accepted_and_is_announced() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);
        let carol = h.world.spawn_actor("Carol", 6.5, 64.0, 6.5);

        h.service.send_request(alice, bob, RequestKind::Tpa).expect("send");
        h.clock.advance(Duration::from_secs(61));
        assert_eq!(h.service.accept(bob), Err(TeleportError::NoSuchRequest));

        h.service.send_request(carol, alice, RequestKind::Tpa).expect("send");
        h.clock.advance(Duration::from_secs(61));
        let expired = h.service.purge_expired_requests();
        assert_eq!(expired.len(), 1);
        assert_eq!(
            h.notifier.substitutions_for(carol, MessageKey::RequestSenderExpired),
            vec![vec![("target", "Alice".to_string())]]
        );
        assert_eq!(
            h.notifier.substitutions_for(alice, MessageKey::RequestReceiverExpired),
            vec![vec![("player", "Carol".to_string())]]
        );
    }

    #[test]
    fn disabled_request_kind_denies_on_accept() {
        let settings = TeleportSettings {
            features: FeatureSettings { tpahere: false, ..Default::default() },
            ..Default::default()
        };
        let h = harness_with(settings);
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);

        // Stored before the feature was switched off.
        assert!(h.service.broker().create(alice, bob, RequestKind::TpaHere));

        assert_eq!(h.service.accept(bob), Err(TeleportError::FeatureDisabled(Feature::TpaHere)));
        assert!(h.notifier.keys_for(bob).contains(&MessageKey::FeatureTpaHereDisabled));
        assert!(h.notifier.keys_for(alice).contains(&MessageKey::RequestDenied));
        assert!(!h.service.scheduler().is_pending(bob));
        assert!(h.service.broker().is_empty());
    }

    #[test]
    fn app_switch_blocks_everything() {
        let settings = TeleportSettings {
            features: FeatureSettings { enabled: false, ..Default::default() },
            ..Default::default()
        };
        let h = harness_with(settings);
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);

        let disabled = Err(TeleportError::FeatureDisabled(Feature::App));
        assert_eq!(h.service.send_request(alice, bob, RequestKind::Tpa), disabled);
        assert_eq!(h.service.spawn_teleport(alice).map(|_| ()), disabled);
        assert_eq!(h.service.random_teleport(alice).map(|_| ()), disabled);
        assert_eq!(h.service.set_home(alice, "base").map(|_| ()), disabled);
        assert!(h.notifier.keys_for(alice).iter().all(|key| *key == MessageKey::AppDisabled));
    }

    #[test]
    fn random_teleport_cooldown_starts_on_completion() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);

        h.service.random_teleport(alice).expect("armed");
        // Pending but not completed: no cooldown yet.
        assert_eq!(h.service.random_teleport(alice).map(|_| ()), Ok(()));
        run_ticks(&h, 20);

        let landed = h.world.position_of(alice).expect("online");
        // angle 0, distance rtp_min_distance (64) from x=0.5
        assert_eq!((landed.x, landed.y, landed.z), (64.5, 64.0, 0.5));

        h.clock.advance(Duration::from_secs(10));
        assert_eq!(
            h.service.random_teleport(alice).map(|_| ()),
            Err(TeleportError::RandomTeleportCooldown(290))
        );
    }

    #[test]
    fn cancelled_random_teleport_leaves_no_cooldown() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        h.service.random_teleport(alice).expect("armed");
        assert!(h.service.on_damage(alice));
        assert!(h.service.random_teleport(alice).is_ok());
    }

    #[test]
    fn spawn_teleport_lands_near_spawn() {
        let h = harness();
        h.world.set_spawn(200, 64, 200);
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);

        h.service.spawn_teleport(alice).expect("armed");
        run_ticks(&h, 20);

        let landed = h.world.position_of(alice).expect("online");
        // angle 0, distance 0 within spawn_radius
        assert_eq!((landed.x, landed.y, landed.z), (200.5, 64.0, 200.5));
    }

    #[test]
    fn homes_respect_limit_and_first_becomes_default() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);

        assert_eq!(h.service.set_home(alice, "Base").as_deref(), Ok("base"));
        h.service.set_home(alice, "mine").expect("second");
        h.service.set_home(alice, "farm").expect("third");
        assert_eq!(h.service.set_home(alice, "tower"), Err(TeleportError::HomeLimit(3)));
        // Overwriting does not count against the limit.
        assert!(h.service.set_home(alice, "MINE").is_ok());

        assert_eq!(h.store.player(alice).default_home.as_deref(), Some("base"));
        assert_eq!(h.service.list_homes(alice), Ok(vec!["base".to_string(), "farm".to_string(), "mine".to_string()]));
        assert_eq!(
            h.notifier.substitutions_for(alice, MessageKey::HomeList),
            vec![vec![("homes", "base, farm, mine".to_string())]]
        );

        let operator = h.world.spawn_actor("Op", 9.5, 64.0, 9.5);
        h.service.set_home_limit(operator, alice, 4).expect("limit");
        assert!(h.service.set_home(alice, "tower").is_ok());
    }

    #[test]
    fn home_teleport_uses_default_and_aborts_if_deleted() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 10.5, 64.0, 10.5);
        h.service.set_home(alice, "base").expect("home");
        h.world.place_actor(alice, 50.5, 64.0, 50.5);

        h.service.home_teleport(alice, None).expect("armed");
        run_ticks(&h, 20);
        assert_eq!(h.world.position_of(alice).map(|p| (p.x, p.z)), Some((10.5, 10.5)));

        h.world.place_actor(alice, 50.5, 64.0, 50.5);
        h.service.home_teleport(alice, Some("BASE")).expect("armed");
        h.service.delete_home(alice, "base").expect("deleted");
        run_ticks(&h, 20);
        assert_eq!(h.world.position_of(alice).map(|p| (p.x, p.z)), Some((50.5, 50.5)));
        assert!(!h.service.scheduler().is_pending(alice));

        assert_eq!(
            h.service.home_teleport(alice, Some("nowhere")).map(|_| ()),
            Err(TeleportError::HomeMissing("nowhere".to_string()))
        );
    }

    #[test]
    fn home_teleport_without_default_falls_back_to_default_name() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 10.5, 64.0, 10.5);
        assert_eq!(
            h.service.home_teleport(alice, None).map(|_| ()),
            Err(TeleportError::HomeMissing(FALLBACK_HOME.to_string()))
        );

        h.service.set_home(alice, "cabin").expect("home");
        h.service.set_default_home(alice, "Cabin").expect("default");
        assert_eq!(h.store.player(alice).default_home.as_deref(), Some("cabin"));
    }

    #[test]
    fn charge_failure_on_accept_keeps_request_consumed_and_no_teleport() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 3.5, 64.0, 3.5);
        h.service.send_request(alice, bob, RequestKind::Tpa).expect("send");

        h.cost.fail_with("4 XP levels");
        let err = h.service.accept(bob).expect_err("alice cannot pay");
        assert_eq!(err, TeleportError::InsufficientResource { required: "4 XP levels".to_string() });
        assert_eq!(h.notifier.keys_for(alice).last(), Some(&MessageKey::CostFailed));
        assert!(!h.service.scheduler().is_pending(alice));
    }

    #[test]
    fn operator_teleports_are_immediate() {
        let h = harness();
        let op = h.world.spawn_actor("Op", 0.5, 64.0, 0.5);
        let bob = h.world.spawn_actor("Bob", 25.5, 64.0, 25.5);

        let outcome = h.service.operator_teleport(op, OperatorTarget::Actor(bob)).expect("teleport");
        assert!(matches!(outcome, EnqueueOutcome::Completed(_)));
        assert_eq!(h.world.position_of(op).map(|p| (p.x, p.z)), Some((25.5, 25.5)));

        let coords = Position::new(h.world.realm(), -7.5, 64.0, 3.5);
        h.service.operator_teleport(op, OperatorTarget::Coordinates(coords)).expect("teleport");
        assert_eq!(h.world.position_of(op).map(|p| (p.x, p.z)), Some((-7.5, 3.5)));
    }

    #[test]
    fn disconnect_records_offline_location_for_offline_teleport() {
        let h = harness();
        let op = h.world.spawn_actor("Op", 0.5, 64.0, 0.5);
        let steve = h.world.spawn_actor("Steve", 42.5, 64.0, -12.5);
        h.service.spawn_teleport(steve).expect("armed");

        h.service.on_disconnect(steve);
        h.world.remove_actor(steve);
        assert!(!h.service.scheduler().is_pending(steve));
        assert_eq!(
            h.store.offline_location("steve").map(|p| (p.x, p.z)),
            Some((42.5, -12.5))
        );

        h.service.offline_teleport(op, "STEVE").expect("teleport");
        assert_eq!(h.world.position_of(op).map(|p| (p.x, p.z)), Some((42.5, -12.5)));

        assert_eq!(
            h.service.offline_teleport(op, "alex").map(|_| ()),
            Err(TeleportError::OfflineLocationMissing("alex".to_string()))
        );
        assert!(h.notifier.keys_for(op).contains(&MessageKey::OfflineMissing));
    }

    #[test]
    fn respawn_cancels_silently() {
        let h = harness();
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        h.service.spawn_teleport(alice).expect("armed");
        assert!(h.service.on_respawn(alice));
        assert!(h.notifier.effects_for(alice).is_empty());
    }

    #[test]
    fn random_offset_landing_jitters_destination() {
        let mut settings = TeleportSettings { teleport_delay_seconds: 0, ..Default::default() };
        settings.landing.mode = LandingMode::RandomOffset;
        settings.landing.random_offset_max = 2;
        let h = harness_with(settings);
        let alice = h.world.spawn_actor("Alice", 0.5, 64.0, 0.5);
        h.service.set_home(alice, "base").expect("home");
        h.world.place_actor(alice, 30.5, 64.0, 30.5);

        h.service.home_teleport(alice, None).expect("teleport");
        // range_inclusive(-2, 2) at 0.0 is -2 on both axes.
        let landed = h.world.position_of(alice).expect("online");
        assert_eq!((landed.x, landed.y, landed.z), (-1.5, 64.0, -1.5));
        assert_eq!(landed.realm, h.world.realm());
    }
}

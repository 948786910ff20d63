//! # Teleport Scheduler
//!
//! Owns the per-actor pending-teleport state machine:
//!
//! ```text
//! Idle --enqueue--> Armed(ticks) --tick...--> Completed --> Idle
//!                        |
//!                        +--move / damage / cancel / disconnect--> Cancelled --> Idle
//! ```
//!
//! Each actor has at most one armed teleport. Enqueuing charges the cost first;
//! a failed charge leaves any armed teleport untouched, a successful one
//! silently replaces it.
//!
//! ## Concurrency
//!
//! The pending map is a [`DashMap`] because movement, damage and disconnect
//! events can arrive from other threads while the host drives [`tick`].
//! Map guards are never held across collaborator calls. Every entry carries a
//! ticket so a tick only finalizes or drops the exact entry it evaluated, even
//! if the actor re-enqueued in between.
//!
//! [`tick`]: TeleportScheduler::tick

use crate::config::TeleportSettings;
use crate::cost::CostGate;
use crate::destination::Destination;
use crate::error::TeleportError;
use crate::notice::{Effect, MessageKey};
use crate::ports::{ActorDirectory, Notifier, WorldAdapter};
use crate::resolver::SafeLocationResolver;
use crate::types::{ActorId, BlockPos, Position, TeleportKind};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs once after a teleport commits successfully.
pub type SuccessCallback = Box<dyn FnOnce() + Send + Sync>;

/// An armed teleport waiting for its countdown.
struct PendingTeleport {
    ticket: u64,
    kind: TeleportKind,
    origin: BlockPos,
    ticks_remaining: u32,
    destination: Box<dyn Destination>,
    on_success: Option<SuccessCallback>,
}

/// What [`TeleportScheduler::enqueue`] did with an accepted teleport.
#[derive(Debug, Clone, PartialEq)]
pub enum EnqueueOutcome {
    /// Countdown started with this many ticks.
    Armed { ticks: u32 },
    /// No countdown applied; the actor already stands here.
    Completed(Position),
}

/// Per-tick bookkeeping, for host logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub evaluated: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub dropped: usize,
    pub failed: usize,
}

pub struct TeleportScheduler {
    pending: DashMap<ActorId, PendingTeleport>,
    next_ticket: AtomicU64,
    delay_ticks: u32,
    ticks_per_second: u32,
    cancel_on_move: bool,
    cancel_on_damage: bool,
    world: Arc<dyn WorldAdapter>,
    directory: Arc<dyn ActorDirectory>,
    notifier: Arc<dyn Notifier>,
    cost: Arc<dyn CostGate>,
    resolver: SafeLocationResolver,
}

impl TeleportScheduler {
    pub fn new(
        settings: &TeleportSettings,
        world: Arc<dyn WorldAdapter>,
        directory: Arc<dyn ActorDirectory>,
        notifier: Arc<dyn Notifier>,
        cost: Arc<dyn CostGate>,
    ) -> Self {
        Self {
            pending: DashMap::new(),
            next_ticket: AtomicU64::new(1),
            delay_ticks: settings.delay_ticks(),
            ticks_per_second: settings.ticks_per_second.max(1),
            cancel_on_move: settings.cancel_on_move,
            cancel_on_damage: settings.cancel_on_damage,
            resolver: SafeLocationResolver::new(world.clone(), settings.resolver),
            world,
            directory,
            notifier,
            cost,
        }
    }

    pub fn resolver(&self) -> &SafeLocationResolver {
        &self.resolver
    }

    /// Charges `actor` for `kind` and arms (or immediately runs) a teleport.
    ///
    /// Charge failures are reported to the actor and leave any armed teleport
    /// in place. Operator teleports are never charged and never delayed.
    pub fn enqueue(
        &self,
        actor: ActorId,
        kind: TeleportKind,
        destination: Box<dyn Destination>,
        on_success: Option<SuccessCallback>,
    ) -> Result<EnqueueOutcome, TeleportError> {
        let Some(current) = self.directory.position(actor) else {
            debug!("🚫 Teleport for offline actor {} ignored", actor);
            return Err(TeleportError::ActorUnavailable(actor));
        };

        if kind != TeleportKind::Operator {
            if let Err(err) = self.cost.charge(actor, kind) {
                debug!("💸 {} could not pay for {} teleport: {}", actor, kind, err);
                self.notifier.notify(actor, err.message_key(), &err.substitutions());
                return Err(err);
            }
        }

        if self.pending.remove(&actor).is_some() {
            debug!("🔁 Replacing pending teleport for {}", actor);
        }

        if self.delay_ticks == 0 || !kind.is_delayed() {
            let landing = self.commit(actor, kind, destination.as_ref(), on_success)?;
            return Ok(EnqueueOutcome::Completed(landing));
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        self.pending.insert(
            actor,
            PendingTeleport {
                ticket,
                kind,
                origin: current.block(),
                ticks_remaining: self.delay_ticks,
                destination,
                on_success,
            },
        );
        debug!("⏳ {} teleport armed for {} ({} ticks from {})", kind, actor, self.delay_ticks, current.block());
        Ok(EnqueueOutcome::Armed { ticks: self.delay_ticks })
    }

    /// Advances every armed teleport by one tick.
    pub fn tick(&self) -> TickSummary {
        let mut summary = TickSummary::default();
        let actors: Vec<ActorId> = self.pending.iter().map(|entry| *entry.key()).collect();

        for actor in actors {
            let Some((ticket, origin, ticks_remaining)) = self
                .pending
                .get(&actor)
                .map(|entry| (entry.ticket, entry.origin, entry.ticks_remaining))
            else {
                continue;
            };
            summary.evaluated += 1;

            let Some(current) = self.directory.position(actor) else {
                if self.remove_ticket(actor, ticket).is_some() {
                    debug!("👻 Dropped pending teleport for absent actor {}", actor);
                    summary.dropped += 1;
                }
                continue;
            };

            if self.cancel_on_move && current.block() != origin {
                if self.remove_ticket(actor, ticket).is_some() {
                    debug!("🚶 {} moved from {} to {}, teleport cancelled", actor, origin, current.block());
                    self.notifier.notify(actor, MessageKey::CancelledMove, &[]);
                    self.notifier.play_effect(actor, Effect::Cancelled);
                    summary.cancelled += 1;
                }
                continue;
            }

            if ticks_remaining % self.ticks_per_second == 0 {
                let seconds = ticks_remaining / self.ticks_per_second;
                self.notifier.notify(actor, MessageKey::Countdown, &[("seconds", seconds.to_string())]);
                self.notifier.play_effect(actor, Effect::Countdown);
            }

            let remaining = match self.pending.get_mut(&actor) {
                Some(mut entry) if entry.ticket == ticket => {
                    entry.ticks_remaining = entry.ticks_remaining.saturating_sub(1);
                    entry.ticks_remaining
                }
                _ => continue,
            };
            if remaining > 0 {
                continue;
            }

            let Some(pending) = self.remove_ticket(actor, ticket) else {
                continue;
            };
            match self.commit(actor, pending.kind, pending.destination.as_ref(), pending.on_success) {
                Ok(_) => summary.completed += 1,
                Err(TeleportError::DestinationUnresolved) => summary.dropped += 1,
                Err(_) => summary.failed += 1,
            }
        }

        summary
    }

    /// Removes a pending teleport without telling anyone.
    pub fn cancel(&self, actor: ActorId) -> bool {
        let removed = self.pending.remove(&actor).is_some();
        if removed {
            debug!("🛑 Pending teleport for {} cancelled silently", actor);
        }
        removed
    }

    /// Removes a pending teleport and tells the actor why.
    pub fn cancel_with_notice(&self, actor: ActorId, reason: MessageKey) -> bool {
        if !self.cancel(actor) {
            return false;
        }
        self.notifier.notify(actor, reason, &[]);
        self.notifier.play_effect(actor, Effect::Cancelled);
        true
    }

    /// Cancels the actor's teleport when damage cancellation is enabled.
    pub fn on_damage(&self, actor: ActorId) -> bool {
        self.cancel_on_damage && self.cancel_with_notice(actor, MessageKey::CancelledDamage)
    }

    /// Cancels the actor's teleport once they leave their origin block.
    ///
    /// Ticks perform the same check; this lets hosts with movement events
    /// react between ticks.
    pub fn on_move(&self, actor: ActorId, position: &Position) -> bool {
        if !self.cancel_on_move {
            return false;
        }
        let Some((ticket, moved)) = self
            .pending
            .get(&actor)
            .map(|entry| (entry.ticket, entry.origin != position.block()))
        else {
            return false;
        };
        if !moved || self.remove_ticket(actor, ticket).is_none() {
            return false;
        }
        self.notifier.notify(actor, MessageKey::CancelledMove, &[]);
        self.notifier.play_effect(actor, Effect::Cancelled);
        true
    }

    pub fn is_pending(&self, actor: ActorId) -> bool {
        self.pending.contains_key(&actor)
    }

    pub fn ticks_remaining(&self, actor: ActorId) -> Option<u32> {
        self.pending.get(&actor).map(|entry| entry.ticks_remaining)
    }

    pub fn pending_kind(&self, actor: ActorId) -> Option<TeleportKind> {
        self.pending.get(&actor).map(|entry| entry.kind)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn remove_ticket(&self, actor: ActorId, ticket: u64) -> Option<PendingTeleport> {
        self.pending
            .remove_if(&actor, |_, pending| pending.ticket == ticket)
            .map(|(_, pending)| pending)
    }

    /// Resolves the destination, makes it safe and moves the actor.
    fn commit(
        &self,
        actor: ActorId,
        kind: TeleportKind,
        destination: &dyn Destination,
        on_success: Option<SuccessCallback>,
    ) -> Result<Position, TeleportError> {
        let Some(target) = destination.resolve() else {
            debug!("🫥 {} teleport for {} has no destination, aborting", kind, actor);
            return Err(TeleportError::DestinationUnresolved);
        };

        let landing = if self.directory.bypasses_safety(actor) {
            target
        } else {
            self.resolver.resolve(&target)
        };

        if !self.world.move_actor(actor, &landing) {
            warn!("⚠️ Host refused to move {} to {}", actor, landing);
            self.notifier.notify(actor, MessageKey::TeleportFailed, &[]);
            return Err(TeleportError::MoveFailed);
        }

        if let Some(callback) = on_success {
            callback();
        }
        self.notifier.notify(actor, MessageKey::TeleportSuccess, &[]);
        self.notifier.play_effect(actor, Effect::Success);
        debug!("✨ {} teleport for {} completed at {}", kind, actor, landing);
        Ok(landing)
    }
}

//! Per-actor cooldown windows.

use crate::clock::Clock;
use crate::types::{ActorId, Timestamp};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Tracks when each actor last used something that is subject to a cooldown.
///
/// One tracker is one cooldown domain; independent domains (sending requests,
/// random teleports) each get their own tracker and timers.
pub struct CooldownTracker {
    last_used: DashMap<ActorId, Timestamp>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl CooldownTracker {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { last_used: DashMap::new(), window, clock }
    }

    /// Starts the window for `actor` now.
    pub fn mark(&self, actor: ActorId) {
        self.last_used.insert(actor, self.clock.now());
    }

    /// Time left in whole seconds, zero when the actor is free to go.
    ///
    /// Elapsed time is floored to whole seconds before subtracting, so an
    /// actor marked at `t` has 1s left at `t + window - 1s` and none at
    /// `t + window`.
    pub fn remaining(&self, actor: ActorId) -> Duration {
        let Some(last) = self.last_used.get(&actor).map(|entry| *entry.value()) else {
            return Duration::ZERO;
        };
        let elapsed_secs = self.clock.now().since(last).as_secs();
        Duration::from_secs(self.window.as_secs().saturating_sub(elapsed_secs))
    }

    /// Whole seconds left, for messages.
    pub fn remaining_secs(&self, actor: ActorId) -> u64 {
        self.remaining(actor).as_secs()
    }

    pub fn clear(&self, actor: ActorId) {
        self.last_used.remove(&actor);
    }

    /// Drops entries whose window has fully elapsed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.last_used.len();
        self.last_used.retain(|_, last| now.since(*last) < self.window);
        before.saturating_sub(self.last_used.len())
    }

    pub fn len(&self) -> usize {
        self.last_used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_used.is_empty()
    }
}

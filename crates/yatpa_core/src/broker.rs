//! # Request Broker
//!
//! Tracks inbound teleport requests, one per receiver, together with the
//! request-sending cooldown of every sender.
//!
//! Requests expire after the configured timeout. Reads evict expired entries
//! lazily, and the host calls [`RequestBroker::purge_expired`] once per second
//! so both parties can be told about the expiry.

use crate::clock::Clock;
use crate::cooldown::CooldownTracker;
use crate::types::{ActorId, RequestKind, Timestamp};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A request from `sender` addressed to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportRequest {
    pub sender: ActorId,
    pub receiver: ActorId,
    pub kind: RequestKind,
    pub created_at: Timestamp,
}

impl TeleportRequest {
    /// Expired once more whole seconds than the timeout have elapsed.
    pub fn is_expired(&self, now: Timestamp, timeout: Duration) -> bool {
        now.since(self.created_at).as_secs() > timeout.as_secs()
    }
}

pub struct RequestBroker {
    requests: DashMap<ActorId, TeleportRequest>,
    cooldowns: CooldownTracker,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl RequestBroker {
    pub fn new(timeout: Duration, cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            requests: DashMap::new(),
            cooldowns: CooldownTracker::new(cooldown, clock.clone()),
            timeout,
            clock,
        }
    }

    /// Stores a request for `receiver`, replacing whatever was there.
    ///
    /// Returns `false` without touching anything when the same sender already
    /// has a live request outstanding for this receiver. On success the
    /// sender's cooldown restarts.
    pub fn create(&self, sender: ActorId, receiver: ActorId, kind: RequestKind) -> bool {
        let now = self.clock.now();
        let request = TeleportRequest { sender, receiver, kind, created_at: now };

        match self.requests.entry(receiver) {
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get();
                if existing.sender == sender && !existing.is_expired(now, self.timeout) {
                    debug!("📨 Duplicate request from {} to {} rejected", sender, receiver);
                    return false;
                }
                debug!("📨 Request from {} to {} replaces one from {}", sender, receiver, existing.sender);
                occupied.insert(request);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(request);
            }
        }

        self.cooldowns.mark(sender);
        debug!("📨 Request {:?} from {} to {} stored", kind, sender, receiver);
        true
    }

    /// Seconds the actor must wait before sending another request.
    pub fn cooldown_remaining(&self, actor: ActorId) -> Duration {
        self.cooldowns.remaining(actor)
    }

    /// The live request addressed to `receiver`, evicting it if expired.
    pub fn pending_for(&self, receiver: ActorId) -> Option<TeleportRequest> {
        let now = self.clock.now();
        {
            let entry = self.requests.get(&receiver)?;
            if !entry.is_expired(now, self.timeout) {
                return Some(entry.clone());
            }
        }

        let timeout = self.timeout;
        if self.requests.remove_if(&receiver, |_, request| request.is_expired(now, timeout)).is_some() {
            debug!("📨 Expired request for {} evicted on read", receiver);
        }
        None
    }

    /// Removes the request for `receiver` regardless of its age.
    pub fn remove_for(&self, receiver: ActorId) -> Option<TeleportRequest> {
        self.requests.remove(&receiver).map(|(_, request)| request)
    }

    /// Removes and returns every request older than the timeout.
    pub fn purge_expired(&self) -> Vec<TeleportRequest> {
        let now = self.clock.now();
        let timeout = self.timeout;
        let mut expired = Vec::new();

        self.requests.retain(|_, request| {
            if request.is_expired(now, timeout) {
                expired.push(request.clone());
                false
            } else {
                true
            }
        });

        if !expired.is_empty() {
            debug!("📨 Purged {} expired request(s)", expired.len());
        }
        self.cooldowns.cleanup_expired();
        expired
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

//! Per-actor persistent state: request preferences, block lists, homes and
//! the last known location of actors who went offline.

use crate::error::StoreError;
use crate::types::{ActorId, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

fn default_true() -> bool {
    true
}

/// Everything remembered about one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Whether the actor accepts incoming requests
    #[serde(default = "default_true")]
    pub accepting: bool,
    /// Actors whose requests are refused
    #[serde(default)]
    pub blocked: BTreeSet<ActorId>,
    /// Operator override of the default home limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_home: Option<String>,
    /// Homes keyed by lower-cased name
    #[serde(default)]
    pub homes: BTreeMap<String, Position>,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            accepting: true,
            blocked: BTreeSet::new(),
            home_limit: None,
            default_home: None,
            homes: BTreeMap::new(),
        }
    }
}

impl PlayerRecord {
    pub fn home(&self, name: &str) -> Option<&Position> {
        self.homes.get(&normalize(name))
    }

    pub fn home_limit_or(&self, default_limit: u32) -> u32 {
        self.home_limit.unwrap_or(default_limit)
    }
}

/// Serializable snapshot of a whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub players: BTreeMap<ActorId, PlayerRecord>,
    /// Last location of offline actors, keyed by lower-cased display name
    #[serde(default)]
    pub offline: BTreeMap<String, Position>,
}

/// Storage backend for [`PlayerRecord`]s and offline locations.
///
/// Reads never fail: a missing or unreadable record is the default record.
pub trait PlayerStore: Send + Sync {
    fn player(&self, actor: ActorId) -> PlayerRecord;

    fn save_player(&self, actor: ActorId, record: PlayerRecord) -> Result<(), StoreError>;

    fn offline_location(&self, name: &str) -> Option<Position>;

    fn set_offline_location(&self, name: &str, position: Position) -> Result<(), StoreError>;
}

/// Home and offline names are case-insensitive.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPlayerStore {
    data: RwLock<StoreData>,
}

impl MemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoreData) -> Self {
        Self { data: RwLock::new(data) }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> StoreData {
        match self.data.read() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn player(&self, actor: ActorId) -> PlayerRecord {
        let read = |data: &StoreData| data.players.get(&actor).cloned().unwrap_or_default();
        match self.data.read() {
            Ok(data) => read(&*data),
            Err(poisoned) => read(&*poisoned.into_inner()),
        }
    }

    fn save_player(&self, actor: ActorId, record: PlayerRecord) -> Result<(), StoreError> {
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        data.players.insert(actor, record);
        Ok(())
    }

    fn offline_location(&self, name: &str) -> Option<Position> {
        let key = normalize(name);
        match self.data.read() {
            Ok(data) => data.offline.get(&key).cloned(),
            Err(poisoned) => poisoned.into_inner().offline.get(&key).cloned(),
        }
    }

    fn set_offline_location(&self, name: &str, position: Position) -> Result<(), StoreError> {
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        data.offline.insert(normalize(name), position);
        Ok(())
    }
}

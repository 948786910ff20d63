//! An in-memory voxel world for running the teleport engine without a game.
//!
//! Terrain is a flat slab of solid ground with a square border. Individual
//! blocks can be overridden, which is enough to build pillars, pools and
//! caves for the resolver to find its way around. The actor registry holds
//! positions, game modes, experience and inventories.

use crate::config::WorldSettings;
use dashmap::DashMap;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use yatpa_core::{ActorDirectory, ActorId, Position, RealmId, Wallet, WorldAdapter};

/// What occupies a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Air,
    Solid,
    Liquid,
}

/// Game modes with different safety rules. Creative and spectator actors
/// land exactly where they aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Survival,
    Adventure,
    Creative,
    Spectator,
}

#[derive(Debug, Clone)]
struct ActorState {
    name: String,
    position: Position,
    game_mode: GameMode,
    experience_level: u32,
    inventory: HashMap<String, u32>,
}

pub struct FlatWorld {
    settings: WorldSettings,
    blocks: DashMap<(RealmId, i32, i32, i32), BlockKind>,
    actors: DashMap<ActorId, ActorState>,
}

impl FlatWorld {
    pub fn new(settings: WorldSettings) -> Self {
        info!(
            "🌍 Flat world '{}' ready: ground at y={}, build limits {}..{}, border ±{}",
            settings.realm,
            settings.ground_height,
            settings.min_build_height,
            settings.max_build_height,
            settings.border_radius
        );
        Self { settings, blocks: DashMap::new(), actors: DashMap::new() }
    }

    pub fn realm(&self) -> RealmId {
        RealmId::new(self.settings.realm.clone())
    }

    pub fn set_block(&self, realm: &RealmId, x: i32, y: i32, z: i32, kind: BlockKind) {
        self.blocks.insert((realm.clone(), x, y, z), kind);
    }

    pub fn block(&self, realm: &RealmId, x: i32, y: i32, z: i32) -> BlockKind {
        if let Some(kind) = self.blocks.get(&(realm.clone(), x, y, z)) {
            return *kind;
        }
        if y >= self.settings.min_build_height && y <= self.settings.ground_height {
            BlockKind::Solid
        } else {
            BlockKind::Air
        }
    }

    /// Registers an online actor at `position`.
    pub fn join(&self, name: &str, position: Position) -> ActorId {
        let actor = ActorId::new();
        info!("👋 {} joined at {}", name, position);
        self.actors.insert(
            actor,
            ActorState {
                name: name.to_string(),
                position,
                game_mode: GameMode::default(),
                experience_level: 0,
                inventory: HashMap::new(),
            },
        );
        actor
    }

    /// Removes an actor, returning its last position.
    pub fn leave(&self, actor: ActorId) -> Option<Position> {
        self.actors.remove(&actor).map(|(_, state)| {
            info!("👋 {} left at {}", state.name, state.position);
            state.position
        })
    }

    /// Moves an actor as if it walked there.
    pub fn walk(&self, actor: ActorId, position: Position) -> bool {
        match self.actors.get_mut(&actor) {
            Some(mut state) => {
                state.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_game_mode(&self, actor: ActorId, game_mode: GameMode) {
        if let Some(mut state) = self.actors.get_mut(&actor) {
            state.game_mode = game_mode;
        }
    }

    pub fn give_levels(&self, actor: ActorId, levels: u32) {
        if let Some(mut state) = self.actors.get_mut(&actor) {
            state.experience_level = state.experience_level.saturating_add(levels);
        }
    }

    pub fn give_items(&self, actor: ActorId, item: &str, amount: u32) {
        if let Some(mut state) = self.actors.get_mut(&actor) {
            let held = state.inventory.entry(item.to_string()).or_default();
            *held = held.saturating_add(amount);
        }
    }

    pub fn online_count(&self) -> usize {
        self.actors.len()
    }
}

impl WorldAdapter for FlatWorld {
    fn is_passable_and_dry(&self, realm: &RealmId, x: i32, y: i32, z: i32) -> bool {
        self.block(realm, x, y, z) == BlockKind::Air
    }

    fn is_solid_and_dry(&self, realm: &RealmId, x: i32, y: i32, z: i32) -> bool {
        self.block(realm, x, y, z) == BlockKind::Solid
    }

    fn highest_solid_y(&self, realm: &RealmId, x: i32, z: i32) -> i32 {
        let min = self.settings.min_build_height;
        (min..self.settings.max_build_height)
            .rev()
            .find(|y| self.block(realm, x, *y, z) == BlockKind::Solid)
            .unwrap_or(min - 1)
    }

    fn is_within_world_border(&self, _realm: &RealmId, x: i32, z: i32) -> bool {
        let radius = self.settings.border_radius;
        x.abs() <= radius && z.abs() <= radius
    }

    fn min_build_height(&self, _realm: &RealmId) -> i32 {
        self.settings.min_build_height
    }

    fn max_build_height(&self, _realm: &RealmId) -> i32 {
        self.settings.max_build_height
    }

    fn move_actor(&self, actor: ActorId, position: &Position) -> bool {
        match self.actors.get_mut(&actor) {
            Some(mut state) => {
                debug!("🌀 {} moved {} -> {}", state.name, state.position, position);
                state.position = position.clone();
                true
            }
            None => {
                warn!("❌ Cannot move {}: not online", actor);
                false
            }
        }
    }

    fn spawn_point(&self, realm: &RealmId) -> Position {
        Position::new(
            realm.clone(),
            f64::from(self.settings.spawn_x) + 0.5,
            f64::from(self.settings.spawn_y),
            f64::from(self.settings.spawn_z) + 0.5,
        )
    }
}

impl ActorDirectory for FlatWorld {
    fn is_online(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    fn position(&self, actor: ActorId) -> Option<Position> {
        self.actors.get(&actor).map(|state| state.position.clone())
    }

    fn display_name(&self, actor: ActorId) -> Option<String> {
        self.actors.get(&actor).map(|state| state.name.clone())
    }

    fn bypasses_safety(&self, actor: ActorId) -> bool {
        self.actors
            .get(&actor)
            .is_some_and(|state| matches!(state.game_mode, GameMode::Creative | GameMode::Spectator))
    }

    fn find_by_name(&self, name: &str) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|entry| entry.value().name.eq_ignore_ascii_case(name))
            .map(|entry| *entry.key())
    }
}

impl Wallet for FlatWorld {
    fn experience_level(&self, actor: ActorId) -> u32 {
        self.actors.get(&actor).map_or(0, |state| state.experience_level)
    }

    fn take_levels(&self, actor: ActorId, levels: u32) -> bool {
        match self.actors.get_mut(&actor) {
            Some(mut state) if state.experience_level >= levels => {
                state.experience_level -= levels;
                true
            }
            _ => false,
        }
    }

    fn count_item(&self, actor: ActorId, item: &str) -> u32 {
        self.actors
            .get(&actor)
            .and_then(|state| state.inventory.get(item).copied())
            .unwrap_or(0)
    }

    fn take_items(&self, actor: ActorId, item: &str, amount: u32) -> bool {
        let Some(mut state) = self.actors.get_mut(&actor) else {
            return false;
        };
        match state.inventory.get_mut(item) {
            Some(held) if *held >= amount => {
                *held -= amount;
                true
            }
            _ => amount == 0,
        }
    }
}

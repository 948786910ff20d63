//! Fakes for the collaborator traits, shared by the unit tests.

use crate::cost::CostGate;
use crate::error::TeleportError;
use crate::notice::{Effect, MessageKey};
use crate::ports::{ActorDirectory, Notifier, RandomSource, Wallet, WorldAdapter};
use crate::types::{ActorId, Position, RealmId, TeleportKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Air,
    Solid,
    Liquid,
}

#[derive(Debug, Clone)]
struct TestActor {
    name: String,
    position: Position,
    bypass: bool,
}

/// A block grid with optional flat ground, a square border and actors.
pub struct GridWorld {
    realm: RealmId,
    ground: Option<i32>,
    border: Option<i32>,
    min_y: i32,
    max_y: i32,
    blocks: Mutex<HashMap<(i32, i32, i32), Block>>,
    spawn: Mutex<(i32, i32, i32)>,
    actors: Mutex<HashMap<ActorId, TestActor>>,
    refuse_moves: AtomicBool,
}

impl GridWorld {
    pub fn new() -> Self {
        Self {
            realm: RealmId::new("overworld"),
            ground: None,
            border: None,
            min_y: 0,
            max_y: 256,
            blocks: Mutex::new(HashMap::new()),
            spawn: Mutex::new((0, 64, 0)),
            actors: Mutex::new(HashMap::new()),
            refuse_moves: AtomicBool::new(false),
        }
    }

    /// Every block at or below `height` is solid.
    pub fn with_ground(mut self, height: i32) -> Self {
        self.ground = Some(height);
        self
    }

    /// Columns with `|x| <= radius && |z| <= radius` are inside.
    pub fn with_border(mut self, radius: i32) -> Self {
        self.border = Some(radius);
        self
    }

    pub fn realm(&self) -> RealmId {
        self.realm.clone()
    }

    pub fn set_solid(&self, x: i32, y: i32, z: i32) {
        self.set(x, y, z, Block::Solid);
    }

    pub fn set_liquid(&self, x: i32, y: i32, z: i32) {
        self.set(x, y, z, Block::Liquid);
    }

    pub fn set_spawn(&self, x: i32, y: i32, z: i32) {
        *self.spawn.lock().unwrap() = (x, y, z);
    }

    pub fn spawn_actor(&self, name: &str, x: f64, y: f64, z: f64) -> ActorId {
        let actor = ActorId::new();
        let position = Position::new(self.realm(), x, y, z);
        self.actors
            .lock()
            .unwrap()
            .insert(actor, TestActor { name: name.to_string(), position, bypass: false });
        actor
    }

    pub fn place_actor(&self, actor: ActorId, x: f64, y: f64, z: f64) {
        if let Some(entry) = self.actors.lock().unwrap().get_mut(&actor) {
            entry.position = Position::new(self.realm(), x, y, z).facing(entry.position.yaw, entry.position.pitch);
        }
    }

    pub fn remove_actor(&self, actor: ActorId) {
        self.actors.lock().unwrap().remove(&actor);
    }

    pub fn position_of(&self, actor: ActorId) -> Option<Position> {
        self.actors.lock().unwrap().get(&actor).map(|entry| entry.position.clone())
    }

    pub fn set_bypass(&self, actor: ActorId, bypass: bool) {
        if let Some(entry) = self.actors.lock().unwrap().get_mut(&actor) {
            entry.bypass = bypass;
        }
    }

    pub fn refuse_moves(&self, refuse: bool) {
        self.refuse_moves.store(refuse, Ordering::SeqCst);
    }

    fn set(&self, x: i32, y: i32, z: i32, block: Block) {
        self.blocks.lock().unwrap().insert((x, y, z), block);
    }

    fn block(&self, x: i32, y: i32, z: i32) -> Block {
        if let Some(block) = self.blocks.lock().unwrap().get(&(x, y, z)) {
            return *block;
        }
        match self.ground {
            Some(height) if y <= height => Block::Solid,
            _ => Block::Air,
        }
    }
}

impl WorldAdapter for GridWorld {
    fn is_passable_and_dry(&self, _realm: &RealmId, x: i32, y: i32, z: i32) -> bool {
        self.block(x, y, z) == Block::Air
    }

    fn is_solid_and_dry(&self, _realm: &RealmId, x: i32, y: i32, z: i32) -> bool {
        self.block(x, y, z) == Block::Solid
    }

    fn highest_solid_y(&self, _realm: &RealmId, x: i32, z: i32) -> i32 {
        (self.min_y..self.max_y)
            .rev()
            .find(|y| self.block(x, *y, z) == Block::Solid)
            .unwrap_or(self.min_y - 1)
    }

    fn is_within_world_border(&self, _realm: &RealmId, x: i32, z: i32) -> bool {
        self.border.map_or(true, |radius| x.abs() <= radius && z.abs() <= radius)
    }

    fn min_build_height(&self, _realm: &RealmId) -> i32 {
        self.min_y
    }

    fn max_build_height(&self, _realm: &RealmId) -> i32 {
        self.max_y
    }

    fn move_actor(&self, actor: ActorId, position: &Position) -> bool {
        if self.refuse_moves.load(Ordering::SeqCst) {
            return false;
        }
        match self.actors.lock().unwrap().get_mut(&actor) {
            Some(entry) => {
                entry.position = position.clone();
                true
            }
            None => false,
        }
    }

    fn spawn_point(&self, realm: &RealmId) -> Position {
        let (x, y, z) = *self.spawn.lock().unwrap();
        Position::new(realm.clone(), f64::from(x), f64::from(y), f64::from(z))
    }
}

impl ActorDirectory for GridWorld {
    fn is_online(&self, actor: ActorId) -> bool {
        self.actors.lock().unwrap().contains_key(&actor)
    }

    fn position(&self, actor: ActorId) -> Option<Position> {
        self.position_of(actor)
    }

    fn display_name(&self, actor: ActorId) -> Option<String> {
        self.actors.lock().unwrap().get(&actor).map(|entry| entry.name.clone())
    }

    fn bypasses_safety(&self, actor: ActorId) -> bool {
        self.actors.lock().unwrap().get(&actor).is_some_and(|entry| entry.bypass)
    }

    fn find_by_name(&self, name: &str) -> Option<ActorId> {
        self.actors
            .lock()
            .unwrap()
            .iter()
            .find(|(_, entry)| entry.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }
}

type Notice = (ActorId, MessageKey, Vec<(&'static str, String)>);

/// Remembers every message and effect.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<Notice>>,
    effects: Mutex<Vec<(ActorId, Effect)>>,
}

impl RecordingNotifier {
    pub fn keys_for(&self, actor: ActorId) -> Vec<MessageKey> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(who, _, _)| *who == actor)
            .map(|(_, key, _)| *key)
            .collect()
    }

    pub fn substitutions_for(&self, actor: ActorId, key: MessageKey) -> Vec<Vec<(&'static str, String)>> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(who, k, _)| *who == actor && *k == key)
            .map(|(_, _, subs)| subs.clone())
            .collect()
    }

    pub fn effects_for(&self, actor: ActorId) -> Vec<Effect> {
        self.effects
            .lock()
            .unwrap()
            .iter()
            .filter(|(who, _)| *who == actor)
            .map(|(_, effect)| *effect)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, actor: ActorId, key: MessageKey, substitutions: &[(&'static str, String)]) {
        self.messages.lock().unwrap().push((actor, key, substitutions.to_vec()));
    }

    fn play_effect(&self, actor: ActorId, effect: Effect) {
        self.effects.lock().unwrap().push((actor, effect));
    }
}

/// Succeeds until told to fail; records every charge attempt.
#[derive(Default)]
pub struct ScriptedCostGate {
    failure: Mutex<Option<String>>,
    charges: Mutex<Vec<(ActorId, TeleportKind)>>,
}

impl ScriptedCostGate {
    pub fn fail_with(&self, required: &str) {
        *self.failure.lock().unwrap() = Some(required.to_string());
    }

    pub fn charges(&self) -> Vec<(ActorId, TeleportKind)> {
        self.charges.lock().unwrap().clone()
    }
}

impl CostGate for ScriptedCostGate {
    fn charge(&self, actor: ActorId, kind: TeleportKind) -> Result<(), TeleportError> {
        self.charges.lock().unwrap().push((actor, kind));
        match self.failure.lock().unwrap().clone() {
            Some(required) => Err(TeleportError::InsufficientResource { required }),
            None => Ok(()),
        }
    }
}

/// Experience and items held in memory.
#[derive(Default)]
pub struct TestWallet {
    levels: Mutex<HashMap<ActorId, u32>>,
    items: Mutex<HashMap<(ActorId, String), u32>>,
}

impl TestWallet {
    pub fn give_levels(&self, actor: ActorId, levels: u32) {
        *self.levels.lock().unwrap().entry(actor).or_default() += levels;
    }

    pub fn levels(&self, actor: ActorId) -> u32 {
        self.levels.lock().unwrap().get(&actor).copied().unwrap_or(0)
    }

    pub fn give_items(&self, actor: ActorId, item: &str, amount: u32) {
        *self.items.lock().unwrap().entry((actor, item.to_string())).or_default() += amount;
    }

    pub fn items(&self, actor: ActorId, item: &str) -> u32 {
        self.items.lock().unwrap().get(&(actor, item.to_string())).copied().unwrap_or(0)
    }
}

impl Wallet for TestWallet {
    fn experience_level(&self, actor: ActorId) -> u32 {
        self.levels(actor)
    }

    fn take_levels(&self, actor: ActorId, levels: u32) -> bool {
        let mut all = self.levels.lock().unwrap();
        let balance = all.entry(actor).or_default();
        if *balance < levels {
            return false;
        }
        *balance -= levels;
        true
    }

    fn count_item(&self, actor: ActorId, item: &str) -> u32 {
        self.items(actor, item)
    }

    fn take_items(&self, actor: ActorId, item: &str, amount: u32) -> bool {
        let mut all = self.items.lock().unwrap();
        let balance = all.entry((actor, item.to_string())).or_default();
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        true
    }
}

/// Cycles through a fixed list of values in `[0, 1)`.
pub struct SequenceRandom {
    values: Vec<f64>,
    next: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "sequence needs at least one value");
        Self { values, next: AtomicUsize::new(0) }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&self) -> f64 {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.values[index % self.values.len()]
    }

    fn range_inclusive(&self, low: i32, high: i32) -> i32 {
        let span = f64::from(high - low + 1);
        (low + (self.next_f64() * span).floor() as i32).min(high)
    }
}

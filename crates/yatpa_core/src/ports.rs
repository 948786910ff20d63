//! # Collaborator Interfaces
//!
//! The core owns no world, no players and no presentation. Hosts implement
//! these traits and hand them to the components as `Arc<dyn Trait>`.
//!
//! All methods are synchronous and are called from the tick loop as well as
//! from event callbacks, so implementations must be `Send + Sync` and must
//! not block.

use crate::notice::{Effect, MessageKey};
use crate::types::{ActorId, Position, RealmId};

/// Block queries and actor movement in the simulated world.
pub trait WorldAdapter: Send + Sync {
    /// Neither solid nor liquid at the given block.
    fn is_passable_and_dry(&self, realm: &RealmId, x: i32, y: i32, z: i32) -> bool;

    /// A solid, non-liquid block that can be stood on.
    fn is_solid_and_dry(&self, realm: &RealmId, x: i32, y: i32, z: i32) -> bool;

    /// Y of the highest solid block in a column (the surface).
    fn highest_solid_y(&self, realm: &RealmId, x: i32, z: i32) -> i32;

    fn is_within_world_border(&self, realm: &RealmId, x: i32, z: i32) -> bool;

    /// Lowest buildable Y, inclusive.
    fn min_build_height(&self, realm: &RealmId) -> i32;

    /// Build height limit, exclusive.
    fn max_build_height(&self, realm: &RealmId) -> i32;

    /// Moves an actor; `false` when the host refused the change.
    fn move_actor(&self, actor: ActorId, position: &Position) -> bool;

    fn spawn_point(&self, realm: &RealmId) -> Position;
}

/// Who is online, where they are and how they are called.
pub trait ActorDirectory: Send + Sync {
    fn is_online(&self, actor: ActorId) -> bool;

    /// Live position, `None` when the actor is not present.
    fn position(&self, actor: ActorId) -> Option<Position>;

    fn display_name(&self, actor: ActorId) -> Option<String>;

    /// Free-movement actors (creative or spectator) skip safety resolution.
    fn bypasses_safety(&self, actor: ActorId) -> bool;

    /// Case-insensitive lookup of an online actor.
    fn find_by_name(&self, name: &str) -> Option<ActorId>;
}

/// Delivers messages and audio-visual effects to actors.
pub trait Notifier: Send + Sync {
    fn notify(&self, actor: ActorId, key: MessageKey, substitutions: &[(&'static str, String)]);

    fn play_effect(&self, actor: ActorId, effect: Effect);
}

/// Uniform random numbers for destination construction.
pub trait RandomSource: Send + Sync {
    /// Uniform in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// Uniform in `[low, high]`, both inclusive.
    fn range_inclusive(&self, low: i32, high: i32) -> i32;
}

/// Resources an actor can pay with.
///
/// Debits return `false` without side effects when the balance is short.
pub trait Wallet: Send + Sync {
    fn experience_level(&self, actor: ActorId) -> u32;

    fn take_levels(&self, actor: ActorId, levels: u32) -> bool;

    fn count_item(&self, actor: ActorId, item: &str) -> u32;

    fn take_items(&self, actor: ActorId, item: &str, amount: u32) -> bool;
}

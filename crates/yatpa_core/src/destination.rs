//! Destination strategies.
//!
//! A [`Destination`] is evaluated once, when a pending teleport commits, so it
//! can follow a moving target or notice that a home was deleted during the
//! countdown. Plain closures are destinations.

use crate::ports::{RandomSource, WorldAdapter};
use crate::types::{Position, RealmId};
use std::f64::consts::TAU;
use std::sync::Arc;
use tracing::debug;

/// Attempts made by [`random_surface_position`] before giving up on the area.
pub const RANDOM_POSITION_ATTEMPTS: usize = 80;

/// Attempts made by [`LandingJitter`] before keeping the exact destination.
pub const LANDING_JITTER_ATTEMPTS: usize = 8;

/// Produces the position a teleport should head for, or `None` to abort.
pub trait Destination: Send + Sync {
    fn resolve(&self) -> Option<Position>;
}

impl<F> Destination for F
where
    F: Fn() -> Option<Position> + Send + Sync,
{
    fn resolve(&self) -> Option<Position> {
        self()
    }
}

/// A destination that never moves.
pub fn fixed(position: Position) -> impl Destination {
    move || Some(position.clone())
}

/// Lands somewhere near the wrapped destination instead of exactly on it.
///
/// Each attempt picks an x/z offset within `±max_offset`, stands on the
/// surface of that column and is accepted when the feet block is passable and
/// the floor solid. If every attempt fails the wrapped destination is used
/// unchanged.
pub struct LandingJitter {
    inner: Box<dyn Destination>,
    world: Arc<dyn WorldAdapter>,
    random: Arc<dyn RandomSource>,
    max_offset: i32,
}

impl LandingJitter {
    pub fn new(
        inner: Box<dyn Destination>,
        world: Arc<dyn WorldAdapter>,
        random: Arc<dyn RandomSource>,
        max_offset: i32,
    ) -> Self {
        Self { inner, world, random, max_offset: max_offset.max(1) }
    }
}

impl Destination for LandingJitter {
    fn resolve(&self) -> Option<Position> {
        let target = self.inner.resolve()?;
        let realm = &target.realm;

        for _ in 0..LANDING_JITTER_ATTEMPTS {
            let dx = self.random.range_inclusive(-self.max_offset, self.max_offset);
            let dz = self.random.range_inclusive(-self.max_offset, self.max_offset);
            let x = (target.x + f64::from(dx)).floor() as i32;
            let z = (target.z + f64::from(dz)).floor() as i32;
            let y = self.world.highest_solid_y(realm, x, z) + 1;

            if self.world.is_passable_and_dry(realm, x, y, z) && self.world.is_solid_and_dry(realm, x, y - 1, z) {
                return Some(Position::centered(realm.clone(), x, f64::from(y), z, target.yaw, target.pitch));
            }
        }

        debug!("🎯 No jittered landing near {}, keeping exact destination", target);
        Some(target)
    }
}

/// Picks a surface position in the annulus `[min_distance, max_distance]`
/// around `(center_x, center_z)`, inside the world border.
///
/// Falls back to the realm's spawn point after
/// [`RANDOM_POSITION_ATTEMPTS`] misses.
pub fn random_surface_position(
    world: &dyn WorldAdapter,
    random: &dyn RandomSource,
    realm: &RealmId,
    center_x: f64,
    center_z: f64,
    min_distance: i32,
    max_distance: i32,
) -> Position {
    let min = min_distance.max(0);
    let max = max_distance.max(min + 1);

    for _ in 0..RANDOM_POSITION_ATTEMPTS {
        let angle = random.next_f64() * TAU;
        let distance = f64::from(random.range_inclusive(min, max));
        let x = (center_x + angle.cos() * distance).floor() as i32;
        let z = (center_z + angle.sin() * distance).floor() as i32;
        if !world.is_within_world_border(realm, x, z) {
            continue;
        }
        let y = world.highest_solid_y(realm, x, z) + 1;
        return Position::centered(realm.clone(), x, f64::from(y), z, 0.0, 0.0);
    }

    debug!("🎲 No random position inside the border around ({}, {}), using spawn", center_x, center_z);
    world.spawn_point(realm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{GridWorld, SequenceRandom};

    #[test]
    fn closures_are_destinations() {
        let realm = RealmId::new("overworld");
        let target = Position::new(realm, 1.0, 2.0, 3.0);
        let dest: Box<dyn Destination> = Box::new(fixed(target.clone()));
        assert_eq!(dest.resolve(), Some(target));

        let never: Box<dyn Destination> = Box::new(|| None);
        assert_eq!(never.resolve(), None);
    }

    #[test]
    fn jitter_lands_on_surface_of_offset_column() {
        let world = Arc::new(GridWorld::new().with_ground(64));
        // range_inclusive(-4, 4) with 0.75 picks offset +2 on both axes.
        let random = Arc::new(SequenceRandom::new(vec![0.75]));
        let base = Position::new(world.realm(), 10.5, 90.0, 10.5).facing(30.0, 0.0);

        let jitter = LandingJitter::new(Box::new(fixed(base)), world.clone(), random, 4);
        let landed = jitter.resolve().expect("destination");
        assert_eq!((landed.x, landed.y, landed.z), (12.5, 65.0, 12.5));
        assert_eq!(landed.yaw, 30.0);
    }

    #[test]
    fn jitter_keeps_exact_destination_when_no_attempt_is_standable() {
        // No ground at all: every surface column lacks a floor.
        let world = Arc::new(GridWorld::new());
        let random = Arc::new(SequenceRandom::new(vec![0.1, 0.9, 0.5]));
        let base = Position::new(world.realm(), 0.5, 70.0, 0.5);

        let jitter = LandingJitter::new(Box::new(fixed(base.clone())), world, random, 4);
        assert_eq!(jitter.resolve(), Some(base));
    }

    #[test]
    fn jitter_propagates_aborted_destination() {
        let world = Arc::new(GridWorld::new().with_ground(64));
        let random = Arc::new(SequenceRandom::new(vec![0.5]));
        let jitter = LandingJitter::new(Box::new(|| None), world, random, 4);
        assert_eq!(jitter.resolve(), None);
    }

    #[test]
    fn random_position_respects_annulus() {
        let world = GridWorld::new().with_ground(64);
        // angle 0 (cos 1, sin 0), distance range [64, 2500] at 0.0 -> 64
        let random = SequenceRandom::new(vec![0.0]);
        let position = random_surface_position(&world, &random, &world.realm(), 0.5, 0.5, 64, 2500);
        assert_eq!((position.x, position.y, position.z), (64.5, 65.0, 0.5));
    }

    #[test]
    fn random_position_falls_back_to_spawn_outside_border() {
        let world = GridWorld::new().with_ground(64).with_border(10);
        world.set_spawn(3, 65, 3);
        let random = SequenceRandom::new(vec![0.0]);
        let position = random_surface_position(&world, &random, &world.realm(), 0.0, 0.0, 64, 100);
        assert_eq!(position, world.spawn_point(&world.realm()));
    }
}

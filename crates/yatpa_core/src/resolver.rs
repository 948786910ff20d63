//! # Safe Location Resolver
//!
//! Converts an arbitrary desired destination into a standing spot an actor can
//! occupy without suffocating, drowning or falling: two passable, dry blocks
//! (feet and head) above a solid, dry floor, inside the build limits.
//!
//! ## Search Order
//!
//! 1. The desired column itself, at the desired Y clamped into the build range.
//! 2. Square rings of growing Chebyshev radius around the desired column. Each
//!    column is scanned vertically from the clamped Y, alternating up and down
//!    with up preferred, then at the surface. The candidate closest to the
//!    desired point wins; the search stops after a ring once the best candidate
//!    lies within that ring's radius.
//! 3. The realm's spawn column, scanned the same way.
//! 4. The spawn point itself, unmodified.
//!
//! The resolver is pure with respect to the world: it only reads.

use crate::config::ResolverSettings;
use crate::error::TeleportError;
use crate::ports::WorldAdapter;
use crate::types::{BlockPos, Position, RealmId};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct SafeLocationResolver {
    world: Arc<dyn WorldAdapter>,
    bounds: ResolverSettings,
}

impl SafeLocationResolver {
    pub fn new(world: Arc<dyn WorldAdapter>, bounds: ResolverSettings) -> Self {
        Self { world, bounds }
    }

    /// Resolves `desired` with the configured search bounds.
    pub fn resolve(&self, desired: &Position) -> Position {
        self.resolve_within(desired, self.bounds.max_horizontal_radius, self.bounds.vertical_range)
    }

    /// Resolves `desired`, always producing a position.
    pub fn resolve_within(&self, desired: &Position, max_horizontal_radius: i32, vertical_range: i32) -> Position {
        match self.try_resolve(desired, max_horizontal_radius, vertical_range) {
            Ok(position) => position,
            Err(_) => {
                let spawn = self.world.spawn_point(&desired.realm);
                warn!("⚠️ No safe location near {} or at spawn, using raw spawn {}", desired, spawn);
                spawn
            }
        }
    }

    /// Steps 1-3 of the search; fails only when even the spawn column is unsafe.
    pub fn try_resolve(
        &self,
        desired: &Position,
        max_horizontal_radius: i32,
        vertical_range: i32,
    ) -> Result<Position, TeleportError> {
        let realm = &desired.realm;
        let origin = desired.block();
        let start_y = self.clamp_y(realm, origin.y);

        if self.world.is_within_world_border(realm, origin.x, origin.z)
            && self.is_safe_stand(realm, origin.x, start_y, origin.z)
        {
            let y = if origin.y == start_y { desired.y } else { f64::from(start_y) };
            return Ok(Position::centered(realm.clone(), origin.x, y, origin.z, desired.yaw, desired.pitch));
        }

        if let Some(found) = self.ring_search(desired, origin, start_y, max_horizontal_radius, vertical_range) {
            debug!("🧭 Safe location for {} found at {}", desired, found);
            return Ok(found);
        }

        let spawn = self.world.spawn_point(realm).block();
        if let Some(found) = self.find_in_column(realm, spawn.x, spawn.z, spawn.y, vertical_range, desired.yaw, desired.pitch) {
            warn!("⚠️ No safe location near {}, falling back to spawn column {}", desired, found);
            return Ok(found);
        }

        Err(TeleportError::UnsafeDestinationNotFound)
    }

    fn ring_search(
        &self,
        desired: &Position,
        origin: BlockPos,
        start_y: i32,
        max_radius: i32,
        vertical_range: i32,
    ) -> Option<Position> {
        let mut best: Option<(f64, Position)> = None;

        for radius in 0..=max_radius {
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    if dx.abs() != radius && dz.abs() != radius {
                        continue;
                    }
                    let Some(candidate) = self.find_in_column(
                        &desired.realm,
                        origin.x + dx,
                        origin.z + dz,
                        start_y,
                        vertical_range,
                        desired.yaw,
                        desired.pitch,
                    ) else {
                        continue;
                    };
                    let distance = desired.distance_squared(&candidate);
                    if best.as_ref().map_or(true, |(best_distance, _)| distance < *best_distance) {
                        best = Some((distance, candidate));
                    }
                }
            }

            if let Some((best_distance, _)) = &best {
                if *best_distance <= f64::from(radius) * f64::from(radius) {
                    break;
                }
            }
        }

        best.map(|(_, position)| position)
    }

    /// Scans one column: offset 0, then +1, -1, +2, -2 ... then the surface.
    #[allow(clippy::too_many_arguments)]
    fn find_in_column(
        &self,
        realm: &RealmId,
        x: i32,
        z: i32,
        target_y: i32,
        vertical_range: i32,
        yaw: f32,
        pitch: f32,
    ) -> Option<Position> {
        if !self.world.is_within_world_border(realm, x, z) {
            return None;
        }
        let (min_y, max_y) = self.stand_range(realm);
        let start_y = target_y.clamp(min_y, max_y);
        let centered = |y: i32| Position::centered(realm.clone(), x, f64::from(y), z, yaw, pitch);

        for dy in 0..=vertical_range.max(0) {
            let up = start_y + dy;
            if up <= max_y && self.is_safe_stand(realm, x, up, z) {
                return Some(centered(up));
            }
            if dy > 0 {
                let down = start_y - dy;
                if down >= min_y && self.is_safe_stand(realm, x, down, z) {
                    return Some(centered(down));
                }
            }
        }

        let surface = (self.world.highest_solid_y(realm, x, z) + 1).clamp(min_y, max_y);
        if self.is_safe_stand(realm, x, surface, z) {
            return Some(centered(surface));
        }
        None
    }

    /// Feet and head passable and dry, floor solid and dry, inside build range.
    pub fn is_safe_stand(&self, realm: &RealmId, x: i32, y: i32, z: i32) -> bool {
        let (min_y, max_y) = self.stand_range(realm);
        if y < min_y || y > max_y {
            return false;
        }
        self.world.is_passable_and_dry(realm, x, y, z)
            && self.world.is_passable_and_dry(realm, x, y + 1, z)
            && self.world.is_solid_and_dry(realm, x, y - 1, z)
    }

    fn stand_range(&self, realm: &RealmId) -> (i32, i32) {
        let min_y = self.world.min_build_height(realm) + 1;
        let max_y = self.world.max_build_height(realm) - 2;
        (min_y, max_y.max(min_y))
    }

    fn clamp_y(&self, realm: &RealmId, y: i32) -> i32 {
        let (min_y, max_y) = self.stand_range(realm);
        y.clamp(min_y, max_y)
    }
}

//! # Core Type Definitions
//!
//! Value types shared by every teleport component: actor and realm identifiers,
//! world positions, block coordinates, timestamps and the teleport/request kinds.
//!
//! ## Key Types
//!
//! - [`ActorId`] - Unique identifier for an actor (player) in the world
//! - [`RealmId`] - Identifier of a world/dimension
//! - [`Position`] - Precise position with facing, tied to a realm
//! - [`BlockPos`] - Integer block coordinates used for movement and safety checks
//! - [`Timestamp`] - Monotonic milliseconds produced by a [`crate::Clock`]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for an actor in the world.
///
/// This is a wrapper around UUID that keeps actor ids from being confused with
/// any other identifier passed through the teleport components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Creates a new random actor ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for ActorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a world or dimension, e.g. `minecraft:overworld`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RealmId(pub String);

impl RealmId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RealmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A precise location in a realm, including facing.
///
/// Positions are immutable values; every adjustment produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub realm: RealmId,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl Position {
    pub fn new(realm: RealmId, x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, realm, yaw: 0.0, pitch: 0.0 }
    }

    /// Returns a copy facing the given direction.
    pub fn facing(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    /// The block containing this position.
    pub fn block(&self) -> BlockPos {
        BlockPos::containing(self.x, self.y, self.z)
    }

    /// Squared euclidean distance, ignoring realms.
    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Standing position in the middle of the given block column at `y`.
    pub fn centered(realm: RealmId, x: i32, y: f64, z: i32, yaw: f32, pitch: f32) -> Self {
        Self {
            x: f64::from(x) + 0.5,
            y,
            z: f64::from(z) + 0.5,
            realm,
            yaw,
            pitch,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}, {:.2}, {:.2} in {}", self.x, self.y, self.z, self.realm)
    }
}

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a precise coordinate (floor on every axis).
    pub fn containing(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }

    pub const fn above(self) -> Self {
        Self::new(self.x, self.y + 1, self.z)
    }

    pub const fn below(self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Monotonic point in time, in milliseconds since an arbitrary clock origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, zero if `earlier` lies in the future.
    pub fn since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    pub fn plus(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.as_millis() as u64))
    }
}

/// The kind of request one actor sends another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Sender asks to travel to the receiver.
    Tpa,
    /// Sender asks the receiver to travel to them.
    TpaHere,
}

impl RequestKind {
    pub fn teleport_kind(self) -> TeleportKind {
        match self {
            RequestKind::Tpa => TeleportKind::Tpa,
            RequestKind::TpaHere => TeleportKind::TpaHere,
        }
    }
}

/// The kind of teleport being executed; selects cost and delay behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportKind {
    Tpa,
    TpaHere,
    Home,
    Rtp,
    Spawn,
    /// Operator-issued teleports: never charged, never delayed.
    Operator,
}

impl TeleportKind {
    pub const CHARGEABLE: [TeleportKind; 5] = [
        TeleportKind::Tpa,
        TeleportKind::TpaHere,
        TeleportKind::Home,
        TeleportKind::Rtp,
        TeleportKind::Spawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TeleportKind::Tpa => "tpa",
            TeleportKind::TpaHere => "tpahere",
            TeleportKind::Home => "home",
            TeleportKind::Rtp => "rtp",
            TeleportKind::Spawn => "spawn",
            TeleportKind::Operator => "operator",
        }
    }

    /// Whether the configured countdown applies to this kind.
    pub fn is_delayed(self) -> bool {
        !matches!(self, TeleportKind::Operator)
    }
}

impl fmt::Display for TeleportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! # Yatpa Core
//!
//! The engine behind player-to-player teleport requests, delayed teleports
//! and safe landing resolution. It owns no world and no network: the host
//! supplies a world, an actor directory, a notifier, a clock, a random source,
//! a cost gate and a player store through the traits in [`ports`], [`clock`],
//! [`cost`] and [`store`], and drives the engine by calling
//! [`TeleportService::tick`] once per game tick.
//!
//! ## Components
//!
//! - **[`RequestBroker`]**: at most one live request per receiver, with
//!   a timeout and a per-sender cooldown
//! - **[`TeleportScheduler`]**: countdowns keyed by actor, cancelled by
//!   movement or damage, charged up front and committed at zero
//! - **[`SafeLocationResolver`]**: nearest standable block around a desired
//!   position, falling back to the realm spawn
//! - **[`TeleportService`]**: the command surface (requests, homes, random,
//!   spawn and operator teleports, lifecycle hooks)
//!
//! Every operation reports failures to the initiating actor through the
//! [`Notifier`] and returns them as a [`TeleportError`].

pub mod broker;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod cost;
pub mod destination;
pub mod error;
pub mod notice;
pub mod ports;
pub mod resolver;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use broker::{RequestBroker, TeleportRequest};
pub use clock::{Clock, ManualClock};
pub use config::{
    CostMode, CostSettings, Feature, FeatureSettings, KindCosts, LandingMode, LandingSettings,
    ResolverSettings, TeleportSettings,
};
pub use cooldown::CooldownTracker;
pub use cost::{ConfiguredCostGate, CostGate, FreeCostGate};
pub use destination::{fixed, random_surface_position, Destination, LandingJitter};
pub use error::{StoreError, TeleportError};
pub use notice::{Effect, MessageKey, Substitutions};
pub use ports::{ActorDirectory, Notifier, RandomSource, Wallet, WorldAdapter};
pub use resolver::SafeLocationResolver;
pub use scheduler::{EnqueueOutcome, SuccessCallback, TeleportScheduler, TickSummary};
pub use service::{Collaborators, OperatorTarget, TeleportService, FALLBACK_HOME};
pub use store::{normalize, MemoryPlayerStore, PlayerRecord, PlayerStore, StoreData};
pub use types::{ActorId, BlockPos, Position, RealmId, RequestKind, TeleportKind, Timestamp};

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, ids are monotonic)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod items;
pub mod obstacles;
pub mod player;
pub mod powerups;
pub mod session;
pub mod state;
pub mod tables;
pub mod tick;
pub mod track;
pub mod world;

pub use collision::{Aabb, Capsule};
pub use items::{Item, ItemStreamer};
pub use obstacles::{
    Obstacle, ObstacleClass, ObstacleSpec, ObstacleStreamer, RandomProfile, SpawnMode, SpawnPlan,
    plan_spawn,
};
pub use player::{DeathCause, InputEvent, Player};
pub use powerups::{ActiveEffect, PowerUpKind, PowerUps};
pub use session::{GamePhase, RunSummary, Session};
pub use state::{GameEvent, GameState, PlayerView, SessionView, Snapshot};
pub use tables::{ItemKind, ObstaclePattern, ObstacleType, PatternEntry, SpawnTables, SpawnableItem};
pub use tick::{TickInput, run_frame, tick};
pub use track::{TrackSegment, TrackStreamer};
pub use world::{EntityIds, World};

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - Rendering only through the `Renderer` trait

pub mod autopilot;
pub mod collision;
pub mod entity;
pub mod spawner;
pub mod state;
pub mod steering;
pub mod tick;

pub use collision::{Ray, circles_overlap, entities_collide, ray_hits_circle};
pub use entity::{EffectKind, EnemyBrain, Entity, EntityId, EntityKind};
pub use spawner::SpawnTimer;
pub use state::{GameEvent, GameState, PlayerPhase, PlayerStatus, RunStats, PLAYER_INDEX};
pub use tick::{TickInput, tick};

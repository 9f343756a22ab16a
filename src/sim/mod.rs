//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable timestep, clamped per tick
//! - Seeded RNG only
//! - Stable iteration order (insertion order of each entity list)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod boss;
pub mod collision;
pub mod economy;
pub mod enemy;
pub mod player;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use enemy::{Enemy, EnemyKind, EnemyType, Shape, TurretSide};
pub use player::MoveIntent;
pub use snapshot::Snapshot;
pub use state::{
    Bullet, BulletOwner, GameEvent, GamePhase, GameState, GoldDrop, Mine, MineState, Player,
    Purchase,
};
pub use tick::{Action, TickInput, tick};

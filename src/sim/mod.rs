//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed 60 Hz frames only, all tuning in per-frame units
//! - Randomness only for cosmetic particles, from a seeded RNG
//! - Entities looked up by id, never by list position
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod geometry;
pub mod level;
pub mod mechanics;
pub mod particles;
pub mod physics;
pub mod state;
pub mod tick;

pub use collision::Outcome;
pub use entity::{Display, Entity, EntityKind, FallStrategy, MechanicState, Properties};
pub use geometry::Rect;
pub use level::LevelData;
pub use mechanics::{MechanicEvent, Rule};
pub use state::{DeathCause, GameEvent, GamePhase, GameState, Particle, PlayerState};
pub use tick::{TickInput, tick};

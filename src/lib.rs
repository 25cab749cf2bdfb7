//! Fakeout - a platformer whose levels lie to you
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (physics, collisions, level mechanics)
//! - `levels`: Built-in hand-authored levels
//! - `renderer`: WebGPU rendering pipeline
//! - `input`: Keyboard/touch to held-state mapping
//! - `taunt`: Post-death taunt text with local fallback
//! - `progress`, `settings`: LocalStorage-backed player data

pub mod audio;
pub mod input;
pub mod levels;
pub mod progress;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod taunt;

pub use progress::Progress;
pub use settings::Settings;

/// Game configuration constants
///
/// Physics values are per-frame quantities at a fixed 60 Hz step.
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one mechanics frame per step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per animation frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Grid size used by hand-authored and editor-authored levels
    pub const TILE: f32 = 40.0;

    /// Player square edge length
    pub const PLAYER_SIZE: f32 = 30.0;
    /// Horizontal speed while a direction is held
    pub const MOVE_SPEED: f32 = 5.0;
    /// Horizontal decay factor when no direction is held
    pub const FRICTION: f32 = 0.8;
    /// Horizontal speeds below this snap to zero
    pub const VELOCITY_EPSILON: f32 = 0.1;
    /// Vertical impulse applied on jump (negative is up)
    pub const JUMP_FORCE: f32 = -11.0;
    pub const GRAVITY: f32 = 0.6;
    pub const MAX_FALL_SPEED: f32 = 12.0;

    /// Distance below the level floor at which the player is lost
    pub const VOID_MARGIN: f32 = 100.0;
    /// Hazard hitbox inset on each side of the player
    pub const HITBOX_INSET: f32 = 4.0;

    /// Frames a crumbling platform holds after first contact
    pub const CRUMBLE_FRAMES: u32 = 20;
    /// Per-frame drop of a triggered falls-on-approach hazard
    pub const APPROACH_FALL_SPEED: f32 = 10.0;

    /// Particles spawned by a death burst
    pub const DEATH_PARTICLES: usize = 40;
    /// Particles spawned when a decoy pops
    pub const POP_PARTICLES: usize = 24;
}

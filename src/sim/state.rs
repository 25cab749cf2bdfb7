//! Game state and core simulation types
//!
//! `GameState` owns one level attempt: a working copy of the level's
//! entities, the player, and cosmetic particles. Restarting rebuilds it from
//! the canonical `LevelData`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::Entity;
use super::geometry::Rect;
use super::level::LevelData;
use super::mechanics::Rule;
use crate::consts::*;

/// Current phase of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Simulation running
    Playing,
    /// Player died; particles keep animating until restart
    Dead,
    /// Goal reached
    Won,
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Spiked,
    Void,
    Trap,
}

impl DeathCause {
    /// Human-readable cause for the death screen and taunt context
    pub fn message(&self) -> &'static str {
        match self {
            DeathCause::Spiked => "Spiked",
            DeathCause::Void => "Fell into the void",
            DeathCause::Trap => "It was a trap!",
        }
    }
}

/// Things collaborators react to (sound, screens, taunts)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Jumped,
    /// A decoy burst open somewhere
    DecoyPopped { at: Vec2 },
    /// A trap platform gave way
    Collapsed { id: String },
    /// A hazard started to fall
    Dropped { id: String },
    /// Something hidden came into play
    Revealed { id: String },
    Died { at: Vec2, cause: DeathCause },
    Won,
}

/// The player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    pub dead: bool,
    /// Last nonzero horizontal input, for eye placement only
    pub face_right: bool,
}

impl PlayerState {
    pub fn new(start: Vec2) -> Self {
        Self {
            pos: start,
            vel: Vec2::ZERO,
            grounded: false,
            dead: false,
            face_right: true,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::square(self.pos, PLAYER_SIZE)
    }

    /// Forgiving rectangle used for hazard and goal contact
    #[inline]
    pub fn hitbox(&self) -> Rect {
        self.rect().inset(HITBOX_INSET)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(PLAYER_SIZE / 2.0)
    }
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases by `decay` each frame
    pub life: f32,
    pub decay: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// One running level attempt
#[derive(Debug, Clone)]
pub struct GameState {
    /// Canonical level data; never mutated
    pub level: LevelData,
    /// Scripted rules for this level
    pub rules: Vec<Rule>,
    /// Working copy mutated by mechanics
    pub entities: Vec<Entity>,
    pub player: PlayerState,
    pub phase: GamePhase,
    /// Frames simulated in this attempt
    pub frame: u64,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Cause of the most recent death in this attempt
    pub death: Option<DeathCause>,
    rng: Pcg32,
}

impl GameState {
    /// Start an attempt at `level` driven by `rules`
    ///
    /// The caller picks the rules: a level's embedded list, or a registry
    /// entry for built-in content.
    pub fn new(level: LevelData, rules: Vec<Rule>, seed: u64) -> Self {
        let entities = level.instantiate();
        let player = PlayerState::new(level.start_pos);
        log::info!(
            "Level {} '{}' loaded: {} entities, {} rules",
            level.id,
            level.name,
            entities.len(),
            rules.len()
        );
        Self {
            level,
            rules,
            entities,
            player,
            phase: GamePhase::Playing,
            frame: 0,
            particles: Vec::new(),
            death: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Rebuild the working copy from the authored level and respawn
    ///
    /// Particles survive so a death burst keeps animating into the retry.
    pub fn restart(&mut self) {
        self.entities = self.level.instantiate();
        self.player = PlayerState::new(self.level.start_pos);
        self.phase = GamePhase::Playing;
        self.frame = 0;
        self.death = None;
        log::info!("Level {} restarted", self.level.id);
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        super::entity::find(&self.entities, id)
    }

    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        super::entity::find_mut(&mut self.entities, id)
    }

    /// Cosmetic particle burst centered on `at`
    pub fn burst(&mut self, at: Vec2, count: usize, palette: [u32; 2]) {
        super::particles::burst(&mut self.particles, &mut self.rng, at, count, palette);
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}

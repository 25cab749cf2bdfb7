//! Fixed timestep simulation tick
//!
//! One call advances one 60 Hz frame in a fixed order: particles, physics,
//! mechanics, horizontal pass, vertical pass, then the void/hazard/goal check.

use super::collision::{self, Outcome};
use super::mechanics::{self, MechanicEvent};
use super::particles::{self, DEATH_PALETTE, POP_PALETTE};
use super::physics;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Held input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Advance the game state by one frame
///
/// Particles age on every call; everything else only runs while playing.
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    particles::update(&mut state.particles);

    if state.phase != GamePhase::Playing {
        return events;
    }
    state.frame += 1;

    if physics::integrate(&mut state.player, input) {
        events.push(GameEvent::Jumped);
    }

    // Mechanics shape the entity list before anything reads it this frame
    let mechanic_events = mechanics::run(
        &mut state.entities,
        &state.rules,
        &state.player,
        state.frame,
    );
    for event in mechanic_events {
        events.push(match event {
            MechanicEvent::Popped { at, .. } => {
                state.burst(at, POP_PARTICLES, POP_PALETTE);
                GameEvent::DecoyPopped { at }
            }
            MechanicEvent::Collapsed { id } => GameEvent::Collapsed { id },
            MechanicEvent::Dropped { id } => GameEvent::Dropped { id },
            MechanicEvent::Revealed { id } => GameEvent::Revealed { id },
        });
    }

    collision::resolve_horizontal(&mut state.player, &state.entities, state.level.width);
    collision::resolve_vertical(&mut state.player, &state.entities);

    match collision::check_outcome(&state.player, &state.entities, state.level.height) {
        Some(Outcome::Death(cause)) => {
            let at = state.player.center();
            state.phase = GamePhase::Dead;
            state.player.dead = true;
            state.death = Some(cause);
            state.burst(at, DEATH_PARTICLES, DEATH_PALETTE);
            log::info!(
                "Died on level {} at frame {}: {}",
                state.level.id,
                state.frame,
                cause.message()
            );
            events.push(GameEvent::Died { at, cause });
        }
        Some(Outcome::Win) => {
            state.phase = GamePhase::Won;
            log::info!("Level {} cleared at frame {}", state.level.id, state.frame);
            events.push(GameEvent::Won);
        }
        None => {}
    }

    events
}

//! Collision resolution for the player
//!
//! Axis-separated AABB resolution: move horizontally and push out of solids,
//! then move vertically and push out again. Not a general physics engine; at
//! these speeds horizontal-then-vertical is enough to avoid corner tunneling.
//!
//! Entities with `collidable = false` are skipped regardless of visibility,
//! which is how fake floors let the player fall through.

use super::entity::{Entity, EntityKind};
use super::state::{DeathCause, PlayerState};
use crate::consts::*;

/// Terminal result of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Death(DeathCause),
    Win,
}

/// Apply horizontal velocity, clamp to the level, push out of solids
pub fn resolve_horizontal(player: &mut PlayerState, entities: &[Entity], level_width: f32) {
    let max_x = (level_width - PLAYER_SIZE).max(0.0);
    let dir = player.vel.x;

    player.pos.x = (player.pos.x + dir).clamp(0.0, max_x);

    for e in entities.iter().filter(|e| e.is_solid()) {
        if !player.rect().intersects(&e.rect) {
            continue;
        }
        if dir > 0.0 {
            player.pos.x = e.rect.x - PLAYER_SIZE;
            player.vel.x = 0.0;
        } else if dir < 0.0 {
            player.pos.x = e.rect.right();
            player.vel.x = 0.0;
        }
    }

    player.pos.x = player.pos.x.clamp(0.0, max_x);
}

/// Apply vertical velocity and push out of solids. Grounded only if a floor
/// was hit this frame.
pub fn resolve_vertical(player: &mut PlayerState, entities: &[Entity]) {
    let dir = player.vel.y;
    player.grounded = false;
    player.pos.y += dir;

    for e in entities.iter().filter(|e| e.is_solid()) {
        if !player.rect().intersects(&e.rect) {
            continue;
        }
        if dir > 0.0 {
            player.pos.y = e.rect.y - PLAYER_SIZE;
            player.vel.y = 0.0;
            player.grounded = true;
        } else if dir < 0.0 {
            player.pos.y = e.rect.bottom();
            player.vel.y = 0.0;
        }
    }
}

/// Void, hazard and goal checks, in that order
///
/// Entities are scanned in list order; the first terminal contact wins.
pub fn check_outcome(player: &PlayerState, entities: &[Entity], level_height: f32) -> Option<Outcome> {
    if player.pos.y > level_height + VOID_MARGIN {
        return Some(Outcome::Death(DeathCause::Void));
    }

    let hitbox = player.hitbox();
    for e in entities {
        if !hitbox.intersects(&e.rect) {
            continue;
        }
        match e.kind {
            // Spikes bite whether or not they are currently drawn
            EntityKind::Spike if e.collidable => {
                return Some(Outcome::Death(DeathCause::Spiked));
            }
            EntityKind::Goal if e.properties.is_fake => {
                return Some(Outcome::Death(DeathCause::Trap));
            }
            EntityKind::Goal if e.visible => return Some(Outcome::Win),
            _ => {}
        }
    }

    None
}

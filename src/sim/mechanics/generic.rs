//! Property-driven mechanics
//!
//! These apply to any entity that carries the matching property, so editor
//! levels can compose them freely.

use glam::Vec2;

use super::MechanicEvent;
use crate::consts::*;
use crate::sim::entity::{Entity, EntityKind, FallStrategy, MechanicState};
use crate::sim::state::PlayerState;

/// How far above a trap platform the player still counts as standing on it
pub const CRUMBLE_REACH: f32 = 2.0;

/// Trap platforms: start a countdown on first grounded contact, vanish for
/// good once it runs out. The countdown never pauses or resets.
pub fn crumble(entities: &mut [Entity], player: &PlayerState, events: &mut Vec<MechanicEvent>) {
    let body = player.rect();

    for e in entities.iter_mut().filter(|e| e.properties.is_trap) {
        match e.state {
            MechanicState::Idle => {
                if player.grounded
                    && e.collidable
                    && body.intersects(&e.rect.grow_up(CRUMBLE_REACH))
                {
                    e.state = MechanicState::Countdown { frames: 0 };
                }
            }
            MechanicState::Countdown { frames } => {
                let frames = frames + 1;
                if frames >= CRUMBLE_FRAMES {
                    e.remove();
                    e.state = MechanicState::Spent;
                    log::debug!("Trap '{}' collapsed", e.id);
                    events.push(MechanicEvent::Collapsed { id: e.id.clone() });
                } else {
                    e.state = MechanicState::Countdown { frames };
                }
            }
            _ => {}
        }
    }
}

/// Hazards that drop once the player walks beneath them, then keep falling
pub fn fall_on_approach(
    entities: &mut [Entity],
    player: &PlayerState,
    events: &mut Vec<MechanicEvent>,
) {
    let player_center = player.center();

    for e in entities
        .iter_mut()
        .filter(|e| e.properties.fall_strategy == Some(FallStrategy::OnApproach))
    {
        if e.state == MechanicState::Idle {
            let dx = (player_center.x - e.rect.center().x).abs();
            if dx < PLAYER_SIZE && player.pos.y > e.rect.y {
                e.state = MechanicState::Falling {
                    vy: APPROACH_FALL_SPEED,
                };
                log::debug!("'{}' dropping", e.id);
                events.push(MechanicEvent::Dropped { id: e.id.clone() });
            }
        }

        if let MechanicState::Falling { vy } = e.state {
            e.rect.y += vy;
        }
    }
}

/// Moving platforms drift by their velocity and turn around `range` pixels
/// either side of where they were authored
pub fn patrol(entities: &mut [Entity]) {
    for e in entities
        .iter_mut()
        .filter(|e| e.kind == EntityKind::MovingPlatform)
    {
        let vel = Vec2::new(e.vx.unwrap_or(0.0), e.vy.unwrap_or(0.0));
        if vel == Vec2::ZERO {
            continue;
        }

        e.rect.x += vel.x;
        e.rect.y += vel.y;

        if let Some(range) = e.properties.range {
            let offset = Vec2::new(e.rect.x, e.rect.y) - e.origin;
            if offset.length() >= range && offset.dot(vel) > 0.0 {
                e.vx = Some(-vel.x);
                e.vy = Some(-vel.y);
            }
        }
    }
}

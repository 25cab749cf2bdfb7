//! Player velocity integration
//!
//! Turns held input plus gravity into this frame's velocity. Position is
//! only applied by the collision resolver, one axis at a time.

use super::state::PlayerState;
use super::tick::TickInput;
use crate::consts::*;

/// Update velocity from input and gravity. Returns true when a jump fired.
pub fn integrate(player: &mut PlayerState, input: &TickInput) -> bool {
    match (input.left, input.right) {
        (true, false) => {
            player.vel.x = -MOVE_SPEED;
            player.face_right = false;
        }
        (false, true) => {
            player.vel.x = MOVE_SPEED;
            player.face_right = true;
        }
        _ => {
            player.vel.x *= FRICTION;
            if player.vel.x.abs() < VELOCITY_EPSILON {
                player.vel.x = 0.0;
            }
        }
    }

    let jumped = input.jump && player.grounded;
    if jumped {
        player.vel.y = JUMP_FORCE;
        player.grounded = false;
    }

    player.vel.y = (player.vel.y + GRAVITY).min(MAX_FALL_SPEED);

    jumped
}

//! Cosmetic particle bursts
//!
//! Nothing in the simulation reads particles back.

use glam::Vec2;
use rand::Rng;

use super::state::{MAX_PARTICLES, Particle};
use crate::consts::GRAVITY;

/// Player red and spike white
pub const DEATH_PALETTE: [u32; 2] = [0xe74c3c, 0xecf0f1];
/// Goal gold and white
pub const POP_PALETTE: [u32; 2] = [0xf1c40f, 0xffffff];

/// Spawn `count` particles flying out of `center`, alternating palette colors
pub fn burst(particles: &mut Vec<Particle>, rng: &mut impl Rng, center: Vec2, count: usize, palette: [u32; 2]) {
    for i in 0..count {
        if particles.len() >= MAX_PARTICLES {
            break;
        }
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(2.0..8.0);
        particles.push(Particle {
            pos: center,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 1.0,
            decay: rng.random_range(0.01..0.03),
            color: palette[i % 2],
            size: rng.random_range(3.0..8.0),
        });
    }
}

/// Age particles one frame and drop the dead ones
pub fn update(particles: &mut Vec<Particle>) {
    for p in particles.iter_mut() {
        p.pos += p.vel;
        p.vel.y += GRAVITY * 0.5;
        p.life -= p.decay;
    }
    particles.retain(|p| p.life > 0.0);
}

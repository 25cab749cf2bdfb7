//! Shape generation for 2D primitives
//!
//! Everything is emitted in level space (pixels, y down); the pipeline maps
//! to clip space.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors, hex_color, parse_hex};
use crate::consts::{PLAYER_SIZE, TILE};
use crate::settings::Settings;
use crate::sim::{Entity, EntityKind, GameState, Particle, PlayerState, Rect};

/// Two triangles covering `r`
pub fn rect(r: Rect, color: [f32; 4]) -> Vec<Vertex> {
    let (x0, y0, x1, y1) = (r.x, r.y, r.right(), r.bottom());
    vec![
        Vertex::new(x0, y0, color),
        Vertex::new(x1, y0, color),
        Vertex::new(x0, y1, color),
        Vertex::new(x0, y1, color),
        Vertex::new(x1, y0, color),
        Vertex::new(x1, y1, color),
    ]
}

/// A row of upward teeth filling `r`, one per tile of width
pub fn spikes(r: Rect, color: [f32; 4]) -> Vec<Vertex> {
    let teeth = (r.w / TILE).round().max(1.0) as u32;
    let tooth_w = r.w / teeth as f32;
    let mut vertices = Vec::with_capacity(teeth as usize * 3);

    for i in 0..teeth {
        let x = r.x + i as f32 * tooth_w;
        vertices.push(Vertex::new(x, r.bottom(), color));
        vertices.push(Vertex::new(x + tooth_w / 2.0, r.y, color));
        vertices.push(Vertex::new(x + tooth_w, r.bottom(), color));
    }

    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Player square with eyes looking the way it last moved
pub fn player(p: &PlayerState) -> Vec<Vertex> {
    let mut vertices = rect(p.rect(), hex_color(colors::PLAYER, 1.0));

    let eye = hex_color(colors::EYE, 1.0);
    let look = if p.face_right { 4.0 } else { -4.0 };
    let eye_y = p.pos.y + PLAYER_SIZE * 0.35;
    for dx in [PLAYER_SIZE * 0.35, PLAYER_SIZE * 0.65] {
        let c = Vec2::new(p.pos.x + dx + look, eye_y);
        vertices.extend(rect(Rect::new(c.x - 2.5, c.y - 2.5, 5.0, 5.0), eye));
    }

    vertices
}

/// Base color for an entity before opacity
pub fn entity_rgb(e: &Entity) -> u32 {
    if let Some(rgb) = e.properties.color.as_deref().and_then(parse_hex) {
        return rgb;
    }
    match e.kind {
        EntityKind::Wall => colors::WALL,
        EntityKind::Spike => colors::SPIKE,
        EntityKind::Goal => colors::GOAL,
        EntityKind::MovingPlatform => colors::PLATFORM,
        EntityKind::Decoration => colors::DECORATION,
        EntityKind::Trigger | EntityKind::Unknown => 0,
    }
}

/// Vertices for one entity, empty when it should not be drawn
pub fn entity(e: &Entity) -> Vec<Vertex> {
    let opacity = e.display.opacity.clamp(0.0, 1.0);
    if !e.visible || opacity <= 0.0 {
        return Vec::new();
    }
    let color = hex_color(entity_rgb(e), opacity);
    let r = Rect {
        x: e.rect.x + e.display.offset.x,
        y: e.rect.y + e.display.offset.y,
        ..e.rect
    };
    match e.kind {
        EntityKind::Wall | EntityKind::MovingPlatform | EntityKind::Decoration => rect(r, color),
        EntityKind::Spike => spikes(r, color),
        EntityKind::Goal => {
            let mut vertices = rect(r, color);
            vertices.extend(rect(r.inset(r.w.min(r.h) * 0.3), [1.0, 1.0, 1.0, opacity * 0.6]));
            vertices
        }
        // Triggers are invisible regions; unknown kinds are never drawn
        EntityKind::Trigger | EntityKind::Unknown => Vec::new(),
    }
}

pub fn particle(p: &Particle) -> Vec<Vertex> {
    let alpha = p.life.clamp(0.0, 1.0);
    circle(p.pos, p.size * 0.5, hex_color(p.color, alpha), 8)
}

/// The full frame in draw order
pub fn scene_vertices(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    if settings.touch_controls {
        let (w, h) = (state.level.width, state.level.height);
        let third = w / 3.0;
        vertices.extend(rect(Rect::new(0.0, h / 2.0, third, h / 2.0), colors::TOUCH_ZONE));
        vertices.extend(rect(
            Rect::new(2.0 * third, h / 2.0, third, h / 2.0),
            colors::TOUCH_ZONE,
        ));
    }

    for e in &state.entities {
        vertices.extend(entity(e));
    }

    if !state.player.dead {
        vertices.extend(player(&state.player));
    }

    if settings.particles {
        for p in &state.particles {
            vertices.extend(particle(p));
        }
    }

    vertices
}

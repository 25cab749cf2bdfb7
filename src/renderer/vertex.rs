//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// `0xRRGGBB` to linear-ish RGBA
pub fn hex_color(rgb: u32, alpha: f32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Parse a `#rrggbb` string from the level editor
pub fn parse_hex(s: &str) -> Option<u32> {
    let digits = s.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.07, 0.07, 0.1, 1.0];
    pub const WALL: u32 = 0x7f8c8d;
    pub const SPIKE: u32 = 0xecf0f1;
    pub const GOAL: u32 = 0xf1c40f;
    pub const PLATFORM: u32 = 0x3498db;
    pub const DECORATION: u32 = 0x34495e;
    pub const PLAYER: u32 = 0xe74c3c;
    pub const EYE: u32 = 0xffffff;
    pub const TOUCH_ZONE: [f32; 4] = [1.0, 1.0, 1.0, 0.06];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex_color(0x000000, 0.5), [0.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#f1c40f"), Some(0xf1c40f));
        assert_eq!(parse_hex("f1c40f"), None);
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }
}

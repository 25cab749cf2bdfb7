//! WebGPU rendering module
//!
//! The scene is rebuilt each frame as a flat triangle list in level space;
//! the pipeline letterboxes it into the canvas.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, level_to_ndc, viewport_to_level};
pub use shapes::scene_vertices;
pub use vertex::Vertex;

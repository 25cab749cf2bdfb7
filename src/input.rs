//! Keyboard and touch input
//!
//! Browser events arrive as press/release edges; the simulation only sees the
//! currently held set, sampled once per tick. No buffering.

use std::collections::{HashMap, HashSet};

use crate::renderer::viewport_to_level;
use crate::sim::TickInput;

/// A held game action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
}

/// Map a `KeyboardEvent.code` to an action
pub fn key_action(code: &str) -> Option<Action> {
    match code {
        "ArrowLeft" | "KeyA" => Some(Action::Left),
        "ArrowRight" | "KeyD" => Some(Action::Right),
        "Space" | "ArrowUp" | "KeyW" => Some(Action::Jump),
        _ => None,
    }
}

/// Map a touch point to an action
///
/// The upper half of the screen jumps. The lower half is split in thirds:
/// left, jump, right.
pub fn touch_action(x: f32, y: f32, width: f32, height: f32) -> Action {
    if y < height / 2.0 {
        return Action::Jump;
    }
    let third = width / 3.0;
    if x < third {
        Action::Left
    } else if x >= 2.0 * third {
        Action::Right
    } else {
        Action::Jump
    }
}

/// Map a touch in canvas CSS pixels to an action
///
/// The level is letterboxed inside the canvas, so the point is first moved
/// into level space; the regions then line up with the drawn overlay.
pub fn canvas_touch_action(x: f32, y: f32, canvas: (f32, f32), level: (f32, f32)) -> Action {
    let viewport = (canvas.0.max(1.0) as u32, canvas.1.max(1.0) as u32);
    let (lx, ly) = viewport_to_level(x, y, level, viewport);
    touch_action(lx, ly, level.0, level.1)
}

/// Everything currently held down
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<String>,
    /// Touch identifier -> action it started on
    touches: HashMap<i32, Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the key maps to an action (the caller should
    /// suppress the browser default)
    pub fn key_down(&mut self, code: &str) -> bool {
        if key_action(code).is_none() {
            return false;
        }
        self.keys.insert(code.to_string());
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.keys.remove(code);
        key_action(code).is_some()
    }

    pub fn touch_start(&mut self, id: i32, action: Action) {
        self.touches.insert(id, action);
    }

    pub fn touch_end(&mut self, id: i32) {
        self.touches.remove(&id);
    }

    /// Drop everything, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.keys.clear();
        self.touches.clear();
    }

    fn held(&self, action: Action) -> bool {
        self.keys.iter().any(|k| key_action(k) == Some(action))
            || self.touches.values().any(|&a| a == action)
    }

    /// Snapshot for one tick
    pub fn to_tick_input(&self) -> TickInput {
        TickInput {
            left: self.held(Action::Left),
            right: self.held(Action::Right),
            jump: self.held(Action::Jump),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_action("ArrowLeft"), Some(Action::Left));
        assert_eq!(key_action("KeyD"), Some(Action::Right));
        assert_eq!(key_action("Space"), Some(Action::Jump));
        assert_eq!(key_action("KeyW"), Some(Action::Jump));
        assert_eq!(key_action("KeyR"), None);
    }

    #[test]
    fn test_held_until_released() {
        let mut input = InputState::new();
        assert!(input.key_down("ArrowRight"));
        assert!(input.to_tick_input().right);
        assert!(input.to_tick_input().right);

        input.key_up("ArrowRight");
        assert_eq!(input.to_tick_input(), TickInput::default());
    }

    #[test]
    fn test_two_keys_for_one_action() {
        let mut input = InputState::new();
        input.key_down("KeyA");
        input.key_down("ArrowLeft");
        input.key_up("KeyA");
        assert!(input.to_tick_input().left);
        input.key_up("ArrowLeft");
        assert!(!input.to_tick_input().left);
    }

    #[test]
    fn test_unmapped_keys_are_ignored() {
        let mut input = InputState::new();
        assert!(!input.key_down("Enter"));
        assert_eq!(input.to_tick_input(), TickInput::default());
    }

    #[test]
    fn test_touch_regions() {
        assert_eq!(touch_action(10.0, 100.0, 900.0, 600.0), Action::Jump);
        assert_eq!(touch_action(10.0, 500.0, 900.0, 600.0), Action::Left);
        assert_eq!(touch_action(450.0, 500.0, 900.0, 600.0), Action::Jump);
        assert_eq!(touch_action(890.0, 500.0, 900.0, 600.0), Action::Right);
    }

    #[test]
    fn test_multi_touch_and_clear() {
        let mut input = InputState::new();
        input.touch_start(1, Action::Right);
        input.touch_start(2, Action::Jump);
        let tick = input.to_tick_input();
        assert!(tick.right && tick.jump && !tick.left);

        input.touch_end(2);
        assert!(!input.to_tick_input().jump);

        input.key_down("KeyA");
        input.clear();
        assert_eq!(input.to_tick_input(), TickInput::default());
    }

    #[test]
    fn test_touch_regions_follow_letterbox() {
        let level = (800.0, 480.0);
        // Wide canvas: the level is 1000x600 on screen, centered with 500 px bars
        let canvas = (2000.0, 600.0);

        // Inside the drawn left overlay
        assert_eq!(canvas_touch_action(750.0, 375.0, canvas, level), Action::Left);
        // Inside the drawn right overlay
        assert_eq!(canvas_touch_action(1400.0, 500.0, canvas, level), Action::Right);
        // Bottom middle of the level
        assert_eq!(canvas_touch_action(1000.0, 500.0, canvas, level), Action::Jump);
        // Upper half of the level
        assert_eq!(canvas_touch_action(800.0, 100.0, canvas, level), Action::Jump);
    }

    #[test]
    fn test_matching_aspect_needs_no_mapping() {
        let level = (800.0, 480.0);
        let canvas = (400.0, 240.0);
        assert_eq!(canvas_touch_action(50.0, 200.0, canvas, level), touch_action(100.0, 400.0, 800.0, 480.0));
        assert_eq!(canvas_touch_action(390.0, 200.0, canvas, level), Action::Right);
    }
}

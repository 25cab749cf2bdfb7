//! Level schema
//!
//! The JSON shape shared by hand-authored levels and the level editor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::geometry::vec2_xy;
use super::mechanics::Rule;

/// A level as authored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "vec2_xy")]
    pub start_pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub entities: Vec<Entity>,
    /// Scripted behaviors; when empty the built-in registry is consulted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Fresh working copy of the entities with runtime fields reset
    pub fn instantiate(&self) -> Vec<Entity> {
        self.entities
            .iter()
            .cloned()
            .map(|mut e| {
                e.prepare();
                e
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{EntityKind, MechanicState};

    const EDITOR_LEVEL: &str = r#"{
        "id": 1700000000,
        "name": "Custom",
        "description": "made in the editor",
        "startPos": { "x": 40, "y": 360 },
        "width": 800,
        "height": 480,
        "entities": [
            { "id": "w_0_10", "type": "WALL", "x": 0, "y": 400, "w": 40, "h": 40,
              "visible": true, "collidable": true, "properties": {} },
            { "id": "fw_1_10", "type": "WALL", "x": 40, "y": 400, "w": 40, "h": 40,
              "visible": true, "collidable": false, "properties": { "paint": "fake" } },
            { "id": "gw_2_10", "type": "WALL", "x": 80, "y": 400, "w": 40, "h": 40,
              "visible": true, "collidable": true, "properties": { "opacity": 0.1 } },
            { "id": "g_5_9", "type": "GOAL", "x": 200, "y": 360, "w": 40, "h": 40,
              "visible": true, "collidable": true, "properties": { "isFake": true } }
        ],
        "rules": [
            { "kind": "slide_goal", "target": "g_5_9", "triggerX": 100, "speed": 2, "maxX": 400 }
        ]
    }"#;

    #[test]
    fn test_parse_editor_level() {
        let level = LevelData::from_json(EDITOR_LEVEL).unwrap();
        assert_eq!(level.id, 1_700_000_000);
        assert_eq!(level.start_pos, Vec2::new(40.0, 360.0));
        assert_eq!(level.entities.len(), 4);
        assert!(!level.entities[1].collidable);
        assert!(level.entities[3].is_decoy());
        assert_eq!(level.rules.len(), 1);
    }

    #[test]
    fn test_instantiate_is_a_deep_copy() {
        let level = LevelData::from_json(EDITOR_LEVEL).unwrap();
        let mut working = level.instantiate();
        working[0].rect.x = 999.0;
        working[0].state = MechanicState::Spent;
        assert_eq!(level.entities[0].rect.x, 0.0);

        let again = level.instantiate();
        assert_eq!(again[0].rect.x, 0.0);
        assert_eq!(again[0].state, MechanicState::Idle);
        assert_eq!(again[2].display.opacity, 0.1);
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{ "id": 3, "name": "Bare", "startPos": {"x": 0, "y": 0},
            "width": 400, "height": 300, "entities": [] }"#;
        let level = LevelData::from_json(json).unwrap();
        assert!(level.description.is_empty());
        assert!(level.rules.is_empty());
    }

    #[test]
    fn test_json_round_trip_preserves_kinds() {
        let level = LevelData::from_json(EDITOR_LEVEL).unwrap();
        let json = level.to_json().unwrap();
        let back = LevelData::from_json(&json).unwrap();
        assert_eq!(back.entities[3].kind, EntityKind::Goal);
        assert_eq!(back.start_pos, level.start_pos);
    }

    #[test]
    fn test_malformed_level_is_an_error() {
        assert!(LevelData::from_json(r#"{ "id": "one" }"#).is_err());
    }
}

//! Built-in levels
//!
//! Seven hand-authored 20x12 tile levels. Their bespoke behaviors are not part
//! of the level data: `scripted_rules` maps a level id to its rule list, and
//! `start` pairs the two into a running attempt.

use glam::Vec2;

use crate::consts::TILE;
use crate::sim::entity::{Entity, EntityKind, FallStrategy, Properties};
use crate::sim::geometry::Rect;
use crate::sim::level::LevelData;
use crate::sim::mechanics::Rule;
use crate::sim::state::GameState;

const WIDTH: f32 = 20.0 * TILE;
const HEIGHT: f32 = 12.0 * TILE;

fn start_pos() -> Vec2 {
    Vec2::new(2.0 * TILE, 8.0 * TILE)
}

fn level(id: u32, name: &str, description: &str, entities: Vec<Entity>) -> LevelData {
    LevelData {
        id,
        name: name.to_string(),
        description: description.to_string(),
        start_pos: start_pos(),
        width: WIDTH,
        height: HEIGHT,
        entities,
        rules: Vec::new(),
    }
}

fn floor(id: &str, tx: f32, tw: f32) -> Entity {
    Entity::tiles(id, EntityKind::Wall, tx, 10.0, tw, 2.0)
}

fn goal(tx: f32, ty: f32) -> Entity {
    Entity::tiles("goal", EntityKind::Goal, tx, ty, 1.0, 1.0)
}

fn spike(id: &str, tx: f32, ty: f32, tw: f32) -> Entity {
    Entity::tiles(id, EntityKind::Spike, tx, ty, tw, 1.0)
}

fn opacity(value: f32) -> Properties {
    Properties {
        opacity: Some(value),
        ..Default::default()
    }
}

/// All built-in levels in play order
pub fn builtin() -> Vec<LevelData> {
    vec![
        level(
            1,
            "First Steps",
            "Walk right. What could go wrong?",
            vec![
                floor("floor_l", 0.0, 8.0),
                floor("floor_r", 12.0, 8.0),
                spike("pit_spikes", 8.0, 11.0, 4.0),
                Entity::tiles("surprise_wall", EntityKind::Wall, 15.0, 8.0, 1.0, 2.0)
                    .hidden()
                    .intangible(),
                goal(18.0, 9.0),
            ],
        ),
        level(
            2,
            "Solid Ground",
            "Every floor is a promise.",
            vec![
                floor("floor_l", 0.0, 9.0),
                Entity::tiles("trap", EntityKind::Wall, 9.0, 10.0, 2.0, 1.0).with_properties(
                    Properties {
                        is_trap: true,
                        ..Default::default()
                    },
                ),
                spike("trap_spikes", 9.0, 11.0, 2.0),
                floor("floor_r", 11.0, 9.0),
                goal(14.0, 9.0),
            ],
        ),
        level(
            3,
            "Look Up",
            "The ceiling has opinions.",
            vec![
                floor("floor", 0.0, 20.0),
                spike("drop_1", 6.0, 2.0, 1.0),
                spike("drop_2", 10.0, 2.0, 1.0),
                spike("drop_3", 14.0, 2.0, 1.0),
                spike("ghost_spike", 17.0, 9.0, 1.0).with_properties(opacity(0.0)),
                goal(19.0, 9.0),
            ],
        ),
        level(
            4,
            "Heavy",
            "Some things fall. Some things are barely there.",
            vec![
                floor("floor", 0.0, 20.0),
                spike("dropper", 7.0, 1.0, 1.0).with_properties(Properties {
                    fall_strategy: Some(FallStrategy::OnApproach),
                    ..Default::default()
                }),
                Entity::tiles("pillar", EntityKind::Spike, 12.0, 0.0, 1.0, 2.0),
                Entity::tiles("ghost_wall", EntityKind::Wall, 15.0, 8.0, 1.0, 2.0)
                    .with_properties(opacity(0.08)),
                goal(18.0, 9.0),
            ],
        ),
        level(
            5,
            "Closing In",
            "Take your time. Or don't.",
            vec![
                Entity::tiles("ceiling", EntityKind::Spike, 0.0, 0.0, 20.0, 1.0),
                floor("floor_l", 0.0, 7.0),
                spike("pit_spikes", 7.0, 11.0, 6.0),
                Entity::new(
                    "lift",
                    EntityKind::MovingPlatform,
                    Rect::new(9.0 * TILE, 10.0 * TILE, 2.0 * TILE, TILE / 2.0),
                )
                .with_velocity(1.5, 0.0)
                .with_properties(Properties {
                    range: Some(2.0 * TILE),
                    ..Default::default()
                }),
                floor("floor_r", 13.0, 7.0),
                goal(18.0, 9.0),
            ],
        ),
        level(
            6,
            "Stand Still",
            "It only wants you when you stop.",
            vec![
                floor("floor", 0.0, 20.0),
                Entity::new(
                    "stalker",
                    EntityKind::Spike,
                    Rect::new(0.0, TILE, 30.0, 30.0),
                ),
                Entity::tiles("block", EntityKind::Wall, 10.0, 9.0, 1.0, 1.0),
                goal(18.0, 9.0),
            ],
        ),
        level(
            7,
            "The Decoy",
            "Finally, an easy one.",
            vec![
                floor("floor", 0.0, 20.0),
                Entity::tiles("fake_goal", EntityKind::Goal, 18.0, 8.0, 1.0, 1.0).with_properties(
                    Properties {
                        is_fake: true,
                        ..Default::default()
                    },
                ),
                Entity::tiles("pedestal", EntityKind::Wall, 18.0, 9.0, 1.0, 1.0),
                Entity::tiles("real_goal", EntityKind::Goal, 2.0, 3.0, 1.0, 1.0)
                    .hidden()
                    .intangible(),
                stair("stair_1", Rect::new(520.0, 340.0, 80.0, 20.0)),
                stair("stair_2", Rect::new(400.0, 280.0, 80.0, 20.0)),
                stair("stair_3", Rect::new(280.0, 220.0, 80.0, 20.0)),
                stair("stair_4", Rect::new(120.0, 160.0, 120.0, 20.0)),
            ],
        ),
    ]
}

fn stair(id: &str, rect: Rect) -> Entity {
    Entity::new(id, EntityKind::Wall, rect).hidden().intangible()
}

/// Scripted rules for a built-in level id; empty for anything else
pub fn scripted_rules(level_id: u32) -> Vec<Rule> {
    match level_id {
        1 => vec![Rule::RevealOnCross {
            target: "surprise_wall".into(),
            trigger_x: 13.0 * TILE,
        }],
        2 => vec![Rule::SlideGoal {
            target: "goal".into(),
            trigger_x: 10.0 * TILE,
            speed: 3.0,
            max_x: 18.0 * TILE,
        }],
        3 => vec![
            Rule::DropSpikes {
                targets: vec!["drop_1".into(), "drop_2".into(), "drop_3".into()],
                range: 60.0,
                shake_frames: 30,
                fall_speed: 8.0,
            },
            Rule::Pulse {
                target: "ghost_spike".into(),
                min: 0.05,
                max: 0.35,
                period: 90.0,
            },
        ],
        4 => vec![Rule::DropPillar {
            target: "pillar".into(),
            trigger_x: 10.0 * TILE,
            gravity: 0.8,
            floor_y: 10.0 * TILE,
        }],
        5 => vec![Rule::DescendCeiling {
            target: "ceiling".into(),
            speed: 0.25,
        }],
        6 => vec![Rule::Chase {
            target: "stalker".into(),
            attack_y: 350.0,
            retreat_y: TILE,
            speed: 6.0,
        }],
        7 => vec![Rule::DecoyChain {
            decoy: "fake_goal".into(),
            goal: "real_goal".into(),
            path: (1..=4).map(|i| format!("stair_{i}")).collect(),
            reach: 8.0,
        }],
        _ => Vec::new(),
    }
}

/// Look up a built-in level
pub fn by_id(id: u32) -> Option<LevelData> {
    builtin().into_iter().find(|l| l.id == id)
}

/// Begin an attempt at built-in level `id` with its scripted rules
pub fn start(id: u32, seed: u64) -> Option<GameState> {
    by_id(id).map(|level| GameState::new(level, scripted_rules(id), seed))
}

/// The level after `id` in play order, if any
pub fn next_after(id: u32) -> Option<u32> {
    let ids: Vec<u32> = builtin().iter().map(|l| l.id).collect();
    let idx = ids.iter().position(|&i| i == id)?;
    ids.get(idx + 1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::find;
    use std::collections::HashSet;

    #[test]
    fn test_seven_levels_in_order() {
        let ids: Vec<u32> = builtin().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_entity_ids_unique_per_level() {
        for level in builtin() {
            let mut seen = HashSet::new();
            for e in &level.entities {
                assert!(seen.insert(e.id.as_str()), "duplicate '{}' in level {}", e.id, level.id);
            }
        }
    }

    #[test]
    fn test_every_level_has_a_real_goal() {
        for level in builtin() {
            assert!(
                level
                    .entities
                    .iter()
                    .any(|e| e.kind == EntityKind::Goal && !e.is_decoy()),
                "level {} has no goal",
                level.id
            );
        }
    }

    #[test]
    fn test_rule_targets_exist() {
        for level in builtin() {
            let rules = scripted_rules(level.id);
            assert!(!rules.is_empty(), "level {} has no rules", level.id);
            for rule in &rules {
                for id in rule.targets() {
                    assert!(
                        find(&level.entities, id).is_some(),
                        "level {} rule targets missing '{}'",
                        level.id,
                        id
                    );
                }
            }
        }
    }

    #[test]
    fn test_spawn_is_clear() {
        for level in builtin() {
            let body = Rect::square(level.start_pos, crate::consts::PLAYER_SIZE);
            for e in level.entities.iter().filter(|e| e.collidable) {
                assert!(
                    !body.intersects(&e.rect),
                    "level {} spawns inside '{}'",
                    level.id,
                    e.id
                );
            }
        }
    }

    #[test]
    fn test_first_level_layout() {
        let level = by_id(1).unwrap();
        assert_eq!(level.start_pos, Vec2::new(80.0, 320.0));
        let spikes = find(&level.entities, "pit_spikes").unwrap();
        assert_eq!(spikes.rect, Rect::new(320.0, 440.0, 160.0, 40.0));
    }

    #[test]
    fn test_ghost_spike_starts_invisible_but_armed() {
        let level = by_id(3).unwrap();
        let working = level.instantiate();
        let ghost = find(&working, "ghost_spike").unwrap();
        assert!(ghost.collidable);
        assert_eq!(ghost.display.opacity, 0.0);
    }

    #[test]
    fn test_navigation() {
        assert_eq!(next_after(1), Some(2));
        assert_eq!(next_after(6), Some(7));
        assert_eq!(next_after(7), None);
        assert_eq!(next_after(42), None);
        assert!(by_id(42).is_none());
        assert!(scripted_rules(42).is_empty());
    }

    #[test]
    fn test_start_pairs_level_with_its_rules() {
        let state = start(7, 1).expect("built-in level");
        assert_eq!(state.level.id, 7);
        assert_eq!(state.rules, scripted_rules(7));
        assert!(state.level.rules.is_empty());
        assert!(start(42, 1).is_none());
    }

    #[test]
    fn test_builtin_levels_survive_json() {
        for level in builtin() {
            let json = level.to_json().unwrap();
            let back = LevelData::from_json(&json).unwrap();
            assert_eq!(back.entities.len(), level.entities.len());
        }
    }
}

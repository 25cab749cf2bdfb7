//! Scripted level rules
//!
//! Each rule names the entities it drives by id. Rules are plain data so a
//! level can embed them; built-in levels get theirs from the registry in
//! `crate::levels`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::MechanicEvent;
use crate::consts::VELOCITY_EPSILON;
use crate::sim::entity::{Entity, MechanicState, find, find_mut};
use crate::sim::state::PlayerState;

fn default_shake_frames() -> u32 {
    30
}

fn default_reach() -> f32 {
    8.0
}

/// A bespoke per-level behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Rule {
    /// Hidden wall appears once the player passes `trigger_x`
    RevealOnCross { target: String, trigger_x: f32 },
    /// Goal runs away to the right while the player is past `trigger_x`
    SlideGoal {
        target: String,
        trigger_x: f32,
        speed: f32,
        max_x: f32,
    },
    /// Ceiling spikes shake, then drop, when the player passes beneath
    DropSpikes {
        targets: Vec<String>,
        range: f32,
        #[serde(default = "default_shake_frames")]
        shake_frames: u32,
        fall_speed: f32,
    },
    /// Sinusoidal render opacity between `min` and `max`
    Pulse {
        target: String,
        min: f32,
        max: f32,
        /// Frames per full cycle
        period: f32,
    },
    /// Heavy block that accelerates down and stops on `floor_y`
    DropPillar {
        target: String,
        trigger_x: f32,
        gravity: f32,
        floor_y: f32,
    },
    /// Ceiling that never stops coming down
    DescendCeiling { target: String, speed: f32 },
    /// Follows the player; closes in while they stand still
    Chase {
        target: String,
        attack_y: f32,
        retreat_y: f32,
        speed: f32,
    },
    /// Touching the decoy removes it and reveals the real goal and its path
    DecoyChain {
        decoy: String,
        goal: String,
        path: Vec<String>,
        /// Extra distance around the decoy that already counts as touching
        #[serde(default = "default_reach")]
        reach: f32,
    },
}

impl Rule {
    /// Advance this rule by one frame
    pub fn apply(
        &self,
        entities: &mut [Entity],
        player: &PlayerState,
        frame: u64,
        events: &mut Vec<MechanicEvent>,
    ) {
        match self {
            Rule::RevealOnCross { target, trigger_x } => {
                if player.pos.x <= *trigger_x {
                    return;
                }
                if let Some(e) = find_mut(entities, target) {
                    if e.state == MechanicState::Idle {
                        e.reveal();
                        e.state = MechanicState::Spent;
                        log::debug!("'{}' revealed", e.id);
                        events.push(MechanicEvent::Revealed { id: e.id.clone() });
                    }
                }
            }

            Rule::SlideGoal {
                target,
                trigger_x,
                speed,
                max_x,
            } => {
                if player.pos.x <= *trigger_x {
                    return;
                }
                if let Some(e) = find_mut(entities, target) {
                    if e.rect.x < *max_x {
                        e.rect.x = (e.rect.x + speed).min(*max_x);
                    }
                }
            }

            Rule::DropSpikes {
                targets,
                range,
                shake_frames,
                fall_speed,
            } => {
                let player_x = player.center().x;
                for id in targets {
                    let Some(e) = find_mut(entities, id) else {
                        continue;
                    };
                    match e.state {
                        MechanicState::Idle => {
                            if (player_x - e.rect.center().x).abs() < *range {
                                e.state = MechanicState::Shaking { frames: 0 };
                            }
                        }
                        MechanicState::Shaking { frames } => {
                            let frames = frames + 1;
                            if frames >= *shake_frames {
                                e.display.offset = Vec2::ZERO;
                                e.state = MechanicState::Falling { vy: *fall_speed };
                                log::debug!("Spike '{}' dropping", e.id);
                                events.push(MechanicEvent::Dropped { id: e.id.clone() });
                            } else {
                                let jitter = (frames as f32 * 1.7).sin() * 3.0;
                                e.display.offset = Vec2::new(jitter, 0.0);
                                e.state = MechanicState::Shaking { frames };
                            }
                        }
                        MechanicState::Falling { vy } => e.rect.y += vy,
                        _ => {}
                    }
                }
            }

            Rule::Pulse {
                target,
                min,
                max,
                period,
            } => {
                if let Some(e) = find_mut(entities, target) {
                    let phase = frame as f32 / period.max(1.0) * std::f32::consts::TAU;
                    let t = (phase.sin() + 1.0) / 2.0;
                    e.display.opacity = min + (max - min) * t;
                }
            }

            Rule::DropPillar {
                target,
                trigger_x,
                gravity,
                floor_y,
            } => {
                let Some(e) = find_mut(entities, target) else {
                    return;
                };
                if e.state == MechanicState::Idle && player.pos.x > *trigger_x {
                    e.state = MechanicState::Falling { vy: 0.0 };
                    log::debug!("Pillar '{}' dropping", e.id);
                    events.push(MechanicEvent::Dropped { id: e.id.clone() });
                }
                if let MechanicState::Falling { vy } = e.state {
                    let vy = vy + gravity;
                    let y = e.rect.y + vy;
                    if y + e.rect.h >= *floor_y {
                        e.rect.y = floor_y - e.rect.h;
                        e.state = MechanicState::Landed;
                    } else {
                        e.rect.y = y;
                        e.state = MechanicState::Falling { vy };
                    }
                }
            }

            Rule::DescendCeiling { target, speed } => {
                if let Some(e) = find_mut(entities, target) {
                    e.rect.y += speed;
                }
            }

            Rule::Chase {
                target,
                attack_y,
                retreat_y,
                speed,
            } => {
                let Some(e) = find_mut(entities, target) else {
                    return;
                };
                e.rect.x = player.center().x - e.rect.w / 2.0;
                let goal_y = if player.vel.x.abs() < VELOCITY_EPSILON {
                    *attack_y
                } else {
                    *retreat_y
                };
                let dy = goal_y - e.rect.y;
                e.rect.y += dy.clamp(-speed, *speed);
            }

            Rule::DecoyChain {
                decoy,
                goal,
                path,
                reach,
            } => {
                let Some(d) = find(entities, decoy) else {
                    return;
                };
                if d.state != MechanicState::Idle
                    || !player.rect().intersects(&d.rect.expand(*reach))
                {
                    return;
                }
                let at = d.rect.center();

                if let Some(d) = find_mut(entities, decoy) {
                    d.remove();
                    d.state = MechanicState::Spent;
                }
                for id in std::iter::once(goal).chain(path.iter()) {
                    if let Some(e) = find_mut(entities, id) {
                        e.reveal();
                        e.state = MechanicState::Spent;
                    }
                }
                log::debug!("Decoy '{}' popped, revealed '{}' and {} path pieces", decoy, goal, path.len());
                events.push(MechanicEvent::Popped {
                    id: decoy.clone(),
                    at,
                });
            }
        }
    }

    /// Ids of every entity this rule drives
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Rule::RevealOnCross { target, .. }
            | Rule::SlideGoal { target, .. }
            | Rule::Pulse { target, .. }
            | Rule::DropPillar { target, .. }
            | Rule::DescendCeiling { target, .. }
            | Rule::Chase { target, .. } => vec![target.as_str()],
            Rule::DropSpikes { targets, .. } => targets.iter().map(String::as_str).collect(),
            Rule::DecoyChain {
                decoy, goal, path, ..
            } => std::iter::once(decoy.as_str())
                .chain(std::iter::once(goal.as_str()))
                .chain(path.iter().map(String::as_str))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_SIZE;
    use crate::sim::entity::{EntityKind, Properties};
    use crate::sim::geometry::Rect;

    fn ent(id: &str, kind: EntityKind, rect: Rect) -> Entity {
        let mut e = Entity::new(id, kind, rect);
        e.prepare();
        e
    }

    fn player_at(x: f32, y: f32) -> PlayerState {
        PlayerState::new(Vec2::new(x, y))
    }

    fn step(rule: &Rule, entities: &mut [Entity], player: &PlayerState, frame: u64) -> Vec<MechanicEvent> {
        let mut events = Vec::new();
        rule.apply(entities, player, frame, &mut events);
        events
    }

    #[test]
    fn test_reveal_on_cross() {
        let mut entities = vec![ent("wall", EntityKind::Wall, Rect::new(600.0, 320.0, 40.0, 80.0))
            .hidden()
            .intangible()];
        let rule = Rule::RevealOnCross {
            target: "wall".into(),
            trigger_x: 500.0,
        };

        step(&rule, &mut entities, &player_at(500.0, 370.0), 0);
        assert!(!entities[0].visible && !entities[0].collidable);

        let events = step(&rule, &mut entities, &player_at(501.0, 370.0), 1);
        assert!(entities[0].visible && entities[0].collidable);
        assert_eq!(events.len(), 1);

        // Once only
        let events = step(&rule, &mut entities, &player_at(600.0, 370.0), 2);
        assert!(events.is_empty());
    }

    #[test]
    fn test_slide_goal_caps_at_max() {
        let mut entities = vec![ent("goal", EntityKind::Goal, Rect::new(560.0, 360.0, 40.0, 40.0))];
        let rule = Rule::SlideGoal {
            target: "goal".into(),
            trigger_x: 400.0,
            speed: 3.0,
            max_x: 720.0,
        };

        step(&rule, &mut entities, &player_at(300.0, 370.0), 0);
        assert_eq!(entities[0].rect.x, 560.0);

        step(&rule, &mut entities, &player_at(401.0, 370.0), 1);
        assert_eq!(entities[0].rect.x, 563.0);

        for f in 0..200 {
            step(&rule, &mut entities, &player_at(450.0, 370.0), f);
        }
        assert_eq!(entities[0].rect.x, 720.0);
    }

    #[test]
    fn test_drop_spikes_shake_then_fall() {
        let mut entities = vec![
            ent("a", EntityKind::Spike, Rect::new(240.0, 80.0, 40.0, 40.0)),
            ent("b", EntityKind::Spike, Rect::new(600.0, 80.0, 40.0, 40.0)),
        ];
        let rule = Rule::DropSpikes {
            targets: vec!["a".into(), "b".into(), "missing".into()],
            range: 60.0,
            shake_frames: 10,
            fall_speed: 8.0,
        };
        let near_a = player_at(245.0, 370.0);

        step(&rule, &mut entities, &near_a, 0);
        assert_eq!(entities[0].state, MechanicState::Shaking { frames: 0 });
        assert_eq!(entities[1].state, MechanicState::Idle);

        for f in 1..10 {
            step(&rule, &mut entities, &near_a, f);
            assert_eq!(entities[0].rect.y, 80.0, "shaking never moves the hitbox");
        }
        assert!(entities[0].display.offset.x.abs() <= 3.0);

        let events = step(&rule, &mut entities, &near_a, 10);
        assert_eq!(entities[0].state, MechanicState::Falling { vy: 8.0 });
        assert_eq!(entities[0].display.offset, Vec2::ZERO);
        assert_eq!(events.len(), 1);

        for f in 11..111 {
            step(&rule, &mut entities, &player_at(0.0, 0.0), f);
        }
        assert_eq!(entities[0].rect.y, 80.0 + 100.0 * 8.0);
        assert_eq!(entities[1].rect.y, 80.0);
    }

    #[test]
    fn test_pulse_stays_in_band() {
        let mut entities = vec![ent("ghost", EntityKind::Spike, Rect::new(0.0, 0.0, 40.0, 40.0))];
        let rule = Rule::Pulse {
            target: "ghost".into(),
            min: 0.05,
            max: 0.35,
            period: 90.0,
        };
        let mut seen_low = false;
        let mut seen_high = false;
        for f in 0..90 {
            step(&rule, &mut entities, &player_at(0.0, 0.0), f);
            let o = entities[0].display.opacity;
            assert!((0.05 - 1e-4..=0.35 + 1e-4).contains(&o));
            seen_low |= o < 0.1;
            seen_high |= o > 0.3;
        }
        assert!(seen_low && seen_high);
        // Visibility flags untouched
        assert!(entities[0].visible && entities[0].collidable);
    }

    #[test]
    fn test_pillar_accelerates_and_lands_on_floor() {
        let mut entities = vec![ent("pillar", EntityKind::Spike, Rect::new(480.0, 0.0, 40.0, 120.0))];
        let rule = Rule::DropPillar {
            target: "pillar".into(),
            trigger_x: 400.0,
            gravity: 0.8,
            floor_y: 400.0,
        };

        for f in 0..10 {
            step(&rule, &mut entities, &player_at(100.0, 370.0), f);
        }
        assert_eq!(entities[0].rect.y, 0.0);
        assert_eq!(entities[0].state, MechanicState::Idle);

        let mut last_vy = 0.0;
        let mut landed_at = None;
        for f in 0..200 {
            step(&rule, &mut entities, &player_at(410.0, 370.0), f);
            assert!(entities[0].rect.bottom() <= 400.0);
            match entities[0].state {
                MechanicState::Falling { vy } => {
                    assert!(vy >= last_vy);
                    last_vy = vy;
                }
                MechanicState::Landed => {
                    landed_at.get_or_insert(f);
                }
                other => panic!("unexpected state {other:?}"),
            }
        }
        assert!(landed_at.is_some());
        assert_eq!(entities[0].rect.bottom(), 400.0);
    }

    #[test]
    fn test_descending_ceiling_never_stops() {
        let mut entities = vec![ent("ceiling", EntityKind::Spike, Rect::new(0.0, 0.0, 800.0, 40.0))];
        let rule = Rule::DescendCeiling {
            target: "ceiling".into(),
            speed: 0.5,
        };
        for f in 0..2000 {
            step(&rule, &mut entities, &player_at(0.0, 0.0), f);
        }
        assert_eq!(entities[0].rect.y, 1000.0);
    }

    #[test]
    fn test_chase_attacks_stationary_player() {
        let mut entities = vec![ent("stalker", EntityKind::Spike, Rect::new(0.0, 40.0, 40.0, 40.0))];
        let rule = Rule::Chase {
            target: "stalker".into(),
            attack_y: 350.0,
            retreat_y: 40.0,
            speed: 6.0,
        };

        let mut still = player_at(300.0, 370.0);
        still.vel = Vec2::ZERO;
        step(&rule, &mut entities, &still, 0);
        assert_eq!(entities[0].rect.center().x, 300.0 + PLAYER_SIZE / 2.0);
        assert_eq!(entities[0].rect.y, 46.0);

        for f in 1..100 {
            step(&rule, &mut entities, &still, f);
        }
        assert_eq!(entities[0].rect.y, 350.0);

        let mut moving = player_at(400.0, 370.0);
        moving.vel.x = 5.0;
        step(&rule, &mut entities, &moving, 100);
        assert_eq!(entities[0].rect.y, 344.0);
        assert_eq!(entities[0].rect.center().x, 400.0 + PLAYER_SIZE / 2.0);
    }

    #[test]
    fn test_decoy_chain_is_one_shot() {
        let mut entities = vec![
            ent("decoy", EntityKind::Goal, Rect::new(720.0, 320.0, 40.0, 40.0)).with_properties(
                Properties {
                    is_fake: true,
                    ..Default::default()
                },
            ),
            ent("real", EntityKind::Goal, Rect::new(80.0, 120.0, 40.0, 40.0))
                .hidden()
                .intangible(),
            ent("step", EntityKind::Wall, Rect::new(520.0, 340.0, 80.0, 20.0))
                .hidden()
                .intangible(),
        ];
        let rule = Rule::DecoyChain {
            decoy: "decoy".into(),
            goal: "real".into(),
            path: vec!["step".into()],
            reach: 8.0,
        };

        let events = step(&rule, &mut entities, &player_at(600.0, 330.0), 0);
        assert!(events.is_empty());
        assert!(!entities[1].visible);

        let events = step(&rule, &mut entities, &player_at(690.0, 330.0), 1);
        assert_eq!(
            events,
            vec![MechanicEvent::Popped {
                id: "decoy".into(),
                at: Vec2::new(740.0, 340.0)
            }]
        );
        assert!(!entities[0].visible && !entities[0].collidable);
        assert!(entities[1].visible && entities[1].collidable);
        assert!(entities[2].visible && entities[2].collidable);

        let events = step(&rule, &mut entities, &player_at(720.0, 330.0), 2);
        assert!(events.is_empty());
    }

    #[test]
    fn test_rule_json_shape() {
        let json = r#"{ "kind": "drop_pillar", "target": "p", "triggerX": 400, "gravity": 0.8, "floorY": 400 }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.targets(), vec!["p"]);

        let json = r#"{ "kind": "drop_spikes", "targets": ["a", "b"], "range": 60, "fallSpeed": 8 }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert!(matches!(rule, Rule::DropSpikes { shake_frames: 30, .. }));
    }
}

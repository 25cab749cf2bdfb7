//! Level mechanics
//!
//! Per-frame rules that move, hide, reveal and arm entities. Mechanics run
//! strictly before collision resolution and never touch the player; they only
//! shape entity state the resolver reads afterwards in the same frame.
//!
//! Two kinds share one pipeline:
//! - generic mechanics, opted into by entity properties on any level
//! - scripted [`Rule`]s, attached to a level by id or embedded in its data

pub mod generic;
pub mod rules;

pub use rules::Rule;

use glam::Vec2;

use super::entity::Entity;
use super::state::PlayerState;

/// Notable mechanic transitions, reported back to the frame driver
#[derive(Debug, Clone, PartialEq)]
pub enum MechanicEvent {
    /// A trap platform gave way
    Collapsed { id: String },
    /// A hazard started falling
    Dropped { id: String },
    /// A hidden entity became solid and visible
    Revealed { id: String },
    /// A decoy was removed; cosmetic burst at `at`
    Popped { id: String, at: Vec2 },
}

/// Advance every mechanic by one frame
pub fn run(
    entities: &mut [Entity],
    rules: &[Rule],
    player: &PlayerState,
    frame: u64,
) -> Vec<MechanicEvent> {
    let mut events = Vec::new();

    generic::crumble(entities, player, &mut events);
    generic::fall_on_approach(entities, player, &mut events);
    generic::patrol(entities);

    for rule in rules {
        rule.apply(entities, player, frame, &mut events);
    }

    events
}

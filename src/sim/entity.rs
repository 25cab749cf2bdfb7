//! Level entities
//!
//! An entity is a rectangle with a kind tag, independent visibility and
//! collidability flags, and typed authoring properties. Mechanics keep their
//! per-entity progress in `state` and cosmetic overrides in `display`; neither
//! is part of the authored data.

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::geometry::Rect;

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Wall,
    Spike,
    Goal,
    Trigger,
    Decoration,
    MovingPlatform,
    /// Any tag this engine does not know; never drawn or collided against
    Unknown,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Wall => "WALL",
            EntityKind::Spike => "SPIKE",
            EntityKind::Goal => "GOAL",
            EntityKind::Trigger => "TRIGGER",
            EntityKind::Decoration => "DECORATION",
            EntityKind::MovingPlatform => "MOVING_PLATFORM",
            EntityKind::Unknown => "UNKNOWN",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "WALL" => EntityKind::Wall,
            "SPIKE" => EntityKind::Spike,
            "GOAL" => EntityKind::Goal,
            "TRIGGER" => EntityKind::Trigger,
            "DECORATION" => EntityKind::Decoration,
            "MOVING_PLATFORM" => EntityKind::MovingPlatform,
            _ => EntityKind::Unknown,
        }
    }

    /// Kinds the resolver pushes the player out of
    pub fn is_solid(&self) -> bool {
        matches!(self, EntityKind::Wall | EntityKind::MovingPlatform)
    }
}

impl Serialize for EntityKind {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(d)?;
        Ok(EntityKind::from_str(&tag))
    }
}

/// How a hazard falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallStrategy {
    /// Drops once the player walks underneath
    OnApproach,
}

/// Authored per-entity options
///
/// On the wire this is the open `properties` object emitted by the level
/// editor; keys this engine does not use are ignored, absent keys default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Properties {
    /// Crumbles shortly after the player stands on it
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_trap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fall_strategy: Option<FallStrategy>,
    /// Goal that kills instead of winning
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_fake: bool,
    /// Render opacity (ghost walls)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Patrol distance for moving platforms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f32>,
    /// Render color override, `#rrggbb`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Progress of whichever mechanic owns an entity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MechanicState {
    #[default]
    Idle,
    /// Crumble countdown, frames since first contact
    Countdown { frames: u32 },
    /// Pre-drop jitter, frames elapsed
    Shaking { frames: u32 },
    Falling { vy: f32 },
    /// Came to rest on its floor line
    Landed,
    /// One-shot transition already fired (crumbled, popped, revealed)
    Spent,
}

/// Render-only overrides written by mechanics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Display {
    /// Drawn offset from the simulated position
    pub offset: Vec2,
    pub opacity: f32,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            opacity: 1.0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A level entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub collidable: bool,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vy: Option<f32>,
    #[serde(skip)]
    pub state: MechanicState,
    #[serde(skip)]
    pub display: Display,
    /// Authored top-left, fixed at instantiation
    #[serde(skip)]
    pub origin: Vec2,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind, rect: Rect) -> Self {
        Self {
            id: id.into(),
            kind,
            rect,
            visible: true,
            collidable: true,
            properties: Properties::default(),
            vx: None,
            vy: None,
            state: MechanicState::Idle,
            display: Display::default(),
            origin: Vec2::new(rect.x, rect.y),
        }
    }

    /// Entity spanning whole tiles
    pub fn tiles(id: impl Into<String>, kind: EntityKind, tx: f32, ty: f32, tw: f32, th: f32) -> Self {
        use crate::consts::TILE;
        Self::new(id, kind, Rect::new(tx * TILE, ty * TILE, tw * TILE, th * TILE))
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn intangible(mut self) -> Self {
        self.collidable = false;
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vx = Some(vx);
        self.vy = Some(vy);
        self
    }

    /// Reset runtime-only fields from the authored data
    pub fn prepare(&mut self) {
        self.state = MechanicState::Idle;
        self.display = Display {
            offset: Vec2::ZERO,
            opacity: self.properties.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
        };
        self.origin = Vec2::new(self.rect.x, self.rect.y);
    }

    /// Blocks player movement this frame
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.collidable && self.kind.is_solid()
    }

    pub fn is_decoy(&self) -> bool {
        self.kind == EntityKind::Goal && self.properties.is_fake
    }

    /// Remove from play: unseen and intangible
    pub fn remove(&mut self) {
        self.visible = false;
        self.collidable = false;
    }

    /// Bring into play: seen and solid
    pub fn reveal(&mut self) {
        self.visible = true;
        self.collidable = true;
    }
}

/// Find an entity by id
pub fn find<'a>(entities: &'a [Entity], id: &str) -> Option<&'a Entity> {
    entities.iter().find(|e| e.id == id)
}

/// Find an entity by id, mutably
pub fn find_mut<'a>(entities: &'a mut [Entity], id: &str) -> Option<&'a mut Entity> {
    entities.iter_mut().find(|e| e.id == id)
}

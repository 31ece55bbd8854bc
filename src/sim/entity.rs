//! Shared entity vocabulary: handles, bodies and the play area

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Handle into the controller's live-entity tables.
///
/// Ids are allocated monotonically and never reused, so a handle to a
/// destroyed entity simply fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Collision footprint centered on the entity position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Footprint {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

/// What the overlap collaborator sees of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub footprint: Footprint,
    /// Disabled bodies never overlap anything
    pub enabled: bool,
}

impl Body {
    pub fn circle(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            footprint: Footprint::Circle { radius },
            enabled: true,
        }
    }

    pub fn rect(pos: Vec2, half_extents: Vec2) -> Self {
        Self {
            pos,
            footprint: Footprint::Rect { half_extents },
            enabled: true,
        }
    }
}

/// Common surface of everything the controller places in the world
pub trait Entity {
    fn id(&self) -> EntityId;
    fn pos(&self) -> Vec2;
    /// Participates in updates and overlap checks
    fn is_active(&self) -> bool;
    fn body(&self) -> Body;
}

/// Which side of the play area an off-screen spawn uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];
}

/// Visible rectangle the game is played in, origin at top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }

    /// Keep a round body inside the area, reflecting velocity with `bounce`
    pub fn confine(&self, pos: &mut Vec2, vel: &mut Vec2, radius: f32, bounce: f32) {
        let max = Vec2::new(self.width - radius, self.height - radius);
        if pos.x < radius {
            pos.x = radius;
            vel.x = vel.x.abs() * bounce;
        } else if pos.x > max.x {
            pos.x = max.x;
            vel.x = -vel.x.abs() * bounce;
        }
        if pos.y < radius {
            pos.y = radius;
            vel.y = vel.y.abs() * bounce;
        } else if pos.y > max.y {
            pos.y = max.y;
            vel.y = -vel.y.abs() * bounce;
        }
    }

    /// Point `margin` outside the given edge, uniformly placed along it
    pub fn offscreen_point(&self, edge: Edge, margin: f32, rng: &mut impl Rng) -> Vec2 {
        match edge {
            Edge::Top => Vec2::new(rng.random_range(0.0..=self.width), -margin),
            Edge::Right => Vec2::new(self.width + margin, rng.random_range(0.0..=self.height)),
            Edge::Bottom => Vec2::new(rng.random_range(0.0..=self.width), self.height + margin),
            Edge::Left => Vec2::new(-margin, rng.random_range(0.0..=self.height)),
        }
    }

    /// Off-screen point on a random edge
    pub fn random_offscreen_point(&self, margin: f32, rng: &mut impl Rng) -> Vec2 {
        let edge = Edge::ALL[rng.random_range(0..Edge::ALL.len())];
        self.offscreen_point(edge, margin, rng)
    }
}

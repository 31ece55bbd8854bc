//! Overlap detection
//!
//! The round controller never tests geometry itself. It lists the body pairs it
//! cares about and asks an `OverlapDetector` which of them intersect; the
//! default `ArcadeOverlap` does circle and axis-aligned box tests.

use glam::Vec2;

use super::entity::{Body, Footprint};

/// "Do these two bodies intersect?" collaborator
pub trait OverlapDetector {
    fn overlaps(&self, a: &Body, b: &Body) -> bool;
}

/// Circle/AABB overlap in the style of an arcade physics engine
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcadeOverlap;

impl OverlapDetector for ArcadeOverlap {
    fn overlaps(&self, a: &Body, b: &Body) -> bool {
        if !a.enabled || !b.enabled {
            return false;
        }
        match (a.footprint, b.footprint) {
            (Footprint::Circle { radius: ra }, Footprint::Circle { radius: rb }) => {
                circle_circle(a.pos, ra, b.pos, rb)
            }
            (Footprint::Circle { radius }, Footprint::Rect { half_extents }) => {
                circle_rect(a.pos, radius, b.pos, half_extents)
            }
            (Footprint::Rect { half_extents }, Footprint::Circle { radius }) => {
                circle_rect(b.pos, radius, a.pos, half_extents)
            }
            (Footprint::Rect { half_extents: ha }, Footprint::Rect { half_extents: hb }) => {
                rect_rect(a.pos, ha, b.pos, hb)
            }
        }
    }
}

/// Detector that never reports anything (headless tests, paused worlds)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlap;

impl OverlapDetector for NoOverlap {
    fn overlaps(&self, _a: &Body, _b: &Body) -> bool {
        false
    }
}

pub fn circle_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

pub fn circle_rect(center: Vec2, radius: f32, rect_center: Vec2, half_extents: Vec2) -> bool {
    let closest = center.clamp(rect_center - half_extents, rect_center + half_extents);
    center.distance_squared(closest) < radius * radius
}

pub fn rect_rect(a: Vec2, ha: Vec2, b: Vec2, hb: Vec2) -> bool {
    let d = (a - b).abs();
    d.x < ha.x + hb.x && d.y < ha.y + hb.y
}

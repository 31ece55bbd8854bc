//! Fixed world features: the tree that drops fruit and the basket that collects it

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, PlayArea};
use crate::consts::*;
use crate::polar_to_cartesian;

/// Attempts at a random layout before settling for the fixed one
const LAYOUT_ATTEMPTS: u32 = 1000;

/// Fruit source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub id: EntityId,
    pub pos: Vec2,
    /// Fruit lands anywhere within this radius of the trunk
    pub canopy_radius: f32,
}

impl Tree {
    pub fn new(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            canopy_radius: TREE_DISPLAY_SIZE * TREE_CANOPY_FRACTION,
        }
    }

    /// Uniform angle, uniform distance within the canopy
    pub fn spawn_point(&self, rng: &mut impl Rng) -> Vec2 {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let distance = rng.random_range(0.0..self.canopy_radius);
        self.pos + polar_to_cartesian(distance, angle)
    }
}

/// Delivery target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Basket {
    pub id: EntityId,
    pub pos: Vec2,
    pub half_extents: Vec2,
}

impl Basket {
    pub fn new(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            // Only the lower half of the basket catches fruit
            half_extents: Vec2::new(BASKET_WIDTH / 2.0, BASKET_HEIGHT / 4.0),
        }
    }
}

impl Entity for Basket {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn is_active(&self) -> bool {
        true
    }

    fn body(&self) -> Body {
        Body::rect(self.pos, self.half_extents)
    }
}

/// Pick tree (left side) and basket (right side) positions at least
/// `min_distance_ratio * max(width, height)` apart.
pub fn layout(area: &PlayArea, min_distance_ratio: f32, rng: &mut impl Rng) -> (Vec2, Vec2) {
    let min_distance = area.width.max(area.height) * min_distance_ratio;
    let inset = 100.0_f32.min(area.width * 0.125).min(area.height / 2.0);

    for _ in 0..LAYOUT_ATTEMPTS {
        let tree = Vec2::new(
            rng.random_range(inset..=(area.width * 0.3).max(inset)),
            rng.random_range(inset..=(area.height - inset).max(inset)),
        );
        let basket = Vec2::new(
            rng.random_range((area.width * 0.7).min(area.width - inset)..=(area.width - inset)),
            rng.random_range(inset..=(area.height - inset).max(inset)),
        );
        if tree.distance(basket) >= min_distance {
            return (tree, basket);
        }
    }

    log::warn!(
        "no layout {} apart after {} attempts, using corner layout",
        min_distance,
        LAYOUT_ATTEMPTS
    );
    (
        Vec2::new(inset, inset),
        Vec2::new(area.width - inset, area.height - inset),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_points_stay_in_canopy() {
        let mut rng = Pcg32::seed_from_u64(99);
        let tree = Tree::new(EntityId::new(1), Vec2::new(150.0, 300.0));
        for _ in 0..500 {
            let p = tree.spawn_point(&mut rng);
            assert!(p.distance(tree.pos) < tree.canopy_radius + 1e-3);
        }
    }

    #[test]
    fn test_layout_respects_min_distance() {
        let area = PlayArea::new(PLAY_WIDTH, PLAY_HEIGHT);
        for seed in 0..50 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let (tree, basket) = layout(&area, MIN_DISTANCE_RATIO, &mut rng);
            assert!(tree.distance(basket) >= PLAY_WIDTH * MIN_DISTANCE_RATIO - 1e-3);
            assert!(tree.x < basket.x);
            assert!(area.contains(tree) && area.contains(basket));
        }
    }

    #[test]
    fn test_layout_falls_back_when_impossible() {
        let area = PlayArea::new(PLAY_WIDTH, PLAY_HEIGHT);
        let mut rng = Pcg32::seed_from_u64(1);
        let (tree, basket) = layout(&area, 5.0, &mut rng);
        assert_eq!(tree, Vec2::new(100.0, 100.0));
        assert_eq!(basket, Vec2::new(700.0, 500.0));
    }
}

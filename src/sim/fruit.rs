//! The fruit: spawned under the tree, carried, dropped, delivered or eaten

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, PlayArea};
use super::mover::MotionModel;
use crate::consts::*;
use crate::{heading, polar_to_cartesian, rotate_toward};

/// A carryable fruit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carryable {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    /// Spawned and not yet resolved
    pub is_active: bool,
    /// Position slaved to `carrier` rather than free-moving
    pub is_picked_up: bool,
    /// Lookup handle only; the fruit never owns its carrier
    pub carrier: Option<EntityId>,
    pub visible: bool,
    /// Physics body enabled
    pub collidable: bool,
}

impl Carryable {
    pub fn new(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            is_active: false,
            is_picked_up: false,
            carrier: None,
            visible: true,
            collidable: true,
        }
    }

    /// Put the fruit into play with a small downward fall out of the canopy
    pub fn activate(&mut self, drop_impulse: f32) {
        self.is_active = true;
        self.vel = Vec2::new(0.0, drop_impulse);
    }

    /// Take the fruit out of play; any carrier link is cut
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.is_picked_up = false;
        self.carrier = None;
        self.vel = Vec2::ZERO;
    }

    /// Attach to `carrier`. Returns false (and changes nothing) if the fruit is
    /// already carried or not in play.
    pub fn pickup(&mut self, carrier: EntityId) -> bool {
        if self.is_picked_up || !self.is_active {
            return false;
        }
        self.is_picked_up = true;
        self.carrier = Some(carrier);
        self.visible = false;
        self.collidable = false;
        self.vel = Vec2::ZERO;
        true
    }

    /// Release from the carrier with a random outward kick so it cannot be
    /// re-caught on the same spot. Returns false if it was not carried.
    pub fn drop(&mut self, speed_min: f32, speed_max: f32, rng: &mut impl Rng) -> bool {
        if !self.is_picked_up {
            return false;
        }
        self.is_picked_up = false;
        self.carrier = None;
        self.visible = true;
        self.collidable = true;

        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(speed_min..=speed_max);
        self.vel = polar_to_cartesian(speed, angle);
        true
    }

    /// Drive the fruit directly (fruit-as-avatar variant)
    pub fn steer(&mut self, intent: Vec2, model: MotionModel, dt: f32) {
        if self.is_active && !self.is_picked_up {
            self.vel = model.apply(self.vel, intent, dt);
        }
    }

    /// Per-frame update. `carrier_pos` is the resolved position of `carrier`,
    /// or None if that entity no longer exists.
    pub fn update(&mut self, carrier_pos: Option<Vec2>, dt: f32, area: &PlayArea, drag: bool) {
        if !self.is_active {
            return;
        }

        if self.is_picked_up {
            match carrier_pos {
                Some(p) => self.pos = p,
                None => {
                    // Carrier vanished: fall out of its paws where it stands
                    log::warn!("fruit {} lost its carrier, releasing in place", self.id.get());
                    self.is_picked_up = false;
                    self.carrier = None;
                    self.visible = true;
                    self.collidable = true;
                }
            }
            return;
        }

        if drag {
            self.vel = crate::apply_drag(self.vel, FRUIT_DRAG, dt);
        }
        self.pos += self.vel * dt;
        area.confine(&mut self.pos, &mut self.vel, FRUIT_RADIUS, FRUIT_BOUNCE);

        if self.vel.length() > 10.0 {
            self.rotation = rotate_toward(self.rotation, heading(self.vel), 0.1);
        }
    }
}

impl Entity for Carryable {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn body(&self) -> Body {
        Body {
            enabled: self.is_active && self.collidable,
            ..Body::circle(self.pos, FRUIT_RADIUS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn live_fruit() -> Carryable {
        let mut fruit = Carryable::new(EntityId::new(1), Vec2::new(100.0, 100.0));
        fruit.activate(0.0);
        fruit
    }

    #[test]
    fn test_pickup_slaves_position_to_carrier() {
        let area = PlayArea::new(PLAY_WIDTH, PLAY_HEIGHT);
        let mut fruit = live_fruit();
        assert!(fruit.pickup(EntityId::new(9)));
        assert!(!fruit.visible);
        assert!(!fruit.body().enabled);

        for step in 0..10 {
            let carrier = Vec2::new(200.0 + step as f32, 150.0);
            fruit.update(Some(carrier), SIM_DT, &area, true);
            assert_eq!(fruit.pos, carrier);
            assert_eq!(fruit.carrier, Some(EntityId::new(9)));
        }
    }

    #[test]
    fn test_pickup_is_noop_when_carried_or_inactive() {
        let mut fruit = live_fruit();
        assert!(fruit.pickup(EntityId::new(2)));
        let before = fruit.clone();
        assert!(!fruit.pickup(EntityId::new(3)));
        assert_eq!(fruit.carrier, before.carrier);
        assert_eq!(fruit.is_picked_up, before.is_picked_up);

        let mut idle = Carryable::new(EntityId::new(4), Vec2::ZERO);
        assert!(!idle.pickup(EntityId::new(2)));
        assert!(!idle.is_picked_up);
        assert_eq!(idle.carrier, None);
    }

    #[test]
    fn test_drop_impulse_within_band() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..100 {
            let mut fruit = live_fruit();
            fruit.pickup(EntityId::new(2));
            assert!(fruit.drop(DROP_SPEED_MIN, DROP_SPEED_MAX, &mut rng));
            let speed = fruit.vel.length();
            assert!(speed >= DROP_SPEED_MIN - 1e-3 && speed <= DROP_SPEED_MAX + 1e-3, "speed {speed}");
            assert_ne!(fruit.vel, Vec2::ZERO);
            assert!(fruit.visible && fruit.collidable);
            assert_eq!(fruit.carrier, None);
        }
    }

    #[test]
    fn test_drop_without_pickup_does_nothing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fruit = live_fruit();
        assert!(!fruit.drop(DROP_SPEED_MIN, DROP_SPEED_MAX, &mut rng));
        assert_eq!(fruit.vel, Vec2::ZERO);
    }

    #[test]
    fn test_missing_carrier_releases_fruit() {
        let area = PlayArea::new(PLAY_WIDTH, PLAY_HEIGHT);
        let mut fruit = live_fruit();
        fruit.pickup(EntityId::new(5));
        fruit.update(None, SIM_DT, &area, true);
        assert!(!fruit.is_picked_up);
        assert_eq!(fruit.carrier, None);
        assert!(fruit.is_active);
    }

    #[test]
    fn test_free_fruit_slows_under_drag() {
        let area = PlayArea::new(PLAY_WIDTH, PLAY_HEIGHT);
        let mut fruit = live_fruit();
        fruit.pos = Vec2::new(400.0, 300.0);
        fruit.vel = Vec2::new(60.0, 0.0);
        for _ in 0..60 {
            fruit.update(None, SIM_DT, &area, true);
        }
        assert_eq!(fruit.vel, Vec2::ZERO);
        assert!(fruit.pos.x > 400.0);
    }
}

//! Player-controlled movement
//!
//! Input arrives as an intent vector; how that becomes velocity depends on the
//! avatar. The fruit avatar snaps to full speed, the squirrel accelerates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, PlayArea};
use crate::consts::*;
use crate::heading;

/// Intent-to-velocity rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionModel {
    /// Velocity is the intent direction at `speed`; no input means standing still
    Direct { speed: f32 },
    /// Accelerate toward the intent, capped per axis at `max_speed`;
    /// coast to a stop when there is no input
    Accelerated { acceleration: f32, max_speed: f32 },
}

impl MotionModel {
    /// Velocity after one tick of `intent`
    pub fn apply(&self, vel: Vec2, intent: Vec2, dt: f32) -> Vec2 {
        let dir = intent.normalize_or_zero();
        match *self {
            MotionModel::Direct { speed } => dir * speed,
            MotionModel::Accelerated {
                acceleration,
                max_speed,
            } => {
                if dir == Vec2::ZERO {
                    let damped = vel * SQUIRREL_IDLE_DAMPING;
                    if damped.x.abs() < SQUIRREL_STOP_SPEED && damped.y.abs() < SQUIRREL_STOP_SPEED {
                        Vec2::ZERO
                    } else {
                        damped
                    }
                } else {
                    let v = vel + dir * acceleration * dt;
                    v.clamp(Vec2::splat(-max_speed), Vec2::splat(max_speed))
                }
            }
        }
    }
}

/// The squirrel: a player entity that can carry one fruit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mover {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    /// Sprite mirrored while moving left
    pub flip_x: bool,
    pub base_speed: f32,
    pub carry_speed: f32,
    pub acceleration: f32,
    /// Current top speed (drops while carrying)
    pub move_speed: f32,
    pub carrying: bool,
    pub active: bool,
}

impl Mover {
    pub fn squirrel(id: EntityId, pos: Vec2, base_speed: f32, carry_speed: f32, acceleration: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            flip_x: false,
            base_speed,
            carry_speed,
            acceleration,
            move_speed: base_speed,
            carrying: false,
            active: true,
        }
    }

    pub fn motion(&self) -> MotionModel {
        MotionModel::Accelerated {
            acceleration: self.acceleration,
            max_speed: self.move_speed,
        }
    }

    /// Apply one tick of player intent and move
    pub fn update(&mut self, intent: Vec2, dt: f32, area: &PlayArea) {
        if !self.active {
            return;
        }
        if intent.x < 0.0 {
            self.flip_x = true;
        } else if intent.x > 0.0 {
            self.flip_x = false;
        }

        self.vel = self.motion().apply(self.vel, intent, dt);
        self.pos += self.vel * dt;
        area.confine(&mut self.pos, &mut self.vel, SQUIRREL_RADIUS, 0.0);

        if self.vel.length() > 10.0 {
            self.rotation = heading(self.vel);
            if self.flip_x {
                self.rotation += std::f32::consts::PI;
            }
        }
    }

    /// Start carrying: slower, and the sprite switches to the laden squirrel
    pub fn pick_up(&mut self) {
        self.carrying = true;
        self.move_speed = self.carry_speed;
    }

    /// Stop carrying (delivered, dropped or stolen)
    pub fn release(&mut self) {
        self.carrying = false;
        self.move_speed = self.base_speed;
    }
}

impl Entity for Mover {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn body(&self) -> Body {
        Body {
            enabled: self.active,
            ..Body::circle(self.pos, SQUIRREL_RADIUS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squirrel() -> Mover {
        Mover::squirrel(
            EntityId::new(1),
            Vec2::new(400.0, 300.0),
            SQUIRREL_SPEED,
            SQUIRREL_CARRY_SPEED,
            SQUIRREL_ACCELERATION,
        )
    }

    #[test]
    fn test_direct_model_ignores_previous_velocity() {
        let model = MotionModel::Direct { speed: 200.0 };
        let v = model.apply(Vec2::new(50.0, 50.0), Vec2::new(1.0, 1.0), SIM_DT);
        assert!((v.length() - 200.0).abs() < 1e-3);
        assert_eq!(model.apply(Vec2::new(50.0, 0.0), Vec2::ZERO, SIM_DT), Vec2::ZERO);
    }

    #[test]
    fn test_accelerated_model_caps_each_axis() {
        let model = MotionModel::Accelerated {
            acceleration: 600.0,
            max_speed: 200.0,
        };
        let mut v = Vec2::ZERO;
        for _ in 0..120 {
            v = model.apply(v, Vec2::new(1.0, 0.0), SIM_DT);
        }
        assert!((v.x - 200.0).abs() < 1e-3);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_idle_squirrel_coasts_to_stop() {
        let area = PlayArea::new(PLAY_WIDTH, PLAY_HEIGHT);
        let mut s = squirrel();
        s.vel = Vec2::new(150.0, 0.0);
        for _ in 0..60 {
            s.update(Vec2::ZERO, SIM_DT, &area);
        }
        assert_eq!(s.vel, Vec2::ZERO);
    }

    #[test]
    fn test_carrying_slows_squirrel() {
        let mut s = squirrel();
        s.pick_up();
        assert!(s.carrying);
        assert_eq!(s.move_speed, SQUIRREL_CARRY_SPEED);
        s.release();
        assert!(!s.carrying);
        assert_eq!(s.move_speed, SQUIRREL_SPEED);
    }
}

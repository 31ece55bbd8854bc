//! Predators and their steering
//!
//! Two policies: the snake re-aims every frame (direct pursuit), the worm only
//! every half second with a sinusoidal wobble (wavering pursuit). Steering
//! itself is a pure function of positions, time, speed and the RNG; the
//! `Pursuer` just stores the result.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId};
use super::state::SnakeProperties;
use crate::config::{SnakeConfig, WormConfig};
use crate::consts::*;
use crate::{heading, polar_to_cartesian, rotate_toward};

/// Predator species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerKind {
    Snake,
    Worm,
}

impl PursuerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PursuerKind::Snake => "snake",
            PursuerKind::Worm => "worm",
        }
    }

    /// Whether catches by this species escalate persisted difficulty
    pub fn is_progressive(&self) -> bool {
        matches!(self, PursuerKind::Snake)
    }

    fn radius(&self) -> f32 {
        match self {
            PursuerKind::Snake => SNAKE_RADIUS,
            PursuerKind::Worm => WORM_RADIUS,
        }
    }
}

/// Result of one steering decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steer {
    pub velocity: Vec2,
    /// New facing angle, if the policy set one
    pub facing: Option<f32>,
}

impl Steer {
    pub const HOLD: Steer = Steer {
        velocity: Vec2::ZERO,
        facing: None,
    };
}

/// Snake policy: head straight for the target, with occasional jitter
pub fn direct_pursuit(
    pos: Vec2,
    target: Vec2,
    speed: f32,
    jitter_chance: f64,
    jitter: f32,
    rng: &mut impl Rng,
) -> Steer {
    let to_target = target - pos;
    let distance = to_target.length();

    let mut steer = if distance > PURSUIT_STOP_DISTANCE {
        Steer {
            velocity: to_target / distance * speed,
            facing: Some(heading(to_target)),
        }
    } else {
        Steer::HOLD
    };

    if jitter > 0.0 && rng.random_bool(jitter_chance.clamp(0.0, 1.0)) {
        steer.velocity += Vec2::new(
            rng.random_range(-jitter..=jitter),
            rng.random_range(-jitter..=jitter),
        );
    }
    steer
}

/// Worm policy: aim at the target with a time-varying bearing offset and noise
pub fn wavering_pursuit(
    pos: Vec2,
    target: Vec2,
    speed: f32,
    elapsed_ms: f64,
    worm: &WormConfig,
    rng: &mut impl Rng,
) -> Steer {
    let to_target = target - pos;
    if to_target.length() <= PURSUIT_STOP_DISTANCE {
        return Steer::HOLD;
    }

    let wiggle_deg = (elapsed_ms as f32 * 0.01 * worm.wiggle_frequency).sin() * worm.wiggle_amplitude_deg;
    let bearing = heading(to_target) + wiggle_deg.to_radians();
    let noise = if worm.noise > 0.0 {
        Vec2::new(
            rng.random_range(-worm.noise..=worm.noise),
            rng.random_range(-worm.noise..=worm.noise),
        )
    } else {
        Vec2::ZERO
    };

    Steer {
        velocity: polar_to_cartesian(speed, bearing) + noise,
        facing: Some(bearing),
    }
}

/// Visual body segment trailing the snake head
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub pos: Vec2,
    pub rotation: f32,
}

/// Species-specific state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PursuerBody {
    Snake {
        segment_count: u32,
        /// Trailing segments (head excluded), nearest first
        segments: Vec<Segment>,
        jitter_chance: f64,
        jitter: f32,
    },
    Worm {
        config: WormConfig,
        /// Session time of the last heading recompute
        last_retarget_ms: Option<f64>,
    },
}

/// A predator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pursuer {
    pub id: EntityId,
    pub kind: PursuerKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    /// Current effective speed
    pub move_speed: f32,
    /// Unscaled speed
    pub base_speed: f32,
    /// Lookup handle of whatever is being chased
    pub target: Option<EntityId>,
    pub active: bool,
    pub body: PursuerBody,
}

impl Pursuer {
    /// Snake carrying the session's persisted difficulty
    pub fn snake(id: EntityId, pos: Vec2, props: &SnakeProperties, config: &SnakeConfig) -> Self {
        let mut snake = Self {
            id,
            kind: PursuerKind::Snake,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            move_speed: props.move_speed,
            base_speed: config.base_speed,
            target: None,
            active: true,
            body: PursuerBody::Snake {
                segment_count: 0,
                segments: Vec::new(),
                jitter_chance: config.jitter_chance,
                jitter: config.jitter,
            },
        };
        snake.set_segment_count(props.segment_count);
        snake
    }

    pub fn worm(id: EntityId, pos: Vec2, config: &WormConfig, initial_rotation: f32) -> Self {
        Self {
            id,
            kind: PursuerKind::Worm,
            pos,
            vel: Vec2::ZERO,
            rotation: initial_rotation,
            move_speed: config.speed,
            base_speed: config.speed,
            target: None,
            active: true,
            body: PursuerBody::Worm {
                config: config.clone(),
                last_retarget_ms: None,
            },
        }
    }

    /// Segment count including the head; 0 for worms
    pub fn segment_count(&self) -> u32 {
        match &self.body {
            PursuerBody::Snake { segment_count, .. } => *segment_count,
            PursuerBody::Worm { .. } => 0,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        match &self.body {
            PursuerBody::Snake { segments, .. } => segments,
            PursuerBody::Worm { .. } => &[],
        }
    }

    /// Rebuild the trailing body for `count` segments (never below the minimum)
    pub fn set_segment_count(&mut self, count: u32) {
        let head = self.pos;
        if let PursuerBody::Snake {
            segment_count,
            segments,
            ..
        } = &mut self.body
        {
            *segment_count = count.max(SNAKE_MIN_SEGMENTS);
            *segments = (1..*segment_count)
                .map(|i| Segment {
                    pos: head - Vec2::new(i as f32 * SEGMENT_SPACING, 0.0),
                    rotation: 0.0,
                })
                .collect();
        }
    }

    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    /// Decide this tick's velocity. `target_pos` is the resolved position of
    /// `target`; None means there is nothing to chase and the pursuer stays put.
    pub fn steer(&mut self, target_pos: Option<Vec2>, now_ms: f64, rng: &mut impl Rng) {
        let Some(target_pos) = target_pos.filter(|_| self.active) else {
            self.vel = Vec2::ZERO;
            return;
        };

        match &mut self.body {
            PursuerBody::Snake {
                jitter_chance,
                jitter,
                ..
            } => {
                let steer = direct_pursuit(self.pos, target_pos, self.move_speed, *jitter_chance, *jitter, rng);
                self.vel = steer.velocity;
                if let Some(facing) = steer.facing {
                    self.rotation = facing;
                }
            }
            PursuerBody::Worm {
                config,
                last_retarget_ms,
            } => {
                let due = match *last_retarget_ms {
                    None => true,
                    Some(last) => now_ms - last > config.retarget_interval_ms,
                };
                if due {
                    *last_retarget_ms = Some(now_ms);
                    let steer = wavering_pursuit(self.pos, target_pos, self.move_speed, now_ms, config, rng);
                    self.vel = steer.velocity;
                    if let Some(facing) = steer.facing {
                        self.rotation = facing;
                    }
                }
                // Wiggle runs every frame regardless of the recompute cadence
                self.rotation += (now_ms as f32 * 0.01).sin() * 0.05;
            }
        }
    }

    /// Integrate velocity and drag the tail along
    pub fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        let prev_head = self.pos;
        self.pos += self.vel * dt;
        self.trail_segments(prev_head);
    }

    /// Each segment eases toward where its leader was, lagging more the
    /// further back it sits
    fn trail_segments(&mut self, prev_head: Vec2) {
        let PursuerBody::Snake { segments, .. } = &mut self.body else {
            return;
        };

        let mut leader = prev_head;
        for (index, segment) in segments.iter_mut().enumerate() {
            let original = segment.pos;
            let lag = 0.2 + index as f32 * 0.05;
            segment.pos += (leader - segment.pos) * lag;

            let to_leader = leader - segment.pos;
            if to_leader != Vec2::ZERO {
                segment.rotation = rotate_toward(segment.rotation, heading(to_leader), 0.2);
            }
            leader = original;
        }
    }
}

impl Entity for Pursuer {
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
            ..Body::circle(self.pos, self.kind.radius())
        }
    }
}

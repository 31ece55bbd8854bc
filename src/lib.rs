//! Orchard Dash - fetch the fruit before the snake does
//!
//! Core modules:
//! - `sim`: Round simulation (entities, pursuit AI, round state machine)
//! - `config`: Variant presets and gameplay tuning
//! - `renderer`: Draw list and procedural asset cache
//! - `audio`: Sound cue dispatch and procedural tones
//! - `ui`: HUD state folded from game events

pub mod audio;
pub mod config;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use config::{ConfigError, GameConfig, GameVariant};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Play area dimensions
    pub const PLAY_WIDTH: f32 = 800.0;
    pub const PLAY_HEIGHT: f32 = 600.0;

    /// Fruit per session
    pub const TOTAL_APPLES: u32 = 10;
    /// Tree and basket must be at least this fraction of the longest side apart
    pub const MIN_DISTANCE_RATIO: f32 = 0.75;

    /// Avatar speeds
    pub const APPLE_MOVE_SPEED: f32 = 200.0;
    pub const SQUIRREL_SPEED: f32 = 200.0;
    pub const SQUIRREL_CARRY_SPEED: f32 = 180.0;
    pub const SQUIRREL_ACCELERATION: f32 = 600.0;
    /// Velocity multiplier per tick when there is no input
    pub const SQUIRREL_IDLE_DAMPING: f32 = 0.9;
    /// Below this per-axis speed an idle squirrel stops dead
    pub const SQUIRREL_STOP_SPEED: f32 = 10.0;
    pub const SQUIRREL_RADIUS: f32 = 16.0;

    /// Fruit body
    pub const FRUIT_RADIUS: f32 = 15.0;
    /// Linear drag (units/s²) applied per axis to free fruit
    pub const FRUIT_DRAG: f32 = 90.0;
    pub const FRUIT_BOUNCE: f32 = 0.2;
    /// Downward nudge when fruit falls out of the canopy
    pub const FRUIT_DROP_IMPULSE: f32 = 40.0;
    /// Random impulse band when a carried fruit is dropped
    pub const DROP_SPEED_MIN: f32 = 50.0;
    pub const DROP_SPEED_MAX: f32 = 80.0;

    /// Snake defaults
    pub const SNAKE_SPEED_FACTOR: f32 = 0.9;
    pub const SNAKE_SPEED_INCREASE: f32 = 0.1;
    pub const SNAKE_START_SEGMENTS: u32 = 3;
    pub const SNAKE_MIN_SEGMENTS: u32 = 3;
    pub const SNAKE_SEGMENT_INCREMENT: u32 = 1;
    pub const SNAKE_RADIUS: f32 = 20.0;
    pub const SNAKE_JITTER_CHANCE: f64 = 0.05;
    pub const SNAKE_JITTER: f32 = 15.0;
    /// Initial spacing of trailing body segments
    pub const SEGMENT_SPACING: f32 = 20.0;

    /// Worm defaults
    pub const WORM_SPEED: f32 = 100.0;
    pub const WORM_RADIUS: f32 = 8.0;
    pub const WORM_RETARGET_MS: f64 = 500.0;
    pub const WORM_WIGGLE_FREQUENCY: f32 = 2.0;
    pub const WORM_WIGGLE_AMPLITUDE_DEG: f32 = 30.0;
    pub const WORM_NOISE: f32 = 10.0;

    /// Pursuers stop steering inside this distance of their target
    pub const PURSUIT_STOP_DISTANCE: f32 = 5.0;
    /// Pursuers spawn this far outside the play area
    pub const OFFSCREEN_MARGIN: f32 = 30.0;

    /// Spawner geometry
    pub const TREE_DISPLAY_SIZE: f32 = 180.0;
    /// Canopy drop radius as a fraction of the tree display width
    pub const TREE_CANOPY_FRACTION: f32 = 0.3;
    pub const BASKET_WIDTH: f32 = 80.0;
    pub const BASKET_HEIGHT: f32 = 50.0;

    /// Round timing (milliseconds)
    pub const CHASE_PURSUER_DELAY_MS: f64 = 500.0;
    pub const PICKUP_PURSUER_DELAY_MS: f64 = 2000.0;
    pub const ROUND_SETTLE_MS: f64 = 1000.0;
    pub const GAME_OVER_DELAY_MS: f64 = 1500.0;
    /// A dropped fruit can't be grabbed again until this much time has passed
    pub const DROP_REGRAB_MS: f64 = 750.0;

    /// Autopilot veers away from pursuers closer than this
    pub const AUTOPILOT_AVOID_RADIUS: f32 = 120.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Heading of a vector in radians (0 = +x)
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Turn `current` toward `target` by at most `step` radians along the short way
pub fn rotate_toward(current: f32, target: f32, step: f32) -> f32 {
    let delta = normalize_angle(target - current);
    if delta.abs() <= step {
        target
    } else {
        current + step * delta.signum()
    }
}

/// Linear drag: each axis loses `drag * dt` of speed without changing sign
pub fn apply_drag(vel: Vec2, drag: f32, dt: f32) -> Vec2 {
    let decay = |v: f32| {
        let reduced = v.abs() - drag * dt;
        if reduced <= 0.0 { 0.0 } else { reduced * v.signum() }
    };
    Vec2::new(decay(vel.x), decay(vel.y))
}

//! Gameplay configuration
//!
//! The two game variants share one controller; a variant is just a preset that
//! picks the avatar, the predator roster and the round timings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::*;
use crate::sim::PursuerKind;

/// Which avatar the player controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    /// The fruit itself is the avatar; a snake chases it to the basket
    Chase,
    /// A squirrel fetches the fruit while a snake and a worm hunt it
    #[default]
    Pickup,
}

impl GameVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameVariant::Chase => "chase",
            GameVariant::Pickup => "pickup",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chase" | "apple" => Some(GameVariant::Chase),
            "pickup" | "squirrel" => Some(GameVariant::Pickup),
            _ => None,
        }
    }

    /// Predators created each round
    pub fn roster(&self) -> &'static [PursuerKind] {
        match self {
            GameVariant::Chase => &[PursuerKind::Snake],
            GameVariant::Pickup => &[PursuerKind::Snake, PursuerKind::Worm],
        }
    }

    /// True when a separate player entity has to pick the fruit up
    pub fn has_carrier(&self) -> bool {
        matches!(self, GameVariant::Pickup)
    }
}

/// Snake tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Unscaled speed; escalation multiplies this
    pub base_speed: f32,
    /// Fractional speed gain per fruit stolen
    pub speed_increase: f32,
    pub start_segments: u32,
    pub segment_increment: u32,
    /// Per-tick probability of velocity jitter
    pub jitter_chance: f64,
    pub jitter: f32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            base_speed: APPLE_MOVE_SPEED * SNAKE_SPEED_FACTOR,
            speed_increase: SNAKE_SPEED_INCREASE,
            start_segments: SNAKE_START_SEGMENTS,
            segment_increment: SNAKE_SEGMENT_INCREMENT,
            jitter_chance: SNAKE_JITTER_CHANCE,
            jitter: SNAKE_JITTER,
        }
    }
}

/// Worm tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WormConfig {
    pub speed: f32,
    pub retarget_interval_ms: f64,
    pub wiggle_frequency: f32,
    pub wiggle_amplitude_deg: f32,
    pub noise: f32,
}

impl Default for WormConfig {
    fn default() -> Self {
        Self {
            speed: WORM_SPEED,
            retarget_interval_ms: WORM_RETARGET_MS,
            wiggle_frequency: WORM_WIGGLE_FREQUENCY,
            wiggle_amplitude_deg: WORM_WIGGLE_AMPLITUDE_DEG,
            noise: WORM_NOISE,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: GameVariant,
    /// Number of fruit (rounds) per session
    pub total_apples: u32,
    pub play_width: f32,
    pub play_height: f32,

    // === Round timing (ms) ===
    /// Predator reaction time after a fruit appears
    pub pursuer_delay_ms: f64,
    /// Pause between a resolved round and the next fruit
    pub settle_delay_ms: f64,
    /// Pause between game over and the final score report
    pub game_over_delay_ms: f64,

    // === Avatar ===
    pub avatar_speed: f32,
    /// Squirrel top speed while holding the fruit
    pub carry_speed: f32,
    pub acceleration: f32,

    // === Fruit ===
    pub fruit_drop_impulse: f32,
    pub drop_speed_min: f32,
    pub drop_speed_max: f32,

    // === Layout ===
    pub min_distance_ratio: f32,

    pub snake: SnakeConfig,
    pub worm: WormConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::pickup()
    }
}

impl GameConfig {
    /// Fruit-as-avatar preset: snake only, quick predator reaction
    pub fn chase() -> Self {
        Self {
            variant: GameVariant::Chase,
            pursuer_delay_ms: CHASE_PURSUER_DELAY_MS,
            avatar_speed: APPLE_MOVE_SPEED,
            carry_speed: APPLE_MOVE_SPEED,
            fruit_drop_impulse: 0.0,
            ..Self::pickup()
        }
    }

    /// Squirrel preset: snake and worm, longer head start
    pub fn pickup() -> Self {
        Self {
            variant: GameVariant::Pickup,
            total_apples: TOTAL_APPLES,
            play_width: PLAY_WIDTH,
            play_height: PLAY_HEIGHT,
            pursuer_delay_ms: PICKUP_PURSUER_DELAY_MS,
            settle_delay_ms: ROUND_SETTLE_MS,
            game_over_delay_ms: GAME_OVER_DELAY_MS,
            avatar_speed: SQUIRREL_SPEED,
            carry_speed: SQUIRREL_CARRY_SPEED,
            acceleration: SQUIRREL_ACCELERATION,
            fruit_drop_impulse: FRUIT_DROP_IMPULSE,
            drop_speed_min: DROP_SPEED_MIN,
            drop_speed_max: DROP_SPEED_MAX,
            min_distance_ratio: MIN_DISTANCE_RATIO,
            snake: SnakeConfig::default(),
            worm: WormConfig::default(),
        }
    }

    /// Preset for a variant
    pub fn for_variant(variant: GameVariant) -> Self {
        match variant {
            GameVariant::Chase => Self::chase(),
            GameVariant::Pickup => Self::pickup(),
        }
    }

    /// Parse a (possibly partial) JSON config. Missing fields take the
    /// defaults of the named variant's preset (pickup when none is named).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let overrides: Value = serde_json::from_str(json)?;
        let variant = overrides
            .get("variant")
            .and_then(Value::as_str)
            .and_then(GameVariant::from_str);

        let mut merged = serde_json::to_value(Self::for_variant(variant.unwrap_or_default()))?;
        merge(&mut merged, overrides);
        if let Some(variant) = variant {
            merged["variant"] = Value::from(variant.as_str());
        }

        let config: GameConfig = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Reject values the round controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_apples == 0 {
            return Err(ConfigError::EmptyQuota);
        }
        if !(self.play_width > 0.0 && self.play_height > 0.0) {
            return Err(ConfigError::InvalidPlayArea {
                width: self.play_width,
                height: self.play_height,
            });
        }
        if !(self.drop_speed_min > 0.0 && self.drop_speed_min <= self.drop_speed_max) {
            return Err(ConfigError::InvalidDropBand {
                min: self.drop_speed_min,
                max: self.drop_speed_max,
            });
        }
        if self.snake.base_speed < 0.0 || self.snake.speed_increase < 0.0 {
            return Err(ConfigError::NegativeSpeed);
        }
        Ok(())
    }
}

/// Overlay `overrides` onto `base`, recursing into objects
fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, value) => *base = value,
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("session must contain at least one fruit")]
    EmptyQuota,
    #[error("play area must be positive, got {width}x{height}")]
    InvalidPlayArea { width: f32, height: f32 },
    #[error("drop impulse band is empty or non-positive: {min}..{max}")]
    InvalidDropBand { min: f32, max: f32 },
    #[error("snake speed and escalation must not be negative")]
    NegativeSpeed,
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_in_roster_and_delay() {
        let chase = GameConfig::chase();
        let pickup = GameConfig::pickup();
        assert_eq!(chase.variant.roster(), &[PursuerKind::Snake]);
        assert_eq!(pickup.variant.roster(), &[PursuerKind::Snake, PursuerKind::Worm]);
        assert_eq!(chase.pursuer_delay_ms, 500.0);
        assert_eq!(pickup.pursuer_delay_ms, 2000.0);
        assert!((pickup.snake.base_speed - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "total_apples": 3, "snake": { "base_speed": 150.0 } }"#)
            .expect("valid config");
        assert_eq!(config.total_apples, 3);
        assert_eq!(config.snake.base_speed, 150.0);
        assert_eq!(config.snake.start_segments, SNAKE_START_SEGMENTS);
        assert_eq!(config.variant, GameVariant::Pickup);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GameConfig::chase();
        config.total_apples = 0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyQuota)));

        let mut config = GameConfig::chase();
        config.drop_speed_min = 90.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDropBand { .. })));

        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_partial_json_follows_named_variant() {
        let config = GameConfig::from_json(r#"{ "variant": "apple", "total_apples": 5 }"#).expect("valid config");
        assert_eq!(config.variant, GameVariant::Chase);
        assert_eq!(config.pursuer_delay_ms, CHASE_PURSUER_DELAY_MS);
        assert_eq!(config.total_apples, 5);

        assert!(matches!(
            GameConfig::from_json(r#"{ "variant": "dragon" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!(GameVariant::from_str("Squirrel"), Some(GameVariant::Pickup));
        assert_eq!(GameVariant::from_str("chase"), Some(GameVariant::Chase));
        assert_eq!(GameVariant::from_str("bogus"), None);
    }
}

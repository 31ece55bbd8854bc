//! Round controller state and core session types
//!
//! Everything that lives for one play session sits on `RoundController`: the
//! fixed spawners, the live fruit/avatar/predators, the persisted snake
//! difficulty and the pending round timers. Transitions are in `round.rs`,
//! the per-frame driver in `tick.rs`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, PlayArea};
use super::fruit::Carryable;
use super::mover::Mover;
use super::pursuer::{Pursuer, PursuerKind};
use super::schedule::Scheduler;
use super::spawner::{self, Basket, Tree};
use crate::config::{GameConfig, SnakeConfig};

/// Snake difficulty that survives the snake being destroyed every round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeProperties {
    pub segment_count: u32,
    pub move_speed: f32,
    pub apples_eaten: u32,
}

impl SnakeProperties {
    pub fn new(config: &SnakeConfig) -> Self {
        Self {
            segment_count: config.start_segments,
            move_speed: config.base_speed,
            apples_eaten: 0,
        }
    }

    /// Escalate after a catch: speed grows linearly with total catches
    pub fn record_catch(&mut self, config: &SnakeConfig) {
        self.apples_eaten += 1;
        self.move_speed = config.base_speed * (1.0 + config.speed_increase * self.apples_eaten as f32);
        self.segment_count += config.segment_increment;
    }
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Delivered,
    Intercepted(PursuerKind),
}

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No session running yet
    Idle,
    /// Creating the next fruit
    AwaitingSpawn,
    /// Fruit on the ground (or, as the avatar, on the run)
    FruitFree,
    /// Squirrel holding the fruit
    FruitCarried,
    /// Round over, waiting for the settle timer
    Resolved(RoundOutcome),
    /// Quota used up
    GameOver,
}

/// One-shot sounds the controller asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Drop,
    Pickup,
    Collect,
    SnakeHiss,
    Eat,
    GameOver,
}

impl SoundCue {
    pub const ALL: [SoundCue; 6] = [
        SoundCue::Drop,
        SoundCue::Pickup,
        SoundCue::Collect,
        SoundCue::SnakeHiss,
        SoundCue::Eat,
        SoundCue::GameOver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Drop => "drop",
            SoundCue::Pickup => "pickup",
            SoundCue::Collect => "collect",
            SoundCue::SnakeHiss => "snake",
            SoundCue::Eat => "eat",
            SoundCue::GameOver => "gameover",
        }
    }
}

/// Notifications for the audio and UI collaborators, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Sound { cue: SoundCue },
    Ambient { playing: bool },
    ScoreChanged { score: u32 },
    RemainingChanged { remaining: u32 },
    FruitSpawned { pos: Vec2 },
    PursuerSpawned { kind: PursuerKind, pos: Vec2 },
    FruitPickedUp { pos: Vec2 },
    FruitDropped { pos: Vec2 },
    Delivered { pos: Vec2 },
    Intercepted { kind: PursuerKind, pos: Vec2 },
    SessionEnded { score: u32 },
}

/// Session-scoped owner of every live entity and the round state machine
#[derive(Debug, Clone)]
pub struct RoundController {
    pub config: GameConfig,
    pub area: PlayArea,
    /// Session clock; frozen while paused
    pub clock_ms: f64,
    pub phase: RoundPhase,
    pub score: u32,
    pub apples_remaining: u32,
    pub is_game_active: bool,
    pub paused: bool,
    /// Final score has been handed to the UI
    pub session_over: bool,
    pub snake_properties: SnakeProperties,
    pub tree: Tree,
    pub basket: Basket,
    /// Squirrel; None in the chase variant where the fruit is the avatar
    pub mover: Option<Mover>,
    pub fruit: Option<Carryable>,
    pub pursuers: Vec<Pursuer>,
    /// 1-based number of the current round; 0 before the first spawn
    pub round: u32,
    /// Outcome of every resolved round, in order
    pub outcomes: Vec<RoundOutcome>,
    /// Earliest session time a dropped fruit can be grabbed again
    pub regrab_at_ms: f64,
    pub(crate) rng: Pcg32,
    pub(crate) scheduler: Scheduler,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl RoundController {
    /// Build a controller and lay out the tree and basket. Call
    /// `start_session` to begin play.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let area = PlayArea::new(config.play_width, config.play_height);
        let mut rng = Pcg32::seed_from_u64(seed);
        let (tree_pos, basket_pos) = spawner::layout(&area, config.min_distance_ratio, &mut rng);
        let snake_properties = SnakeProperties::new(&config.snake);
        let apples_remaining = config.total_apples;

        let mut ctrl = Self {
            config,
            area,
            clock_ms: 0.0,
            phase: RoundPhase::Idle,
            score: 0,
            apples_remaining,
            is_game_active: false,
            paused: false,
            session_over: false,
            snake_properties,
            tree: Tree::new(EntityId::new(0), tree_pos),
            basket: Basket::new(EntityId::new(0), basket_pos),
            mover: None,
            fruit: None,
            pursuers: Vec::new(),
            round: 0,
            outcomes: Vec::new(),
            regrab_at_ms: 0.0,
            rng,
            scheduler: Scheduler::new(),
            events: Vec::new(),
            next_id: 1,
        };
        ctrl.tree.id = ctrl.next_entity_id();
        ctrl.basket.id = ctrl.next_entity_id();
        log::debug!("layout: tree at {:?}, basket at {:?}", tree_pos, basket_pos);
        ctrl
    }

    /// Allocate a new entity id (never reused)
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resolve a handle to a live entity's position
    pub fn entity_position(&self, id: EntityId) -> Option<Vec2> {
        if let Some(mover) = self.mover.as_ref().filter(|m| m.id == id && m.active) {
            return Some(mover.pos);
        }
        if let Some(fruit) = self.fruit.as_ref().filter(|f| f.id == id && f.is_active) {
            return Some(fruit.pos);
        }
        if let Some(p) = self.pursuers.iter().find(|p| p.id == id && p.active) {
            return Some(p.pos);
        }
        if self.tree.id == id {
            return Some(self.tree.pos);
        }
        if self.basket.id == id {
            return Some(self.basket.pos);
        }
        None
    }

    /// Position of whatever the player is steering
    pub fn avatar_position(&self) -> Option<Vec2> {
        if self.config.variant.has_carrier() {
            self.mover.as_ref().map(|m| m.pos)
        } else {
            self.fruit.as_ref().filter(|f| f.is_active).map(|f| f.pos)
        }
    }

    /// A live (spawned, unresolved) fruit exists
    pub fn has_live_fruit(&self) -> bool {
        self.fruit.as_ref().is_some_and(|f| f.is_active)
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }
}

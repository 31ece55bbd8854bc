//! Game simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform code:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Entities referenced by id, never by pointer

pub mod collision;
pub mod entity;
pub mod fruit;
pub mod mover;
pub mod pursuer;
pub mod round;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{ArcadeOverlap, NoOverlap, OverlapDetector};
pub use entity::{Body, Edge, Entity, EntityId, Footprint, PlayArea};
pub use fruit::Carryable;
pub use mover::{MotionModel, Mover};
pub use pursuer::{Pursuer, PursuerKind, Segment, Steer, direct_pursuit, wavering_pursuit};
pub use round::OverlapPair;
pub use schedule::{RoundAction, Scheduler};
pub use spawner::{Basket, Tree};
pub use state::{GameEvent, RoundController, RoundOutcome, RoundPhase, SnakeProperties, SoundCue};
pub use tick::{FixedStep, TickInput, tick};

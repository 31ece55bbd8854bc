//! Round lifecycle transitions
//!
//! Every handler re-checks the phase and entity flags on entry, so a late
//! timer or a duplicate overlap report is ignored instead of resolving a round
//! twice.

use glam::Vec2;
use rand::Rng;

use super::collision::OverlapDetector;
use super::entity::{Body, Entity, EntityId};
use super::fruit::Carryable;
use super::mover::Mover;
use super::pursuer::{Pursuer, PursuerKind};
use super::schedule::RoundAction;
use super::state::{GameEvent, RoundController, RoundOutcome, RoundPhase, SoundCue};
use crate::consts::*;

/// Body pairs the controller watches, in resolution priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPair {
    /// Squirrel reaches the free fruit
    AvatarFruit,
    /// Carrying squirrel reaches the basket
    AvatarBasket,
    /// Fruit avatar reaches the basket
    FruitBasket,
    /// Predator reaches the free fruit
    PursuerFruit(EntityId),
    /// Predator reaches the carrying squirrel
    PursuerAvatar(EntityId),
}

impl RoundController {
    /// Reset the session and drop the first fruit
    pub fn start_session(&mut self) {
        self.scheduler.cancel_all();
        self.fruit = None;
        self.pursuers.clear();
        self.score = 0;
        self.apples_remaining = self.config.total_apples;
        self.is_game_active = true;
        self.paused = false;
        self.session_over = false;
        self.round = 0;
        self.outcomes.clear();
        self.regrab_at_ms = 0.0;
        self.snake_properties = super::state::SnakeProperties::new(&self.config.snake);

        self.mover = if self.config.variant.has_carrier() {
            let id = self.next_entity_id();
            Some(Mover::squirrel(
                id,
                self.area.center(),
                self.config.avatar_speed,
                self.config.carry_speed,
                self.config.acceleration,
            ))
        } else {
            None
        };

        log::info!(
            "session started: {} variant, {} apples",
            self.config.variant.as_str(),
            self.apples_remaining
        );
        self.emit(GameEvent::ScoreChanged { score: 0 });
        self.emit(GameEvent::RemainingChanged {
            remaining: self.apples_remaining,
        });
        self.emit(GameEvent::Ambient { playing: true });

        self.phase = RoundPhase::Idle;
        self.spawn_fruit();
    }

    /// Enter AwaitingSpawn and put one fruit into play
    pub fn spawn_fruit(&mut self) {
        if !self.is_game_active || self.apples_remaining == 0 {
            log::debug!("spawn skipped: game inactive or quota used");
            return;
        }
        if self.fruit.is_some() {
            log::warn!("spawn skipped: round {} still has a fruit", self.round);
            return;
        }

        self.phase = RoundPhase::AwaitingSpawn;
        self.apples_remaining -= 1;
        self.round += 1;

        let pos = self.tree.spawn_point(&mut self.rng);
        let id = self.next_entity_id();
        let mut fruit = Carryable::new(id, pos);
        fruit.activate(self.config.fruit_drop_impulse);
        self.fruit = Some(fruit);

        log::info!("round {}: fruit spawned, {} left", self.round, self.apples_remaining);
        self.emit(GameEvent::RemainingChanged {
            remaining: self.apples_remaining,
        });
        self.emit(GameEvent::FruitSpawned { pos });
        self.emit(GameEvent::Sound { cue: SoundCue::Drop });

        self.phase = RoundPhase::FruitFree;
        self.scheduler.schedule(
            self.clock_ms + self.config.pursuer_delay_ms,
            RoundAction::SpawnPursuers { round: self.round },
        );
    }

    /// Release the variant's predators just outside the play area
    pub fn spawn_pursuers(&mut self, round: u32) {
        if !self.is_game_active || round != self.round || !self.has_live_fruit() || !self.pursuers.is_empty() {
            log::debug!("pursuer spawn for round {} is stale, ignoring", round);
            return;
        }
        if !matches!(self.phase, RoundPhase::FruitFree | RoundPhase::FruitCarried) {
            return;
        }

        for &kind in self.config.variant.roster() {
            let id = self.next_entity_id();
            let pos = self.area.random_offscreen_point(OFFSCREEN_MARGIN, &mut self.rng);
            let pursuer = match kind {
                PursuerKind::Snake => Pursuer::snake(id, pos, &self.snake_properties, &self.config.snake),
                PursuerKind::Worm => {
                    let facing = self.rng.random_range(0.0..std::f32::consts::TAU);
                    Pursuer::worm(id, pos, &self.config.worm, facing)
                }
            };
            log::debug!(
                "{} {} spawned at ({:.0}, {:.0}), speed {:.1}",
                kind.as_str(),
                id.get(),
                pos.x,
                pos.y,
                pursuer.move_speed
            );
            self.pursuers.push(pursuer);
            self.emit(GameEvent::PursuerSpawned { kind, pos });
            if kind == PursuerKind::Snake {
                self.emit(GameEvent::Sound {
                    cue: SoundCue::SnakeHiss,
                });
            }
        }
        self.retarget_pursuers();
    }

    /// The single targeting rule: free fruit is chased, carried fruit means
    /// chasing its carrier
    pub fn pursuit_target(&self) -> Option<EntityId> {
        match self.phase {
            RoundPhase::FruitFree => self.fruit.as_ref().filter(|f| f.is_active).map(|f| f.id),
            RoundPhase::FruitCarried => self.mover.as_ref().map(|m| m.id),
            _ => None,
        }
    }

    /// Point every pursuer at the current target
    pub fn retarget_pursuers(&mut self) {
        let target = self.pursuit_target();
        for p in &mut self.pursuers {
            p.set_target(target);
        }
    }

    /// Squirrel grabs the fruit
    pub fn on_pickup(&mut self) -> bool {
        if self.phase != RoundPhase::FruitFree || self.clock_ms < self.regrab_at_ms {
            return false;
        }
        let (Some(mover), Some(fruit)) = (self.mover.as_mut(), self.fruit.as_mut()) else {
            return false;
        };
        if !fruit.pickup(mover.id) {
            return false;
        }
        mover.pick_up();
        let pos = mover.pos;
        fruit.pos = pos;

        self.phase = RoundPhase::FruitCarried;
        self.retarget_pursuers();
        log::info!("round {}: fruit picked up", self.round);
        self.emit(GameEvent::FruitPickedUp { pos });
        self.emit(GameEvent::Sound { cue: SoundCue::Pickup });
        true
    }

    /// Squirrel lets go of the fruit, which bounces free with a random kick
    pub fn drop_carried(&mut self) -> bool {
        if self.phase != RoundPhase::FruitCarried {
            return false;
        }
        let (Some(mover), Some(fruit)) = (self.mover.as_mut(), self.fruit.as_mut()) else {
            return false;
        };
        if !fruit.drop(self.config.drop_speed_min, self.config.drop_speed_max, &mut self.rng) {
            return false;
        }
        mover.release();
        let pos = fruit.pos;

        self.phase = RoundPhase::FruitFree;
        self.regrab_at_ms = self.clock_ms + DROP_REGRAB_MS;
        self.retarget_pursuers();
        log::info!("round {}: fruit dropped", self.round);
        self.emit(GameEvent::FruitDropped { pos });
        self.emit(GameEvent::Sound { cue: SoundCue::Drop });
        true
    }

    /// Fruit reached the basket
    pub fn on_delivery(&mut self) -> bool {
        let delivered = match self.phase {
            RoundPhase::FruitCarried => self.mover.as_ref().is_some_and(|m| m.carrying),
            RoundPhase::FruitFree => !self.config.variant.has_carrier() && self.has_live_fruit(),
            _ => false,
        };
        if !delivered {
            return false;
        }

        self.score += 1;
        let pos = self.basket.pos;
        log::info!("round {}: delivered, score {}", self.round, self.score);
        self.emit(GameEvent::ScoreChanged { score: self.score });
        self.emit(GameEvent::Delivered { pos });
        self.emit(GameEvent::Sound { cue: SoundCue::Collect });
        self.resolve(RoundOutcome::Delivered);
        true
    }

    /// A predator got the fruit (or the squirrel holding it)
    pub fn on_interception(&mut self, pursuer_id: EntityId) -> bool {
        if !matches!(self.phase, RoundPhase::FruitFree | RoundPhase::FruitCarried) || !self.has_live_fruit() {
            return false;
        }
        let Some(pursuer) = self.pursuers.iter().find(|p| p.id == pursuer_id && p.active) else {
            log::warn!("interception by unknown pursuer {}", pursuer_id.get());
            return false;
        };
        let kind = pursuer.kind;
        let pos = pursuer.pos;

        if kind.is_progressive() {
            self.snake_properties.record_catch(&self.config.snake);
            log::info!(
                "snake ate apple #{}: speed {:.1}, {} segments",
                self.snake_properties.apples_eaten,
                self.snake_properties.move_speed,
                self.snake_properties.segment_count
            );
        } else {
            log::info!("round {}: {} caught the fruit", self.round, kind.as_str());
        }
        self.emit(GameEvent::Intercepted { kind, pos });
        self.emit(GameEvent::Sound { cue: SoundCue::Eat });
        self.resolve(RoundOutcome::Intercepted(kind));
        true
    }

    fn resolve(&mut self, outcome: RoundOutcome) {
        self.phase = RoundPhase::Resolved(outcome);
        self.outcomes.push(outcome);
        self.cleanup_round();
        self.check_game_status();
    }

    /// Destroy the round's fruit and predators; the squirrel stays
    pub fn cleanup_round(&mut self) {
        if let Some(mut fruit) = self.fruit.take() {
            fruit.deactivate();
        }
        self.pursuers.clear();
        if let Some(mover) = self.mover.as_mut() {
            mover.release();
        }
    }

    /// End the game once the quota is used up, otherwise queue the next fruit
    pub fn check_game_status(&mut self) {
        if !self.is_game_active {
            return;
        }
        if self.apples_remaining == 0 && !self.has_live_fruit() {
            self.enter_game_over();
        } else if self.fruit.is_none() && !self.scheduler.contains(RoundAction::SpawnFruit) {
            self.scheduler
                .schedule(self.clock_ms + self.config.settle_delay_ms, RoundAction::SpawnFruit);
        }
    }

    fn enter_game_over(&mut self) {
        self.is_game_active = false;
        self.phase = RoundPhase::GameOver;
        self.scheduler.cancel_all();
        log::info!(
            "game over: {} of {} delivered",
            self.score,
            self.config.total_apples
        );
        self.emit(GameEvent::Sound {
            cue: SoundCue::GameOver,
        });
        self.emit(GameEvent::Ambient { playing: false });
        self.scheduler.schedule(
            self.clock_ms + self.config.game_over_delay_ms,
            RoundAction::ReportFinalScore,
        );
    }

    /// Fire every timer that has come due
    pub fn run_due_actions(&mut self) {
        for action in self.scheduler.drain_due(self.clock_ms) {
            match action {
                RoundAction::SpawnFruit => self.spawn_fruit(),
                RoundAction::SpawnPursuers { round } => self.spawn_pursuers(round),
                RoundAction::ReportFinalScore => {
                    if !self.session_over {
                        self.session_over = true;
                        self.emit(GameEvent::SessionEnded { score: self.score });
                    }
                }
            }
        }
    }

    /// Pairs worth testing this frame, in priority order: the player's pickup
    /// or delivery is checked before any predator contact
    pub fn monitored_pairs(&self) -> Vec<(OverlapPair, EntityId, EntityId)> {
        let mut pairs = Vec::new();
        let Some(fruit) = self.fruit.as_ref().filter(|f| f.is_active) else {
            return pairs;
        };

        match (self.phase, self.mover.as_ref()) {
            (RoundPhase::FruitFree, Some(mover)) => {
                pairs.push((OverlapPair::AvatarFruit, mover.id, fruit.id));
                for p in &self.pursuers {
                    pairs.push((OverlapPair::PursuerFruit(p.id), p.id, fruit.id));
                }
            }
            (RoundPhase::FruitFree, None) => {
                pairs.push((OverlapPair::FruitBasket, fruit.id, self.basket.id));
                for p in &self.pursuers {
                    pairs.push((OverlapPair::PursuerFruit(p.id), p.id, fruit.id));
                }
            }
            (RoundPhase::FruitCarried, Some(mover)) => {
                pairs.push((OverlapPair::AvatarBasket, mover.id, self.basket.id));
                for p in &self.pursuers {
                    pairs.push((OverlapPair::PursuerAvatar(p.id), p.id, mover.id));
                }
            }
            _ => {}
        }
        pairs
    }

    /// Collision body of a live entity
    pub fn body(&self, id: EntityId) -> Option<Body> {
        if let Some(mover) = self.mover.as_ref().filter(|m| m.id == id) {
            return Some(mover.body());
        }
        if let Some(fruit) = self.fruit.as_ref().filter(|f| f.id == id) {
            return Some(fruit.body());
        }
        if let Some(p) = self.pursuers.iter().find(|p| p.id == id) {
            return Some(p.body());
        }
        if self.basket.id == id {
            return Some(self.basket.body());
        }
        None
    }

    /// Overlap callback: apply the transition the pair stands for. Returns
    /// true if round state changed.
    pub fn resolve_overlap(&mut self, pair: OverlapPair) -> bool {
        match pair {
            OverlapPair::AvatarFruit => self.on_pickup(),
            OverlapPair::AvatarBasket => self.phase == RoundPhase::FruitCarried && self.on_delivery(),
            OverlapPair::FruitBasket => {
                self.phase == RoundPhase::FruitFree && self.mover.is_none() && self.on_delivery()
            }
            OverlapPair::PursuerFruit(id) => {
                let free = self.fruit.as_ref().is_some_and(|f| f.is_active && !f.is_picked_up);
                self.phase == RoundPhase::FruitFree && free && self.on_interception(id)
            }
            OverlapPair::PursuerAvatar(id) => {
                let carrying = self.mover.as_ref().is_some_and(|m| m.carrying);
                self.phase == RoundPhase::FruitCarried && carrying && self.on_interception(id)
            }
        }
    }

    /// Ask the detector about every monitored pair and resolve the first hit.
    /// At most one transition happens per call.
    pub fn process_overlaps(&mut self, detector: &dyn OverlapDetector) -> Option<OverlapPair> {
        for (pair, a, b) in self.monitored_pairs() {
            let (Some(body_a), Some(body_b)) = (self.body(a), self.body(b)) else {
                continue;
            };
            if detector.overlaps(&body_a, &body_b) && self.resolve_overlap(pair) {
                return Some(pair);
            }
        }
        None
    }

    /// First pursuer of the given kind
    pub fn pursuer(&self, kind: PursuerKind) -> Option<&Pursuer> {
        self.pursuers.iter().find(|p| p.kind == kind)
    }

    /// Where the live fruit is, if any
    pub fn fruit_position(&self) -> Option<Vec2> {
        self.fruit.as_ref().filter(|f| f.is_active).map(|f| f.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::collision::ArcadeOverlap;

    fn started(config: GameConfig) -> RoundController {
        let mut ctrl = RoundController::new(config, 1234);
        ctrl.start_session();
        ctrl
    }

    fn advance_clock(ctrl: &mut RoundController, ms: f64) {
        ctrl.clock_ms += ms;
        ctrl.run_due_actions();
    }

    #[test]
    fn test_session_start_spawns_first_fruit() {
        let ctrl = started(GameConfig::pickup());
        assert_eq!(ctrl.phase, RoundPhase::FruitFree);
        assert_eq!(ctrl.round, 1);
        assert_eq!(ctrl.apples_remaining, ctrl.config.total_apples - 1);
        assert!(ctrl.has_live_fruit());
        assert!(ctrl.mover.is_some());
        assert!(ctrl.pursuers.is_empty());
    }

    #[test]
    fn test_second_spawn_is_refused_while_fruit_live() {
        let mut ctrl = started(GameConfig::pickup());
        let remaining = ctrl.apples_remaining;
        let fruit_id = ctrl.fruit.as_ref().map(|f| f.id);
        ctrl.spawn_fruit();
        assert_eq!(ctrl.apples_remaining, remaining);
        assert_eq!(ctrl.fruit.as_ref().map(|f| f.id), fruit_id);
    }

    #[test]
    fn test_pursuers_spawn_offscreen_after_delay() {
        let mut ctrl = started(GameConfig::pickup());
        advance_clock(&mut ctrl, 1999.0);
        assert!(ctrl.pursuers.is_empty());
        advance_clock(&mut ctrl, 1.0);
        assert_eq!(ctrl.pursuers.len(), 2);
        let fruit_id = ctrl.fruit.as_ref().map(|f| f.id);
        for p in &ctrl.pursuers {
            assert!(!ctrl.area.contains(p.pos));
            assert_eq!(p.target, fruit_id);
        }
    }

    #[test]
    fn test_stale_pursuer_timer_is_ignored() {
        let mut ctrl = started(GameConfig::chase());
        // Deliver before the snake shows up
        assert!(ctrl.resolve_overlap(OverlapPair::FruitBasket));
        advance_clock(&mut ctrl, 500.0);
        assert!(ctrl.pursuers.is_empty());
        advance_clock(&mut ctrl, 500.0);
        // Next round's fruit, but its own snake is still 500 ms away
        assert_eq!(ctrl.round, 2);
        assert!(ctrl.pursuers.is_empty());
    }

    #[test]
    fn test_pickup_retargets_to_carrier() {
        let mut ctrl = started(GameConfig::pickup());
        advance_clock(&mut ctrl, 2000.0);
        assert!(ctrl.resolve_overlap(OverlapPair::AvatarFruit));
        assert_eq!(ctrl.phase, RoundPhase::FruitCarried);
        let mover_id = ctrl.mover.as_ref().map(|m| m.id);
        assert!(ctrl.pursuers.iter().all(|p| p.target == mover_id));
        assert!(ctrl.mover.as_ref().is_some_and(|m| m.carrying));

        // A second pickup report is a no-op
        assert!(!ctrl.resolve_overlap(OverlapPair::AvatarFruit));
    }

    #[test]
    fn test_outcomes_are_mutually_exclusive() {
        let mut ctrl = started(GameConfig::pickup());
        advance_clock(&mut ctrl, 2000.0);
        let snake_id = ctrl.pursuer(PursuerKind::Snake).map(|p| p.id).expect("snake");
        assert!(ctrl.resolve_overlap(OverlapPair::AvatarFruit));
        assert!(ctrl.resolve_overlap(OverlapPair::AvatarBasket));
        assert!(!ctrl.resolve_overlap(OverlapPair::PursuerAvatar(snake_id)));
        assert!(!ctrl.resolve_overlap(OverlapPair::AvatarBasket));
        assert_eq!(ctrl.outcomes, vec![RoundOutcome::Delivered]);
        assert_eq!(ctrl.score, 1);
        assert_eq!(ctrl.snake_properties.apples_eaten, 0);
    }

    #[test]
    fn test_drop_frees_fruit_and_blocks_instant_regrab() {
        let mut ctrl = started(GameConfig::pickup());
        advance_clock(&mut ctrl, 2000.0);
        assert!(ctrl.resolve_overlap(OverlapPair::AvatarFruit));
        assert!(ctrl.drop_carried());
        assert_eq!(ctrl.phase, RoundPhase::FruitFree);
        let fruit = ctrl.fruit.as_ref().expect("fruit");
        let speed = fruit.vel.length();
        assert!((DROP_SPEED_MIN - 1e-3..=DROP_SPEED_MAX + 1e-3).contains(&speed));
        let fruit_id = Some(fruit.id);
        assert!(ctrl.pursuers.iter().all(|p| p.target == fruit_id));

        assert!(!ctrl.resolve_overlap(OverlapPair::AvatarFruit));
        advance_clock(&mut ctrl, DROP_REGRAB_MS);
        assert!(ctrl.resolve_overlap(OverlapPair::AvatarFruit));
    }

    #[test]
    fn test_worm_catch_leaves_difficulty_alone() {
        let mut ctrl = started(GameConfig::pickup());
        advance_clock(&mut ctrl, 2000.0);
        let before = ctrl.snake_properties.clone();
        let worm_id = ctrl.pursuer(PursuerKind::Worm).map(|p| p.id).expect("worm");
        assert!(ctrl.resolve_overlap(OverlapPair::PursuerFruit(worm_id)));
        assert_eq!(ctrl.snake_properties, before);
        assert_eq!(ctrl.outcomes, vec![RoundOutcome::Intercepted(PursuerKind::Worm)]);
        assert!(ctrl.fruit.is_none());
        assert!(ctrl.pursuers.is_empty());
    }

    #[test]
    fn test_process_overlaps_uses_detector() {
        let mut ctrl = started(GameConfig::pickup());
        let fruit_pos = ctrl.fruit_position().expect("fruit");
        // Let the fruit settle, then park the squirrel on it
        if let Some(fruit) = ctrl.fruit.as_mut() {
            fruit.vel = Vec2::ZERO;
        }
        if let Some(mover) = ctrl.mover.as_mut() {
            mover.pos = fruit_pos;
        }
        assert_eq!(ctrl.process_overlaps(&ArcadeOverlap), Some(OverlapPair::AvatarFruit));
        assert_eq!(ctrl.phase, RoundPhase::FruitCarried);
    }
}

//! Fixed timestep simulation tick
//!
//! One call advances the session by one step: timers, avatar, fruit,
//! predators, then overlap resolution.

use glam::Vec2;

use super::collision::OverlapDetector;
use super::mover::MotionModel;
use super::state::{RoundController, RoundPhase};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction (any length; normalized by the motion model)
    pub intent: Vec2,
    /// Let go of the carried fruit
    pub drop: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - the autopilot plays the game
    pub idle_mode: bool,
}

impl TickInput {
    /// Build an intent from 8-way key state; opposite keys cancel
    pub fn from_directions(up: bool, down: bool, left: bool, right: bool) -> Self {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Self {
            intent: Vec2::new(axis(left, right), axis(up, down)).normalize_or_zero(),
            ..Default::default()
        }
    }
}

/// Wall-clock accumulator feeding fixed `SIM_DT` steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    /// Add a frame's elapsed seconds (clamped to 0.1) and return how many
    /// simulation steps to run, at most `MAX_SUBSTEPS`
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, 0.1);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        steps
    }

    /// Forget any leftover time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}

/// Advance the session by one fixed timestep
pub fn tick(ctrl: &mut RoundController, input: &TickInput, dt: f32, detector: &dyn OverlapDetector) {
    // Handle pause toggle
    if input.pause && ctrl.is_game_active {
        ctrl.paused = !ctrl.paused;
        log::info!("{}", if ctrl.paused { "paused" } else { "resumed" });
    }
    if ctrl.paused || ctrl.phase == RoundPhase::Idle {
        return;
    }

    ctrl.clock_ms += dt as f64 * 1000.0;
    ctrl.run_due_actions();
    if ctrl.session_over {
        return;
    }

    let intent = if input.idle_mode {
        autopilot_intent(ctrl)
    } else {
        input.intent
    };

    // Avatar
    let area = ctrl.area;
    if let Some(mover) = ctrl.mover.as_mut() {
        mover.update(intent, dt, &area);
    } else if let Some(fruit) = ctrl.fruit.as_mut() {
        fruit.steer(
            intent,
            MotionModel::Direct {
                speed: ctrl.config.avatar_speed,
            },
            dt,
        );
    }

    if input.drop {
        ctrl.drop_carried();
    }

    // Fruit follows its carrier or rolls free
    let carrier_pos = ctrl
        .fruit
        .as_ref()
        .and_then(|f| f.carrier)
        .and_then(|id| ctrl.entity_position(id));
    let drag = ctrl.config.variant.has_carrier();
    if let Some(fruit) = ctrl.fruit.as_mut() {
        fruit.update(carrier_pos, dt, &area, drag);
    }

    // Re-affirm the targeting rule every frame
    ctrl.retarget_pursuers();
    let targets: Vec<Option<Vec2>> = ctrl
        .pursuers
        .iter()
        .map(|p| p.target.and_then(|id| ctrl.entity_position(id)))
        .collect();
    let now = ctrl.clock_ms;
    for (pursuer, target) in ctrl.pursuers.iter_mut().zip(targets) {
        pursuer.steer(target, now, &mut ctrl.rng);
        pursuer.advance(dt);
    }

    ctrl.process_overlaps(detector);
}

/// Demo player: fetch the fruit, then run for the basket, shying away from
/// any predator that gets close
fn autopilot_intent(ctrl: &RoundController) -> Vec2 {
    let Some(avatar) = ctrl.avatar_position() else {
        return Vec2::ZERO;
    };

    let goal = match ctrl.phase {
        RoundPhase::FruitFree if ctrl.mover.is_some() => ctrl.fruit_position(),
        RoundPhase::FruitFree | RoundPhase::FruitCarried => Some(ctrl.basket.pos),
        _ => None,
    };
    let Some(goal) = goal else {
        return Vec2::ZERO;
    };

    let mut intent = (goal - avatar).normalize_or_zero();
    for p in &ctrl.pursuers {
        let away = avatar - p.pos;
        let distance = away.length();
        if distance < AUTOPILOT_AVOID_RADIUS {
            let weight = (AUTOPILOT_AVOID_RADIUS - distance) / AUTOPILOT_AVOID_RADIUS * 1.5;
            intent += away.normalize_or_zero() * weight;
        }
    }
    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, SnakeConfig};
    use crate::sim::collision::{ArcadeOverlap, NoOverlap};
    use crate::sim::pursuer::PursuerKind;
    use crate::sim::round::OverlapPair;
    use crate::sim::state::{GameEvent, RoundOutcome, SoundCue};

    fn run_ms(ctrl: &mut RoundController, ms: f64) {
        let steps = (ms / (SIM_DT as f64 * 1000.0)).ceil() as u32 + 1;
        for _ in 0..steps {
            tick(ctrl, &TickInput::default(), SIM_DT, &NoOverlap);
        }
    }

    fn started(config: GameConfig, seed: u64) -> RoundController {
        let mut ctrl = RoundController::new(config, seed);
        ctrl.start_session();
        ctrl
    }

    fn snake_id(ctrl: &RoundController) -> crate::sim::EntityId {
        ctrl.pursuer(PursuerKind::Snake).map(|p| p.id).expect("snake spawned")
    }

    #[test]
    fn test_from_directions() {
        let input = TickInput::from_directions(true, false, false, true);
        assert!((input.intent.length() - 1.0).abs() < 1e-5);
        assert!(input.intent.x > 0.0 && input.intent.y < 0.0);
        assert_eq!(TickInput::from_directions(true, true, true, true).intent, Vec2::ZERO);
    }

    #[test]
    fn test_three_catches_then_seven_deliveries() {
        let mut ctrl = started(GameConfig::pickup(), 42);
        let initial_segments = ctrl.snake_properties.segment_count;
        let mut events = ctrl.drain_events();

        for round in 1..=10 {
            assert_eq!(ctrl.round, round);
            let wait = ctrl.config.pursuer_delay_ms;
            run_ms(&mut ctrl, wait);
            assert_eq!(ctrl.pursuers.len(), 2);
            if round <= 3 {
                let id = snake_id(&ctrl);
                assert!(ctrl.resolve_overlap(OverlapPair::PursuerFruit(id)));
            } else {
                assert!(ctrl.resolve_overlap(OverlapPair::AvatarFruit));
                assert!(ctrl.resolve_overlap(OverlapPair::AvatarBasket));
            }
            events.extend(ctrl.drain_events());
            if round < 10 {
                assert!(ctrl.is_game_active);
                let wait = ctrl.config.settle_delay_ms;
                run_ms(&mut ctrl, wait);
            }
        }

        assert_eq!(ctrl.score, 7);
        assert_eq!(ctrl.apples_remaining, 0);
        assert_eq!(ctrl.snake_properties.segment_count, initial_segments + 3);
        assert_eq!(ctrl.phase, RoundPhase::GameOver);
        assert!(!ctrl.is_game_active);
        assert_eq!(ctrl.outcomes.len(), 10);
        assert_eq!(
            &ctrl.outcomes[..3],
            &[RoundOutcome::Intercepted(PursuerKind::Snake); 3]
        );

        let wait = ctrl.config.game_over_delay_ms + 1000.0;

        run_ms(&mut ctrl, wait);
        events.extend(ctrl.drain_events());
        let game_overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Sound { cue: SoundCue::GameOver }))
            .count();
        let endings: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::SessionEnded { .. }))
            .collect();
        assert_eq!(game_overs, 1);
        assert_eq!(endings, vec![&GameEvent::SessionEnded { score: 7 }]);
        assert!(ctrl.session_over);
    }

    #[test]
    fn test_snake_speed_survives_recreation() {
        let config = GameConfig {
            snake: SnakeConfig {
                base_speed: 150.0,
                speed_increase: 0.1,
                ..SnakeConfig::default()
            },
            ..GameConfig::chase()
        };
        let mut ctrl = started(config, 9);

        for _ in 0..3 {
            let wait = ctrl.config.pursuer_delay_ms;
            run_ms(&mut ctrl, wait);
            let id = snake_id(&ctrl);
            assert!(ctrl.resolve_overlap(OverlapPair::PursuerFruit(id)));
            let wait = ctrl.config.settle_delay_ms;
            run_ms(&mut ctrl, wait);
        }
        assert!((ctrl.snake_properties.move_speed - 195.0).abs() < 1e-3);

        // The next round's brand new snake carries the escalated speed
        let wait = ctrl.config.pursuer_delay_ms;
        run_ms(&mut ctrl, wait);
        let snake = ctrl.pursuer(PursuerKind::Snake).expect("snake");
        assert!((snake.move_speed - 195.0).abs() < 1e-3);
        assert_eq!(snake.segment_count(), ctrl.snake_properties.segment_count);
    }

    #[test]
    fn test_worm_catches_never_escalate() {
        let mut ctrl = started(GameConfig::pickup(), 5);
        let before = ctrl.snake_properties.clone();
        for _ in 0..4 {
            let wait = ctrl.config.pursuer_delay_ms;
            run_ms(&mut ctrl, wait);
            assert!(ctrl.resolve_overlap(OverlapPair::AvatarFruit));
            let worm = ctrl.pursuer(PursuerKind::Worm).map(|p| p.id).expect("worm");
            assert!(ctrl.resolve_overlap(OverlapPair::PursuerAvatar(worm)));
            let wait = ctrl.config.settle_delay_ms;
            run_ms(&mut ctrl, wait);
        }
        assert_eq!(ctrl.snake_properties, before);
        assert_eq!(ctrl.score, 0);
    }

    #[test]
    fn test_remaining_counts_down_by_one_per_spawn() {
        let mut ctrl = started(GameConfig::chase(), 3);
        let quota = ctrl.config.total_apples;
        let mut spawns = 0;
        let mut last = ctrl.apples_remaining;
        assert_eq!(last, quota - 1);

        while ctrl.is_game_active {
            assert!(ctrl.resolve_overlap(OverlapPair::FruitBasket));
            let wait = ctrl.config.settle_delay_ms;
            run_ms(&mut ctrl, wait);
            if ctrl.is_game_active {
                spawns += 1;
                assert_eq!(ctrl.apples_remaining, last - 1);
                last = ctrl.apples_remaining;
            }
        }
        assert_eq!(spawns, quota - 1);
        assert_eq!(ctrl.apples_remaining, 0);
        assert_eq!(ctrl.score, quota);
    }

    #[test]
    fn test_at_most_one_live_fruit() {
        let mut ctrl = started(GameConfig::pickup(), 77);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut last_id = None;
        for _ in 0..60 * 90 {
            tick(&mut ctrl, &input, SIM_DT, &ArcadeOverlap);
            let live = ctrl.fruit.iter().filter(|f| f.is_active).count();
            assert!(live <= 1);
            if let Some(fruit) = ctrl.fruit.as_ref() {
                if last_id != Some(fruit.id) {
                    assert!(last_id.is_none_or(|prev| prev < fruit.id));
                    last_id = Some(fruit.id);
                }
            }
            if ctrl.session_over {
                break;
            }
        }
        assert!(ctrl.apples_remaining <= ctrl.config.total_apples);
    }

    #[test]
    fn test_pause_freezes_timers() {
        let mut ctrl = started(GameConfig::pickup(), 11);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut ctrl, &pause, SIM_DT, &NoOverlap);
        assert!(ctrl.paused);
        let clock = ctrl.clock_ms;

        run_ms(&mut ctrl, 5000.0);
        assert_eq!(ctrl.clock_ms, clock);
        assert!(ctrl.pursuers.is_empty());

        tick(&mut ctrl, &pause, SIM_DT, &NoOverlap);
        assert!(!ctrl.paused);
        let wait = ctrl.config.pursuer_delay_ms;
        run_ms(&mut ctrl, wait);
        assert_eq!(ctrl.pursuers.len(), 2);
    }

    #[test]
    fn test_carried_fruit_tracks_squirrel() {
        let mut ctrl = started(GameConfig::pickup(), 13);
        assert!(ctrl.resolve_overlap(OverlapPair::AvatarFruit));
        let input = TickInput {
            intent: Vec2::new(1.0, 0.5),
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut ctrl, &input, SIM_DT, &NoOverlap);
            let mover = ctrl.mover.as_ref().map(|m| m.pos);
            assert_eq!(ctrl.fruit_position(), mover);
        }
    }

    #[test]
    fn test_drop_input_frees_fruit() {
        let mut ctrl = started(GameConfig::pickup(), 17);
        assert!(ctrl.resolve_overlap(OverlapPair::AvatarFruit));
        let drop = TickInput {
            drop: true,
            ..Default::default()
        };
        tick(&mut ctrl, &drop, SIM_DT, &NoOverlap);
        assert_eq!(ctrl.phase, RoundPhase::FruitFree);
        assert!(ctrl.mover.as_ref().is_some_and(|m| !m.carrying));
        assert!(ctrl.fruit.as_ref().is_some_and(|f| !f.is_picked_up && f.visible));
    }

    #[test]
    fn test_chase_avatar_moves_fruit() {
        let mut ctrl = started(GameConfig::chase(), 21);
        let start = ctrl.fruit_position().expect("fruit");
        let input = TickInput {
            intent: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut ctrl, &input, SIM_DT, &NoOverlap);
        }
        let end = ctrl.fruit_position().expect("fruit");
        assert!(end.x > start.x);
    }

    #[test]
    fn test_determinism() {
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut a = started(GameConfig::pickup(), 99999);
        let mut b = started(GameConfig::pickup(), 99999);
        for _ in 0..600 {
            tick(&mut a, &input, SIM_DT, &ArcadeOverlap);
            tick(&mut b, &input, SIM_DT, &ArcadeOverlap);
        }
        assert_eq!(a.round, b.round);
        assert_eq!(a.score, b.score);
        assert_eq!(a.mover.map(|m| m.pos), b.mover.map(|m| m.pos));
    }

    #[test]
    fn test_autopilot_sessions_run_to_completion() {
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for config in [GameConfig::pickup(), GameConfig::chase()] {
            for seed in 0..12 {
                let mut ctrl = started(config.clone(), seed);
                for _ in 0..60 * 60 * 30 {
                    tick(&mut ctrl, &input, SIM_DT, &ArcadeOverlap);
                    if ctrl.session_over {
                        break;
                    }
                }
                assert!(ctrl.session_over, "seed {seed} never finished");
                assert_eq!(ctrl.outcomes.len(), ctrl.config.total_apples as usize);
                let delivered = ctrl
                    .outcomes
                    .iter()
                    .filter(|o| **o == RoundOutcome::Delivered)
                    .count();
                assert_eq!(ctrl.score as usize, delivered);
            }
        }
    }

    #[test]
    fn test_fixed_step_caps_and_resets() {
        let mut step = FixedStep::default();
        assert_eq!(step.advance(SIM_DT * 0.5), 0);
        assert_eq!(step.advance(SIM_DT * 0.6), 1);

        // Long frames are clamped, then capped
        assert_eq!(step.advance(5.0), MAX_SUBSTEPS);
        assert!(step.pending() > 0.0);

        step.reset();
        assert_eq!(step.pending(), 0.0);
        assert_eq!(step.advance(SIM_DT * 0.5), 0);
    }
}

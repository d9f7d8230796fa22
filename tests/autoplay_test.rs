//! Autoplay loop tests: path choice, stop conditions, timing, forecasts.

use armory::data::{
    CostTables, EnhancementCostRecord, ProbabilisticCostRecord, WeaponFamily, WeaponVariant,
};
use armory::enhancement::{
    AttemptKind, AutoplayState, AutoplayStrategy, LevelSelection, Material, Outcome, StepOutcome,
    StrategyBuilder,
};
use armory::simulator::{run_forecast, ForecastConfig};
use armory::{Notice, Session};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DELAY: Duration = Duration::from_millis(50);

fn prob(level: u32, success: f64) -> ProbabilisticCostRecord {
    ProbabilisticCostRecord {
        grade: "Epic".to_string(),
        level,
        success,
        failure: 1.0 - success,
        downgrade: 0.0,
        reset: 0.0,
        gold: 40,
        shard: 0,
        stone: 2,
        downgrade_protection_cost: 0,
        reset_protection_cost: 0,
    }
}

/// +1 probabilistic only, +2 both kinds, +3 probabilistic only.
fn epic_tables() -> Arc<CostTables> {
    Arc::new(CostTables::new(
        vec![EnhancementCostRecord {
            grade: "Epic".to_string(),
            level: 2,
            gold: 500,
            shard: 5,
            stone: 0,
        }],
        vec![prob(1, 1.0), prob(2, 1.0), prob(3, 1.0)],
    ))
}

fn moonblade() -> WeaponFamily {
    WeaponFamily::new(vec![
        WeaponVariant {
            name: "Moonblade".to_string(),
            grade: "Epic".to_string(),
            level: 0,
        },
        WeaponVariant {
            name: "Moonblade".to_string(),
            grade: "Epic".to_string(),
            level: 1,
        },
    ])
    .unwrap()
}

fn session() -> Session {
    let mut session = Session::detached(epic_tables()).with_step_delay(DELAY);
    session.select_weapon(moonblade());
    session
}

/// Tick every step delay until autoplay goes idle, collecting attempts.
fn drive(session: &mut Session, start: Instant, rng: &mut ChaCha8Rng) -> Vec<StepOutcome> {
    let mut outcomes = Vec::new();
    let mut now = start;
    for _ in 0..100 {
        now += DELAY;
        if let Some(outcome) = session.tick(now, rng) {
            outcomes.push(outcome);
        }
        if session.autoplay().state() == AutoplayState::Idle {
            break;
        }
    }
    outcomes
}

// =========================================================================
// Path selection
// =========================================================================

#[test]
fn test_autoplay_prefers_guaranteed_where_selected() {
    let mut session = session();
    let strategy = StrategyBuilder::new(session.tables(), "Epic")
        .target(3)
        .prefer_guaranteed([2])
        .build();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let t0 = Instant::now();
    assert!(session.start_autoplay(strategy, t0));

    let outcomes = drive(&mut session, t0, &mut rng);
    let kinds: Vec<AttemptKind> = outcomes
        .iter()
        .filter_map(|o| match o {
            StepOutcome::Attempted(result) => Some(result.kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            AttemptKind::Probabilistic,
            AttemptKind::Guaranteed,
            AttemptKind::Probabilistic
        ]
    );
    assert_eq!(outcomes.last(), Some(&StepOutcome::TargetReached));
    assert_eq!(session.level(), 3);
    assert_eq!(session.autoplay().state(), AutoplayState::Idle);

    let labels: Vec<&str> = session.history().iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "[+2 → +3] success",
            "[+1 → +2] success (guaranteed)",
            "[+0 → +1] success"
        ]
    );
    assert_eq!(session.ledger().spent(Material::Gold), 580);
}

#[test]
fn test_probabilistic_used_when_guaranteed_not_preferred() {
    let mut session = session();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let t0 = Instant::now();
    session.start_autoplay(AutoplayStrategy::new(3), t0);

    drive(&mut session, t0, &mut rng);
    assert!(session
        .history()
        .iter()
        .all(|e| e.outcome == Outcome::Success));
    assert_eq!(session.level(), 3);
}

#[test]
fn test_autoplay_stops_without_cost_data() {
    let mut session = session();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let t0 = Instant::now();
    session.start_autoplay(AutoplayStrategy::new(8), t0);

    let outcomes = drive(&mut session, t0, &mut rng);
    assert_eq!(outcomes.last(), Some(&StepOutcome::NoPath { next_level: 4 }));
    assert_eq!(session.level(), 3);
    assert_eq!(
        session.take_notices(),
        vec![Notice::AutoplayStopped { next_level: 4 }]
    );
}

#[test]
fn test_strategy_from_level_selection() {
    let session = session();
    let strategy = StrategyBuilder::new(session.tables(), "Epic")
        .guaranteed(&"all".parse::<LevelSelection>().unwrap())
        .build();
    assert_eq!(strategy.target_level, 3);
    assert!(strategy.prefers_guaranteed(2));
    assert!(!strategy.prefers_guaranteed(1));
}

// =========================================================================
// Timing and cancellation
// =========================================================================

#[test]
fn test_step_waits_for_delay() {
    let mut session = session();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let t0 = Instant::now();
    session.start_autoplay(AutoplayStrategy::new(3), t0);

    assert!(session.tick(t0, &mut rng).is_none());
    assert!(session.tick(t0 + DELAY / 2, &mut rng).is_none());
    assert!(matches!(
        session.tick(t0 + DELAY, &mut rng),
        Some(StepOutcome::Attempted(_))
    ));
    // Next step is scheduled one delay after the previous one ran.
    assert!(session.tick(t0 + DELAY + DELAY / 2, &mut rng).is_none());
    assert_eq!(session.level(), 1);
}

#[test]
fn test_no_step_after_stop() {
    let mut session = session();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let t0 = Instant::now();
    session.start_autoplay(AutoplayStrategy::new(3), t0);
    session.tick(t0 + DELAY, &mut rng);
    assert_eq!(session.history().len(), 1);

    // The next step is already due when stop arrives.
    session.stop_autoplay();
    assert!(session.tick(t0 + DELAY * 10, &mut rng).is_none());
    assert_eq!(session.autoplay_step(&mut rng), StepOutcome::Inactive);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.level(), 1);
}

#[test]
fn test_pause_preserves_strategy_and_resume_continues() {
    let mut session = session();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let t0 = Instant::now();
    session.start_autoplay(AutoplayStrategy::new(3), t0);
    session.tick(t0 + DELAY, &mut rng);

    assert_eq!(session.toggle_autoplay_pause(t0 + DELAY), AutoplayState::Paused);
    assert!(session.tick(t0 + DELAY * 5, &mut rng).is_none());
    assert_eq!(session.autoplay().strategy().unwrap().target_level, 3);

    let resumed_at = t0 + DELAY * 5;
    assert_eq!(session.toggle_autoplay_pause(resumed_at), AutoplayState::Running);
    drive(&mut session, resumed_at, &mut rng);
    assert_eq!(session.level(), 3);
    assert_eq!(session.history().len(), 3);
}

// =========================================================================
// Forecast
// =========================================================================

fn coin_flip_tables() -> Arc<CostTables> {
    Arc::new(CostTables::new(
        vec![],
        vec![prob(1, 0.5), prob(2, 0.5), prob(3, 0.5)],
    ))
}

#[test]
fn test_forecast_is_deterministic_with_seed() {
    let mut config = ForecastConfig::for_strategy(AutoplayStrategy::new(3), 50);
    config.seed = Some(7);

    let a = run_forecast(&config, coin_flip_tables(), &moonblade());
    let b = run_forecast(&config, coin_flip_tables(), &moonblade());
    assert_eq!(a.run_stats, b.run_stats);
    assert_eq!(a.num_runs, 50);
    assert_eq!(a.runs_completed, 50);
    assert!(a.avg_attempts >= 3.0);
    assert_eq!(a.total_successes, 150);
}

#[test]
fn test_forecast_step_limit_leaves_runs_incomplete() {
    let mut config = ForecastConfig::for_strategy(AutoplayStrategy::new(3), 10);
    config.seed = Some(1);
    config.max_steps_per_run = 2;

    let report = run_forecast(&config, epic_tables(), &moonblade());
    assert_eq!(report.runs_completed, 0);
    assert!(report.run_stats.iter().all(|r| r.final_level == 2));
    assert_eq!(report.completion_rate(), 0.0);
}

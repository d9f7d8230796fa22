//! Forecast runner built on the interactive session.

use super::config::ForecastConfig;
use super::report::{ForecastReport, RunStats};
use crate::data::{CostTables, WeaponFamily};
use crate::enhancement::autoplay::StepOutcome;
use crate::session::Session;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run the full forecast and return a report.
pub fn run_forecast(
    config: &ForecastConfig,
    tables: Arc<CostTables>,
    family: &WeaponFamily,
) -> ForecastReport {
    let mut all_runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        // Create RNG for this run
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(run_idx as u64)),
            None => ChaCha8Rng::from_entropy(),
        };

        let run_stats = simulate_single_run(config, Arc::clone(&tables), family, &mut rng);

        if config.verbosity >= 2 {
            tracing::info!(
                "Run {}/{} - +{} after {} attempts, {} gold, {} weapons consumed",
                run_idx + 1,
                config.num_runs,
                run_stats.final_level,
                run_stats.attempts,
                run_stats.gold,
                run_stats.weapons_consumed
            );
        }
        all_runs.push(run_stats);
    }

    ForecastReport::from_runs(all_runs, config.strategy.target_level)
}

/// Play one autoplay run to completion (or the step limit) from +0.
pub fn simulate_single_run<R: Rng>(
    config: &ForecastConfig,
    tables: Arc<CostTables>,
    family: &WeaponFamily,
    rng: &mut R,
) -> RunStats {
    let mut session = Session::detached(tables).with_step_delay(Duration::ZERO);
    session.select_weapon(family.clone());
    session.start_autoplay(config.strategy.clone(), Instant::now());

    let mut stats = RunStats::default();
    let mut steps = 0u64;
    while steps < config.max_steps_per_run {
        steps += 1;
        match session.autoplay_step(rng) {
            StepOutcome::Attempted(result) => stats.record(&result),
            StepOutcome::TargetReached | StepOutcome::NoPath { .. } | StepOutcome::Inactive => {
                break
            }
        }
    }

    stats.finish(
        session.level(),
        session.level() >= config.strategy.target_level,
        session.ledger(),
    );
    stats
}

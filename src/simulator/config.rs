//! Forecast configuration.

use crate::enhancement::strategy::AutoplayStrategy;

/// Configuration for a forecast.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Number of independent runs
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Strategy every run follows
    pub strategy: AutoplayStrategy,

    /// Autoplay steps per run before giving up
    pub max_steps_per_run: u64,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per run)
    pub verbosity: u8,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            num_runs: 1000,
            seed: None,
            strategy: AutoplayStrategy::default(),
            max_steps_per_run: 100_000,
            verbosity: 1,
        }
    }
}

impl ForecastConfig {
    /// Quick config for a given strategy
    pub fn for_strategy(strategy: AutoplayStrategy, num_runs: u32) -> Self {
        Self {
            num_runs,
            strategy,
            ..Default::default()
        }
    }
}

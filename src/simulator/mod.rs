//! Monte Carlo forecasting for enhancement strategies.
//!
//! Runs an autoplay strategy many times without step delays and summarizes
//! what reaching the target tends to cost:
//! - Attempts and outcome counts per run
//! - Materials spent and weapons sacrificed
//! - How often the target is reached within the step limit
//!
//! Every run goes through the same session and autoplay step used
//! interactively, so forecasts match real play.

mod config;
mod report;
mod runner;

pub use config::ForecastConfig;
pub use report::{ForecastReport, RunStats};
pub use runner::{run_forecast, simulate_single_run};

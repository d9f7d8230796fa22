//! Forecast report generation.

use crate::enhancement::ledger::Ledger;
use crate::enhancement::types::{AttemptKind, EnhancementResult, Material, Outcome};
use serde::Serialize;

/// What happened during one forecast run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub attempts: u64,
    pub guaranteed_attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub downgrades: u64,
    pub resets: u64,
    pub resets_prevented: u64,
    pub final_level: u32,
    pub reached_target: bool,
    pub gold: u64,
    pub shard: u64,
    pub stone: u64,
    pub weapons_consumed: u32,
}

impl RunStats {
    pub fn record(&mut self, result: &EnhancementResult) {
        self.attempts += 1;
        if result.kind == AttemptKind::Guaranteed {
            self.guaranteed_attempts += 1;
        }
        match result.outcome {
            Outcome::GuaranteedSuccess | Outcome::Success => self.successes += 1,
            Outcome::Failure => self.failures += 1,
            Outcome::Downgrade => self.downgrades += 1,
            Outcome::Reset => self.resets += 1,
            Outcome::ResetPrevented => self.resets_prevented += 1,
        }
    }

    pub fn finish(&mut self, final_level: u32, reached_target: bool, ledger: &Ledger) {
        self.final_level = final_level;
        self.reached_target = reached_target;
        self.gold = ledger.spent(Material::Gold);
        self.shard = ledger.spent(Material::Shard);
        self.stone = ledger.spent(Material::Stone);
        self.weapons_consumed = ledger.consumed_weapons.values().sum();
    }
}

/// Aggregated results from multiple forecast runs.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub num_runs: u32,
    pub runs_completed: u32,
    pub target_level: u32,

    pub avg_attempts: f64,
    pub avg_final_level: f64,
    pub avg_gold: f64,
    pub avg_shard: f64,
    pub avg_stone: f64,
    pub avg_weapons_consumed: f64,

    /// Gold spent by completed runs at the 50th and 90th percentile
    pub median_gold: u64,
    pub p90_gold: u64,

    pub total_successes: u64,
    pub total_failures: u64,
    pub total_downgrades: u64,
    pub total_resets: u64,
    pub total_resets_prevented: u64,

    #[serde(skip)]
    pub run_stats: Vec<RunStats>,
}

fn average(runs: &[RunStats], f: impl Fn(&RunStats) -> f64) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(f).sum::<f64>() / runs.len() as f64
}

/// Nearest-rank percentile of a sorted slice.
fn percentile(sorted: &[u64], pct: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

impl ForecastReport {
    pub fn from_runs(runs: Vec<RunStats>, target_level: u32) -> Self {
        let num_runs = runs.len() as u32;
        let runs_completed = runs.iter().filter(|r| r.reached_target).count() as u32;

        let mut completed_gold: Vec<u64> = runs
            .iter()
            .filter(|r| r.reached_target)
            .map(|r| r.gold)
            .collect();
        completed_gold.sort_unstable();

        Self {
            num_runs,
            runs_completed,
            target_level,
            avg_attempts: average(&runs, |r| r.attempts as f64),
            avg_final_level: average(&runs, |r| r.final_level as f64),
            avg_gold: average(&runs, |r| r.gold as f64),
            avg_shard: average(&runs, |r| r.shard as f64),
            avg_stone: average(&runs, |r| r.stone as f64),
            avg_weapons_consumed: average(&runs, |r| r.weapons_consumed as f64),
            median_gold: percentile(&completed_gold, 50.0),
            p90_gold: percentile(&completed_gold, 90.0),
            total_successes: runs.iter().map(|r| r.successes).sum(),
            total_failures: runs.iter().map(|r| r.failures).sum(),
            total_downgrades: runs.iter().map(|r| r.downgrades).sum(),
            total_resets: runs.iter().map(|r| r.resets).sum(),
            total_resets_prevented: runs.iter().map(|r| r.resets_prevented).sum(),
            run_stats: runs,
        }
    }

    pub fn completion_rate(&self) -> f64 {
        if self.num_runs == 0 {
            return 0.0;
        }
        self.runs_completed as f64 / self.num_runs as f64
    }

    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                  ENHANCEMENT FORECAST\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} total, {} reached +{} ({:.1}%)\n\n",
            self.num_runs,
            self.runs_completed,
            self.target_level,
            self.completion_rate() * 100.0
        ));

        report.push_str("── PROGRESS ─────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Attempts:        {:.1}\n", self.avg_attempts));
        report.push_str(&format!("  Avg Final Level:     +{:.1}\n\n", self.avg_final_level));

        report.push_str("── COST ─────────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Gold:            {:.0}\n", self.avg_gold));
        report.push_str(&format!("  Median Gold:         {}\n", self.median_gold));
        report.push_str(&format!("  90th pct Gold:       {}\n", self.p90_gold));
        report.push_str(&format!("  Avg Shards:          {:.1}\n", self.avg_shard));
        report.push_str(&format!("  Avg Stones:          {:.1}\n", self.avg_stone));
        report.push_str(&format!(
            "  Avg Weapons Used:    {:.2}\n\n",
            self.avg_weapons_consumed
        ));

        report.push_str("── OUTCOMES ─────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Successes:           {}\n", self.total_successes));
        report.push_str(&format!("  Failures:            {}\n", self.total_failures));
        report.push_str(&format!("  Downgrades:          {}\n", self.total_downgrades));
        report.push_str(&format!("  Resets:              {}\n", self.total_resets));
        report.push_str(&format!(
            "  Resets Prevented:    {}\n",
            self.total_resets_prevented
        ));

        report
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

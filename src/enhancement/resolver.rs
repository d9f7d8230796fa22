//! Outcome resolution for probabilistic attempts.

use super::types::{MaterialCosts, OutcomeCategory, ProtectionOptions};
use crate::data::ProbabilisticCostRecord;
use rand::Rng;

/// Probability mass per outcome category after protections are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    pub success: f64,
    pub failure: f64,
    pub downgrade: f64,
    pub reset: f64,
}

impl Distribution {
    pub fn from_record(record: &ProbabilisticCostRecord) -> Self {
        Self {
            success: record.success,
            failure: record.failure,
            downgrade: record.downgrade,
            reset: record.reset,
        }
    }

    pub fn total(&self) -> f64 {
        self.success + self.failure + self.downgrade + self.reset
    }

    /// Halve success; the other half of success and all downgrade mass become failure.
    pub fn with_downgrade_protection(self) -> Self {
        let half_success = self.success / 2.0;
        Self {
            success: half_success,
            failure: self.failure + self.downgrade + half_success,
            downgrade: 0.0,
            reset: self.reset,
        }
    }
}

/// Drop protection flags the record cannot honour.
pub fn effective_options(
    record: &ProbabilisticCostRecord,
    requested: ProtectionOptions,
) -> ProtectionOptions {
    ProtectionOptions {
        downgrade: requested.downgrade && record.supports_downgrade_protection(),
        reset: requested.reset && record.supports_reset_protection(),
    }
}

/// Distribution the next draw will use. Also what a front end should display.
pub fn adjusted_distribution(
    record: &ProbabilisticCostRecord,
    options: ProtectionOptions,
) -> Distribution {
    let base = Distribution::from_record(record);
    if effective_options(record, options).downgrade {
        base.with_downgrade_protection()
    } else {
        base
    }
}

/// Map a draw in [0, 1) to a category.
///
/// Mass accumulates success, failure, downgrade, reset; the first bound
/// exceeding `draw` wins. Anything past the first three bounds is a reset,
/// which also absorbs rounding in tables that do not sum to exactly 1.0.
pub fn sample_category(distribution: &Distribution, draw: f64) -> OutcomeCategory {
    let mut cumulative = distribution.success;
    if draw < cumulative {
        return OutcomeCategory::Success;
    }
    cumulative += distribution.failure;
    if draw < cumulative {
        return OutcomeCategory::Failure;
    }
    cumulative += distribution.downgrade;
    if draw < cumulative {
        return OutcomeCategory::Downgrade;
    }
    OutcomeCategory::Reset
}

/// Level movement caused by a resolved outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelChange {
    Up,
    Stay,
    Down,
    ToZero,
}

impl LevelChange {
    pub fn apply(self, level: u32) -> u32 {
        match self {
            LevelChange::Up => level + 1,
            LevelChange::Stay => level,
            LevelChange::Down => level.saturating_sub(1),
            LevelChange::ToZero => 0,
        }
    }
}

/// A resolved probabilistic attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub category: OutcomeCategory,
    pub change: LevelChange,
    pub costs: MaterialCosts,
    /// True when reset protection converted a reset and a weapon copy was spent.
    pub reset_prevented: bool,
}

/// Resolve an attempt against a known draw.
pub fn resolve_with_draw(
    record: &ProbabilisticCostRecord,
    requested: ProtectionOptions,
    draw: f64,
) -> Resolution {
    let options = effective_options(record, requested);
    let distribution = adjusted_distribution(record, options);

    let mut costs = record.costs();
    if options.downgrade {
        costs.add_gold(record.downgrade_protection_cost);
    }

    let category = sample_category(&distribution, draw);
    let (change, reset_prevented) = match category {
        OutcomeCategory::Success => (LevelChange::Up, false),
        OutcomeCategory::Failure => (LevelChange::Stay, false),
        OutcomeCategory::Downgrade => (LevelChange::Down, false),
        OutcomeCategory::Reset if options.reset => {
            costs.add_gold(record.reset_protection_cost);
            (LevelChange::Stay, true)
        }
        OutcomeCategory::Reset => (LevelChange::ToZero, false),
    };

    Resolution {
        category,
        change,
        costs,
        reset_prevented,
    }
}

/// Resolve an attempt with a fresh uniform draw from `rng`.
pub fn resolve<R: Rng + ?Sized>(
    record: &ProbabilisticCostRecord,
    requested: ProtectionOptions,
    rng: &mut R,
) -> Resolution {
    let draw: f64 = rng.gen();
    resolve_with_draw(record, requested, draw)
}

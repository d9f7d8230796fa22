use super::types::ProtectionOptions;
use crate::data::{CostTables, ProbabilisticCostRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Settings for one autoplay run. Read-only once the run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoplayStrategy {
    pub target_level: u32,
    /// Levels where the guaranteed path is taken even if a probabilistic one exists.
    pub guaranteed_levels: BTreeSet<u32>,
    pub downgrade_protect_levels: BTreeSet<u32>,
    pub reset_protect_levels: BTreeSet<u32>,
}

impl AutoplayStrategy {
    pub fn new(target_level: u32) -> Self {
        Self {
            target_level,
            ..Default::default()
        }
    }

    pub fn prefers_guaranteed(&self, level: u32) -> bool {
        self.guaranteed_levels.contains(&level)
    }

    /// Protections for a probabilistic attempt at `level`, limited to what
    /// `record` supports.
    pub fn protections_for(&self, level: u32, record: &ProbabilisticCostRecord) -> ProtectionOptions {
        ProtectionOptions {
            downgrade: self.downgrade_protect_levels.contains(&level)
                && record.supports_downgrade_protection(),
            reset: self.reset_protect_levels.contains(&level) && record.supports_reset_protection(),
        }
    }
}

/// A set of levels as written by a user: `all`, or a comma separated list
/// such as `3,4,+5`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LevelSelection {
    #[default]
    Nothing,
    Everywhere,
    Levels(Vec<u32>),
}

impl FromStr for LevelSelection {
    type Err = std::num::ParseIntError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("all") {
            return Ok(LevelSelection::Everywhere);
        }
        if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
            return Ok(LevelSelection::Nothing);
        }
        raw.split(',')
            .map(|s| s.trim().trim_start_matches('+').parse())
            .collect::<Result<_, _>>()
            .map(LevelSelection::Levels)
    }
}

/// Builds an [`AutoplayStrategy`] for one grade, only accepting levels the
/// cost tables can honour.
pub struct StrategyBuilder<'a> {
    tables: &'a CostTables,
    grade: String,
    strategy: AutoplayStrategy,
}

impl<'a> StrategyBuilder<'a> {
    /// Starts with the target at the grade's maximum level and nothing selected.
    pub fn new(tables: &'a CostTables, grade: &str) -> Self {
        Self {
            tables,
            grade: grade.to_string(),
            strategy: AutoplayStrategy::new(tables.max_level(grade)),
        }
    }

    /// Target level, clamped into 1..=max level.
    pub fn target(mut self, level: u32) -> Self {
        let max = self.tables.max_level(&self.grade);
        self.strategy.target_level = level.clamp(1.min(max), max);
        self
    }

    pub fn prefer_guaranteed<I: IntoIterator<Item = u32>>(mut self, levels: I) -> Self {
        let available = self.tables.guaranteed_levels(&self.grade);
        self.strategy
            .guaranteed_levels
            .extend(levels.into_iter().filter(|l| available.contains(l)));
        self
    }

    pub fn protect_downgrade<I: IntoIterator<Item = u32>>(mut self, levels: I) -> Self {
        let available = self.tables.protectable_levels(&self.grade).downgrade;
        self.strategy
            .downgrade_protect_levels
            .extend(levels.into_iter().filter(|l| available.contains(l)));
        self
    }

    pub fn protect_reset<I: IntoIterator<Item = u32>>(mut self, levels: I) -> Self {
        let available = self.tables.protectable_levels(&self.grade).reset;
        self.strategy
            .reset_protect_levels
            .extend(levels.into_iter().filter(|l| available.contains(l)));
        self
    }

    pub fn prefer_guaranteed_everywhere(mut self) -> Self {
        self.strategy.guaranteed_levels = self.tables.guaranteed_levels(&self.grade);
        self
    }

    pub fn protect_downgrade_everywhere(mut self) -> Self {
        self.strategy.downgrade_protect_levels = self.tables.protectable_levels(&self.grade).downgrade;
        self
    }

    pub fn protect_reset_everywhere(mut self) -> Self {
        self.strategy.reset_protect_levels = self.tables.protectable_levels(&self.grade).reset;
        self
    }

    pub fn guaranteed(self, selection: &LevelSelection) -> Self {
        match selection {
            LevelSelection::Nothing => self,
            LevelSelection::Everywhere => self.prefer_guaranteed_everywhere(),
            LevelSelection::Levels(l) => self.prefer_guaranteed(l.iter().copied()),
        }
    }

    pub fn downgrade_protection(self, selection: &LevelSelection) -> Self {
        match selection {
            LevelSelection::Nothing => self,
            LevelSelection::Everywhere => self.protect_downgrade_everywhere(),
            LevelSelection::Levels(l) => self.protect_downgrade(l.iter().copied()),
        }
    }

    pub fn reset_protection(self, selection: &LevelSelection) -> Self {
        match selection {
            LevelSelection::Nothing => self,
            LevelSelection::Everywhere => self.protect_reset_everywhere(),
            LevelSelection::Levels(l) => self.protect_reset(l.iter().copied()),
        }
    }

    pub fn build(self) -> AutoplayStrategy {
        self.strategy
    }
}

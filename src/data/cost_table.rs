//! Enhancement cost tables and lookup by (grade, level).

use super::numeric::{loose_f64, loose_level, loose_u64};
use crate::enhancement::types::MaterialCosts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the guaranteed-upgrade table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementCostRecord {
    #[serde(alias = "등급", default)]
    pub grade: String,
    #[serde(alias = "강화 차수", deserialize_with = "loose_level", default)]
    pub level: u32,
    #[serde(alias = "골드", deserialize_with = "loose_u64", default)]
    pub gold: u64,
    #[serde(alias = "무형의 파편", deserialize_with = "loose_u64", default)]
    pub shard: u64,
    #[serde(alias = "정교한 강화석", deserialize_with = "loose_u64", default)]
    pub stone: u64,
}

impl EnhancementCostRecord {
    pub fn costs(&self) -> MaterialCosts {
        MaterialCosts::new(self.gold, self.shard, self.stone)
    }
}

/// One row of the probabilistic-upgrade table.
///
/// The four probabilities are expected to sum to 1.0 before any protection
/// adjustment. Surcharges are extra gold paid when the matching protection
/// is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilisticCostRecord {
    #[serde(alias = "등급", default)]
    pub grade: String,
    #[serde(alias = "강화 차수", deserialize_with = "loose_level", default)]
    pub level: u32,
    #[serde(alias = "성공 확률", deserialize_with = "loose_f64", default)]
    pub success: f64,
    #[serde(alias = "실패 확률", deserialize_with = "loose_f64", default)]
    pub failure: f64,
    #[serde(alias = "하락 확률", deserialize_with = "loose_f64", default)]
    pub downgrade: f64,
    #[serde(alias = "리셋 확률", deserialize_with = "loose_f64", default)]
    pub reset: f64,
    #[serde(alias = "골드", deserialize_with = "loose_u64", default)]
    pub gold: u64,
    #[serde(alias = "무형의 파편", deserialize_with = "loose_u64", default)]
    pub shard: u64,
    #[serde(alias = "정교한 강화석", deserialize_with = "loose_u64", default)]
    pub stone: u64,
    #[serde(alias = "하락 방지 비용", deserialize_with = "loose_u64", default)]
    pub downgrade_protection_cost: u64,
    #[serde(alias = "리셋 방지 비용", deserialize_with = "loose_u64", default)]
    pub reset_protection_cost: u64,
}

impl ProbabilisticCostRecord {
    pub fn costs(&self) -> MaterialCosts {
        MaterialCosts::new(self.gold, self.shard, self.stone)
    }

    pub fn supports_downgrade_protection(&self) -> bool {
        self.downgrade > 0.0
    }

    pub fn supports_reset_protection(&self) -> bool {
        self.reset > 0.0
    }
}

/// Records available for a single enhancement step.
///
/// Both absent means no further enhancement is possible from the level below.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhancementInfo<'a> {
    pub guaranteed: Option<&'a EnhancementCostRecord>,
    pub probabilistic: Option<&'a ProbabilisticCostRecord>,
}

impl EnhancementInfo<'_> {
    pub fn is_terminal(&self) -> bool {
        self.guaranteed.is_none() && self.probabilistic.is_none()
    }
}

/// Levels at which each protection can be requested for a grade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectableLevels {
    pub downgrade: BTreeSet<u32>,
    pub reset: BTreeSet<u32>,
}

/// The two externally supplied cost tables.
#[derive(Debug, Clone, Default)]
pub struct CostTables {
    pub guaranteed: Vec<EnhancementCostRecord>,
    pub probabilistic: Vec<ProbabilisticCostRecord>,
}

impl CostTables {
    pub fn new(
        guaranteed: Vec<EnhancementCostRecord>,
        probabilistic: Vec<ProbabilisticCostRecord>,
    ) -> Self {
        Self {
            guaranteed,
            probabilistic,
        }
    }

    /// Resolve the records for upgrading a `grade` weapon to `level`.
    /// The first matching row of each table wins.
    pub fn lookup(&self, grade: &str, level: u32) -> EnhancementInfo<'_> {
        EnhancementInfo {
            guaranteed: self
                .guaranteed
                .iter()
                .find(|r| r.grade == grade && r.level == level),
            probabilistic: self
                .probabilistic
                .iter()
                .find(|r| r.grade == grade && r.level == level),
        }
    }

    /// Highest level present in either table for `grade`, 0 if none.
    pub fn max_level(&self, grade: &str) -> u32 {
        let guaranteed = self
            .guaranteed
            .iter()
            .filter(|r| r.grade == grade)
            .map(|r| r.level);
        let probabilistic = self
            .probabilistic
            .iter()
            .filter(|r| r.grade == grade)
            .map(|r| r.level);
        guaranteed.chain(probabilistic).max().unwrap_or(0)
    }

    pub fn guaranteed_levels(&self, grade: &str) -> BTreeSet<u32> {
        self.guaranteed
            .iter()
            .filter(|r| r.grade == grade)
            .map(|r| r.level)
            .collect()
    }

    pub fn protectable_levels(&self, grade: &str) -> ProtectableLevels {
        let mut levels = ProtectableLevels::default();
        for record in self.probabilistic.iter().filter(|r| r.grade == grade) {
            if record.supports_downgrade_protection() {
                levels.downgrade.insert(record.level);
            }
            if record.supports_reset_protection() {
                levels.reset.insert(record.level);
            }
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guaranteed(grade: &str, level: u32, gold: u64) -> EnhancementCostRecord {
        EnhancementCostRecord {
            grade: grade.to_string(),
            level,
            gold,
            shard: 0,
            stone: 0,
        }
    }

    fn probabilistic(grade: &str, level: u32, downgrade: f64, reset: f64) -> ProbabilisticCostRecord {
        ProbabilisticCostRecord {
            grade: grade.to_string(),
            level,
            success: 1.0 - downgrade - reset,
            failure: 0.0,
            downgrade,
            reset,
            gold: 10,
            shard: 0,
            stone: 0,
            downgrade_protection_cost: 0,
            reset_protection_cost: 0,
        }
    }

    fn tables() -> CostTables {
        CostTables::new(
            vec![guaranteed("Rare", 1, 100), guaranteed("Rare", 2, 200), guaranteed("Epic", 1, 500)],
            vec![
                probabilistic("Rare", 2, 0.0, 0.0),
                probabilistic("Rare", 3, 0.2, 0.0),
                probabilistic("Rare", 4, 0.2, 0.1),
            ],
        )
    }

    #[test]
    fn test_lookup_both_one_or_neither() {
        let t = tables();
        let info = t.lookup("Rare", 1);
        assert!(info.guaranteed.is_some());
        assert!(info.probabilistic.is_none());

        let info = t.lookup("Rare", 2);
        assert!(info.guaranteed.is_some());
        assert!(info.probabilistic.is_some());

        let info = t.lookup("Rare", 5);
        assert!(info.is_terminal());
    }

    #[test]
    fn test_lookup_matches_grade_exactly() {
        let t = tables();
        assert_eq!(t.lookup("Epic", 1).guaranteed.map(|r| r.gold), Some(500));
        assert!(t.lookup("rare", 1).is_terminal());
    }

    #[test]
    fn test_zero_cost_record_is_still_present() {
        let t = CostTables::new(vec![guaranteed("Common", 1, 0)], vec![]);
        assert!(!t.lookup("Common", 1).is_terminal());
    }

    #[test]
    fn test_max_level_spans_both_tables() {
        let t = tables();
        assert_eq!(t.max_level("Rare"), 4);
        assert_eq!(t.max_level("Epic"), 1);
        assert_eq!(t.max_level("Mythic"), 0);
    }

    #[test]
    fn test_guaranteed_and_protectable_levels() {
        let t = tables();
        assert_eq!(t.guaranteed_levels("Rare"), BTreeSet::from([1, 2]));

        let p = t.protectable_levels("Rare");
        assert_eq!(p.downgrade, BTreeSet::from([3, 4]));
        assert_eq!(p.reset, BTreeSet::from([4]));
    }

    #[test]
    fn test_deserialize_spreadsheet_headers() {
        let json = r#"{
            "등급": "전설", "강화 차수": "5",
            "성공 확률": "0.5", "실패 확률": 0.2, "하락 확률": 0.2, "리셋 확률": 0.1,
            "골드": "1,000", "하락 방지 비용": "2,500", "리셋 방지 비용": ""
        }"#;
        let record: ProbabilisticCostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.grade, "전설");
        assert_eq!(record.level, 5);
        assert_eq!(record.gold, 1000);
        assert_eq!(record.downgrade_protection_cost, 2500);
        assert_eq!(record.reset_protection_cost, 0);
        assert_eq!(record.shard, 0);
    }
}

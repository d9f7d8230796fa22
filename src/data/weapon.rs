//! Weapon reference rows and their grouping into families.

use super::numeric::loose_level;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of weapon stats at a specific enhancement level.
///
/// Only the identifying columns matter to the simulator; any other columns
/// in the source row are ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponVariant {
    #[serde(alias = "이름")]
    pub name: String,
    #[serde(alias = "등급", default)]
    pub grade: String,
    #[serde(alias = "강화 차수", deserialize_with = "loose_level", default)]
    pub level: u32,
}

/// All variants of one weapon, sorted by increasing enhancement level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponFamily {
    variants: Vec<WeaponVariant>,
}

impl WeaponFamily {
    /// Build a family from its variants. Returns `None` for an empty list.
    pub fn new(mut variants: Vec<WeaponVariant>) -> Option<Self> {
        if variants.is_empty() {
            return None;
        }
        variants.sort_by_key(|v| v.level);
        Some(Self { variants })
    }

    /// The level 0 variant, or the lowest level present.
    pub fn base(&self) -> &WeaponVariant {
        self.variants
            .iter()
            .find(|v| v.level == 0)
            .unwrap_or(&self.variants[0])
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    /// Grade of the base variant; this is the key into the cost tables.
    pub fn grade(&self) -> &str {
        &self.base().grade
    }

    pub fn variants(&self) -> &[WeaponVariant] {
        &self.variants
    }
}

/// Group variant rows by name. Rows without a name are dropped.
pub fn group_families(variants: &[WeaponVariant]) -> Vec<WeaponFamily> {
    let mut by_name: BTreeMap<&str, Vec<WeaponVariant>> = BTreeMap::new();
    for variant in variants.iter().filter(|v| !v.name.trim().is_empty()) {
        by_name
            .entry(variant.name.as_str())
            .or_default()
            .push(variant.clone());
    }
    by_name.into_values().filter_map(WeaponFamily::new).collect()
}

/// Which weapons the simulator offers for selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionFilter {
    /// Grades in display order. Empty means every grade is allowed.
    pub allowed_grades: Vec<String>,
    pub excluded_weapons: Vec<String>,
}

impl SelectionFilter {
    pub fn allows(&self, family: &WeaponFamily) -> bool {
        let grade_ok = self.allowed_grades.is_empty()
            || self.allowed_grades.iter().any(|g| g == family.grade());
        grade_ok && !self.excluded_weapons.iter().any(|w| w == family.name())
    }

    /// Families that pass the filter, ordered by allowed grade then name.
    pub fn select<'a>(&self, families: &'a [WeaponFamily]) -> Vec<&'a WeaponFamily> {
        let mut selected: Vec<&WeaponFamily> =
            families.iter().filter(|f| self.allows(f)).collect();
        selected.sort_by_key(|f| {
            let rank = self
                .allowed_grades
                .iter()
                .position(|g| g == f.grade())
                .unwrap_or(self.allowed_grades.len());
            (rank, f.name().to_string())
        });
        selected
    }

    /// Look up a family by name, only if the filter offers it.
    pub fn find<'a>(&self, families: &'a [WeaponFamily], name: &str) -> Option<&'a WeaponFamily> {
        find_family(families, name).filter(|f| self.allows(f))
    }
}

/// Case-sensitive lookup of a family by name.
pub fn find_family<'a>(families: &'a [WeaponFamily], name: &str) -> Option<&'a WeaponFamily> {
    families.iter().find(|f| f.name() == name)
}

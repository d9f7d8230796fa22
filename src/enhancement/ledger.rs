use super::types::{EnhancementResult, Material};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Running totals of materials spent and weapons sacrificed.
///
/// Persisted after every change; see [`super::persistence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default = "zeroed_materials", deserialize_with = "known_materials")]
    pub materials: BTreeMap<Material, u64>,
    #[serde(default)]
    pub consumed_weapons: BTreeMap<String, u32>,
}

fn zeroed_materials() -> BTreeMap<Material, u64> {
    Material::ALL.into_iter().map(|m| (m, 0)).collect()
}

/// Material totals keyed by name. Keys this build does not know are dropped
/// so one stray entry cannot invalidate the rest.
fn known_materials<'de, D>(deserializer: D) -> Result<BTreeMap<Material, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, u64>::deserialize(deserializer)?;
    let mut materials = zeroed_materials();
    for (key, amount) in raw {
        match Material::from_key(&key) {
            Some(material) => {
                materials.insert(material, amount);
            }
            None => tracing::warn!(material = %key, amount, "ignoring unknown material in ledger"),
        }
    }
    Ok(materials)
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Every known material at 0, nothing consumed.
    pub fn new() -> Self {
        Self {
            materials: zeroed_materials(),
            consumed_weapons: BTreeMap::new(),
        }
    }

    /// Ledger with `result` booked. `self` is left untouched.
    pub fn apply(&self, result: &EnhancementResult) -> Ledger {
        let mut next = self.clone();
        for (material, amount) in result.costs.iter().filter(|(_, amount)| *amount > 0) {
            let total = next.materials.entry(material).or_insert(0);
            *total = total.saturating_add(amount);
        }
        if let Some(name) = &result.consumed_weapon {
            *next.consumed_weapons.entry(name.clone()).or_insert(0) += 1;
        }
        next
    }

    pub fn spent(&self, material: Material) -> u64 {
        self.materials.get(&material).copied().unwrap_or(0)
    }

    pub fn consumed(&self, weapon: &str) -> u32 {
        self.consumed_weapons.get(weapon).copied().unwrap_or(0)
    }

    pub fn has_spending(&self) -> bool {
        self.materials.values().any(|v| *v > 0)
    }

    pub fn has_consumed_weapons(&self) -> bool {
        self.consumed_weapons.values().any(|v| *v > 0)
    }

    /// True when no total in `self` is lower than in `earlier`.
    pub fn dominates(&self, earlier: &Ledger) -> bool {
        let materials_ok = earlier
            .materials
            .iter()
            .all(|(m, v)| self.materials.get(m).copied().unwrap_or(0) >= *v);
        let weapons_ok = earlier
            .consumed_weapons
            .iter()
            .all(|(w, c)| self.consumed(w) >= *c);
        materials_ok && weapons_ok
    }
}

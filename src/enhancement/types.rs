use serde::{Deserialize, Serialize};
use std::fmt;

/// Most recent attempts kept in the history feed.
pub const HISTORY_CAPACITY: usize = 20;

/// Pause between autoplay steps, in milliseconds.
pub const AUTOPLAY_STEP_DELAY_MS: u64 = 50;

/// Key under which the ledger is persisted.
pub const LEDGER_STORAGE_KEY: &str = "enhancement_ledger";

/// Where an unreadable stored ledger is copied before it is replaced.
pub const LEDGER_BACKUP_KEY: &str = "enhancement_ledger.bak";

/// Materials consumed by enhancement attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Gold,
    Shard,
    Stone,
}

impl Material {
    pub const ALL: [Material; 3] = [Material::Gold, Material::Shard, Material::Stone];

    /// Inverse of the serialized key (`"gold"`, `"shard"`, `"stone"`).
    pub fn from_key(key: &str) -> Option<Material> {
        match key {
            "gold" => Some(Material::Gold),
            "shard" => Some(Material::Shard),
            "stone" => Some(Material::Stone),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Material::Gold => "Gold",
            Material::Shard => "Formless Shard",
            Material::Stone => "Refined Stone",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Material cost of a single attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCosts {
    pub gold: u64,
    pub shard: u64,
    pub stone: u64,
}

impl MaterialCosts {
    pub fn new(gold: u64, shard: u64, stone: u64) -> Self {
        Self { gold, shard, stone }
    }

    pub fn get(&self, material: Material) -> u64 {
        match material {
            Material::Gold => self.gold,
            Material::Shard => self.shard,
            Material::Stone => self.stone,
        }
    }

    /// Pairs of (material, amount) in a fixed order, zero amounts included.
    pub fn iter(&self) -> impl Iterator<Item = (Material, u64)> + '_ {
        Material::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    pub fn add_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }
}

/// Which upgrade path an attempt takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptKind {
    Guaranteed,
    Probabilistic,
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptKind::Guaranteed => f.write_str("guaranteed"),
            AttemptKind::Probabilistic => f.write_str("probabilistic"),
        }
    }
}

/// Protections for a probabilistic attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionOptions {
    pub downgrade: bool,
    pub reset: bool,
}

impl ProtectionOptions {
    pub const NONE: ProtectionOptions = ProtectionOptions {
        downgrade: false,
        reset: false,
    };

    pub fn downgrade() -> Self {
        Self {
            downgrade: true,
            reset: false,
        }
    }

    pub fn reset() -> Self {
        Self {
            downgrade: false,
            reset: true,
        }
    }

    pub fn both() -> Self {
        Self {
            downgrade: true,
            reset: true,
        }
    }
}

/// The four mutually exclusive results of a probabilistic draw, in sampling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeCategory {
    Success,
    Failure,
    Downgrade,
    Reset,
}

/// What an attempt did to the weapon, as shown in the history feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    GuaranteedSuccess,
    Success,
    Failure,
    Downgrade,
    Reset,
    ResetPrevented,
}

/// Display styling for history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    Success,
    Failure,
    Downgrade,
    Reset,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::GuaranteedSuccess => "success (guaranteed)",
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Downgrade => "downgrade",
            Outcome::Reset => "reset",
            Outcome::ResetPrevented => "reset (prevented)",
        }
    }

    /// A prevented reset is styled like a failure.
    pub fn class(self) -> OutcomeClass {
        match self {
            Outcome::GuaranteedSuccess | Outcome::Success => OutcomeClass::Success,
            Outcome::Failure | Outcome::ResetPrevented => OutcomeClass::Failure,
            Outcome::Downgrade => OutcomeClass::Downgrade,
            Outcome::Reset => OutcomeClass::Reset,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The transition produced by one attempt. Nothing is applied yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementResult {
    pub kind: AttemptKind,
    pub from_level: u32,
    pub new_level: u32,
    pub outcome: Outcome,
    pub costs: MaterialCosts,
    /// Set when reset protection sacrificed a copy of the weapon.
    pub consumed_weapon: Option<String>,
}

impl EnhancementResult {
    /// History line, e.g. `[+4 → +5] success`.
    pub fn message(&self) -> String {
        format!(
            "[+{} → +{}] {}",
            self.from_level, self.new_level, self.outcome
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classes() {
        assert_eq!(Outcome::GuaranteedSuccess.class(), OutcomeClass::Success);
        assert_eq!(Outcome::Success.class(), OutcomeClass::Success);
        assert_eq!(Outcome::Failure.class(), OutcomeClass::Failure);
        assert_eq!(Outcome::ResetPrevented.class(), OutcomeClass::Failure);
        assert_eq!(Outcome::Downgrade.class(), OutcomeClass::Downgrade);
        assert_eq!(Outcome::Reset.class(), OutcomeClass::Reset);
    }

    #[test]
    fn test_material_keys_match_serialization() {
        for material in Material::ALL {
            let key = serde_json::to_value(material).unwrap();
            assert_eq!(Material::from_key(key.as_str().unwrap()), Some(material));
        }
        assert_eq!(Material::from_key("crystal"), None);
    }
}

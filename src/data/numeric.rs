//! Normalization of loosely formatted numeric fields.
//!
//! Spreadsheet exports carry numbers as plain numbers, as strings with
//! thousands separators ("1,200"), or as empty cells. Everything is folded
//! into native numbers here so the rest of the crate never sees strings.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Parse a loosely formatted number. Commas are stripped; anything that still
/// fails to parse (or is not finite) becomes 0.
pub fn parse_num(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Cell contents as they appear in exported rows.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Number(f64),
    Text(String),
    Null(()),
    /// Booleans, arrays, objects: nothing numeric to recover.
    Other(IgnoredAny),
}

impl LooseValue {
    fn as_f64(&self) -> f64 {
        match self {
            LooseValue::Number(n) if n.is_finite() => *n,
            LooseValue::Number(_) => 0.0,
            LooseValue::Text(s) => parse_num(s),
            LooseValue::Null(()) | LooseValue::Other(_) => 0.0,
        }
    }
}

/// Serde adapter for probability-like fields.
pub fn loose_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LooseValue::deserialize(deserializer)?.as_f64())
}

/// Serde adapter for material costs. Negative or fractional values are
/// clamped/truncated; costs are whole units.
pub fn loose_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = LooseValue::deserialize(deserializer)?.as_f64();
    Ok(if v <= 0.0 { 0 } else { v as u64 })
}

/// Serde adapter for enhancement levels.
pub fn loose_level<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = LooseValue::deserialize(deserializer)?.as_f64();
    Ok(if v <= 0.0 { 0 } else { v as u32 })
}

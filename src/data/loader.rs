//! Loads weapon and cost data exported as JSON.

use super::cost_table::{CostTables, EnhancementCostRecord, ProbabilisticCostRecord};
use super::weapon::{group_families, WeaponFamily, WeaponVariant};
use crate::error::DataError;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const WEAPONS_FILE: &str = "weapons.json";
pub const GUARANTEED_COSTS_FILE: &str = "guaranteed_costs.json";
pub const PROBABILISTIC_COSTS_FILE: &str = "probabilistic_costs.json";

/// Everything the simulator needs from the data directory.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub families: Vec<WeaponFamily>,
    pub tables: CostTables,
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let json = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_cost_tables(dir: &Path) -> Result<CostTables, DataError> {
    let guaranteed: Vec<EnhancementCostRecord> = read_rows(&dir.join(GUARANTEED_COSTS_FILE))?;
    let probabilistic: Vec<ProbabilisticCostRecord> =
        read_rows(&dir.join(PROBABILISTIC_COSTS_FILE))?;
    tracing::debug!(
        guaranteed = guaranteed.len(),
        probabilistic = probabilistic.len(),
        "loaded cost tables"
    );
    Ok(CostTables::new(guaranteed, probabilistic))
}

pub fn load_families(dir: &Path) -> Result<Vec<WeaponFamily>, DataError> {
    let variants: Vec<WeaponVariant> = read_rows(&dir.join(WEAPONS_FILE))?;
    let families = group_families(&variants);
    tracing::debug!(
        rows = variants.len(),
        families = families.len(),
        "loaded weapon data"
    );
    Ok(families)
}

pub fn load_catalog(dir: &Path) -> Result<Catalog, DataError> {
    Ok(Catalog {
        families: load_families(dir)?,
        tables: load_cost_tables(dir)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_catalog_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(WEAPONS_FILE),
            r#"[{"name":"Spear","grade":"Rare","level":"0","damage":"1,000"},
                {"name":"Spear","grade":"Rare","level":1}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(GUARANTEED_COSTS_FILE),
            r#"[{"grade":"Rare","level":1,"gold":"1,500"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(PROBABILISTIC_COSTS_FILE),
            r#"[{"grade":"Rare","level":2,"success":0.6,"failure":0.4,"gold":900}]"#,
        )
        .unwrap();

        let catalog = load_catalog(dir.path()).unwrap();
        assert_eq!(catalog.families.len(), 1);
        assert_eq!(catalog.families[0].variants().len(), 2);
        assert_eq!(catalog.tables.lookup("Rare", 1).guaranteed.unwrap().gold, 1500);
        assert_eq!(catalog.tables.max_level("Rare"), 2);
    }

    #[test]
    fn test_malformed_rows_are_absorbed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(GUARANTEED_COSTS_FILE),
            r#"[{"grade":"Rare","level":1,"gold":"1,500"},
                {"grade":"Rare","gold":"10"},
                {"level":2,"gold":true,"shard":{"n":1}}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(PROBABILISTIC_COSTS_FILE),
            r#"[{"grade":"Rare","success":false},
                {"grade":"Rare","level":2,"success":"0.5","failure":null,"gold":[1]}]"#,
        )
        .unwrap();

        let tables = load_cost_tables(dir.path()).unwrap();
        assert_eq!(tables.guaranteed.len(), 3);
        assert_eq!(tables.probabilistic.len(), 2);

        // A level-less row lands on +0, which no attempt ever targets.
        assert_eq!(tables.guaranteed[1].level, 0);
        assert_eq!(tables.lookup("Rare", 1).guaranteed.unwrap().gold, 1500);

        let grade_less = &tables.guaranteed[2];
        assert_eq!(grade_less.grade, "");
        assert_eq!((grade_less.gold, grade_less.shard), (0, 0));

        let record = tables.lookup("Rare", 2).probabilistic.unwrap();
        assert_eq!(record.success, 0.5);
        assert_eq!(record.failure, 0.0);
        assert_eq!(record.gold, 0);
        assert_eq!(tables.max_level("Rare"), 2);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_cost_tables(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert!(err.to_string().contains(GUARANTEED_COSTS_FILE));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(WEAPONS_FILE), "{not json").unwrap();
        let err = load_families(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::Json { .. }));
    }
}

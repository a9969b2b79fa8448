use std::fs;
use std::path::Path;

use tracing::info;

use crate::catalog::FoodCatalog;
use crate::error::Result;
use crate::models::{CustomMealShare, DayPlan, FoodItem};
use crate::planner::SolverPolicy;

/// Load and validate a catalog from a JSON array of food records.
///
/// Deduplicates by id (last record wins, first position kept).
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<FoodCatalog> {
    let content = fs::read_to_string(path.as_ref())?;
    let foods: Vec<FoodItem> = serde_json::from_str(&content)?;
    let catalog = FoodCatalog::new(foods);
    info!("Loaded {} foods from {}", catalog.len(), path.as_ref().display());
    Ok(catalog)
}

/// Save catalog foods as a JSON array.
pub fn save_catalog<P: AsRef<Path>>(path: P, catalog: &FoodCatalog) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog.foods())?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_custom_shares<P: AsRef<Path>>(path: P) -> Result<Vec<CustomMealShare>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a solver policy; fields absent from the file keep their defaults.
pub fn load_policy<P: AsRef<Path>>(path: P) -> Result<SolverPolicy> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_policy<P: AsRef<Path>>(path: P, policy: &SolverPolicy) -> Result<()> {
    let json = serde_json::to_string_pretty(policy)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn save_day_plan<P: AsRef<Path>>(path: P, plan: &DayPlan) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG: &str = r#"[
        {"id": "egg", "name": "Egg", "calories": 143, "protein": 12.6, "carbs": 0.7, "fat": 9.5,
         "category": "protein", "archetype": "egg", "measurement_unit": "egg", "unit_grams": 50,
         "animal_source": "egg", "meal_types": ["breakfast"]},
        {"id": "banana", "name": "Banana", "calories": 89, "protein": 1.1, "carbs": 22.8, "fat": 0.3,
         "category": "fruit", "archetype": "fruit"},
        {"id": "egg", "name": "Large egg", "calories": 143, "protein": 12.6, "carbs": 0.7, "fat": 9.5,
         "category": "protein", "archetype": "egg", "measurement_unit": "egg", "unit_grams": 60,
         "animal_source": "egg"}
    ]"#;

    fn temp_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_and_save_roundtrip() {
        let file = temp_with(CATALOG);
        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let out = NamedTempFile::new().unwrap();
        save_catalog(out.path(), &catalog).unwrap();
        let reloaded = load_catalog(out.path()).unwrap();
        assert_eq!(reloaded.foods(), catalog.foods());
    }

    #[test]
    fn test_deduplication_last_wins() {
        let file = temp_with(CATALOG);
        let catalog = load_catalog(file.path()).unwrap();
        let egg = catalog.require("egg").unwrap();
        assert_eq!(egg.name(), "Large egg");
        assert_eq!(egg.unit_grams(), Some(60.0));
        assert_eq!(catalog.foods()[0].id(), "egg");
    }

    #[test]
    fn test_invalid_record_fails_load() {
        let file = temp_with(
            r#"[{"id": "bread", "name": "Bread", "calories": 265, "protein": 9, "carbs": 49,
                 "fat": 3.2, "category": "carb", "measurement_unit": "slice"}]"#,
        );
        assert!(load_catalog(file.path()).is_err());
    }

    #[test]
    fn test_policy_roundtrip() {
        let mut policy = SolverPolicy::default();
        policy.tolerance = 3.0;
        let out = NamedTempFile::new().unwrap();
        save_policy(out.path(), &policy).unwrap();
        assert_eq!(load_policy(out.path()).unwrap(), policy);
    }

    #[test]
    fn test_load_custom_shares() {
        let file = temp_with(
            r#"[{"meal_id": "breakfast", "percentage": 40,
                 "macro_ratio": {"protein": 30, "carbs": 40, "fat": 30}},
                {"meal_id": "dinner", "percentage": 60}]"#,
        );
        let shares = load_custom_shares(file.path()).unwrap();
        assert_eq!(shares.len(), 2);
        assert!(shares[0].valid_ratio().is_some());
        assert!(shares[1].macro_ratio.is_none());
    }
}

//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Model;

pub const LATEST_VERSION: u32 = 2;

/// Impact factor key used by version 2 files.
pub const GWP_KEY: &str = "GWP";

pub fn migrate_to_latest(mut model: Model) -> Result<Model, ProjectError> {
    while model.version < LATEST_VERSION {
        model = migrate_one_version(model)?;
    }
    Ok(model)
}

fn migrate_one_version(model: Model) -> Result<Model, ProjectError> {
    match model.version {
        0 => migrate_v0_to_v1(model),
        1 => migrate_v1_to_v2(model),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut model: Model) -> Result<Model, ProjectError> {
    model.version = 1;
    Ok(model)
}

/// Version 1 files spelled the global-warming factor in any case ("gwp",
/// "Gwp"); version 2 normalizes it to `GWP`.
fn migrate_v1_to_v2(mut model: Model) -> Result<Model, ProjectError> {
    for system in &mut model.systems {
        for feed in &mut system.feeds {
            let legacy: Vec<String> = feed
                .characterization_factors
                .keys()
                .filter(|k| k.as_str() != GWP_KEY && k.eq_ignore_ascii_case(GWP_KEY))
                .cloned()
                .collect();
            for key in legacy {
                if let Some(value) = feed.characterization_factors.remove(&key) {
                    feed.characterization_factors
                        .entry(GWP_KEY.to_string())
                        .or_insert(value);
                }
            }
        }
    }

    model.version = 2;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{StreamDef, SystemDef};
    use std::collections::BTreeMap;

    fn v1_model() -> Model {
        let mut factors = BTreeMap::new();
        factors.insert("gwp".to_string(), 0.5);
        Model {
            version: 1,
            name: "legacy".to_string(),
            chemicals: vec!["Water".to_string()],
            systems: vec![SystemDef {
                id: "s".to_string(),
                name: "S".to_string(),
                operating_hours: 8000.0,
                recycle: Default::default(),
                utilities: Default::default(),
                feeds: vec![StreamDef {
                    id: "water".to_string(),
                    price_usd_per_kg: 0.0,
                    mass_kg_per_hr: BTreeMap::new(),
                    characterization_factors: factors,
                }],
                units: vec![],
                product_prices: BTreeMap::new(),
                tea: Default::default(),
            }],
        }
    }

    #[test]
    fn v1_gwp_keys_are_normalized() {
        let migrated = migrate_to_latest(v1_model()).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        let factors = &migrated.systems[0].feeds[0].characterization_factors;
        assert_eq!(factors.get(GWP_KEY), Some(&0.5));
        assert!(!factors.contains_key("gwp"));
    }

    #[test]
    fn latest_version_is_untouched() {
        let mut model = v1_model();
        model.version = LATEST_VERSION;
        let migrated = migrate_to_latest(model.clone()).unwrap();
        assert_eq!(migrated, model);
    }
}

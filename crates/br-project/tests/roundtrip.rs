use br_project::schema::*;
use br_project::{load_json, load_yaml, save_json, save_yaml, validate_model};
use std::collections::BTreeMap;

fn simple_model() -> Model {
    let mut feed_mass = BTreeMap::new();
    feed_mass.insert("Glucose".to_string(), 100.0);
    feed_mass.insert("Water".to_string(), 900.0);

    let mut split = BTreeMap::new();
    split.insert("Glucose".to_string(), 0.9);

    Model {
        version: br_project::LATEST_VERSION,
        name: "Simple".to_string(),
        chemicals: vec!["Water".to_string(), "Glucose".to_string()],
        systems: vec![SystemDef {
            id: "sys1".to_string(),
            name: "Simple System".to_string(),
            operating_hours: 8000.0,
            recycle: RecycleDef::default(),
            utilities: UtilityPricesDef::default(),
            feeds: vec![StreamDef {
                id: "sugar_feed".to_string(),
                price_usd_per_kg: 0.3,
                mass_kg_per_hr: feed_mass,
                characterization_factors: BTreeMap::new(),
            }],
            units: vec![UnitDef {
                id: "S1".to_string(),
                name: "Separator".to_string(),
                ins: vec!["sugar_feed".to_string()],
                outs: vec!["sugar_product".to_string(), "wastewater".to_string()],
                kind: UnitKindDef::Splitter {
                    split,
                    default_split: 0.0,
                },
                heat_utilities: vec![HeatUtilityDef {
                    agent: HeatingAgentDef::Steam,
                    duty_kj_per_kg: 100.0,
                }],
                power_kw_per_kg: 0.01,
                purchase_cost: Some(PurchaseCostDef {
                    base_cost_usd: 1.0e6,
                    base_flow_kg_per_hr: 1000.0,
                    exponent: 0.6,
                    installation_factor: 2.0,
                }),
            }],
            product_prices: BTreeMap::new(),
            tea: TeaDef::default(),
        }],
    }
}

#[test]
fn roundtrip_yaml_simple_model() {
    let model = simple_model();
    validate_model(&model).unwrap();

    let path = std::env::temp_dir().join("br_project_roundtrip_simple.yaml");
    save_yaml(&path, &model).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(model, loaded);
}

#[test]
fn roundtrip_json_simple_model() {
    let model = simple_model();
    let path = std::env::temp_dir().join("br_project_roundtrip_simple.json");
    save_json(&path, &model).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(model, loaded);
}

#[test]
fn tea_irr_uses_uppercase_key() {
    let yaml = serde_yaml::to_string(&TeaDef::default()).unwrap();
    assert!(yaml.contains("IRR:"));
}

use br_project::schema::*;
use br_project::{ValidationError, validate_model};
use std::collections::BTreeMap;

fn base_system(units: Vec<UnitDef>) -> Model {
    let mut mass = BTreeMap::new();
    mass.insert("A".to_string(), 10.0);
    Model {
        version: br_project::LATEST_VERSION,
        name: "m".to_string(),
        chemicals: vec!["A".to_string(), "B".to_string()],
        systems: vec![SystemDef {
            id: "s".to_string(),
            name: "S".to_string(),
            operating_hours: 8000.0,
            recycle: RecycleDef::default(),
            utilities: UtilityPricesDef::default(),
            feeds: vec![StreamDef {
                id: "feed".to_string(),
                price_usd_per_kg: 1.0,
                mass_kg_per_hr: mass,
                characterization_factors: BTreeMap::new(),
            }],
            units,
            product_prices: BTreeMap::new(),
            tea: TeaDef::default(),
        }],
    }
}

fn reactor(products: &[(&str, f64)]) -> UnitDef {
    UnitDef {
        id: "R1".to_string(),
        name: "Reactor".to_string(),
        ins: vec!["feed".to_string()],
        outs: vec!["out".to_string()],
        kind: UnitKindDef::Reactor {
            reactions: vec![ReactionDef {
                reactant: "A".to_string(),
                conversion: 0.5,
                co_reactants: BTreeMap::new(),
                products: products
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
            }],
        },
        heat_utilities: vec![],
        power_kw_per_kg: 0.0,
        purchase_cost: None,
    }
}

#[test]
fn reaction_must_conserve_mass() {
    assert!(validate_model(&base_system(vec![reactor(&[("B", 1.0)])])).is_ok());

    let err = validate_model(&base_system(vec![reactor(&[("B", 0.5)])])).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn unknown_inlet_is_missing_reference() {
    let mut unit = reactor(&[("B", 1.0)]);
    unit.ins = vec!["nowhere".to_string()];
    let err = validate_model(&base_system(vec![unit])).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { .. }));
}

#[test]
fn splitter_needs_two_outlets() {
    let unit = UnitDef {
        id: "S1".to_string(),
        name: "Split".to_string(),
        ins: vec!["feed".to_string()],
        outs: vec!["only".to_string()],
        kind: UnitKindDef::Splitter {
            split: BTreeMap::new(),
            default_split: 0.5,
        },
        heat_utilities: vec![],
        power_kw_per_kg: 0.0,
        purchase_cost: None,
    };
    let err = validate_model(&base_system(vec![unit])).unwrap_err();
    assert!(matches!(err, ValidationError::Topology { .. }));
}

#[test]
fn stream_consumed_twice_is_rejected() {
    let first = reactor(&[("B", 1.0)]);
    let mut second = reactor(&[("B", 1.0)]);
    second.id = "R2".to_string();
    second.outs = vec!["out2".to_string()];
    let err = validate_model(&base_system(vec![first, second])).unwrap_err();
    assert!(matches!(err, ValidationError::Topology { .. }));
}

#[test]
fn construction_schedule_must_sum_to_one() {
    let mut model = base_system(vec![]);
    model.systems[0].tea.construction_schedule = vec![0.5, 0.4];
    assert!(validate_model(&model).is_err());
}

#[test]
fn product_price_must_reference_product() {
    let mut model = base_system(vec![reactor(&[("B", 1.0)])]);
    model.systems[0]
        .product_prices
        .insert("feed".to_string(), 1.0);
    let err = validate_model(&model).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { .. }));
}

#[test]
fn newer_version_is_unsupported() {
    let mut model = base_system(vec![]);
    model.version = br_project::LATEST_VERSION + 1;
    let err = validate_model(&model).unwrap_err();
    assert!(matches!(err, ValidationError::UnsupportedVersion { .. }));
}

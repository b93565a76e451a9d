use std::path::Path;

fn sample_model_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../models/HP/system_light_lle_vacuum_distillation.yaml")
}

#[test]
fn sample_model_loads_and_validates() {
    let path = sample_model_path();
    let model = br_project::load_yaml(&path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));
    br_project::validate_model(&model).unwrap();

    let system = model.preferred_system("HP_sys").unwrap();
    assert_eq!(system.id, "HP_sys");
    assert_eq!(system.feeds.len(), 5);

    let products = system.product_ids();
    assert!(products.contains(&"HP_product"));
    assert!(products.contains(&"treated_water"));
    assert!(!products.contains(&"solvent_recycle"));
}

#[test]
fn sample_model_is_discoverable_from_repo_root() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models");
    let found = br_project::find_file(&root, "system_light_lle_vacuum_distillation.yaml");
    assert!(found.is_some());
}

#[test]
fn preferred_system_falls_back_to_first_declared() {
    let mut model: br_project::schema::Model = serde_yaml::from_str(
        "version: 1\nname: m\nchemicals: []\nsystems:\n  - id: a\n    name: A\n  - id: HP_sys\n    name: HP\n",
    )
    .unwrap();
    assert_eq!(model.preferred_system_index("HP_sys"), Some(1));
    assert_eq!(model.preferred_system("HP_sys").unwrap().id, "HP_sys");
    assert_eq!(model.preferred_system_index("missing"), Some(0));
    assert_eq!(model.preferred_system("missing").unwrap().id, "a");

    model.systems.clear();
    assert_eq!(model.preferred_system_index("HP_sys"), None);
    assert!(model.preferred_system("HP_sys").is_none());
}

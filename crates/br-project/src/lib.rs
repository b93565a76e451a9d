//! br-project: canonical flowsheet model file format, discovery and validation.

pub mod discover;
pub mod migrate;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use discover::find_file;
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_model};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<Model> {
    let content = std::fs::read_to_string(path)?;
    let mut model: Model = serde_yaml::from_str(&content)?;
    model = migrate_to_latest(model)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn save_yaml(path: &Path, model: &Model) -> ProjectResult<()> {
    validate_model(model)?;
    let content = serde_yaml::to_string(model)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Model> {
    let content = std::fs::read_to_string(path)?;
    let mut model: Model = serde_json::from_str(&content)?;
    model = migrate_to_latest(model)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn save_json(path: &Path, model: &Model) -> ProjectResult<()> {
    validate_model(model)?;
    let content = serde_json::to_string_pretty(model)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a model file, choosing the format from the extension (`.json` or YAML).
pub fn load_model(path: &Path) -> ProjectResult<Model> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

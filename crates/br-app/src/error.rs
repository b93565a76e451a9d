//! Error types for the br-app service layer.

use std::path::PathBuf;

/// Application error shared by the CLI and the UI.
///
/// Backend failures keep their original error as `source()` so the
/// presentation layer can print the whole chain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Model file '{file_name}' not found under {}", root.display())]
    ModelNotFound { root: PathBuf, file_name: String },

    #[error("Failed to load model")]
    Project(#[from] br_project::ProjectError),

    #[error("Model validation failed")]
    Validation(#[from] br_project::ValidationError),

    #[error("Simulation failed")]
    Simulation(#[from] br_sim::SimError),

    #[error("Techno-economic analysis failed")]
    Tea(#[from] br_sim::TeaError),

    #[error("No product stream qualifies as the main product (checked {checked} streams)")]
    NoProductFound { checked: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for br-app operations.
pub type AppResult<T> = Result<T, AppError>;

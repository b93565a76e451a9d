//! Error types for flowsheet simulation and TEA.

use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;
pub type TeaResult<T> = Result<T, TeaError>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown chemical '{chemical}' in {context}")]
    UnknownChemical { chemical: String, context: String },

    #[error("Unknown stream '{stream}' in {context}")]
    UnknownStream { stream: String, context: String },

    #[error(
        "Recycle did not converge after {iterations} iterations (residual {residual:.3e}, tolerance {tolerance:.1e})"
    )]
    RecycleNotConverged {
        iterations: usize,
        residual: f64,
        tolerance: f64,
    },

    #[error("Unit '{unit}' failed: {what}")]
    Unit { unit: String, what: String },

    #[error("Numeric error: {0}")]
    Numeric(#[from] br_core::BrError),

    #[error("TEA error: {0}")]
    Tea(#[from] TeaError),
}

#[derive(Error, Debug)]
pub enum TeaError {
    #[error("System has not been simulated; cost basis unavailable")]
    NotSimulated,

    #[error("Stream '{0}' is not a product of this system")]
    NotAProduct(String),

    #[error("Stream '{0}' has no mass flow; its price cannot affect NPV")]
    ZeroFlow(String),

    #[error("No break-even price found for '{stream}' within ±{bound:.3e} USD/kg")]
    PriceNotBracketed { stream: String, bound: f64 },

    #[error("Invalid TEA setting: {what}")]
    InvalidSetting { what: String },
}

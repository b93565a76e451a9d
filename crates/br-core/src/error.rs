use thiserror::Error;

pub type BrResult<T> = Result<T, BrError>;

#[derive(Error, Debug)]
pub enum BrError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Negative value for {what}: {value}")]
    Negative { what: &'static str, value: f64 },
}

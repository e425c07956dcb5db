//! Error types for the ranking engine and its exporters

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FuzzyfolioError>;

#[derive(Error, Debug)]
pub enum FuzzyfolioError {
    #[error("invalid {criterion} weight: {value}")]
    InvalidWeight { criterion: &'static str, value: f64 },

    #[error("unknown model label: {0}")]
    UnknownModel(String),

    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

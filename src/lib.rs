//! Portfolio aggregation and TOPSIS ranking behind the FuzzyFolio dashboard.

pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod logging;
pub mod models;
pub mod report;
pub mod topsis;

pub use error::{FuzzyfolioError, Result};
pub use export::{deserialize, serialize, ExportFormat};
pub use generator::{portfolios, reset_portfolios};
pub use models::{Model, ModelSummary, ScoredPoint, Weights};
pub use topsis::rank;

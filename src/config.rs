//! Dashboard configuration

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyfolioError, Result};
use crate::models::{Model, Weights};

pub const WINDOW_SIZE_RANGE: RangeInclusive<u32> = 5..=60;

/// Settings the dashboard controls produce.
///
/// `window_size`, `alpha_range`, `beta_range` and `grid_size` are reported
/// alongside results but do not change generation or ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// TOPSIS criterion weights
    pub weights: Weights,
    /// Rolling window in months
    pub window_size: u32,
    /// Models shown on the frontier chart and included in exports
    pub enabled_models: Vec<Model>,
    pub alpha_range: (f64, f64),
    pub beta_range: (f64, f64),
    pub grid_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            window_size: 20,
            enabled_models: vec![
                Model::M1,
                Model::M3,
                Model::M6,
                Model::M7Cloud,
                Model::M7Best,
            ],
            alpha_range: (0.2, 0.4),
            beta_range: (0.8, 1.0),
            grid_size: 15,
        }
    }
}

impl DashboardConfig {
    /// Reads a JSON config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if !WINDOW_SIZE_RANGE.contains(&self.window_size) {
            return Err(FuzzyfolioError::InvalidConfig(format!(
                "window_size {} outside {}..={}",
                self.window_size,
                WINDOW_SIZE_RANGE.start(),
                WINDOW_SIZE_RANGE.end()
            )));
        }
        for (name, (low, high)) in [("alpha_range", self.alpha_range), ("beta_range", self.beta_range)] {
            if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
                return Err(FuzzyfolioError::InvalidConfig(format!(
                    "{name} [{low}, {high}] must be an ordered pair within [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_reset_state() {
        let config = DashboardConfig::default();
        assert_eq!(config.weights, Weights::new(0.4, 0.3, 0.3));
        assert_eq!(config.window_size, 20);
        assert_eq!(config.enabled_models.len(), 5);
        assert!(!config.enabled_models.contains(&Model::M2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(
            &path,
            r#"{ "weights": { "return": 0.6, "variance": 0.2, "entropy": 0.2 }, "enabled_models": ["M2", "M7_Best"] }"#,
        )
        .unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.weights, Weights::new(0.6, 0.2, 0.2));
        assert_eq!(config.enabled_models, vec![Model::M2, Model::M7Best]);
        assert_eq!(config.window_size, 20);
    }

    #[test]
    fn rejects_out_of_range_window() {
        let config = DashboardConfig {
            window_size: 90,
            ..DashboardConfig::default()
        };
        assert!(matches!(config.validate(), Err(FuzzyfolioError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_negative_weight_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "weights": { "return": -1.0, "variance": 0.2, "entropy": 0.2 } }"#)
            .unwrap();
        assert!(matches!(
            DashboardConfig::from_file(&path),
            Err(FuzzyfolioError::InvalidWeight { criterion: "return", .. })
        ));
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyfolioError, Result};

/// Portfolio construction strategies shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "M7_Best")]
    M7Best,
    M3,
    M6,
    #[serde(rename = "M7_Cloud")]
    M7Cloud,
    M2,
    #[serde(rename = "COMP")]
    Comp,
    M1,
}

impl Model {
    /// Leaderboard order. Ranking enumerates models in this order, so equal
    /// scores keep it after the stable sort.
    pub const ALL: [Model; 7] = [
        Model::M7Best,
        Model::M3,
        Model::M6,
        Model::M7Cloud,
        Model::M2,
        Model::Comp,
        Model::M1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Model::M7Best => "M7_Best",
            Model::M3 => "M3",
            Model::M6 => "M6",
            Model::M7Cloud => "M7_Cloud",
            Model::M2 => "M2",
            Model::Comp => "COMP",
            Model::M1 => "M1",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Model::M7Best => "M7 Optimal",
            Model::M3 => "Hybrid (M3)",
            Model::M6 => "Fuzzy Return (M6)",
            Model::M7Cloud => "M7 Fuzzy Space",
            Model::M2 => "Max Entropy (M2)",
            Model::Comp => "Comparatif",
            Model::M1 => "Markowitz (M1)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Model::M7Best => "Fuzzy Entropy Optimal",
            Model::M3 => "Min Var + Max Entropy",
            Model::M6 => "Fuzzy Return + Min Var",
            Model::M7Cloud => "Fuzzy Exploration Space",
            Model::M2 => "Max Shannon Entropy",
            Model::Comp => "Possibilistic Mean-Var",
            Model::M1 => "Markowitz Classic",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Model::M7Best => "hsl(152 76% 50%)",
            Model::M3 => "hsl(280 80% 60%)",
            Model::M6 => "hsl(38 92% 50%)",
            Model::M7Cloud => "hsl(220 15% 55%)",
            Model::M2 => "hsl(192 95% 50%)",
            Model::Comp => "hsl(340 80% 55%)",
            Model::M1 => "hsl(220 90% 56%)",
        }
    }

    /// Max points per model drawn on the frontier chart.
    pub fn display_budget(self) -> usize {
        match self {
            Model::M7Cloud => 500,
            Model::M1 | Model::M7Best => 150,
            Model::M2 | Model::M3 | Model::M6 => 100,
            Model::Comp => 80,
        }
    }

    /// Fuzzy-parameterized models carry `alpha`/`beta` on every point.
    pub fn is_fuzzy(self) -> bool {
        matches!(self, Model::M7Cloud | Model::M7Best)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = FuzzyfolioError;

    fn from_str(s: &str) -> Result<Self> {
        Model::ALL
            .into_iter()
            .find(|model| model.as_str() == s.trim())
            .ok_or_else(|| FuzzyfolioError::UnknownModel(s.to_string()))
    }
}

/// One simulated portfolio outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub model: Model,
    #[serde(rename = "return")]
    pub ret: f64,
    pub variance: f64,
    pub entropy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
}

/// Per-model means plus the closeness score from the latest ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub model: Model,
    pub avg_return: f64,
    pub avg_variance: f64,
    pub avg_entropy: f64,
    pub count: usize,
    pub topsis_score: f64,
    pub color: &'static str,
}

impl ModelSummary {
    pub fn empty(model: Model) -> Self {
        Self {
            model,
            avg_return: 0.0,
            avg_variance: 0.0,
            avg_entropy: 0.0,
            count: 0,
            topsis_score: 0.0,
            color: model.color(),
        }
    }
}

/// Criterion importance. Components need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(rename = "return")]
    pub ret: f64,
    pub variance: f64,
    pub entropy: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            ret: 0.4,
            variance: 0.3,
            entropy: 0.3,
        }
    }
}

impl Weights {
    pub fn new(ret: f64, variance: f64, entropy: f64) -> Self {
        Self {
            ret,
            variance,
            entropy,
        }
    }

    /// Rejects negative or non-finite components.
    pub fn validate(&self) -> Result<()> {
        for (criterion, value) in [
            ("return", self.ret),
            ("variance", self.variance),
            ("entropy", self.entropy),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FuzzyfolioError::InvalidWeight { criterion, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_portfolios: usize,
    pub m7_advantage_pct: f64,
    pub risk_reduction_pct: f64,
    pub top_score: f64,
    pub best_model: Model,
}

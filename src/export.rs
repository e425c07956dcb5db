use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FuzzyfolioError, Result};
use crate::models::{Model, ScoredPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = FuzzyfolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(FuzzyfolioError::UnknownFormat(s.to_string())),
        }
    }
}

/// CSV layout: numerics fixed to 6 decimals, missing alpha/beta left empty.
#[derive(Serialize)]
struct CsvRow {
    model: Model,
    #[serde(rename = "return")]
    ret: String,
    variance: String,
    entropy: String,
    alpha: String,
    beta: String,
}

impl From<&ScoredPoint> for CsvRow {
    fn from(point: &ScoredPoint) -> Self {
        let optional = |value: Option<f64>| value.map(|v| format!("{v:.6}")).unwrap_or_default();
        Self {
            model: point.model,
            ret: format!("{:.6}", point.ret),
            variance: format!("{:.6}", point.variance),
            entropy: format!("{:.6}", point.entropy),
            alpha: optional(point.alpha),
            beta: optional(point.beta),
        }
    }
}

#[derive(Deserialize)]
struct CsvRecord {
    model: Model,
    #[serde(rename = "return")]
    ret: f64,
    variance: f64,
    entropy: f64,
    alpha: Option<f64>,
    beta: Option<f64>,
}

pub fn serialize(points: &[ScoredPoint], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(points)?),
        ExportFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(Vec::new());
            if points.is_empty() {
                writer.write_record(["model", "return", "variance", "entropy", "alpha", "beta"])?;
            }
            for point in points {
                writer.serialize(CsvRow::from(point))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|err| FuzzyfolioError::Io(err.into_error()))?;
            // Only ASCII is ever written.
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

pub fn deserialize(text: &str, format: ExportFormat) -> Result<Vec<ScoredPoint>> {
    match format {
        ExportFormat::Json => Ok(serde_json::from_str(text)?),
        ExportFormat::Csv => {
            let mut reader = csv::Reader::from_reader(text.as_bytes());
            let mut points = Vec::new();
            for result in reader.deserialize::<CsvRecord>() {
                let row = result?;
                points.push(ScoredPoint {
                    model: row.model,
                    ret: row.ret,
                    variance: row.variance,
                    entropy: row.entropy,
                    alpha: row.alpha,
                    beta: row.beta,
                });
            }
            Ok(points)
        }
    }
}

/// Default download name, e.g. `fuzzyfolio_11626_portfolios.csv`.
pub fn export_file_name(total: usize, format: ExportFormat) -> String {
    format!("fuzzyfolio_{total}_portfolios.{}", format.extension())
}

/// Format inferred from the file extension.
pub fn format_for_path(path: &Path) -> Result<ExportFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    extension.parse()
}

pub fn load_points(path: &Path) -> Result<Vec<ScoredPoint>> {
    let format = format_for_path(path)?;
    let text = std::fs::read_to_string(path)?;
    let points = deserialize(&text, format)?;
    debug!(path = %path.display(), count = points.len(), "loaded points");
    Ok(points)
}

pub fn save_points(path: &Path, points: &[ScoredPoint], format: ExportFormat) -> Result<()> {
    std::fs::write(path, serialize(points, format)?)?;
    Ok(())
}

/// Evenly spaced subset of at most `max` items.
pub fn downsample<T>(items: &[T], max: usize) -> Vec<&T> {
    if items.len() <= max {
        return items.iter().collect();
    }
    let step = items.len() as f64 / max as f64;
    (0..max)
        .map(|i| &items[(i as f64 * step).floor() as usize])
        .collect()
}

/// Enabled models only, each thinned to its display budget.
pub fn chart_sample(points: &[ScoredPoint], enabled: &[Model]) -> Vec<ScoredPoint> {
    let mut groups: BTreeMap<Model, Vec<ScoredPoint>> = BTreeMap::new();
    for point in points.iter().filter(|p| enabled.contains(&p.model)) {
        groups.entry(point.model).or_default().push(*point);
    }

    groups
        .into_iter()
        .flat_map(|(model, group)| {
            downsample(&group, model.display_budget())
                .into_iter()
                .copied()
                .collect::<Vec<_>>()
        })
        .collect()
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use fuzzyfolio::config::DashboardConfig;
use fuzzyfolio::export::{self, ExportFormat};
use fuzzyfolio::generator::{self, count_by_model, filter_models};
use fuzzyfolio::logging::{self, LogFormat};
use fuzzyfolio::models::{Model, ScoredPoint};
use fuzzyfolio::{report, topsis};

#[derive(Parser)]
#[command(name = "fuzzyfolio")]
#[command(about = "Fuzzy entropy portfolio explorer with TOPSIS model ranking", long_about = None)]
struct Cli {
    /// JSON dashboard configuration
    #[arg(long, global = true, env = "FUZZYFOLIO_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Population counts and headline figures
    Summary,
    /// Rank the models with TOPSIS
    Rank {
        #[command(flatten)]
        weights: WeightArgs,
        #[command(flatten)]
        selection: Selection,
        #[arg(long, default_value_t = 7)]
        limit: usize,
    },
    /// Export portfolios as JSON or CSV
    Export {
        #[arg(long)]
        format: ExportFormat,
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the downsampled frontier chart points as CSV
    Frontier {
        #[arg(long, value_delimiter = ',')]
        models: Option<Vec<Model>>,
        #[arg(long, default_value = "frontier.csv")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        weights: WeightArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct WeightArgs {
    #[arg(long = "return")]
    ret: Option<f64>,
    #[arg(long)]
    variance: Option<f64>,
    #[arg(long)]
    entropy: Option<f64>,
}

#[derive(Args)]
struct Selection {
    /// Comma-separated model labels, e.g. M1,M7_Best
    #[arg(long, value_delimiter = ',')]
    models: Option<Vec<Model>>,
    /// Previously exported JSON or CSV file to use instead of the generated set
    #[arg(long)]
    input: Option<PathBuf>,
}

impl WeightArgs {
    fn apply(&self, config: &mut DashboardConfig) {
        if let Some(value) = self.ret {
            config.weights.ret = value;
        }
        if let Some(value) = self.variance {
            config.weights.variance = value;
        }
        if let Some(value) = self.entropy {
            config.weights.entropy = value;
        }
    }
}

impl Selection {
    fn points(&self) -> anyhow::Result<Vec<ScoredPoint>> {
        let points = load_or_generate(self.input.as_deref())?;
        Ok(match &self.models {
            Some(models) => filter_models(&points, models),
            None => points,
        })
    }
}

fn load_or_generate(input: Option<&Path>) -> anyhow::Result<Vec<ScoredPoint>> {
    match input {
        Some(path) => export::load_points(path)
            .with_context(|| format!("failed to load portfolios from {}", path.display())),
        None => Ok(generator::portfolios().to_vec()),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display())),
        None => Ok(DashboardConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format, Level::INFO);
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Summary => {
            let points: Arc<[ScoredPoint]> = generator::portfolios();
            let rankings = topsis::rank(&points, &config.weights);
            let stats = topsis::dashboard_stats(&points, &rankings);

            println!("{} portfolios generated:", stats.total_portfolios);
            for model in Model::ALL {
                println!("- {:<9} {:>5}", model.as_str(), count_by_model(&points, model));
            }
            println!(
                "Best model {} (score {:.4}), M7 return advantage {:+.1}%, variance reduction {:.1}%",
                stats.best_model, stats.top_score, stats.m7_advantage_pct, stats.risk_reduction_pct
            );
        }
        Commands::Rank {
            weights,
            selection,
            limit,
        } => {
            weights.apply(&mut config);
            let points = selection.points()?;
            let rankings = topsis::try_rank(&points, &config.weights)?;

            println!("TOPSIS leaderboard:");
            for (index, summary) in rankings.iter().take(limit).enumerate() {
                println!(
                    "{}. {} ({}) score {:.4} across {} portfolios",
                    index + 1,
                    summary.model.display_name(),
                    summary.model.description(),
                    summary.topsis_score,
                    summary.count
                );
            }
        }
        Commands::Export {
            format,
            selection,
            out,
        } => {
            let points = match (&selection.models, &selection.input) {
                (None, None) => filter_models(&generator::portfolios(), &config.enabled_models),
                _ => selection.points()?,
            };
            let out = out.unwrap_or_else(|| PathBuf::from(export::export_file_name(points.len(), format)));
            export::save_points(&out, &points, format)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(mime = format.mime_type(), count = points.len(), "export finished");
            println!("Exported {} portfolios to {}.", points.len(), out.display());
        }
        Commands::Frontier { models, out } => {
            let enabled = models.unwrap_or_else(|| config.enabled_models.clone());
            let sample = export::chart_sample(&generator::portfolios(), &enabled);
            export::save_points(&out, &sample, ExportFormat::Csv)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Frontier sample of {} points written to {}.", sample.len(), out.display());
        }
        Commands::Report { weights, out } => {
            weights.apply(&mut config);
            config.validate()?;
            let points = generator::portfolios();
            let rankings = topsis::rank(&points, &config.weights);
            let report = report::build_report(&config, Utc::now().date_naive(), &points, &rankings);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

use std::fmt::Write;

use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::generator::count_by_model;
use crate::models::{Model, ModelSummary, ScoredPoint};
use crate::topsis;

pub fn build_report(
    config: &DashboardConfig,
    generated_on: NaiveDate,
    points: &[ScoredPoint],
    rankings: &[ModelSummary],
) -> String {
    let stats = topsis::dashboard_stats(points, rankings);
    let mut output = String::new();

    let _ = writeln!(output, "# FuzzyFolio TOPSIS Report");
    let _ = writeln!(
        output,
        "Generated on {} from {} portfolios (window {} months)",
        generated_on, stats.total_portfolios, config.window_size
    );
    let _ = writeln!(
        output,
        "Weights: return {:.2}, variance {:.2}, entropy {:.2}",
        config.weights.ret, config.weights.variance, config.weights.entropy
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Leaderboard");

    for (index, summary) in rankings.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {} ({}) score {:.4} across {} portfolios, return {:.2}%, variance {:.3}%, entropy {:.3}",
            index + 1,
            summary.model.display_name(),
            summary.model.description(),
            summary.topsis_score,
            summary.count,
            summary.avg_return * 100.0,
            summary.avg_variance * 100.0,
            summary.avg_entropy
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Population");

    if points.is_empty() {
        let _ = writeln!(output, "No portfolios in this selection.");
    } else {
        for model in Model::ALL {
            let count = count_by_model(points, model);
            if count > 0 {
                let _ = writeln!(output, "- {}: {} portfolios", model, count);
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline");
    let _ = writeln!(
        output,
        "- Best model: {} (score {:.4})",
        stats.best_model.display_name(),
        stats.top_score
    );
    let _ = writeln!(output, "- M7 return advantage vs Markowitz: {:+.1}%", stats.m7_advantage_pct);
    let _ = writeln!(output, "- Variance reduction vs Markowitz: {:.1}%", stats.risk_reduction_pct);

    output
}

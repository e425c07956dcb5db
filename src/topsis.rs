use tracing::debug;

use crate::error::Result;
use crate::models::{DashboardStats, Model, ModelSummary, ScoredPoint, Weights};

/// Weighted, normalized criteria of one model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Criteria {
    ret: f64,
    variance: f64,
    entropy: f64,
}

impl Criteria {
    fn distance(&self, other: &Criteria) -> f64 {
        ((self.ret - other.ret).powi(2)
            + (self.variance - other.variance).powi(2)
            + (self.entropy - other.entropy).powi(2))
        .sqrt()
    }
}

/// Per-model means over `points`, one entry per known model in `Model::ALL`
/// order. Models without points get an all-zero summary.
pub fn aggregate(points: &[ScoredPoint]) -> Vec<ModelSummary> {
    Model::ALL
        .into_iter()
        .map(|model| {
            let mut summary = ModelSummary::empty(model);
            let (mut ret, mut variance, mut entropy) = (0.0, 0.0, 0.0);

            for point in points.iter().filter(|point| point.model == model) {
                ret += point.ret;
                variance += point.variance;
                entropy += point.entropy;
                summary.count += 1;
            }

            if summary.count > 0 {
                let count = summary.count as f64;
                summary.avg_return = ret / count;
                summary.avg_variance = variance / count;
                summary.avg_entropy = entropy / count;
            }
            summary
        })
        .collect()
}

/// Ranks all seven models by TOPSIS closeness, best first.
///
/// Return and entropy are benefit criteria, variance is a cost criterion.
/// Weights are not validated here; see [`try_rank`].
pub fn rank(points: &[ScoredPoint], weights: &Weights) -> Vec<ModelSummary> {
    let mut summaries = aggregate(points);

    let norm = |value: fn(&ModelSummary) -> f64| -> f64 {
        summaries.iter().map(|s| value(s).powi(2)).sum::<f64>().sqrt()
    };
    let norms = Criteria {
        ret: norm(|s| s.avg_return),
        variance: norm(|s| s.avg_variance),
        entropy: norm(|s| s.avg_entropy),
    };

    let weighted: Vec<Criteria> = summaries
        .iter()
        .map(|s| Criteria {
            ret: normalize(s.avg_return, norms.ret) * weights.ret,
            variance: normalize(s.avg_variance, norms.variance) * weights.variance,
            entropy: normalize(s.avg_entropy, norms.entropy) * weights.entropy,
        })
        .collect();

    let max = |value: fn(&Criteria) -> f64| weighted.iter().map(value).fold(f64::NEG_INFINITY, f64::max);
    let min = |value: fn(&Criteria) -> f64| weighted.iter().map(value).fold(f64::INFINITY, f64::min);

    let ideal = Criteria {
        ret: max(|c| c.ret),
        variance: min(|c| c.variance),
        entropy: max(|c| c.entropy),
    };
    let anti_ideal = Criteria {
        ret: min(|c| c.ret),
        variance: max(|c| c.variance),
        entropy: min(|c| c.entropy),
    };
    debug!(?ideal, ?anti_ideal, ?weights, "topsis reference vectors");

    for (summary, criteria) in summaries.iter_mut().zip(&weighted) {
        let d_pos = criteria.distance(&ideal);
        let d_neg = criteria.distance(&anti_ideal);
        summary.topsis_score = if d_pos + d_neg > 0.0 {
            d_neg / (d_pos + d_neg)
        } else {
            0.0
        };
    }

    // Stable: equal scores keep `Model::ALL` order.
    summaries.sort_by(|a, b| {
        b.topsis_score
            .partial_cmp(&a.topsis_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

/// [`rank`] after rejecting negative or non-finite weights.
pub fn try_rank(points: &[ScoredPoint], weights: &Weights) -> Result<Vec<ModelSummary>> {
    weights.validate()?;
    Ok(rank(points, weights))
}

fn normalize(value: f64, norm: f64) -> f64 {
    if norm > 0.0 {
        value / norm
    } else {
        0.0
    }
}

/// Headline figures: M7_Best against the Markowitz baseline, plus the leader.
pub fn dashboard_stats(points: &[ScoredPoint], rankings: &[ModelSummary]) -> DashboardStats {
    let means = aggregate(points);
    let find = |model: Model| means.iter().find(|s| s.model == model);
    let (best, baseline) = (find(Model::M7Best), find(Model::M1));

    let (m7_advantage_pct, risk_reduction_pct) = match (best, baseline) {
        (Some(best), Some(baseline)) if best.count > 0 && baseline.count > 0 => (
            percent_change(best.avg_return - baseline.avg_return, baseline.avg_return.abs()),
            percent_change(baseline.avg_variance - best.avg_variance, baseline.avg_variance),
        ),
        _ => (0.0, 0.0),
    };

    let leader = rankings.first();
    DashboardStats {
        total_portfolios: points.len(),
        m7_advantage_pct,
        risk_reduction_pct,
        top_score: leader.map_or(0.0, |s| s.topsis_score),
        best_model: leader.map_or(Model::M7Best, |s| s.model),
    }
}

fn percent_change(delta: f64, base: f64) -> f64 {
    if base > 0.0 {
        delta / base * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_portfolios;
    use approx::assert_abs_diff_eq;

    fn point(model: Model, ret: f64, variance: f64, entropy: f64) -> ScoredPoint {
        ScoredPoint {
            model,
            ret,
            variance,
            entropy,
            alpha: None,
            beta: None,
        }
    }

    fn score_of(rankings: &[ModelSummary], model: Model) -> f64 {
        rankings
            .iter()
            .find(|s| s.model == model)
            .map(|s| s.topsis_score)
            .unwrap()
    }

    #[test]
    fn aggregate_computes_means_per_model() {
        let points = vec![
            point(Model::M1, 0.01, 0.002, 1.0),
            point(Model::M1, 0.03, 0.004, 0.8),
            point(Model::M3, 0.02, 0.003, 1.2),
        ];
        let summaries = aggregate(&points);
        assert_eq!(summaries.len(), 7);

        let m1 = summaries.iter().find(|s| s.model == Model::M1).unwrap();
        assert_eq!(m1.count, 2);
        assert_abs_diff_eq!(m1.avg_return, 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(m1.avg_variance, 0.003, epsilon = 1e-12);
        assert_abs_diff_eq!(m1.avg_entropy, 0.9, epsilon = 1e-12);

        let m6 = summaries.iter().find(|s| s.model == Model::M6).unwrap();
        assert_eq!(*m6, ModelSummary::empty(Model::M6));
    }

    #[test]
    fn ranking_always_covers_seven_models() {
        let full = generate_portfolios();
        for subset in [vec![], full[..10].to_vec(), full.clone()] {
            let rankings = rank(&subset, &Weights::default());
            assert_eq!(rankings.len(), 7);
            for model in Model::ALL {
                assert_eq!(rankings.iter().filter(|s| s.model == model).count(), 1);
            }
        }
    }

    #[test]
    fn ranking_is_sorted_and_bounded() {
        let rankings = rank(&generate_portfolios(), &Weights::default());
        for pair in rankings.windows(2) {
            assert!(pair[0].topsis_score >= pair[1].topsis_score);
        }
        for summary in &rankings {
            assert!((0.0..=1.0).contains(&summary.topsis_score));
        }
    }

    #[test]
    fn best_zone_leads_with_default_weights() {
        let rankings = rank(&generate_portfolios(), &Weights::default());
        assert_eq!(rankings[0].model, Model::M7Best);
        assert_eq!(rankings[0].count, 618);
    }

    #[test]
    fn empty_input_scores_zero_in_enumeration_order() {
        let rankings = rank(&[], &Weights::default());
        let order: Vec<Model> = rankings.iter().map(|s| s.model).collect();
        assert_eq!(order, Model::ALL.to_vec());
        assert!(rankings.iter().all(|s| s.topsis_score == 0.0 && s.count == 0));
    }

    #[test]
    fn missing_models_score_without_nan() {
        let points = vec![
            point(Model::M1, 0.01, 0.004, 1.0),
            point(Model::M6, 0.02, 0.002, 1.1),
        ];
        let rankings = rank(&points, &Weights::default());
        assert!(rankings.iter().all(|s| s.topsis_score.is_finite()));
        // M6 dominates M1 on every criterion.
        assert_eq!(rankings[0].model, Model::M6);
        assert!(score_of(&rankings, Model::M6) > score_of(&rankings, Model::M1));
    }

    #[test]
    fn zero_weights_score_everything_zero() {
        let rankings = rank(&generate_portfolios(), &Weights::new(0.0, 0.0, 0.0));
        assert!(rankings.iter().all(|s| s.topsis_score == 0.0));
    }

    #[test]
    fn empty_models_pull_the_variance_ideal_to_zero() {
        let points = vec![point(Model::M2, 0.01, 0.003, 1.0)];
        let rankings = rank(&points, &Weights::default());
        // M2 normalizes to (0.4, 0.3, 0.3); the six empty models sit at the origin.
        // Ideal (0.4, 0, 0.3), anti-ideal (0, 0.3, 0).
        assert_eq!(rankings[0].model, Model::M2);
        assert_abs_diff_eq!(rankings[0].topsis_score, 0.625, epsilon = 1e-12);
        for summary in &rankings[1..] {
            assert_abs_diff_eq!(summary.topsis_score, 0.375, epsilon = 1e-12);
        }
        let tail: Vec<Model> = rankings[1..].iter().map(|s| s.model).collect();
        let expected: Vec<Model> = Model::ALL.into_iter().filter(|m| *m != Model::M2).collect();
        assert_eq!(tail, expected);
    }

    #[test]
    fn raising_return_weight_favours_high_return_model() {
        // M3 earns more, M1 is calmer and more diversified.
        let points = vec![
            point(Model::M3, 0.03, 0.006, 1.0),
            point(Model::M1, 0.005, 0.002, 1.2),
        ];
        let low = rank(&points, &Weights::new(0.1, 0.3, 0.3));
        let high = rank(&points, &Weights::new(0.9, 0.3, 0.3));

        let relative = |rankings: &[ModelSummary]| {
            score_of(rankings, Model::M3) - score_of(rankings, Model::M1)
        };
        assert!(relative(&high) >= relative(&low));
        assert_eq!(high[0].model, Model::M3);
    }

    #[test]
    fn try_rank_rejects_invalid_weights() {
        assert!(try_rank(&[], &Weights::new(-0.1, 0.3, 0.3)).is_err());
        assert_eq!(try_rank(&[], &Weights::default()).unwrap().len(), 7);
    }

    #[test]
    fn headline_stats_compare_m7_best_to_markowitz() {
        let points = vec![
            point(Model::M1, 0.01, 0.004, 1.0),
            point(Model::M7Best, 0.015, 0.002, 1.3),
        ];
        let rankings = rank(&points, &Weights::default());
        let stats = dashboard_stats(&points, &rankings);
        assert_eq!(stats.total_portfolios, 2);
        assert_abs_diff_eq!(stats.m7_advantage_pct, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.risk_reduction_pct, 50.0, epsilon = 1e-9);
        assert_eq!(stats.best_model, Model::M7Best);
        assert_abs_diff_eq!(stats.top_score, rankings[0].topsis_score);
    }

    #[test]
    fn headline_stats_without_baseline_are_zero() {
        let points = vec![point(Model::M7Best, 0.015, 0.002, 1.3)];
        let stats = dashboard_stats(&points, &[]);
        assert_eq!(stats.m7_advantage_pct, 0.0);
        assert_eq!(stats.risk_reduction_pct, 0.0);
        assert_eq!(stats.top_score, 0.0);
        assert_eq!(stats.best_model, Model::M7Best);
    }
}

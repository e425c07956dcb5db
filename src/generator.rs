use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use crate::models::{Model, ScoredPoint};

pub const SEED_START: u64 = 42;
pub const GRID_SIZE: usize = 15;
pub const GRID_START: f64 = 0.05;
pub const GRID_STEP: f64 = 0.0643;
pub const POINTS_PER_CELL: usize = 38;

const BEST_ALPHA: (f64, f64) = (0.2, 0.4);
const BEST_BETA: (f64, f64) = (0.8, 1.0);

static PORTFOLIOS: Mutex<Option<Arc<[ScoredPoint]>>> = Mutex::new(None);

/// Deterministic `[0, 1)` sequence: `frac(sin(seed) * 10000)`, seed bumped per draw.
#[derive(Debug, Clone)]
pub struct SeededSequence {
    seed: u64,
}

impl SeededSequence {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn next_value(&mut self) -> f64 {
        let x = (self.seed as f64).sin() * 10000.0;
        self.seed += 1;
        x - x.floor()
    }

    /// Uniform draw in `[low, low + width)`.
    fn band(&mut self, low: f64, width: f64) -> f64 {
        low + self.next_value() * width
    }

    /// Symmetric jitter in `[-width / 2, width / 2)`.
    fn jitter(&mut self, width: f64) -> f64 {
        (self.next_value() - 0.5) * width
    }
}

impl Default for SeededSequence {
    fn default() -> Self {
        Self::new(SEED_START)
    }
}

/// The shared collection, generated on first use.
pub fn portfolios() -> Arc<[ScoredPoint]> {
    let mut cache = lock_cache();
    cache
        .get_or_insert_with(|| Arc::from(generate_portfolios()))
        .clone()
}

/// Drops the cached collection; the next `portfolios()` call regenerates it.
pub fn reset_portfolios() {
    lock_cache().take();
}

fn lock_cache() -> MutexGuard<'static, Option<Arc<[ScoredPoint]>>> {
    // The cache holds immutable data, so a poisoned lock is still usable.
    PORTFOLIOS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn grid_axis() -> [f64; GRID_SIZE] {
    std::array::from_fn(|i| GRID_START + i as f64 * GRID_STEP)
}

/// Grid cells in this rectangle are left to `M7_Best`.
pub fn in_best_zone(alpha: f64, beta: f64) -> bool {
    (BEST_ALPHA.0..=BEST_ALPHA.1).contains(&alpha) && (BEST_BETA.0..=BEST_BETA.1).contains(&beta)
}

/// Uncached generation, model-major: M1, M2, M3, M6, COMP, M7_Cloud, M7_Best.
pub fn generate_portfolios() -> Vec<ScoredPoint> {
    let mut rng = SeededSequence::default();
    let mut points = Vec::with_capacity(12_000);

    for i in 0..800 {
        let t = i as f64 / 800.0;
        let base_var = 0.001 + t * 0.015;
        let base_ret = -0.005 + t * 0.025;
        let variance = base_var + rng.jitter(0.002);
        let ret = base_ret + rng.jitter(0.003);
        let entropy = rng.band(0.8, 0.4);
        points.push(plain(Model::M1, ret, variance, entropy));
    }

    // (model, count, variance band, return band, entropy band)
    let banded = [
        (Model::M2, 600, (0.003, 0.008), (0.002, 0.012), (1.1, 0.3)),
        (Model::M3, 500, (0.002, 0.006), (0.003, 0.01), (1.0, 0.35)),
        (Model::M6, 500, (0.002, 0.007), (0.004, 0.011), (1.05, 0.3)),
        (Model::Comp, 400, (0.003, 0.01), (0.001, 0.008), (0.7, 0.4)),
    ];
    for (model, count, var_band, ret_band, ent_band) in banded {
        for _ in 0..count {
            let variance = rng.band(var_band.0, var_band.1);
            let ret = rng.band(ret_band.0, ret_band.1);
            let entropy = rng.band(ent_band.0, ent_band.1);
            points.push(plain(model, ret, variance, entropy));
        }
    }

    let axis = grid_axis();
    for &alpha in &axis {
        for &beta in &axis {
            if in_best_zone(alpha, beta) {
                continue;
            }
            let var_base = 0.001 + (1.0 - beta) * 0.012;
            let ret_base = alpha * 0.02 - 0.005;
            for _ in 0..POINTS_PER_CELL {
                // Jitter near beta = 1 can dip below zero; variance is floored there.
                let variance = (var_base + rng.jitter(0.004)).max(0.0);
                let ret = ret_base + rng.jitter(0.008);
                let entropy = rng.band(0.9, 0.5);
                points.push(fuzzy(Model::M7Cloud, ret, variance, entropy, alpha, beta));
            }
        }
    }

    for _ in 0..618 {
        let alpha = rng.band(BEST_ALPHA.0, BEST_ALPHA.1 - BEST_ALPHA.0);
        let beta = rng.band(BEST_BETA.0, BEST_BETA.1 - BEST_BETA.0);
        let variance = rng.band(0.001, 0.003);
        let ret = rng.band(0.008, 0.012);
        let entropy = rng.band(1.2, 0.2);
        points.push(fuzzy(Model::M7Best, ret, variance, entropy, alpha, beta));
    }

    info!(total = points.len(), "generated portfolio population");
    points
}

/// Points whose model is in `enabled`, in their original order.
pub fn filter_models(points: &[ScoredPoint], enabled: &[Model]) -> Vec<ScoredPoint> {
    let enabled: HashSet<Model> = enabled.iter().copied().collect();
    points
        .iter()
        .filter(|point| enabled.contains(&point.model))
        .copied()
        .collect()
}

pub fn count_by_model(points: &[ScoredPoint], model: Model) -> usize {
    points.iter().filter(|point| point.model == model).count()
}

fn plain(model: Model, ret: f64, variance: f64, entropy: f64) -> ScoredPoint {
    ScoredPoint {
        model,
        ret,
        variance,
        entropy,
        alpha: None,
        beta: None,
    }
}

fn fuzzy(model: Model, ret: f64, variance: f64, entropy: f64, alpha: f64, beta: f64) -> ScoredPoint {
    ScoredPoint {
        model,
        ret,
        variance,
        entropy,
        alpha: Some(alpha),
        beta: Some(beta),
    }
}

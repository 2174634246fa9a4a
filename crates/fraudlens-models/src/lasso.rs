//! Regularized linear model: L1-penalized logistic regression
//!
//! Coefficients are fitted by cyclic coordinate descent on a quadratic
//! approximation of the binomial log-likelihood, over a decreasing grid of
//! penalties with warm starts. Features are standardized internally and the
//! intercept is never penalized; reported coefficients are on the input
//! scale.
//!
//! # Penalty selection
//!
//! The grid starts at `λmax`, the smallest penalty at which every
//! coefficient is zero, and decreases log-linearly to `λmax · ratio`. Every
//! fold of a stratified k-fold split fits the whole path on its training part
//! and scores each penalty by binomial deviance on its holdout part. The
//! selected penalty is the largest one whose mean deviance is within one
//! standard error of the minimum (the one-standard-error rule). The model is
//! then refit on the full matrix at that penalty.

use fraudlens_features::matrix::{ColumnSet, FeatureMatrix};
use fraudlens_stats::descriptive::DescriptiveStats;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::{
    classifier::{self, Classifier, FitError, FitWarning, FittedModel, RankedFeature, sigmoid},
    folds::{self, FoldAssignment},
};

/// Fitted probabilities are kept this far away from 0 and 1.
const PROBABILITY_FLOOR: f64 = 1e-5;
const MAX_OUTER_ITERATIONS: usize = 100;
/// A penalty is converged when no coefficient moves more than this between
/// successive quadratic approximations.
const OUTER_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LassoConfig {
    pub folds: usize,
    /// Number of penalties in the generated grid.
    pub n_lambda: usize,
    /// Smallest penalty of the generated grid as a fraction of `λmax`.
    pub lambda_min_ratio: f64,
    /// Explicit penalty grid. Replaces the generated grid when set.
    pub lambdas: Option<Vec<f64>>,
    /// Coordinate descent passes per quadratic approximation.
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for LassoConfig {
    fn default() -> Self {
        Self {
            folds: 10,
            n_lambda: 50,
            lambda_min_ratio: 1e-3,
            lambdas: None,
            max_iterations: 1000,
            tolerance: 1e-7,
        }
    }
}

/// Cross-validated deviance at one penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvPoint {
    pub lambda: f64,
    pub mean_deviance: f64,
    pub std_error: f64,
    /// Nonzero coefficients of the full-data fit at this penalty.
    pub nonzero: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LassoFit {
    pub intercept: f64,
    /// Input-scale coefficients, in column order.
    pub coefficients: Vec<f64>,
    /// Selected penalty (one-standard-error rule).
    pub lambda: f64,
    /// Penalty with the minimum cross-validated deviance.
    pub lambda_min: f64,
    pub cv: Vec<CvPoint>,
}

impl LassoFit {
    pub(crate) fn log_odds(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }

    pub(crate) fn ranking(&self, columns: &ColumnSet) -> Vec<RankedFeature> {
        let mut ranked = columns
            .iter()
            .zip(&self.coefficients)
            .filter(|(_, b)| **b != 0.0)
            .map(|(name, &score)| RankedFeature {
                feature: name.to_owned(),
                score,
            })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| {
            b.score
                .abs()
                .total_cmp(&a.score.abs())
                .then_with(|| a.feature.cmp(&b.feature))
        });
        ranked
    }
}

#[derive(Debug, Clone)]
pub struct LassoTrainer {
    config: LassoConfig,
    seed: u64,
}

impl LassoTrainer {
    #[must_use]
    pub fn new(config: LassoConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    fn grid(&self, lambda_max: f64) -> Result<Vec<f64>, FitError> {
        let mut grid = match &self.config.lambdas {
            Some(explicit) => explicit.clone(),
            None if lambda_max <= 0.0 || !lambda_max.is_finite() => {
                return Err(FitError::NoInformativeFeature);
            }
            None => log_grid(lambda_max, self.config.lambda_min_ratio, self.config.n_lambda),
        };
        if grid.is_empty() || grid.iter().any(|&l| l.is_nan() || l <= 0.0 || l.is_infinite()) {
            return Err(FitError::EmptyPenaltyGrid);
        }
        grid.sort_by(|a, b| b.total_cmp(a));
        grid.dedup();
        Ok(grid)
    }
}

impl Classifier for LassoTrainer {
    fn name(&self) -> &str {
        "lasso"
    }

    fn fit(&self, train: &FeatureMatrix) -> Result<FittedModel, FitError> {
        classifier::check_trainable(train)?;
        let folds = FoldAssignment::stratified(train.labels(), self.config.folds, self.seed)?;
        let y = classifier::label_vector(train);

        let full = Standardized::new(train.values());
        let lambdas = self.grid(full.lambda_max(&y))?;
        tracing::debug!(
            lambda_max = lambdas[0],
            lambda_last = lambdas[lambdas.len() - 1],
            count = lambdas.len(),
            "penalty grid"
        );

        let fold_deviances = folds::map_folds(folds.k(), |fold| {
            let fit_rows = folds.train_indices(fold);
            let holdout = folds.holdout_indices(fold);
            let x = train.values().select(Axis(0), &fit_rows);
            let fold_y = y.select(Axis(0), &fit_rows);
            let scaled = Standardized::new(&x);
            let path = fit_path(&scaled.x, &fold_y, &lambdas, &self.config);

            let hx = train.values().select(Axis(0), &holdout);
            let hy = y.select(Axis(0), &holdout);
            path.iter()
                .map(|point| {
                    let (b0, beta) = scaled.unscale(point);
                    deviance(&(hx.dot(&beta) + b0), &hy)
                })
                .collect::<Vec<_>>()
        });

        let path = fit_path(&full.x, &y, &lambdas, &self.config);
        let cv = lambdas
            .iter()
            .enumerate()
            .map(|(i, &lambda)| {
                let stats = DescriptiveStats::new(fold_deviances.iter().map(|d| d[i]))
                    .expect("at least two folds");
                CvPoint {
                    lambda,
                    mean_deviance: stats.mean,
                    std_error: stats.std_error,
                    nonzero: path[i].beta.iter().filter(|&&b| b != 0.0).count(),
                }
            })
            .collect::<Vec<_>>();

        let (min_idx, selected_idx) = select_penalty(&cv);
        let point = &path[selected_idx];
        let (intercept, coefficients) = full.unscale(point);

        let mut warnings = vec![];
        if let Some(bad) = path[..=selected_idx].iter().find(|p| !p.converged) {
            warnings.push(FitWarning::PenaltyPathNotConverged { lambda: bad.lambda });
        }

        tracing::info!(
            lambda = cv[selected_idx].lambda,
            lambda_min = cv[min_idx].lambda,
            nonzero = cv[selected_idx].nonzero,
            features = train.n_cols(),
            "fitted lasso model"
        );

        let fit = LassoFit {
            intercept,
            coefficients: coefficients.to_vec(),
            lambda: cv[selected_idx].lambda,
            lambda_min: cv[min_idx].lambda,
            cv,
        };
        Ok(FittedModel::new(
            self.name(),
            train.columns().clone(),
            fit,
            warnings,
        ))
    }
}

/// `count` penalties from `lambda_max` down to `lambda_max * ratio`,
/// evenly spaced on the log scale.
#[must_use]
pub fn log_grid(lambda_max: f64, ratio: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![lambda_max],
        _ => {
            #[expect(clippy::cast_precision_loss)]
            let last = (count - 1) as f64;
            (0..count)
                .map(|k| {
                    #[expect(clippy::cast_precision_loss)]
                    let t = k as f64 / last;
                    lambda_max * ratio.powf(t)
                })
                .collect()
        }
    }
}

/// Indices of the minimum-deviance penalty and of the one-standard-error
/// penalty in `cv`, which is ordered by decreasing penalty.
///
/// Ties on the minimum resolve to the smallest penalty. The selected penalty
/// is the largest whose mean deviance does not exceed the minimum plus its
/// standard error.
#[must_use]
pub fn select_penalty(cv: &[CvPoint]) -> (usize, usize) {
    let mut min_idx = cv.len() - 1;
    for i in (0..cv.len()).rev() {
        if cv[i].mean_deviance < cv[min_idx].mean_deviance {
            min_idx = i;
        }
    }
    let bound = cv[min_idx].mean_deviance + cv[min_idx].std_error;
    let selected = (0..=min_idx)
        .find(|&i| cv[i].mean_deviance <= bound)
        .unwrap_or(min_idx);
    (min_idx, selected)
}

/// Mean binomial deviance of log-odds `eta` against 0/1 labels `y`.
fn deviance(eta: &Array1<f64>, y: &Array1<f64>) -> f64 {
    let total = eta
        .iter()
        .zip(y)
        .map(|(&e, &t)| {
            let p = sigmoid(e).clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
            t * p.ln() + (1.0 - t) * (1.0 - p).ln()
        })
        .sum::<f64>();
    #[expect(clippy::cast_precision_loss)]
    let n = y.len() as f64;
    -2.0 * total / n
}

/// Column-standardized copy of a matrix.
///
/// Uses the population (`1/n`) standard deviation. Constant columns get a
/// zero scale and are excluded from fitting.
struct Standardized {
    x: Array2<f64>,
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl Standardized {
    fn new(values: &Array2<f64>) -> Self {
        let (n, p) = values.dim();
        let mut x = values.clone();
        let mut mean = Array1::zeros(p);
        let mut scale = Array1::zeros(p);
        if n == 0 {
            return Self { x, mean, scale };
        }
        for (j, mut column) in x.axis_iter_mut(Axis(1)).enumerate() {
            let m = column.mean().unwrap_or(0.0);
            let sd = column.mapv(|v| (v - m).powi(2)).mean().unwrap_or(0.0).sqrt();
            mean[j] = m;
            if sd > 1e-12 * m.abs().max(1.0) {
                scale[j] = sd;
                column.mapv_inplace(|v| (v - m) / sd);
            } else {
                column.fill(0.0);
            }
        }
        Self { x, mean, scale }
    }

    /// Smallest penalty at which every coefficient is zero.
    fn lambda_max(&self, y: &Array1<f64>) -> f64 {
        #[expect(clippy::cast_precision_loss)]
        let n = y.len() as f64;
        let ybar = y.mean().unwrap_or(0.0);
        let centered = y.mapv(|t| t - ybar);
        self.x
            .t()
            .dot(&centered)
            .iter()
            .fold(0.0_f64, |m, &g| m.max(g.abs() / n))
    }

    /// Input-scale intercept and coefficients of a standardized fit.
    fn unscale(&self, point: &PathPoint) -> (f64, Array1<f64>) {
        let beta = point
            .beta
            .iter()
            .zip(&self.scale)
            .map(|(&b, &s)| if s > 0.0 { b / s } else { 0.0 })
            .collect::<Array1<f64>>();
        let intercept = point.intercept - beta.dot(&self.mean);
        (intercept, beta)
    }
}

/// Standardized-scale fit at one penalty.
#[derive(Debug, Clone)]
struct PathPoint {
    lambda: f64,
    intercept: f64,
    beta: Array1<f64>,
    converged: bool,
}

fn soft_threshold(value: f64, lambda: f64) -> f64 {
    if value > lambda {
        value - lambda
    } else if value < -lambda {
        value + lambda
    } else {
        0.0
    }
}

/// Fit the whole penalty path, warm-starting each penalty from the previous.
fn fit_path(x: &Array2<f64>, y: &Array1<f64>, lambdas: &[f64], config: &LassoConfig) -> Vec<PathPoint> {
    let (n, p) = x.dim();
    #[expect(clippy::cast_precision_loss)]
    let nf = n as f64;
    let active = (0..p)
        .filter(|&j| x.column(j).iter().any(|&v| v != 0.0))
        .collect::<Vec<_>>();

    let ybar = y.mean().unwrap_or(0.5).clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
    let mut b0 = (ybar / (1.0 - ybar)).ln();
    let mut beta = Array1::<f64>::zeros(p);

    let mut path = Vec::with_capacity(lambdas.len());
    for &lambda in lambdas {
        let mut converged = false;
        for _ in 0..MAX_OUTER_ITERATIONS {
            let eta = x.dot(&beta) + b0;
            let mu = eta.mapv(|e| sigmoid(e).clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR));
            let w = mu.mapv(|m| m * (1.0 - m));
            // working residual z - eta
            let mut r = (y - &mu) / &w;
            let w_sum = w.sum();
            let xw2 = active
                .iter()
                .map(|&j| x.column(j).iter().zip(&w).map(|(v, wi)| wi * v * v).sum::<f64>() / nf)
                .collect::<Vec<_>>();

            let beta_before = beta.clone();
            let b0_before = b0;
            for _ in 0..config.max_iterations {
                let mut max_change = 0.0_f64;

                let d0 = w.iter().zip(&r).map(|(wi, ri)| wi * ri).sum::<f64>() / w_sum;
                b0 += d0;
                r.mapv_inplace(|ri| ri - d0);
                max_change = max_change.max(d0.abs());

                for (&j, &curvature) in active.iter().zip(&xw2) {
                    let xj = x.column(j);
                    let old = beta[j];
                    let gradient = xj
                        .iter()
                        .zip(&w)
                        .zip(&r)
                        .map(|((v, wi), ri)| wi * v * ri)
                        .sum::<f64>()
                        / nf;
                    let new = soft_threshold(gradient + curvature * old, lambda) / curvature;
                    let delta = new - old;
                    if delta != 0.0 {
                        r.scaled_add(-delta, &xj);
                        beta[j] = new;
                        max_change = max_change.max(delta.abs());
                    }
                }
                if max_change < config.tolerance {
                    break;
                }
            }

            let outer_change = beta
                .iter()
                .zip(&beta_before)
                .fold((b0 - b0_before).abs(), |m, (a, b)| m.max((a - b).abs()));
            if outer_change < OUTER_TOLERANCE {
                converged = true;
                break;
            }
        }
        tracing::trace!(lambda, converged, "penalty path point");
        path.push(PathPoint {
            lambda,
            intercept: b0,
            beta: beta.clone(),
            converged,
        });
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::ModelParams,
        testutil::{matrix, synthetic},
    };

    fn point(lambda: f64, mean_deviance: f64, std_error: f64) -> CvPoint {
        CvPoint {
            lambda,
            mean_deviance,
            std_error,
            nonzero: 0,
        }
    }

    #[test]
    fn test_one_standard_error_rule() {
        let cv = [
            point(1.0, 1.30, 0.02),
            point(0.5, 1.12, 0.02),
            point(0.25, 1.06, 0.02),
            point(0.125, 1.05, 0.03),
            point(0.0625, 1.07, 0.03),
        ];
        // minimum at 0.125; bound 1.08; largest penalty within it is 0.25
        assert_eq!(select_penalty(&cv), (3, 2));
    }

    #[test]
    fn test_minimum_ties_resolve_to_smallest_penalty() {
        let cv = [point(1.0, 1.3, 0.0), point(0.5, 1.0, 0.0), point(0.25, 1.0, 0.0)];
        let (min_idx, selected) = select_penalty(&cv);
        assert_eq!(min_idx, 2);
        // with zero standard error the rule still prefers the larger tied penalty
        assert_eq!(selected, 1);
    }

    #[test]
    fn test_log_grid_endpoints() {
        let grid = log_grid(2.0, 1e-3, 50);
        assert_eq!(grid.len(), 50);
        assert!((grid[0] - 2.0).abs() < 1e-12);
        assert!((grid[49] - 2e-3).abs() < 1e-12);
        assert!(grid.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_lambda_max_zeros_every_coefficient() {
        let m = synthetic(300, 4);
        let y = classifier::label_vector(&m);
        let scaled = Standardized::new(m.values());
        let lambda_max = scaled.lambda_max(&y);
        let path = fit_path(
            &scaled.x,
            &y,
            &[lambda_max * 1.0001, lambda_max * 0.5],
            &LassoConfig::default(),
        );
        assert!(path[0].beta.iter().all(|&b| b == 0.0));
        assert!(path[1].beta.iter().any(|&b| b != 0.0));
    }

    #[test]
    fn test_tiny_penalty_matches_unpenalized_fit() {
        // 2×2 table: unpenalized slope is ln(3.5), intercept ln(3/7)
        let mut rows = vec![];
        let mut labels = vec![];
        for (x, fraud, legit) in [(0.0, 30, 70), (1.0, 60, 40)] {
            for i in 0..fraud + legit {
                rows.push(vec![x]);
                labels.push(i < fraud);
            }
        }
        let m = matrix(&["flag"], rows, labels);
        let y = classifier::label_vector(&m);
        let scaled = Standardized::new(m.values());
        let path = fit_path(&scaled.x, &y, &[1e-9], &LassoConfig::default());
        assert!(path[0].converged);
        let (b0, beta) = scaled.unscale(&path[0]);
        assert!((beta[0] - 3.5_f64.ln()).abs() < 1e-3);
        assert!((b0 - (3.0_f64 / 7.0).ln()).abs() < 1e-3);
    }

    #[test]
    fn test_cross_validated_fit_keeps_signal() {
        let m = synthetic(400, 21);
        let model = LassoTrainer::new(LassoConfig::default(), 8).fit(&m).unwrap();
        let ModelParams::Lasso(fit) = model.params() else {
            panic!("expected lasso params");
        };
        assert_eq!(fit.cv.len(), 50);
        assert!(fit.lambda >= fit.lambda_min);
        assert!(fit.coefficients[0] > 0.5);

        let ranked = model.influence_ranking(&classifier::InfluencePolicy::default());
        assert_eq!(ranked[0].feature, "signal");
        assert!(ranked.iter().all(|r| r.score != 0.0));
    }

    #[test]
    fn test_same_seed_same_selection() {
        let m = synthetic(200, 5);
        let fit = |seed| {
            let model = LassoTrainer::new(LassoConfig::default(), seed).fit(&m).unwrap();
            match model.params() {
                ModelParams::Lasso(fit) => fit.clone(),
                _ => unreachable!(),
            }
        };
        assert_eq!(fit(3), fit(3));
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let m = synthetic(100, 1);
        let config = LassoConfig {
            lambdas: Some(vec![0.1, -1.0]),
            ..LassoConfig::default()
        };
        assert_eq!(
            LassoTrainer::new(config, 0).fit(&m).unwrap_err(),
            FitError::EmptyPenaltyGrid
        );
    }

    #[test]
    fn test_constant_features_have_no_generated_grid() {
        let rows = (0..40).map(|i| vec![3.0, f64::from(i % 2)]).collect();
        // the second column alternates within each class, so it carries no signal
        let labels = (0..40).map(|i| (i / 2) % 2 == 0).collect();
        let m = matrix(&["constant", "alternating"], rows, labels);
        assert_eq!(
            LassoTrainer::new(LassoConfig::default(), 0).fit(&m).unwrap_err(),
            FitError::NoInformativeFeature
        );

        let rows = (0..40).map(|_| vec![3.0]).collect();
        let labels = (0..40).map(|i| i < 20).collect();
        let m = matrix(&["constant"], rows, labels);
        assert_eq!(
            LassoTrainer::new(LassoConfig::default(), 0).fit(&m).unwrap_err(),
            FitError::NoInformativeFeature
        );
    }
}

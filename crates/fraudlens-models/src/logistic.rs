//! Linear risk model: logistic regression fitted by IRLS
//!
//! Maximizes the binomial log-likelihood with Newton steps
//! (iteratively reweighted least squares). Standard errors come from the
//! inverse Fisher information at the final estimate and significance from a
//! two-sided Wald test.
//!
//! The model does no feature selection. Which columns it sees is decided by
//! the feature schema.

use fraudlens_features::matrix::FeatureMatrix;
use fraudlens_stats::normal;
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use serde::{Deserialize, Serialize};

use crate::classifier::{
    self, Classifier, FitError, FitWarning, FittedModel, InfluencePolicy, RankedFeature, sigmoid,
};

/// Pivots below this fraction of the largest diagonal entry count as zero.
const PIVOT_FLOOR: f64 = 1e-12;

/// Name of the intercept term in reports.
pub const INTERCEPT: &str = "(intercept)";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub max_iterations: usize,
    /// Converged when the largest absolute Newton step is below this.
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-8,
        }
    }
}

/// One estimated term with its Wald statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub feature: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z: f64,
    pub p_value: f64,
}

impl Coefficient {
    fn new(feature: &str, estimate: f64, variance: Option<f64>) -> Self {
        let std_error = variance.map_or(f64::NAN, |v| v.max(0.0).sqrt());
        let z = estimate / std_error;
        Self {
            feature: feature.to_owned(),
            estimate,
            std_error,
            z,
            p_value: normal::two_sided_p_value(z),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticFit {
    pub intercept: Coefficient,
    pub coefficients: Vec<Coefficient>,
    pub iterations: usize,
    pub converged: bool,
}

impl LogisticFit {
    pub(crate) fn log_odds(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.intercept.estimate
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c.estimate * x)
                .sum::<f64>()
    }

    pub(crate) fn ranking(&self, policy: &InfluencePolicy) -> Vec<RankedFeature> {
        let mut significant = self
            .coefficients
            .iter()
            .filter(|c| c.p_value < policy.significance)
            .collect::<Vec<_>>();
        significant.sort_by(|a, b| {
            a.p_value
                .total_cmp(&b.p_value)
                .then_with(|| b.estimate.abs().total_cmp(&a.estimate.abs()))
        });
        significant
            .into_iter()
            .take(policy.top_n)
            .map(|c| RankedFeature {
                feature: c.feature.clone(),
                score: c.estimate,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogisticTrainer {
    config: LogisticConfig,
}

impl LogisticTrainer {
    #[must_use]
    pub fn new(config: LogisticConfig) -> Self {
        Self { config }
    }
}

impl Classifier for LogisticTrainer {
    fn name(&self) -> &str {
        "logistic"
    }

    fn fit(&self, train: &FeatureMatrix) -> Result<FittedModel, FitError> {
        classifier::check_trainable(train)?;

        let (n, p) = train.values().dim();
        let mut x = Array2::<f64>::ones((n, p + 1));
        x.slice_mut(s![.., 1..]).assign(train.values());
        let y = classifier::label_vector(train);

        let mut beta = Array1::<f64>::zeros(p + 1);
        let mut iterations = 0;
        let mut converged = false;
        for iteration in 1..=self.config.max_iterations {
            iterations = iteration;
            let (info, mu) = information(&x, &beta);
            let Some(chol) = factorize(&info) else {
                break;
            };
            let step = solve(&chol, &x.t().dot(&(&y - &mu)));
            let next = &beta + &step;
            if next.iter().any(|b| !b.is_finite()) {
                break;
            }
            beta = next;
            let largest = step.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
            tracing::trace!(iteration, largest, "IRLS step");
            if largest < self.config.tolerance {
                converged = true;
                break;
            }
        }

        let mut warnings = vec![];
        if !converged {
            warnings.push(FitWarning::NotConverged { iterations });
        }
        let (info, mu) = information(&x, &beta);
        let covariance = factorize(&info).map(|c| c.inverse());
        if covariance.is_none() {
            warnings.push(FitWarning::SingularInformation);
        }
        let eps = 10.0 * f64::EPSILON;
        if mu.iter().any(|&m| m < eps || m > 1.0 - eps) {
            warnings.push(FitWarning::FittedProbabilitiesSaturated);
        }

        let variance = |j: usize| covariance.as_ref().map(|c| c[(j, j)]);
        let fit = LogisticFit {
            intercept: Coefficient::new(INTERCEPT, beta[0], variance(0)),
            coefficients: train
                .columns()
                .iter()
                .enumerate()
                .map(|(j, name)| Coefficient::new(name, beta[j + 1], variance(j + 1)))
                .collect(),
            iterations,
            converged,
        };
        tracing::info!(
            features = p,
            rows = n,
            iterations,
            converged,
            "fitted logistic model"
        );
        Ok(FittedModel::new(
            self.name(),
            train.columns().clone(),
            fit,
            warnings,
        ))
    }
}

/// Fisher information `XᵀWX` and fitted means at `beta`.
fn information(x: &Array2<f64>, beta: &Array1<f64>) -> (Array2<f64>, Array1<f64>) {
    let mu = x.dot(beta).mapv(sigmoid);
    let w = mu.mapv(|m| m * (1.0 - m));
    let xw = x * &w.view().insert_axis(Axis(1));
    (x.t().dot(&xw), mu)
}

/// Cholesky factorization of the information matrix.
///
/// Returns `None` unless the matrix is numerically positive definite: every
/// squared pivot must exceed [`PIVOT_FLOOR`] times the largest diagonal entry.
fn factorize(info: &Array2<f64>) -> Option<Cholesky<f64, Dyn>> {
    let n = info.nrows();
    let scale = info.diag().iter().fold(0.0_f64, |m, &d| m.max(d.abs()));
    let floor = PIVOT_FLOOR * scale.max(f64::MIN_POSITIVE);
    let chol = DMatrix::from_fn(n, n, |i, j| info[[i, j]]).cholesky()?;
    let positive = chol
        .l_dirty()
        .diagonal()
        .iter()
        .all(|&d| d.is_finite() && d * d > floor);
    positive.then_some(chol)
}

fn solve(chol: &Cholesky<f64, Dyn>, rhs: &Array1<f64>) -> Array1<f64> {
    let b = DVector::from_iterator(rhs.len(), rhs.iter().copied());
    chol.solve(&b).iter().copied().collect()
}

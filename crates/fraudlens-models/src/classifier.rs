//! The shared classifier interface and fitted-model representation
//!
//! Every model family implements [`Classifier`]. Fitting produces a
//! [`FittedModel`]: the training column set, the family-specific parameters
//! ([`ModelParams`]), the decision threshold and any non-fatal
//! [`FitWarning`]s raised by the optimizer.
//!
//! A fitted model never changes after fitting. Predictions and influence
//! rankings are pure functions of it.

use fraudlens_features::matrix::{ColumnSet, FeatureMatrix};
use ndarray::{Array1, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::{boost::BoostedFit, lasso::LassoFit, logistic::LogisticFit};

/// Training input that no model can be fitted on.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("training matrix has no rows")]
    EmptyMatrix,
    #[display("training matrix contains a single class")]
    SingleClass,
    #[display("{folds} folds requested but the smaller class has {smallest_class} rows")]
    InvalidFolds { folds: usize, smallest_class: usize },
    #[display("penalty grid is empty or contains non-positive values")]
    EmptyPenaltyGrid,
    #[display("no feature is informative: every penalty zeroes all coefficients")]
    NoInformativeFeature,
    #[display("parameter {parameter} = {value} is out of range")]
    InvalidParameter { parameter: &'static str, value: f64 },
}

/// Non-fatal optimizer diagnostics. The fit is still usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitWarning {
    #[display("optimizer did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },
    #[display("information matrix is singular; standard errors are undefined")]
    SingularInformation,
    #[display("fitted probabilities numerically 0 or 1 occurred")]
    FittedProbabilitiesSaturated,
    #[display("coordinate descent did not converge at penalty {lambda:.3e}")]
    PenaltyPathNotConverged { lambda: f64 },
    #[display("a fold used the full budget of {rounds} rounds without early stopping")]
    RoundBudgetExhausted { rounds: usize },
}

/// A feature with its influence score under a model's native metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    pub feature: String,
    pub score: f64,
}

/// How many features an influence ranking keeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluencePolicy {
    /// Linear risk model: keep coefficients with `p < significance`.
    pub significance: f64,
    /// Keep at most this many features. The regularized model ignores this
    /// and returns every nonzero coefficient.
    pub top_n: usize,
}

impl Default for InfluencePolicy {
    fn default() -> Self {
        Self {
            significance: 0.001,
            top_n: 10,
        }
    }
}

/// Family-specific fitted parameters.
#[derive(Debug, Clone, derive_more::From, derive_more::IsVariant)]
pub enum ModelParams {
    Logistic(LogisticFit),
    Lasso(LassoFit),
    Boosted(BoostedFit),
}

impl ModelParams {
    fn log_odds(&self, row: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Logistic(fit) => fit.log_odds(row),
            Self::Lasso(fit) => fit.log_odds(row),
            Self::Boosted(fit) => fit.log_odds(row),
        }
    }
}

/// A capability to fit a binary classifier on a feature matrix.
pub trait Classifier {
    fn name(&self) -> &str;

    /// Fit on `train`.
    ///
    /// Optimizer trouble is reported through [`FittedModel::warnings`], not
    /// as an error.
    fn fit(&self, train: &FeatureMatrix) -> Result<FittedModel, FitError>;
}

#[derive(Debug, Clone)]
pub struct FittedModel {
    name: String,
    columns: ColumnSet,
    params: ModelParams,
    threshold: f64,
    warnings: Vec<FitWarning>,
}

impl FittedModel {
    pub(crate) fn new(
        name: &str,
        columns: ColumnSet,
        params: impl Into<ModelParams>,
        warnings: Vec<FitWarning>,
    ) -> Self {
        for warning in &warnings {
            tracing::warn!(model = name, "{warning}");
        }
        Self {
            name: name.to_owned(),
            columns,
            params: params.into(),
            threshold: 0.5,
            warnings,
        }
    }

    /// Replace the decision threshold (default `0.5`).
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column sequence the model was fitted on.
    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    #[must_use]
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn warnings(&self) -> &[FitWarning] {
        &self.warnings
    }

    /// Predicted fraud probability for every row.
    ///
    /// # Panics
    ///
    /// Panics if `matrix` does not have the model's column sequence.
    #[must_use]
    pub fn predict_proba(&self, matrix: &FeatureMatrix) -> Array1<f64> {
        assert_eq!(
            matrix.columns(),
            &self.columns,
            "matrix columns differ from the fitted columns"
        );
        matrix
            .values()
            .axis_iter(Axis(0))
            .map(|row| sigmoid(self.params.log_odds(row)))
            .collect()
    }

    /// Predicted class for every row: fraud iff `p >` [`Self::threshold`].
    ///
    /// # Panics
    ///
    /// Panics if `matrix` does not have the model's column sequence.
    #[must_use]
    pub fn predict(&self, matrix: &FeatureMatrix) -> Vec<bool> {
        self.predict_proba(matrix)
            .iter()
            .map(|&p| p > self.threshold)
            .collect()
    }

    /// Features ranked by the model family's native influence metric.
    ///
    /// - logistic: coefficients with `p < significance`, most significant
    ///   first, scored by the coefficient, at most `top_n`
    /// - lasso: every nonzero coefficient by decreasing magnitude
    /// - boosted: normalized split gain, at most `top_n`
    #[must_use]
    pub fn influence_ranking(&self, policy: &InfluencePolicy) -> Vec<RankedFeature> {
        match &self.params {
            ModelParams::Logistic(fit) => fit.ranking(policy),
            ModelParams::Lasso(fit) => fit.ranking(&self.columns),
            ModelParams::Boosted(fit) => fit.ranking(&self.columns, policy),
        }
    }
}

#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Reject matrices no model can be fitted on.
pub(crate) fn check_trainable(train: &FeatureMatrix) -> Result<(), FitError> {
    if train.n_rows() == 0 {
        return Err(FitError::EmptyMatrix);
    }
    let (fraud, legit) = train.class_counts();
    if fraud == 0 || legit == 0 {
        return Err(FitError::SingleClass);
    }
    Ok(())
}

pub(crate) fn label_vector(train: &FeatureMatrix) -> Array1<f64> {
    train
        .labels()
        .iter()
        .map(|&l| if l { 1.0 } else { 0.0 })
        .collect()
}

//! Model trainers for the fraud analysis pipeline
//!
//! Three model families share the [`Classifier`](classifier::Classifier)
//! interface. Each fits on a training [`FeatureMatrix`] and produces an
//! immutable [`FittedModel`](classifier::FittedModel) that predicts
//! probabilities and ranks features by the family's native influence metric.
//!
//! | family | module | fitting | influence |
//! |--------|--------|---------|-----------|
//! | linear risk model | [`logistic`] | IRLS | coefficient, filtered by Wald p-value |
//! | regularized linear model | [`lasso`] | coordinate descent, CV penalty, 1-SE rule | nonzero coefficients |
//! | gradient-boosted ensemble | [`boost`] | second-order boosting, CV early stopping | gain / cover / frequency |
//!
//! Optimizer trouble never aborts a fit: a non-convergent fit is returned
//! with [`FitWarning`](classifier::FitWarning)s attached. Only structurally
//! unusable input fails with [`FitError`](classifier::FitError).
//!
//! Cross-validation folds ([`folds`]) are seeded explicitly and evaluated
//! concurrently on scoped threads.
//!
//! [`FeatureMatrix`]: fraudlens_features::matrix::FeatureMatrix

pub mod boost;
pub mod classifier;
pub mod folds;
pub mod lasso;
pub mod logistic;

#[cfg(test)]
mod testutil;

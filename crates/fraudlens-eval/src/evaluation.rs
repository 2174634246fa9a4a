//! Evaluator: metrics of a fitted model on a reconciled matrix

use fraudlens_features::{
    align::{self, SchemaMismatchError},
    matrix::ReconciledMatrix,
};
use fraudlens_models::classifier::{FittedModel, InfluencePolicy, RankedFeature};
use fraudlens_stats::roc;
use serde::Serialize;

use crate::confusion::{ConfusionMatrix, DegenerateMatrixError};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvaluateError {
    #[display("{_0}")]
    SchemaMismatch(SchemaMismatchError),
    #[display("{_0}")]
    Degenerate(DegenerateMatrixError),
}

/// Metrics of one model on one evaluation set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub model_name: String,
    pub threshold: f64,
    pub accuracy: f64,
    pub sensitivity: f64,
    pub specificity: f64,
    pub balanced_accuracy: f64,
    /// ROC AUC of the predicted probabilities.
    pub auc: Option<f64>,
    pub confusion: ConfusionMatrix,
    pub ranked_features: Vec<RankedFeature>,
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    policy: InfluencePolicy,
}

impl Evaluator {
    #[must_use]
    pub fn new(policy: InfluencePolicy) -> Self {
        Self { policy }
    }

    /// Score `model` on `matrix` at the model's own decision threshold.
    ///
    /// # Errors
    ///
    /// - [`EvaluateError::SchemaMismatch`] if the matrix columns are not the
    ///   model's fitted columns
    /// - [`EvaluateError::Degenerate`] if the matrix lacks a class
    pub fn evaluate(
        &self,
        model: &FittedModel,
        matrix: &ReconciledMatrix,
    ) -> Result<EvaluationResult, EvaluateError> {
        align::verify(model.columns(), matrix)?;

        let threshold = model.threshold();
        let predicted = model.predict(matrix);
        let proba = model.predict_proba(matrix).to_vec();
        let confusion = ConfusionMatrix::tally(&predicted, matrix.labels());
        let rates = confusion.rates()?;
        let auc = roc::auc(&proba, matrix.labels());

        tracing::info!(
            model = model.name(),
            threshold,
            accuracy = rates.accuracy,
            balanced_accuracy = rates.balanced_accuracy,
            "evaluated model"
        );

        Ok(EvaluationResult {
            model_name: model.name().to_owned(),
            threshold,
            accuracy: rates.accuracy,
            sensitivity: rates.sensitivity,
            specificity: rates.specificity,
            balanced_accuracy: rates.balanced_accuracy,
            auc,
            confusion,
            ranked_features: model.influence_ranking(&self.policy),
        })
    }
}

#[cfg(test)]
mod tests {
    use fraudlens_features::matrix::{ColumnSet, FeatureMatrix};
    use fraudlens_models::{
        classifier::Classifier as _,
        logistic::LogisticTrainer,
    };
    use ndarray::Array2;

    use super::*;

    fn matrix(columns: &[&str], xs: &[f64], labels: &[bool]) -> FeatureMatrix {
        let p = columns.len();
        let n = labels.len();
        let values = Array2::from_shape_fn((n, p), |(i, j)| if j == 0 { xs[i] } else { 0.0 });
        FeatureMatrix::new(
            columns.iter().copied().collect::<ColumnSet>(),
            (0..n).map(|i| format!("r{i}")).collect(),
            values,
            labels.to_vec(),
        )
    }

    fn train() -> FeatureMatrix {
        // x = 1 is mostly fraud, x = 0 mostly legitimate
        let mut xs = vec![];
        let mut labels = vec![];
        for (x, fraud, legit) in [(0.0, 20, 80), (1.0, 80, 20)] {
            for i in 0..fraud + legit {
                xs.push(x);
                labels.push(i < fraud);
            }
        }
        matrix(&["flag"], &xs, &labels)
    }

    #[test]
    fn test_evaluate_reports_rates() {
        let train = train();
        let model = LogisticTrainer::default().fit(&train).unwrap();
        let eval = matrix(
            &["flag", "job=pilot"],
            &[1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            &[true, true, true, false, false, false],
        );
        let reconciled = align::reconcile(train.columns(), &eval).unwrap();
        let result = Evaluator::default().evaluate(&model, &reconciled).unwrap();

        // p = 0.8 for flag = 1, p = 0.2 for flag = 0
        assert_eq!(
            result.confusion,
            ConfusionMatrix {
                tp: 2,
                fp: 1,
                tn: 2,
                fn_: 1
            }
        );
        assert!((result.sensitivity - 2.0 / 3.0).abs() < 1e-12);
        assert!((result.specificity - 2.0 / 3.0).abs() < 1e-12);
        assert!((result.balanced_accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.model_name, "logistic");
        assert!(result.auc.is_some());
        assert_eq!(result.ranked_features[0].feature, "flag");
    }

    #[test]
    fn test_threshold_is_strict() {
        let train = train();
        let model = LogisticTrainer::default().fit(&train).unwrap();
        let eval = matrix(&["flag", "job=chef"], &[1.0, 0.0], &[true, false]);
        let reconciled = align::reconcile(train.columns(), &eval).unwrap();

        let below = model.clone().with_threshold(0.79);
        let at_fit = Evaluator::default().evaluate(&below, &reconciled).unwrap();
        assert_eq!(at_fit.confusion.tp, 1);
        assert!((at_fit.threshold - 0.79).abs() < f64::EPSILON);
        let above = model.with_threshold(0.81);
        let above = Evaluator::default().evaluate(&above, &reconciled).unwrap();
        assert_eq!(above.confusion.tp, 0);
        assert_eq!(above.confusion.fn_, 1);
    }

    #[test]
    fn test_foreign_columns_are_rejected() {
        let train = train();
        let model = LogisticTrainer::default().fit(&train).unwrap();
        let eval = matrix(&["flag", "job=chef"], &[1.0, 0.0], &[true, false]);
        let other = ["flag", "job=chef"].into_iter().collect::<ColumnSet>();
        let reconciled = align::reconcile(&other, &eval).unwrap();
        let err = Evaluator::default()
            .evaluate(&model, &reconciled)
            .unwrap_err();
        assert!(matches!(err, EvaluateError::SchemaMismatch(_)));
    }

    #[test]
    fn test_single_class_eval_set_is_degenerate() {
        let train = train();
        let model = LogisticTrainer::default().fit(&train).unwrap();
        let eval = matrix(&["flag", "job=chef"], &[1.0, 0.0], &[false, false]);
        let reconciled = align::reconcile(train.columns(), &eval).unwrap();
        let err = Evaluator::default()
            .evaluate(&model, &reconciled)
            .unwrap_err();
        assert!(matches!(err, EvaluateError::Degenerate(_)));
    }
}

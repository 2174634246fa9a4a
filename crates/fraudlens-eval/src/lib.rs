//! Evaluation of fitted models
//!
//! The [`Evaluator`](evaluation::Evaluator) scores a
//! [`FittedModel`](fraudlens_models::classifier::FittedModel) on a
//! [`ReconciledMatrix`](fraudlens_features::matrix::ReconciledMatrix): it
//! re-verifies the column sequence, predicts with the model-specific decision
//! threshold and derives accuracy, sensitivity, specificity and balanced
//! accuracy from the [`ConfusionMatrix`](confusion::ConfusionMatrix).
//!
//! An evaluation set missing a class yields
//! [`DegenerateMatrixError`](confusion::DegenerateMatrixError). The failure is
//! local to that evaluation; other models can still be scored.

pub mod confusion;
pub mod evaluation;

//! The analysis run: derive, sample, then encode, fit and evaluate each model
//!
//! # Failure scopes
//!
//! - A record that fails derivation is dropped or aborts the run, per
//!   [`DerivePolicy`](fraudlens_data::derive::DerivePolicy)
//! - Too few records for the requested sample sizes aborts the run before any
//!   model is fitted
//! - A reconciled column sequence that differs from the training columns
//!   aborts the run
//! - A model that cannot be fitted, or whose evaluation set lacks a class, is
//!   reported as failed; the other models still run

use fraudlens_data::{
    derive::{DeriveSummary, DerivedTable, FieldDeriver},
    record::{DerivedRecord, RawRecord},
    sampling::{BalancedSampler, BalancedSplit},
};
use fraudlens_eval::evaluation::{EvaluateError, EvaluationResult, Evaluator};
use fraudlens_features::{align, encoder::CategoricalEncoder};
use fraudlens_models::{
    boost::{BoostTrainer, ImportanceKind, StoppingMetric},
    classifier::{Classifier, FitWarning, FittedModel, ModelParams, RankedFeature},
    lasso::LassoTrainer,
    logistic::{Coefficient, LogisticTrainer},
};
use serde::Serialize;

use crate::config::{ModelSection, PipelineConfig};

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Effective configuration, reference date resolved.
    pub config: PipelineConfig,
    pub derive: DeriveSummary,
    pub split: SplitSizes,
    pub models: Vec<ModelReport>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SplitSizes {
    pub seed: u64,
    pub train: usize,
    pub eval: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub name: String,
    pub threshold: f64,
    /// Number of training columns.
    pub columns: usize,
    /// Training columns the evaluation set never produced.
    pub zero_filled: Vec<String>,
    /// Evaluation columns unknown to the model.
    pub dropped_columns: Vec<String>,
    pub warnings: Vec<FitWarning>,
    pub details: Option<ModelDetails>,
    pub outcome: ModelOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome {
    Evaluated(EvaluationResult),
    Failed { error: String },
}

/// Family-specific facts about a fitted model.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelDetails {
    Logistic {
        /// Intercept first, then one entry per column.
        coefficients: Vec<Coefficient>,
        iterations: usize,
        converged: bool,
    },
    Lasso {
        lambda: f64,
        lambda_min: f64,
        nonzero: usize,
        penalties: usize,
    },
    Boosted {
        rounds: usize,
        metric: StoppingMetric,
        cv_metric: Option<f64>,
        gain: Vec<RankedFeature>,
        cover: Vec<RankedFeature>,
        frequency: Vec<RankedFeature>,
    },
}

impl ModelDetails {
    fn of(model: &FittedModel) -> Self {
        match model.params() {
            ModelParams::Logistic(fit) => Self::Logistic {
                coefficients: std::iter::once(&fit.intercept)
                    .chain(&fit.coefficients)
                    .cloned()
                    .collect(),
                iterations: fit.iterations,
                converged: fit.converged,
            },
            ModelParams::Lasso(fit) => Self::Lasso {
                lambda: fit.lambda,
                lambda_min: fit.lambda_min,
                nonzero: fit.coefficients.iter().filter(|b| **b != 0.0).count(),
                penalties: fit.cv.len(),
            },
            ModelParams::Boosted(fit) => Self::Boosted {
                rounds: fit.rounds,
                metric: fit.metric,
                cv_metric: fit
                    .rounds
                    .checked_sub(1)
                    .and_then(|i| fit.cv_curve.get(i))
                    .copied(),
                gain: fit.importance_ranking(model.columns(), ImportanceKind::Gain),
                cover: fit.importance_ranking(model.columns(), ImportanceKind::Cover),
                frequency: fit.importance_ranking(model.columns(), ImportanceKind::Frequency),
            },
        }
    }
}

/// Derive every raw record against the configured reference date.
pub fn derive(config: &PipelineConfig, raws: &[RawRecord]) -> anyhow::Result<DerivedTable> {
    let deriver = FieldDeriver::new(config.reference_date());
    Ok(deriver.derive_all(raws, config.policy)?)
}

/// Draw the balanced train/eval split.
pub fn sample(config: &PipelineConfig, records: &[DerivedRecord]) -> anyhow::Result<BalancedSplit> {
    let sampler = BalancedSampler::new(config.train_per_class, config.eval_per_class, config.seed);
    Ok(sampler.sample(records)?)
}

/// Run the full analysis on `raws`.
pub fn analyze(config: &PipelineConfig, raws: &[RawRecord]) -> anyhow::Result<AnalysisReport> {
    let config = PipelineConfig {
        reference_date: Some(config.reference_date()),
        ..config.clone()
    };
    let table = derive(&config, raws)?;
    let split = sample(&config, &table.records)?;
    let (train, eval) = split.partition(&table.records);

    let evaluator = Evaluator::new(config.influence);
    let models = vec![
        run_model(
            &LogisticTrainer::new(config.logistic.fit),
            &config.logistic,
            &train,
            &eval,
            &evaluator,
        )?,
        run_model(
            &LassoTrainer::new(config.lasso.fit.clone(), config.seed),
            &config.lasso,
            &train,
            &eval,
            &evaluator,
        )?,
        run_model(
            &BoostTrainer::new(config.boosted.fit.clone(), config.seed),
            &config.boosted,
            &train,
            &eval,
            &evaluator,
        )?,
    ];

    Ok(AnalysisReport {
        derive: table.summary,
        split: SplitSizes {
            seed: config.seed,
            train: split.train.len(),
            eval: split.eval.len(),
        },
        models,
        config,
    })
}

fn run_model<C>(
    trainer: &dyn Classifier,
    section: &ModelSection<C>,
    train: &[&DerivedRecord],
    eval: &[&DerivedRecord],
    evaluator: &Evaluator,
) -> anyhow::Result<ModelReport> {
    let name = trainer.name();
    let encoder = CategoricalEncoder::new(section.schema.clone());
    let train_matrix = encoder.encode(train);
    let eval_matrix = align::reconcile(train_matrix.columns(), &encoder.encode_candidate(eval))?;
    tracing::info!(
        model = name,
        columns = train_matrix.n_cols(),
        zero_filled = eval_matrix.zero_filled().len(),
        dropped = eval_matrix.dropped().len(),
        "encoded feature matrices"
    );

    let (warnings, details, outcome) = match trainer.fit(&train_matrix) {
        Ok(model) => {
            let model = model.with_threshold(section.threshold);
            let outcome = match evaluator.evaluate(&model, &eval_matrix) {
                Ok(result) => ModelOutcome::Evaluated(result),
                Err(EvaluateError::Degenerate(e)) => {
                    tracing::error!(model = name, "evaluation failed: {e}");
                    ModelOutcome::Failed {
                        error: e.to_string(),
                    }
                }
                Err(EvaluateError::SchemaMismatch(e)) => return Err(e.into()),
            };
            (
                model.warnings().to_vec(),
                Some(ModelDetails::of(&model)),
                outcome,
            )
        }
        Err(e) => {
            tracing::error!(model = name, "fit failed: {e}");
            let outcome = ModelOutcome::Failed {
                error: e.to_string(),
            };
            (vec![], None, outcome)
        }
    };

    Ok(ModelReport {
        name: name.to_owned(),
        threshold: section.threshold,
        columns: train_matrix.n_cols(),
        zero_filled: eval_matrix.zero_filled().to_vec(),
        dropped_columns: eval_matrix.dropped().to_vec(),
        warnings,
        details,
        outcome,
    })
}

//! Pipeline configuration
//!
//! Loaded from an optional JSON file; every field has a default, so `{}` is
//! a valid configuration. Command-line flags override the loaded values.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use fraudlens_data::derive::DerivePolicy;
use fraudlens_features::{
    column::{CategoricalColumn, NumericColumn},
    encoder::{FeatureSchema, LevelEncoding},
};
use fraudlens_models::{
    boost::BoostConfig, classifier::InfluencePolicy, lasso::LassoConfig, logistic::LogisticConfig,
};
use serde::{Deserialize, Serialize};

use crate::util;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Date ages are computed against. Defaults to today (UTC).
    pub reference_date: Option<NaiveDate>,
    pub seed: u64,
    pub train_per_class: usize,
    pub eval_per_class: usize,
    pub policy: DerivePolicy,
    pub influence: InfluencePolicy,
    pub logistic: ModelSection<LogisticConfig>,
    pub lasso: ModelSection<LassoConfig>,
    pub boosted: ModelSection<BoostConfig>,
    pub profile: ProfileConfig,
}

/// Columns, decision threshold and fitting parameters of one model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSection<C> {
    pub schema: FeatureSchema,
    pub threshold: f64,
    #[serde(default)]
    pub fit: C,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Levels seen fewer times than this are left out of rate tables.
    pub min_count: usize,
    pub top_n: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            min_count: 30,
            top_n: 10,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            seed: 42,
            train_per_class: 1000,
            eval_per_class: 500,
            policy: DerivePolicy::Drop,
            influence: InfluencePolicy::default(),
            logistic: ModelSection {
                schema: FeatureSchema {
                    numeric: vec![
                        NumericColumn::Amount,
                        NumericColumn::Age,
                        NumericColumn::TimeOfDay,
                    ],
                    categorical: vec![CategoricalColumn::Category],
                    standardize: true,
                    encoding: LevelEncoding::DropReference,
                },
                threshold: 0.5,
                fit: LogisticConfig::default(),
            },
            lasso: ModelSection {
                schema: FeatureSchema {
                    numeric: vec![
                        NumericColumn::Amount,
                        NumericColumn::Age,
                        NumericColumn::TimeOfDay,
                        NumericColumn::CityPop,
                        NumericColumn::DistanceKm,
                    ],
                    categorical: vec![
                        CategoricalColumn::Category,
                        CategoricalColumn::Job,
                        CategoricalColumn::State,
                        CategoricalColumn::HourOfDay,
                    ],
                    standardize: true,
                    encoding: LevelEncoding::DropReference,
                },
                threshold: 0.48,
                fit: LassoConfig::default(),
            },
            boosted: ModelSection {
                schema: FeatureSchema {
                    numeric: NumericColumn::ALL.to_vec(),
                    categorical: vec![
                        CategoricalColumn::Category,
                        CategoricalColumn::HourOfDay,
                        CategoricalColumn::DayOfWeek,
                        CategoricalColumn::State,
                    ],
                    standardize: false,
                    encoding: LevelEncoding::AllLevels,
                },
                threshold: 0.5,
                fit: BoostConfig::default(),
            },
            profile: ProfileConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => util::read_json_file("config", path),
            None => Ok(Self::default()),
        }
    }

    /// The configured reference date, or today.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_document_overrides_fields() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{
                "seed": 7,
                "reference_date": "2020-12-31",
                "policy": "abort",
                "lasso": {
                    "schema": { "numeric": ["amount"], "categorical": ["job"] },
                    "threshold": 0.45,
                    "fit": { "folds": 5 }
                },
                "boosted": {
                    "schema": { "numeric": ["log_amount"], "categorical": [], "encoding": "all_levels" },
                    "threshold": 0.6,
                    "fit": { "metric": "error", "patience": 20 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.reference_date(), NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
        assert_eq!(config.policy, DerivePolicy::Abort);
        assert_eq!(config.lasso.schema.categorical, [CategoricalColumn::Job]);
        assert!(config.lasso.schema.standardize);
        assert_eq!(config.lasso.fit.folds, 5);
        assert_eq!(config.lasso.fit.n_lambda, 50);
        assert!((config.boosted.threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.boosted.fit.patience, 20);
        assert_eq!(config.boosted.fit.max_rounds, 1000);
        assert_eq!(config.train_per_class, 1000);
    }

    #[test]
    fn test_default_thresholds_per_model() {
        let config = PipelineConfig::default();
        assert!((config.logistic.threshold - 0.5).abs() < f64::EPSILON);
        assert!((config.lasso.threshold - 0.48).abs() < f64::EPSILON);
        assert!((config.boosted.threshold - 0.5).abs() < f64::EPSILON);
    }
}

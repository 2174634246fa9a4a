//! Categorical Encoder
//!
//! Turns a set of derived records into a [`FeatureMatrix`] according to a
//! [`FeatureSchema`]. Numeric columns come first, in schema order, followed by
//! the indicator columns of each categorical column in schema order. Within a
//! categorical column, levels are ordered lexicographically.
//!
//! The set of levels is discovered from the records being encoded, so two
//! matrices built from different record sets can disagree on their columns.
//! [`align::reconcile`](crate::align::reconcile) resolves that disagreement.

use std::collections::{BTreeSet, HashMap};

use fraudlens_data::record::DerivedRecord;
use fraudlens_stats::descriptive::DescriptiveStats;
use ndarray::{Array2, ArrayViewMut1};
use serde::{Deserialize, Serialize};

use crate::{
    column::{CategoricalColumn, NumericColumn},
    matrix::{ColumnSet, FeatureMatrix},
};

/// How the levels of a categorical column become indicator columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelEncoding {
    /// One indicator per observed level except the first, which becomes the
    /// baseline absorbed by the intercept.
    #[default]
    DropReference,
    /// One indicator per observed level.
    AllLevels,
}

/// Columns and encoding options for one model family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub numeric: Vec<NumericColumn>,
    pub categorical: Vec<CategoricalColumn>,
    #[serde(default = "default_standardize")]
    pub standardize: bool,
    #[serde(default)]
    pub encoding: LevelEncoding,
}

fn default_standardize() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    schema: FeatureSchema,
}

impl CategoricalEncoder {
    #[must_use]
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Encode `records` under the schema's own level encoding.
    ///
    /// Use this for the reference (training) matrix.
    #[must_use]
    pub fn encode(&self, records: &[&DerivedRecord]) -> FeatureMatrix {
        self.encode_with(records, self.schema.encoding)
    }

    /// Encode `records` keeping an indicator for every observed level.
    ///
    /// A matrix that is going to be reconciled against a reference must not
    /// drop its own first level: its baseline can differ from the
    /// reference's, and the reference may hold an indicator for it.
    #[must_use]
    pub fn encode_candidate(&self, records: &[&DerivedRecord]) -> FeatureMatrix {
        self.encode_with(records, LevelEncoding::AllLevels)
    }

    fn encode_with(&self, records: &[&DerivedRecord], encoding: LevelEncoding) -> FeatureMatrix {
        let numeric = dedup(&self.schema.numeric);
        let categorical = dedup(&self.schema.categorical);

        let mut names = numeric.iter().map(ToString::to_string).collect::<Vec<_>>();
        let mut indicator_index = HashMap::new();
        for &column in &categorical {
            let levels = records
                .iter()
                .map(|r| column.level(r).into_owned())
                .collect::<BTreeSet<_>>();
            let skip = match encoding {
                LevelEncoding::DropReference => 1,
                LevelEncoding::AllLevels => 0,
            };
            for level in levels.into_iter().skip(skip) {
                indicator_index.insert((column, level.clone()), names.len());
                names.push(column.indicator_name(&level));
            }
        }

        let mut values = Array2::zeros((records.len(), names.len()));
        for (i, record) in records.iter().enumerate() {
            for (j, column) in numeric.iter().enumerate() {
                values[[i, j]] = column.value(record);
            }
            for &column in &categorical {
                let key = (column, column.level(record).into_owned());
                if let Some(&j) = indicator_index.get(&key) {
                    values[[i, j]] = 1.0;
                }
            }
        }

        if self.schema.standardize {
            for j in 0..numeric.len() {
                standardize(values.column_mut(j));
            }
        }

        tracing::debug!(
            rows = records.len(),
            numeric = numeric.len(),
            indicators = names.len() - numeric.len(),
            ?encoding,
            "encoded feature matrix"
        );

        FeatureMatrix::new(
            ColumnSet::new(names),
            records.iter().map(|r| r.id().to_owned()).collect(),
            values,
            records.iter().map(|r| r.is_fraud()).collect(),
        )
    }
}

fn dedup<T: Copy + PartialEq>(items: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for &item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Center on the column mean and scale to unit sample variance.
///
/// A constant column is only centered.
fn standardize(mut column: ArrayViewMut1<'_, f64>) {
    let Some(stats) = DescriptiveStats::new(column.iter().copied()) else {
        return;
    };
    let scale = if stats.std_dev > 0.0 && stats.std_dev.is_finite() {
        stats.std_dev
    } else {
        1.0
    };
    column.mapv_inplace(|x| (x - stats.mean) / scale);
}

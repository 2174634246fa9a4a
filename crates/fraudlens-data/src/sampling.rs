//! Class-balanced train/evaluation sampling
//!
//! [`BalancedSampler`] draws a training set with `train_per_class` records of
//! each label and then, from the records left over, an evaluation set with
//! `eval_per_class` records of each label.
//!
//! # Reproducibility
//!
//! The sampler owns its seed. Drawing uses a PCG generator seeded from it, so
//! the same seed and the same input order always produce the same split,
//! independent of platform or of any process-wide random state.
//!
//! # Guarantees
//!
//! - Train and evaluation sets never share an identifier; this is re-checked
//!   after drawing by intersecting the identifier sets
//! - Each set holds exactly as many fraud as legitimate records
//!
//! # Example
//!
//! ```no_run
//! use fraudlens_data::{record::DerivedRecord, sampling::BalancedSampler};
//!
//! let records: Vec<DerivedRecord> = vec![]; // derived records
//! let sampler = BalancedSampler::new(1000, 500, 42);
//! let split = sampler.sample(&records).unwrap();
//! let (train, eval) = split.partition(&records);
//! assert_eq!(train.len(), 2000);
//! assert_eq!(eval.len(), 1000);
//! ```

use std::collections::HashSet;

use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::record::{DerivedRecord, Label};

/// Requested balanced sample sizes exceed what a class can supply.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "class {label} has {available} records but {required} are needed \
     ({train_per_class} train + {eval_per_class} eval)"
)]
pub struct InsufficientDataError {
    pub label: Label,
    pub available: usize,
    pub required: usize,
    pub train_per_class: usize,
    pub eval_per_class: usize,
}

/// Failure to produce a valid split.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SampleError {
    #[display("{_0}")]
    InsufficientData(InsufficientDataError),
    /// Train and eval share an identifier. Only possible when the input
    /// contains duplicate identifiers.
    #[display("train and eval sets share {count} identifier(s), e.g. '{example}'")]
    #[from(ignore)]
    Overlap { count: usize, example: String },
}

/// Two disjoint, class-balanced sets of record positions.
///
/// Positions index into the slice passed to [`BalancedSampler::sample`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedSplit {
    pub train: Vec<usize>,
    pub eval: Vec<usize>,
}

/// Identifier view of a [`BalancedSplit`], for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIds {
    pub seed: u64,
    pub train: Vec<String>,
    pub eval: Vec<String>,
}

impl BalancedSplit {
    /// Borrow the train and eval records out of `records`.
    #[must_use]
    pub fn partition<'a>(
        &self,
        records: &'a [DerivedRecord],
    ) -> (Vec<&'a DerivedRecord>, Vec<&'a DerivedRecord>) {
        let pick = |idx: &[usize]| idx.iter().map(|&i| &records[i]).collect();
        (pick(&self.train), pick(&self.eval))
    }

    #[must_use]
    pub fn ids(&self, records: &[DerivedRecord], seed: u64) -> SplitIds {
        let ids = |idx: &[usize]| idx.iter().map(|&i| records[i].id().to_owned()).collect();
        SplitIds {
            seed,
            train: ids(&self.train),
            eval: ids(&self.eval),
        }
    }

    /// Check that no identifier appears in both sets.
    pub fn verify_disjoint(&self, records: &[DerivedRecord]) -> Result<(), SampleError> {
        let train_ids = self
            .train
            .iter()
            .map(|&i| records[i].id())
            .collect::<HashSet<_>>();
        let shared = self
            .eval
            .iter()
            .map(|&i| records[i].id())
            .filter(|id| train_ids.contains(id))
            .collect::<Vec<_>>();
        match shared.first() {
            None => Ok(()),
            Some(example) => Err(SampleError::Overlap {
                count: shared.len(),
                example: (*example).to_owned(),
            }),
        }
    }
}

/// Seeded class-balanced sampler.
#[derive(Debug, Clone, Copy)]
pub struct BalancedSampler {
    train_per_class: usize,
    eval_per_class: usize,
    seed: u64,
}

impl BalancedSampler {
    #[must_use]
    pub fn new(train_per_class: usize, eval_per_class: usize, seed: u64) -> Self {
        Self {
            train_per_class,
            eval_per_class,
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw a balanced split from `records`.
    ///
    /// Fails before drawing anything if either class has fewer than
    /// `train_per_class + eval_per_class` records.
    pub fn sample(&self, records: &[DerivedRecord]) -> Result<BalancedSplit, SampleError> {
        let required = self.train_per_class + self.eval_per_class;
        let mut pools = Label::ALL.map(|label| {
            records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.label == label)
                .map(|(i, _)| i)
                .collect::<Vec<_>>()
        });

        for (label, pool) in Label::ALL.iter().zip(&pools) {
            if pool.len() < required {
                return Err(InsufficientDataError {
                    label: *label,
                    available: pool.len(),
                    required,
                    train_per_class: self.train_per_class,
                    eval_per_class: self.eval_per_class,
                }
                .into());
            }
        }

        let mut rng = Pcg32::seed_from_u64(self.seed);

        // train draws come first for both classes, then eval draws from the remainder
        let mut train = Vec::with_capacity(2 * self.train_per_class);
        for pool in &mut pools {
            pool.shuffle(&mut rng);
            train.extend(pool.drain(..self.train_per_class));
        }
        let mut eval = Vec::with_capacity(2 * self.eval_per_class);
        for pool in &mut pools {
            pool.shuffle(&mut rng);
            eval.extend(pool.drain(..self.eval_per_class));
        }

        let split = BalancedSplit { train, eval };
        split.verify_disjoint(records)?;

        tracing::info!(
            seed = self.seed,
            train = split.train.len(),
            eval = split.eval.len(),
            "drew balanced split"
        );
        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::derive::{FieldDeriver, tests::raw};

    fn records(fraud: usize, legit: usize) -> Vec<DerivedRecord> {
        let deriver = FieldDeriver::new(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        (0..fraud + legit)
            .map(|i| {
                let label = if i < fraud { "1" } else { "0" };
                deriver
                    .derive(&raw(&format!("t{i}"), "01-05-2020 12:30", label))
                    .unwrap()
            })
            .collect()
    }

    fn count(records: &[DerivedRecord], idx: &[usize], label: Label) -> usize {
        idx.iter().filter(|&&i| records[i].label == label).count()
    }

    #[test]
    fn test_split_is_balanced_and_disjoint() {
        let records = records(40, 200);
        let split = BalancedSampler::new(10, 5, 7).sample(&records).unwrap();

        assert_eq!(count(&records, &split.train, Label::Fraud), 10);
        assert_eq!(count(&records, &split.train, Label::Legit), 10);
        assert_eq!(count(&records, &split.eval, Label::Fraud), 5);
        assert_eq!(count(&records, &split.eval, Label::Legit), 5);

        let train = split.train.iter().collect::<HashSet<_>>();
        assert!(split.eval.iter().all(|i| !train.contains(i)));
        assert!(split.verify_disjoint(&records).is_ok());
    }

    #[test]
    fn test_same_seed_same_split() {
        let records = records(40, 200);
        let a = BalancedSampler::new(12, 8, 99).sample(&records).unwrap();
        let b = BalancedSampler::new(12, 8, 99).sample(&records).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.ids(&records, 99), b.ids(&records, 99));

        let c = BalancedSampler::new(12, 8, 100).sample(&records).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_insufficient_positive_class() {
        let records = records(14, 200);
        let err = BalancedSampler::new(10, 5, 1).sample(&records).unwrap_err();
        assert_eq!(
            err,
            SampleError::InsufficientData(InsufficientDataError {
                label: Label::Fraud,
                available: 14,
                required: 15,
                train_per_class: 10,
                eval_per_class: 5,
            })
        );
    }

    #[test]
    fn test_exact_class_size_uses_every_record() {
        let records = records(15, 15);
        let split = BalancedSampler::new(10, 5, 3).sample(&records).unwrap();
        let mut all = split.train.iter().chain(&split.eval).copied().collect::<Vec<_>>();
        all.sort_unstable();
        assert_eq!(all, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_identifiers_are_reported() {
        let mut records = records(30, 30);
        for r in &mut records {
            r.raw.id = "same".to_owned();
        }
        let err = BalancedSampler::new(10, 5, 3).sample(&records).unwrap_err();
        assert!(matches!(err, SampleError::Overlap { .. }));
    }
}

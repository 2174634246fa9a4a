//! Stratified k-fold cross-validation
//!
//! Rows are split into `k` folds so that every fold holds (up to rounding) the
//! same share of each class. Assignment is seeded and depends only on the
//! seed and the label sequence.
//!
//! [`map_folds`] runs one closure per fold on its own scoped thread. Each
//! closure writes only to its own result slot and results come back in fold
//! order, so aggregation never depends on thread scheduling.

use std::thread;

use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;

use crate::classifier::FitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldAssignment {
    fold_of: Vec<usize>,
    k: usize,
}

impl FoldAssignment {
    /// Assign each row to one of `k` folds, stratified by label.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidFolds`] unless `2 <= k <= n` where `n` is
    /// the size of the smaller class, which guarantees every holdout fold
    /// contains both classes.
    pub fn stratified(labels: &[bool], k: usize, seed: u64) -> Result<Self, FitError> {
        let positives = labels.iter().filter(|&&l| l).count();
        let smallest_class = positives.min(labels.len() - positives);
        if k < 2 || k > smallest_class {
            return Err(FitError::InvalidFolds {
                folds: k,
                smallest_class,
            });
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut fold_of = vec![0; labels.len()];
        let mut next = 0;
        for class in [true, false] {
            let mut rows = (0..labels.len())
                .filter(|&i| labels[i] == class)
                .collect::<Vec<_>>();
            rows.shuffle(&mut rng);
            for row in rows {
                fold_of[row] = next;
                next = (next + 1) % k;
            }
        }
        Ok(Self { fold_of, k })
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn fold_of(&self, row: usize) -> usize {
        self.fold_of[row]
    }

    /// Rows used for fitting when `fold` is held out.
    #[must_use]
    pub fn train_indices(&self, fold: usize) -> Vec<usize> {
        self.rows_where(|f| f != fold)
    }

    #[must_use]
    pub fn holdout_indices(&self, fold: usize) -> Vec<usize> {
        self.rows_where(|f| f == fold)
    }

    fn rows_where(&self, pred: impl Fn(usize) -> bool) -> Vec<usize> {
        self.fold_of
            .iter()
            .enumerate()
            .filter(|&(_, &f)| pred(f))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Evaluate `f` for every fold concurrently, returning results in fold order.
pub fn map_folds<T, F>(k: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let mut slots = (0..k).map(|_| None).collect::<Vec<Option<T>>>();
    let f = &f;
    thread::scope(|s| {
        for (fold, slot) in slots.iter_mut().enumerate() {
            s.spawn(move || {
                *slot = Some(f(fold));
            });
        }
    });
    slots
        .into_iter()
        .map(|slot| slot.expect("every fold thread fills its slot"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pos: usize, neg: usize) -> Vec<bool> {
        (0..pos + neg).map(|i| i < pos).collect()
    }

    #[test]
    fn test_folds_are_stratified_and_cover_all_rows() {
        let labels = labels(20, 30);
        let folds = FoldAssignment::stratified(&labels, 5, 11).unwrap();

        let mut seen = vec![false; labels.len()];
        for fold in 0..5 {
            let holdout = folds.holdout_indices(fold);
            let pos = holdout.iter().filter(|&&i| labels[i]).count();
            assert_eq!(pos, 4);
            assert_eq!(holdout.len(), 10);
            for &i in &holdout {
                assert!(!seen[i]);
                seen[i] = true;
            }
            assert_eq!(folds.train_indices(fold).len(), 40);
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn test_assignment_is_seeded() {
        let labels = labels(10, 10);
        let a = FoldAssignment::stratified(&labels, 3, 5).unwrap();
        let b = FoldAssignment::stratified(&labels, 3, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_many_folds_rejected() {
        let labels = labels(3, 10);
        assert_eq!(
            FoldAssignment::stratified(&labels, 4, 0),
            Err(FitError::InvalidFolds {
                folds: 4,
                smallest_class: 3
            })
        );
        assert!(FoldAssignment::stratified(&labels, 1, 0).is_err());
    }

    #[test]
    fn test_map_folds_keeps_fold_order() {
        let out = map_folds(6, |fold| fold * 10);
        assert_eq!(out, [0, 10, 20, 30, 40, 50]);
    }
}

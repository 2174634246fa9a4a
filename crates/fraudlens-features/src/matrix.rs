//! Feature matrices and their column sets
//!
//! A [`FeatureMatrix`] is a dense `rows × columns` array of `f64` with a
//! named, ordered [`ColumnSet`], one record identifier per row and one binary
//! label per row (`true` = fraud).
//!
//! A [`ReconciledMatrix`] is a feature matrix whose column sequence has been
//! verified against a reference column set. It can only be obtained through
//! [`align::reconcile`](crate::align::reconcile), so holding one is proof that
//! the column identity and order match the matrix a model was fitted on.

use std::{collections::HashMap, ops::Deref};

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Named, ordered set of feature columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSet {
    names: Vec<String>,
}

impl ColumnSet {
    /// # Panics
    ///
    /// Panics if `names` contains duplicates.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let this = Self { names };
        assert_eq!(
            this.index().len(),
            this.names.len(),
            "column names must be unique"
        );
        this
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn name(&self, position: usize) -> &str {
        &self.names[position]
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Lookup table from column name to position.
    #[must_use]
    pub fn index(&self) -> HashMap<&str, usize> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect()
    }
}

impl<S> FromIterator<S> for ColumnSet
where
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Dense feature matrix with identifiers and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: ColumnSet,
    ids: Vec<String>,
    values: Array2<f64>,
    labels: Vec<bool>,
}

impl FeatureMatrix {
    /// # Panics
    ///
    /// Panics if the shape of `values` disagrees with `columns`, `ids` or `labels`.
    #[must_use]
    pub fn new(columns: ColumnSet, ids: Vec<String>, values: Array2<f64>, labels: Vec<bool>) -> Self {
        assert_eq!(values.ncols(), columns.len(), "column count mismatch");
        assert_eq!(values.nrows(), ids.len(), "identifier count mismatch");
        assert_eq!(values.nrows(), labels.len(), "label count mismatch");
        Self {
            columns,
            ids,
            values,
            labels,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    #[must_use]
    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// Number of fraud and legitimate rows.
    #[must_use]
    pub fn class_counts(&self) -> (usize, usize) {
        let fraud = self.labels.iter().filter(|&&l| l).count();
        (fraud, self.labels.len() - fraud)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .position(name)
            .map(|j| self.values.column(j))
    }

    /// A new matrix holding only `rows`, in the given order.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            ids: rows.iter().map(|&i| self.ids[i].clone()).collect(),
            values: self.values.select(Axis(0), rows),
            labels: rows.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

/// A feature matrix verified to share its column sequence with a reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledMatrix {
    matrix: FeatureMatrix,
    zero_filled: Vec<String>,
    dropped: Vec<String>,
}

impl ReconciledMatrix {
    pub(crate) fn new(matrix: FeatureMatrix, zero_filled: Vec<String>, dropped: Vec<String>) -> Self {
        Self {
            matrix,
            zero_filled,
            dropped,
        }
    }

    /// Reference columns absent from the candidate, filled with zeros.
    #[must_use]
    pub fn zero_filled(&self) -> &[String] {
        &self.zero_filled
    }

    /// Candidate columns absent from the reference, dropped.
    #[must_use]
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    #[must_use]
    pub fn into_inner(self) -> FeatureMatrix {
        self.matrix
    }
}

impl Deref for ReconciledMatrix {
    type Target = FeatureMatrix;

    fn deref(&self) -> &Self::Target {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn matrix() -> FeatureMatrix {
        FeatureMatrix::new(
            ["a", "b"].into_iter().collect(),
            vec!["r0".into(), "r1".into(), "r2".into()],
            array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            vec![true, false, true],
        )
    }

    #[test]
    fn test_select_rows_keeps_rows_in_order() {
        let m = matrix().select_rows(&[2, 0]);
        assert_eq!(m.ids(), ["r2", "r0"]);
        assert_eq!(m.values(), &array![[5.0, 6.0], [1.0, 2.0]]);
        assert_eq!(m.labels(), [true, true]);
        assert_eq!(m.columns(), matrix().columns());
    }

    #[test]
    fn test_class_counts_and_column_lookup() {
        let m = matrix();
        assert_eq!(m.class_counts(), (2, 1));
        assert_eq!(m.column("b").unwrap().to_vec(), vec![2.0, 4.0, 6.0]);
        assert!(m.column("c").is_none());
    }

    #[test]
    #[should_panic(expected = "column names must be unique")]
    fn test_duplicate_columns_rejected() {
        let _ = ["a", "a"].into_iter().collect::<ColumnSet>();
    }
}

//! Schema reconciliation
//!
//! Re-expresses a candidate matrix over a reference column set: shared
//! columns are copied, reference-only columns are zero-filled and
//! candidate-only columns are dropped. The result's column sequence equals
//! the reference exactly, which [`verify`] checks before a
//! [`ReconciledMatrix`] is handed out.

use ndarray::Array2;

use crate::matrix::{ColumnSet, FeatureMatrix, ReconciledMatrix};

/// The column sequence of a matrix differs from its reference.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "column sequence mismatch at position {position}: expected {}, found {}",
    show(expected.as_deref()),
    show(found.as_deref())
)]
pub struct SchemaMismatchError {
    /// First position at which the sequences differ.
    pub position: usize,
    pub expected: Option<String>,
    pub found: Option<String>,
}

fn show(name: Option<&str>) -> String {
    name.map_or_else(|| "<none>".to_owned(), |n| format!("'{n}'"))
}

/// Check that `matrix` has exactly the `reference` columns, in order.
pub fn verify(reference: &ColumnSet, matrix: &FeatureMatrix) -> Result<(), SchemaMismatchError> {
    let expected = reference.as_slice();
    let found = matrix.columns().as_slice();
    let len = expected.len().max(found.len());
    match (0..len).find(|&i| expected.get(i) != found.get(i)) {
        None => Ok(()),
        Some(position) => Err(SchemaMismatchError {
            position,
            expected: expected.get(position).cloned(),
            found: found.get(position).cloned(),
        }),
    }
}

/// Re-express `candidate` over the `reference` column set.
#[must_use]
pub fn align(reference: &ColumnSet, candidate: &FeatureMatrix) -> FeatureMatrix {
    align_parts(reference, candidate).0
}

/// Align `candidate` to `reference` and verify the result.
///
/// # Errors
///
/// Returns [`SchemaMismatchError`] if the aligned column sequence is not
/// identical to `reference`.
pub fn reconcile(
    reference: &ColumnSet,
    candidate: &FeatureMatrix,
) -> Result<ReconciledMatrix, SchemaMismatchError> {
    let (matrix, zero_filled, dropped) = align_parts(reference, candidate);
    verify(reference, &matrix)?;

    if !zero_filled.is_empty() || !dropped.is_empty() {
        tracing::info!(
            zero_filled = zero_filled.len(),
            dropped = dropped.len(),
            "reconciled feature matrix against reference columns"
        );
        tracing::debug!(?zero_filled, ?dropped, "reconciliation detail");
    }
    Ok(ReconciledMatrix::new(matrix, zero_filled, dropped))
}

fn align_parts(
    reference: &ColumnSet,
    candidate: &FeatureMatrix,
) -> (FeatureMatrix, Vec<String>, Vec<String>) {
    let candidate_index = candidate.columns().index();
    let reference_index = reference.index();
    let source = candidate.values();

    let mut values = Array2::zeros((candidate.n_rows(), reference.len()));
    let mut zero_filled = vec![];
    for (j, name) in reference.iter().enumerate() {
        match candidate_index.get(name) {
            Some(&k) => values.column_mut(j).assign(&source.column(k)),
            None => zero_filled.push(name.to_owned()),
        }
    }
    let dropped = candidate
        .columns()
        .iter()
        .filter(|name| !reference_index.contains_key(name))
        .map(str::to_owned)
        .collect();

    let matrix = FeatureMatrix::new(
        reference.clone(),
        candidate.ids().to_vec(),
        values,
        candidate.labels().to_vec(),
    );
    (matrix, zero_filled, dropped)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn candidate() -> FeatureMatrix {
        FeatureMatrix::new(
            ["amount", "job=pilot", "job=chef"].into_iter().collect(),
            vec!["e0".into(), "e1".into()],
            array![[1.5, 1.0, 0.0], [-0.5, 0.0, 1.0]],
            vec![true, false],
        )
    }

    fn reference() -> ColumnSet {
        ["amount", "job=chef", "job=actor"].into_iter().collect()
    }

    #[test]
    fn test_aligned_columns_equal_reference() {
        let reference = reference();
        let m = reconcile(&reference, &candidate()).unwrap();

        assert_eq!(m.columns(), &reference);
        // shared columns copied unchanged
        assert_eq!(m.column("amount").unwrap().to_vec(), [1.5, -0.5]);
        assert_eq!(m.column("job=chef").unwrap().to_vec(), [0.0, 1.0]);
        // reference-only columns are zero
        assert_eq!(m.column("job=actor").unwrap().to_vec(), [0.0, 0.0]);
        assert_eq!(m.zero_filled(), ["job=actor"]);
        assert_eq!(m.dropped(), ["job=pilot"]);
        // rows are untouched
        assert_eq!(m.ids(), ["e0", "e1"]);
        assert_eq!(m.labels(), [true, false]);
    }

    #[test]
    fn test_align_is_identity_on_matching_columns() {
        let m = candidate();
        assert_eq!(align(m.columns(), &m), m);
    }

    #[test]
    fn test_align_twice_equals_align_once() {
        let reference = reference();
        let once = align(&reference, &candidate());
        let twice = align(&reference, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reordered_reference_is_followed() {
        let reference = ["job=chef", "amount"].into_iter().collect::<ColumnSet>();
        let m = align(&reference, &candidate());
        assert_eq!(m.values(), &array![[0.0, 1.5], [1.0, -0.5]]);
    }

    #[test]
    fn test_verify_reports_first_difference() {
        let err = verify(&reference(), &candidate()).unwrap_err();
        assert_eq!(err.position, 1);
        assert_eq!(err.expected.as_deref(), Some("job=chef"));
        assert_eq!(err.found.as_deref(), Some("job=pilot"));
        assert_eq!(
            err.to_string(),
            "column sequence mismatch at position 1: expected 'job=chef', found 'job=pilot'"
        );

        let short = ["amount"].into_iter().collect::<ColumnSet>();
        let err = verify(&short, &candidate()).unwrap_err();
        assert_eq!(err.position, 1);
        assert_eq!(err.expected, None);
        assert_eq!(
            err.to_string(),
            "column sequence mismatch at position 1: expected <none>, found 'job=pilot'"
        );
    }
}

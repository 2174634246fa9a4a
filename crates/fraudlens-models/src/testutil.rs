use fraudlens_features::matrix::{ColumnSet, FeatureMatrix};
use ndarray::Array2;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::classifier::sigmoid;

pub(crate) fn matrix(columns: &[&str], rows: Vec<Vec<f64>>, labels: Vec<bool>) -> FeatureMatrix {
    let n = rows.len();
    let p = columns.len();
    let values = Array2::from_shape_vec((n, p), rows.into_iter().flatten().collect()).unwrap();
    FeatureMatrix::new(
        columns.iter().copied().collect::<ColumnSet>(),
        (0..n).map(|i| format!("r{i}")).collect(),
        values,
        labels,
    )
}

/// `signal` drives the label through `p = sigmoid(3 * signal)`; `noise` is
/// independent of it.
pub(crate) fn synthetic(n: usize, seed: u64) -> FeatureMatrix {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for _ in 0..n {
        let signal = rng.random_range(-1.0..1.0);
        let noise = rng.random_range(-1.0..1.0);
        labels.push(rng.random::<f64>() < sigmoid(3.0 * signal));
        rows.push(vec![signal, noise]);
    }
    matrix(&["signal", "noise"], rows, labels)
}

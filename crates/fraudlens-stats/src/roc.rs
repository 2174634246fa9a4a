//! Area under the ROC curve.

use std::iter;

/// Computes the ROC AUC of `scores` against binary `labels`.
///
/// Uses the Mann-Whitney rank statistic: the probability that a randomly
/// chosen positive scores higher than a randomly chosen negative, with ties
/// counted as one half.
///
/// # Returns
///
/// * `Some(auc)` - in `[0, 1]`
/// * `None` - if either class is absent
///
/// # Panics
///
/// Panics if `scores` and `labels` have different lengths.
///
/// # Examples
///
/// ```
/// use fraudlens_stats::roc::auc;
///
/// let scores = [0.1, 0.4, 0.35, 0.8];
/// let labels = [false, false, true, true];
/// assert_eq!(auc(&scores, &labels), Some(0.75));
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn auc(scores: &[f64], labels: &[bool]) -> Option<f64> {
    assert_eq!(scores.len(), labels.len());

    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order = (0..scores.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // average 1-based ranks over runs of tied scores
    let mut pos_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let pos_in_run = order[start..end].iter().filter(|&&i| labels[i]).count();
        pos_rank_sum += avg_rank * pos_in_run as f64;
        start = end;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Fraction of thresholded predictions that disagree with the labels.
///
/// A score strictly greater than `threshold` is a positive prediction.
/// Returns `NaN` for empty input.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn error_rate(scores: &[f64], labels: &[bool], threshold: f64) -> f64 {
    assert_eq!(scores.len(), labels.len());
    let wrong = iter::zip(scores, labels)
        .filter(|&(s, l)| (*s > threshold) != *l)
        .count();
    wrong as f64 / scores.len() as f64
}

//! Confusion matrix and the rates derived from it

use serde::{Deserialize, Serialize};

/// The evaluation set lacks one class entirely, so a rate is undefined.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("evaluation set of {total} rows contains no {missing} rows")]
pub struct DegenerateMatrixError {
    pub missing: &'static str,
    pub total: usize,
}

/// Counts of predicted × actual outcomes, fraud being the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

/// Rates computed from a non-degenerate confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub accuracy: f64,
    /// `TP / (TP + FN)`
    pub sensitivity: f64,
    /// `TN / (TN + FP)`
    pub specificity: f64,
    /// Mean of sensitivity and specificity.
    pub balanced_accuracy: f64,
}

impl ConfusionMatrix {
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    #[must_use]
    pub fn tally(predicted: &[bool], actual: &[bool]) -> Self {
        assert_eq!(predicted.len(), actual.len(), "prediction count mismatch");
        let mut m = Self::default();
        for (&p, &a) in predicted.iter().zip(actual) {
            match (p, a) {
                (true, true) => m.tp += 1,
                (true, false) => m.fp += 1,
                (false, false) => m.tn += 1,
                (false, true) => m.fn_ += 1,
            }
        }
        m
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn rates(&self) -> Result<Rates, DegenerateMatrixError> {
        let positives = self.tp + self.fn_;
        let negatives = self.tn + self.fp;
        let missing = if positives == 0 {
            Some("fraud")
        } else if negatives == 0 {
            Some("legitimate")
        } else {
            None
        };
        if let Some(missing) = missing {
            return Err(DegenerateMatrixError {
                missing,
                total: self.total(),
            });
        }

        let sensitivity = self.tp as f64 / positives as f64;
        let specificity = self.tn as f64 / negatives as f64;
        Ok(Rates {
            accuracy: (self.tp + self.tn) as f64 / self.total() as f64,
            sensitivity,
            specificity,
            balanced_accuracy: (sensitivity + specificity) / 2.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_balanced_accuracy_literals() {
        // sensitivity 9/11, specificity 8/10
        let m = ConfusionMatrix {
            tp: 9,
            fp: 2,
            tn: 8,
            fn_: 2,
        };
        let r = m.rates().unwrap();
        assert!(close(r.sensitivity, 0.818));
        assert!(close(r.specificity, 0.8));
        assert!(close(r.balanced_accuracy, 0.809));
        assert!(close(r.accuracy, 17.0 / 21.0));
    }

    #[test]
    fn test_rates_follow_count_definitions() {
        let m = ConfusionMatrix {
            tp: 8,
            fp: 2,
            tn: 9,
            fn_: 1,
        };
        let r = m.rates().unwrap();
        assert!((r.sensitivity - 8.0 / 9.0).abs() < 1e-12);
        assert!((r.specificity - 9.0 / 11.0).abs() < 1e-12);
        assert!((r.balanced_accuracy - (8.0 / 9.0 + 9.0 / 11.0) / 2.0).abs() < 1e-12);
        assert!((r.accuracy - 17.0 / 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_tally() {
        let predicted = [true, true, false, false, true];
        let actual = [true, false, false, true, true];
        assert_eq!(
            ConfusionMatrix::tally(&predicted, &actual),
            ConfusionMatrix {
                tp: 2,
                fp: 1,
                tn: 1,
                fn_: 1
            }
        );
    }

    #[test]
    fn test_missing_class_is_degenerate() {
        let m = ConfusionMatrix::tally(&[true, false], &[false, false]);
        assert_eq!(
            m.rates().unwrap_err(),
            DegenerateMatrixError {
                missing: "fraud",
                total: 2
            }
        );
        let m = ConfusionMatrix::tally(&[true], &[true]);
        assert_eq!(m.rates().unwrap_err().missing, "legitimate");
    }
}

//! Per-class profiles of derived records
//!
//! Fraud rate per categorical level and per-class descriptive statistics of
//! numeric columns. These summaries are computed on the full derived table,
//! before any sampling.

use std::collections::BTreeMap;

use fraudlens_data::record::DerivedRecord;
use fraudlens_stats::descriptive::DescriptiveStats;

use crate::column::{CategoricalColumn, NumericColumn};

/// Fraud rate of one categorical level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRate {
    pub level: String,
    pub count: usize,
    pub fraud: usize,
    pub rate: f64,
}

/// Fraud rate of every level of `column` seen at least `min_count` times.
///
/// Sorted by rate descending, then by level.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn fraud_rate_by_level(
    records: &[DerivedRecord],
    column: CategoricalColumn,
    min_count: usize,
) -> Vec<LevelRate> {
    let mut counts = BTreeMap::<String, (usize, usize)>::new();
    for record in records {
        let entry = counts.entry(column.level(record).into_owned()).or_default();
        entry.0 += 1;
        if record.is_fraud() {
            entry.1 += 1;
        }
    }

    let mut rates = counts
        .into_iter()
        .filter(|(_, (count, _))| *count >= min_count.max(1))
        .map(|(level, (count, fraud))| LevelRate {
            level,
            count,
            fraud,
            rate: fraud as f64 / count as f64,
        })
        .collect::<Vec<_>>();
    rates.sort_by(|a, b| b.rate.total_cmp(&a.rate).then_with(|| a.level.cmp(&b.level)));
    rates
}

/// Descriptive statistics of one numeric column, split by class.
#[derive(Debug, Clone)]
pub struct ClassSummary {
    pub column: NumericColumn,
    pub fraud: Option<DescriptiveStats>,
    pub legit: Option<DescriptiveStats>,
}

#[must_use]
pub fn summarize_by_class(records: &[DerivedRecord], column: NumericColumn) -> ClassSummary {
    let values = |fraud: bool| {
        records
            .iter()
            .filter(move |r| r.is_fraud() == fraud)
            .map(move |r| column.value(r))
    };
    ClassSummary {
        column,
        fraud: DescriptiveStats::new(values(true)),
        legit: DescriptiveStats::new(values(false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::record;

    fn records() -> Vec<DerivedRecord> {
        vec![
            record("a", "travel", "01-05-2020 23:15", "1", 900.0),
            record("b", "travel", "01-05-2020 22:00", "1", 700.0),
            record("c", "travel", "02-05-2020 10:00", "0", 50.0),
            record("d", "food", "02-05-2020 12:00", "0", 10.0),
            record("e", "food", "03-05-2020 13:00", "1", 30.0),
            record("f", "food", "03-05-2020 14:00", "0", 20.0),
            record("g", "gas", "04-05-2020 09:00", "0", 40.0),
        ]
    }

    #[test]
    fn test_rates_sorted_descending() {
        let rates = fraud_rate_by_level(&records(), CategoricalColumn::Category, 1);
        let levels = rates.iter().map(|r| r.level.as_str()).collect::<Vec<_>>();
        assert_eq!(levels, ["travel", "food", "gas"]);
        assert_eq!(rates[0].count, 3);
        assert_eq!(rates[0].fraud, 2);
        assert!((rates[0].rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((rates[2].rate).abs() < f64::EPSILON);
    }

    #[test]
    fn test_min_count_filters_rare_levels() {
        let rates = fraud_rate_by_level(&records(), CategoricalColumn::Category, 2);
        assert!(rates.iter().all(|r| r.level != "gas"));
        assert_eq!(rates.len(), 2);
    }

    #[test]
    fn test_class_summary_splits_by_label() {
        let summary = summarize_by_class(&records(), NumericColumn::Amount);
        let fraud = summary.fraud.unwrap();
        let legit = summary.legit.unwrap();
        assert_eq!(fraud.count, 3);
        assert_eq!(legit.count, 4);
        assert_eq!(fraud.median, 700.0);
        assert_eq!(legit.max, 50.0);
    }
}

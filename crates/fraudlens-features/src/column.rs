//! Enumerated feature columns
//!
//! Every column a feature matrix can be built from is a variant of
//! [`NumericColumn`] or [`CategoricalColumn`]. Configuration names columns by
//! their snake_case id (`"time_of_day"`, `"category"`), which round-trips
//! through [`FromStr`] and serde.

use std::{borrow::Cow, str::FromStr};

use fraudlens_data::record::DerivedRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown {kind} column '{name}'")]
pub struct UnknownColumnError {
    pub kind: &'static str,
    pub name: String,
}

/// A real-valued column taken directly from a derived record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    #[display("amount")]
    Amount,
    #[display("log_amount")]
    LogAmount,
    #[display("hour")]
    Hour,
    #[display("minute")]
    Minute,
    #[display("time_of_day")]
    TimeOfDay,
    #[display("day_of_week")]
    DayOfWeek,
    #[display("age")]
    Age,
    #[display("city_pop")]
    CityPop,
    #[display("distance_km")]
    DistanceKm,
}

impl NumericColumn {
    pub const ALL: [Self; 9] = [
        Self::Amount,
        Self::LogAmount,
        Self::Hour,
        Self::Minute,
        Self::TimeOfDay,
        Self::DayOfWeek,
        Self::Age,
        Self::CityPop,
        Self::DistanceKm,
    ];

    #[must_use]
    pub fn value(self, record: &DerivedRecord) -> f64 {
        match self {
            Self::Amount => record.amount,
            Self::LogAmount => record.log_amount,
            Self::Hour => f64::from(record.hour),
            Self::Minute => f64::from(record.minute),
            Self::TimeOfDay => record.time_of_day,
            Self::DayOfWeek => f64::from(record.day_of_week),
            Self::Age => f64::from(record.age),
            Self::CityPop => record.city_pop,
            Self::DistanceKm => record.distance_km,
        }
    }
}

impl FromStr for NumericColumn {
    type Err = UnknownColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string() == s)
            .ok_or_else(|| UnknownColumnError {
                kind: "numeric",
                name: s.to_owned(),
            })
    }
}

/// A column whose distinct values become indicator features.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    #[display("category")]
    Category,
    #[display("merchant")]
    Merchant,
    #[display("job")]
    Job,
    #[display("city")]
    City,
    #[display("state")]
    State,
    /// Hour of the transaction as a level (`"00"`..`"23"`)
    #[display("hour_of_day")]
    HourOfDay,
    /// Day of week as a level (`"1"` = Sunday .. `"7"`)
    #[display("day_of_week")]
    DayOfWeek,
}

impl CategoricalColumn {
    pub const ALL: [Self; 7] = [
        Self::Category,
        Self::Merchant,
        Self::Job,
        Self::City,
        Self::State,
        Self::HourOfDay,
        Self::DayOfWeek,
    ];

    /// The record's level for this column.
    ///
    /// Hours are zero-padded so lexicographic level order is numeric order.
    #[must_use]
    pub fn level(self, record: &DerivedRecord) -> Cow<'_, str> {
        match self {
            Self::Category => Cow::Borrowed(&record.raw.category),
            Self::Merchant => Cow::Borrowed(&record.raw.merchant),
            Self::Job => Cow::Borrowed(&record.raw.job),
            Self::City => Cow::Borrowed(&record.raw.city),
            Self::State => Cow::Borrowed(&record.raw.state),
            Self::HourOfDay => Cow::Owned(format!("{:02}", record.hour)),
            Self::DayOfWeek => Cow::Owned(record.day_of_week.to_string()),
        }
    }

    /// Name of the indicator column for `level`.
    #[must_use]
    pub fn indicator_name(self, level: &str) -> String {
        format!("{self}={level}")
    }
}

impl FromStr for CategoricalColumn {
    type Err = UnknownColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string() == s)
            .ok_or_else(|| UnknownColumnError {
                kind: "categorical",
                name: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::record;

    #[test]
    fn test_ids_round_trip() {
        for c in NumericColumn::ALL {
            assert_eq!(c.to_string().parse::<NumericColumn>(), Ok(c));
        }
        for c in CategoricalColumn::ALL {
            assert_eq!(c.to_string().parse::<CategoricalColumn>(), Ok(c));
        }
        assert!("amt".parse::<NumericColumn>().is_err());
    }

    #[test]
    fn test_hour_level_is_zero_padded() {
        let r = record("t1", "misc_net", "07-03-2020 09:05", "0", 10.0);
        assert_eq!(CategoricalColumn::HourOfDay.level(&r), "09");
        assert_eq!(CategoricalColumn::DayOfWeek.level(&r), "7");
        assert_eq!(
            CategoricalColumn::Category.indicator_name("misc_net"),
            "category=misc_net"
        );
        assert!((NumericColumn::TimeOfDay.value(&r) - (9.0 + 5.0 / 60.0)).abs() < 1e-12);
    }
}

//! Transaction records before and after field derivation
//!
//! # Data Structure
//!
//! ```text
//! RawRecord (as ingested, immutable)
//! ├─ id, timestamp string, amount
//! ├─ categorical descriptors (category, merchant, job, city, state)
//! ├─ birth date string, raw label field
//! └─ cardholder and merchant coordinates
//!
//! DerivedRecord
//! ├─ raw: RawRecord
//! ├─ amount, city_pop (parsed)
//! ├─ date, hour, minute, time_of_day, day_of_week
//! ├─ age (whole years at the reference date)
//! ├─ label (cleaned)
//! └─ log_amount, distance_km
//! ```
//!
//! # Serialization
//!
//! [`RawRecord`] deserializes from the column names of the public credit-card
//! transaction dataset, so a CSV reader can produce it directly:
//!
//! ```text
//! trans_date_trans_time,cc_num,merchant,category,amt,...,is_fraud
//! 01-05-2020 23:15,2703186189652095,fraud_Rippin,misc_net,4.97,...,0
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One transaction exactly as read from the source table.
///
/// Numeric fields stay text until derivation so that one dirty value costs
/// only its own record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawRecord {
    /// Unique transaction identifier
    #[serde(rename = "trans_num")]
    pub id: String,
    /// Combined `day-month-year hour:minute[:second]` string
    #[serde(rename = "trans_date_trans_time")]
    pub timestamp: String,
    /// Transaction amount, parsed during derivation
    #[serde(rename = "amt")]
    pub amount: String,
    pub category: String,
    pub merchant: String,
    pub job: String,
    pub city: String,
    pub state: String,
    /// Population of the cardholder's city; may be absent
    #[serde(default)]
    pub city_pop: String,
    /// Cardholder birth date (`day-month-year`)
    #[serde(rename = "dob")]
    pub birth_date: String,
    /// Fraud flag as ingested; may carry trailing garbage after the digit
    #[serde(rename = "is_fraud")]
    pub label: String,
    pub lat: String,
    pub long: String,
    pub merch_lat: String,
    pub merch_long: String,
}

/// Cleaned binary outcome of a transaction.
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
    derive_more::IsVariant,
)]
pub enum Label {
    #[display("0")]
    #[serde(rename = "0")]
    Legit,
    #[display("1")]
    #[serde(rename = "1")]
    Fraud,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Fraud, Label::Legit];

    /// The label as the single-character string `"0"` or `"1"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Label::Legit => "0",
            Label::Fraud => "1",
        }
    }

    #[must_use]
    pub const fn from_bool(is_fraud: bool) -> Self {
        if is_fraud { Label::Fraud } else { Label::Legit }
    }
}

/// A raw record plus the analysis-ready fields computed from it.
///
/// Produced only by [`FieldDeriver`](crate::derive::FieldDeriver), which
/// guarantees:
///
/// - `hour < 24`, `minute < 60`, `time_of_day` in `[0, 24)`
/// - `day_of_week` in `1..=7` with Sunday = 1
/// - `age` is the whole number of years between birth and the reference date
/// - `amount` and `city_pop` are finite and non-negative
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub raw: RawRecord,
    pub amount: f64,
    /// Zero when the source has no population
    pub city_pop: f64,
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    /// `hour + minute / 60`
    pub time_of_day: f64,
    /// 1 = Sunday, ..., 7 = Saturday
    pub day_of_week: u32,
    pub age: u32,
    pub label: Label,
    /// `ln(1 + amount)`
    pub log_amount: f64,
    /// Great-circle distance between cardholder and merchant
    pub distance_km: f64,
}

impl DerivedRecord {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.raw.id
    }

    #[must_use]
    pub fn is_fraud(&self) -> bool {
        self.label.is_fraud()
    }
}

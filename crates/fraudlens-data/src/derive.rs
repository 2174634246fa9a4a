//! Field derivation from raw records
//!
//! [`FieldDeriver`] turns a [`RawRecord`] into a [`DerivedRecord`] or reports
//! why it cannot. Derivation is all-or-nothing: a record either gets every
//! derived field or an error, never a partially filled record.
//!
//! # Conventions
//!
//! - Dates are `day-month-year` (`-` or `/` separated) with a four-digit year
//! - Timestamps are `<date> <HH:MM[:SS]>` with a single space separator
//! - Day of week is 1 = Sunday, ..., 7 = Saturday
//! - Age is the number of complete years between the birth date and the
//!   deriver's reference date
//! - The label keeps only its first character, which must be `0` or `1`
//! - Amount, population and coordinates are parsed here; a value that is not
//!   a finite number in range fails the record
//!
//! # Batch derivation
//!
//! [`FieldDeriver::derive_all`] applies a [`DerivePolicy`]: under
//! [`DerivePolicy::Drop`] failing records are skipped and counted in a
//! [`DeriveSummary`]; under [`DerivePolicy::Abort`] the first failure is
//! returned.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use fraudlens_data::{
//!     derive::{DerivePolicy, FieldDeriver},
//!     record::RawRecord,
//! };
//!
//! let raw: Vec<RawRecord> = vec![]; // read from CSV
//! let deriver = FieldDeriver::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//! let derived = deriver.derive_all(&raw, DerivePolicy::Drop).unwrap();
//! println!("{} records dropped", derived.summary.dropped());
//! ```

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::record::{DerivedRecord, Label, RawRecord};

const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%d/%m/%Y"];
const EARTH_RADIUS_KM: f64 = 6371.0088;
const LOGGED_DROPS: usize = 5;

/// A malformed date, time or numeric field on a single record.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParseError {
    #[display("timestamp '{value}' has no space between date and time")]
    MissingTime { value: String },
    #[display("{field} '{value}' is not a day-month-year date with a four-digit year")]
    InvalidDate { field: &'static str, value: String },
    #[display("time '{value}' is not HH:MM or HH:MM:SS")]
    InvalidTime { value: String },
    #[display("birth date {birth} is after reference date {reference}")]
    BirthAfterReference {
        birth: NaiveDate,
        reference: NaiveDate,
    },
    #[display("amount '{value}' is not a non-negative number")]
    InvalidAmount { value: String },
    #[display("city population '{value}' is not a non-negative number")]
    InvalidPopulation { value: String },
    #[display("coordinate {field}='{value}' is not a number within ±{limit}")]
    InvalidCoordinate {
        field: &'static str,
        value: String,
        limit: f64,
    },
}

/// The label field does not start with `0` or `1`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("label '{value}' does not start with 0 or 1")]
pub struct LabelFormatError {
    pub value: String,
}

/// Reason a single record could not be derived.
#[derive(
    Debug,
    Clone,
    PartialEq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum DeriveError {
    #[display("{_0}")]
    Parse(ParseError),
    #[display("{_0}")]
    LabelFormat(LabelFormatError),
}

/// What to do with a record that fails derivation.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum DerivePolicy {
    /// Skip the record and count it
    #[default]
    Drop,
    /// Stop at the first failing record
    Abort,
}

/// Counts of a batch derivation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveSummary {
    pub total: usize,
    pub derived: usize,
    pub dropped_parse: usize,
    pub dropped_label: usize,
}

impl DeriveSummary {
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped_parse + self.dropped_label
    }
}

/// Output of [`FieldDeriver::derive_all`].
#[derive(Debug, Clone)]
pub struct DerivedTable {
    pub records: Vec<DerivedRecord>,
    pub summary: DeriveSummary,
}

/// Computes derived fields relative to a fixed reference date.
#[derive(Debug, Clone, Copy)]
pub struct FieldDeriver {
    reference_date: NaiveDate,
}

impl FieldDeriver {
    #[must_use]
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    #[must_use]
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Derive a single record.
    pub fn derive(&self, raw: &RawRecord) -> Result<DerivedRecord, DeriveError> {
        let (date, hour, minute) = split_timestamp(&raw.timestamp)?;
        let birth = parse_date("birth date", &raw.birth_date)?;
        let age = self
            .reference_date
            .years_since(birth)
            .ok_or(ParseError::BirthAfterReference {
                birth,
                reference: self.reference_date,
            })?;
        let label = clean_label(&raw.label)?;

        let amount = parse_number(&raw.amount)
            .filter(|a| *a >= 0.0)
            .ok_or_else(|| ParseError::InvalidAmount {
                value: raw.amount.clone(),
            })?;
        let city_pop = parse_population(&raw.city_pop)?;
        let holder = (
            parse_coordinate("lat", &raw.lat, 90.0)?,
            parse_coordinate("long", &raw.long, 180.0)?,
        );
        let merchant = (
            parse_coordinate("merch_lat", &raw.merch_lat, 90.0)?,
            parse_coordinate("merch_long", &raw.merch_long, 180.0)?,
        );

        Ok(DerivedRecord {
            raw: raw.clone(),
            amount,
            city_pop,
            date,
            hour,
            minute,
            time_of_day: f64::from(hour) + f64::from(minute) / 60.0,
            day_of_week: date.weekday().number_from_sunday(),
            age,
            label,
            log_amount: amount.ln_1p(),
            distance_km: haversine_km(holder, merchant),
        })
    }

    /// Derive every record, applying `policy` to failures.
    pub fn derive_all(
        &self,
        raws: &[RawRecord],
        policy: DerivePolicy,
    ) -> Result<DerivedTable, DeriveError> {
        let mut summary = DeriveSummary {
            total: raws.len(),
            ..DeriveSummary::default()
        };
        let mut records = Vec::with_capacity(raws.len());

        for raw in raws {
            match self.derive(raw) {
                Ok(record) => records.push(record),
                Err(e) if policy == DerivePolicy::Abort => {
                    tracing::error!(id = %raw.id, "aborting derivation: {e}");
                    return Err(e);
                }
                Err(e) => {
                    if summary.dropped() < LOGGED_DROPS {
                        tracing::warn!(id = %raw.id, "dropping record: {e}");
                    }
                    match e {
                        DeriveError::Parse(_) => summary.dropped_parse += 1,
                        DeriveError::LabelFormat(_) => summary.dropped_label += 1,
                    }
                }
            }
        }
        summary.derived = records.len();

        if summary.dropped() > 0 {
            tracing::warn!(
                dropped = summary.dropped(),
                parse = summary.dropped_parse,
                label = summary.dropped_label,
                "dropped records during derivation"
            );
        }
        tracing::info!(total = summary.total, derived = summary.derived, "derived fields");

        Ok(DerivedTable { records, summary })
    }
}

/// Clean a possibly defect-contaminated label field.
///
/// Only the first character is significant.
pub fn clean_label(value: &str) -> Result<Label, LabelFormatError> {
    match value.chars().next() {
        Some('0') => Ok(Label::Legit),
        Some('1') => Ok(Label::Fraud),
        _ => Err(LabelFormatError {
            value: value.to_owned(),
        }),
    }
}

/// Split `"<date> <time>"` into its date, hour and minute.
pub fn split_timestamp(value: &str) -> Result<(NaiveDate, u32, u32), ParseError> {
    let (date, time) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| ParseError::MissingTime {
            value: value.to_owned(),
        })?;
    let date = parse_date("transaction date", date)?;
    let (hour, minute) = parse_time(time)?;
    Ok((date, hour, minute))
}

/// Parse a `day-month-year` date with a four-digit year.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = value.trim();
    let invalid = || ParseError::InvalidDate {
        field,
        value: value.to_owned(),
    };
    // chrono's %Y also accepts one to three digits
    let year = trimmed.rsplit(['-', '/']).next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(invalid)
}

fn parse_time(value: &str) -> Result<(u32, u32), ParseError> {
    let field = |part: &str, limit: u32| part.parse::<u32>().ok().filter(|n| *n < limit);
    let parts = value.trim().split(':').collect::<Vec<_>>();
    let parsed = match parts.as_slice() {
        &[hour, minute] => field(hour, 24).zip(field(minute, 60)),
        // seconds are optional but must be valid when present
        &[hour, minute, second] => field(hour, 24)
            .zip(field(minute, 60))
            .filter(|_| field(second, 60).is_some()),
        _ => None,
    };
    parsed.ok_or_else(|| ParseError::InvalidTime {
        value: value.to_owned(),
    })
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_population(value: &str) -> Result<f64, ParseError> {
    if value.trim().is_empty() {
        return Ok(0.0);
    }
    parse_number(value)
        .filter(|p| *p >= 0.0)
        .ok_or_else(|| ParseError::InvalidPopulation {
            value: value.to_owned(),
        })
}

fn parse_coordinate(field: &'static str, value: &str, limit: f64) -> Result<f64, ParseError> {
    parse_number(value)
        .filter(|v| v.abs() <= limit)
        .ok_or_else(|| ParseError::InvalidCoordinate {
            field,
            value: value.to_owned(),
            limit,
        })
}

/// Great-circle distance in kilometres between two `(lat, long)` points in degrees.
#[must_use]
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let a = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

//! Transaction records, field derivation and balanced sampling
//!
//! This crate covers the first two stages of the analysis pipeline:
//!
//! ```text
//! RawRecord (ingested)
//!     ↓ FieldDeriver (derive)
//! DerivedRecord
//!     ↓ BalancedSampler (sampling)
//! BalancedSplit { train, eval }
//! ```
//!
//! # Modules
//!
//! - [`record`]: [`RawRecord`](record::RawRecord), [`DerivedRecord`](record::DerivedRecord)
//!   and the cleaned [`Label`](record::Label)
//! - [`derive`]: timestamp, age, weekday and label derivation with per-record
//!   error isolation
//! - [`sampling`]: seeded class-balanced train/eval sampling
//!
//! # Error Isolation
//!
//! Per-record failures ([`ParseError`](derive::ParseError),
//! [`LabelFormatError`](derive::LabelFormatError)) are isolated to the record and
//! aggregated into a drop count. Run-level failures
//! ([`InsufficientDataError`](sampling::InsufficientDataError)) surface before any
//! model sees the data.

pub mod derive;
pub mod record;
pub mod sampling;

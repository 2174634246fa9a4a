//! Feature matrices for the fraud analysis models
//!
//! Derived records become numeric matrices here. Each model family declares a
//! [`FeatureSchema`](encoder::FeatureSchema): which numeric columns to carry
//! (optionally standardized) and which categorical columns to expand into
//! indicator columns.
//!
//! Because the train and eval sets are encoded independently, their indicator
//! columns can differ. [`align::reconcile`] re-expresses the eval matrix over
//! the train matrix's columns and verifies the result, producing a
//! [`ReconciledMatrix`](matrix::ReconciledMatrix), the only matrix type a
//! fitted model is evaluated on.
//!
//! ```text
//! train records ──encode──────────▶ FeatureMatrix (reference) ──▶ fit
//!                                         │ columns
//! eval records ──encode_candidate──▶ FeatureMatrix ──reconcile──▶ ReconciledMatrix ──▶ evaluate
//! ```
//!
//! # Modules
//!
//! - [`column`]: enumerated numeric and categorical columns
//! - [`encoder`]: schema-driven matrix construction
//! - [`matrix`]: [`FeatureMatrix`](matrix::FeatureMatrix), [`ColumnSet`](matrix::ColumnSet)
//! - [`align`]: schema reconciliation and verification
//! - [`profile`]: fraud rate per level, per-class numeric summaries

pub mod align;
pub mod column;
pub mod encoder;
pub mod matrix;
pub mod profile;

#[cfg(test)]
mod testutil;

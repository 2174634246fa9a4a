//! Statistical utilities shared by the fraudlens pipeline.
//!
//! This crate provides the small set of numerical building blocks the rest of
//! the workspace needs:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation and
//!   standard error of a sample
//! - **Normal distribution**: the standard normal CDF and two-sided tail
//!   probabilities, used for Wald significance tests on coefficients
//! - **ROC analysis**: area under the ROC curve from scores and binary labels
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`normal`]: Standard normal distribution functions
//! - [`roc`]: Rank-based ROC AUC
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use fraudlens_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.median, 3.0);
//! ```
//!
//! ## Testing a coefficient for significance
//!
//! ```
//! use fraudlens_stats::normal;
//!
//! let z = 1.959_964;
//! let p = normal::two_sided_p_value(z);
//! assert!((p - 0.05).abs() < 1e-4);
//! ```
//!
//! ## Scoring a ranking
//!
//! ```
//! use fraudlens_stats::roc;
//!
//! let scores = [0.9, 0.8, 0.3, 0.1];
//! let labels = [true, true, false, false];
//! assert_eq!(roc::auc(&scores, &labels), Some(1.0));
//! ```

pub mod descriptive;
pub mod normal;
pub mod roc;

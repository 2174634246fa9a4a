use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fraudlens_data::derive::DerivePolicy;

use self::{analyze::AnalyzeArg, profile::ProfileArg, split::SplitArg};
use crate::config::PipelineConfig;

mod analyze;
mod profile;
mod split;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train and evaluate every model on a balanced split
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Print fraud rates per level and numeric summaries per class
    Profile(#[clap(flatten)] ProfileArg),
    /// Write the balanced split's identifiers as JSON
    Split(#[clap(flatten)] SplitArg),
}

/// Input and configuration shared by every command.
#[derive(Debug, Clone, Args)]
pub(crate) struct PipelineArg {
    /// Path to the transactions CSV file
    pub input: PathBuf,

    /// Pipeline configuration JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for sampling and cross-validation folds
    #[arg(long)]
    pub seed: Option<u64>,

    /// Training records drawn per class
    #[arg(long)]
    pub train_per_class: Option<usize>,

    /// Evaluation records drawn per class
    #[arg(long)]
    pub eval_per_class: Option<usize>,

    /// Date ages are computed against (YYYY-MM-DD, default today)
    #[arg(long)]
    pub reference_date: Option<NaiveDate>,

    /// What to do with records that fail derivation (drop or abort)
    #[arg(long)]
    pub policy: Option<DerivePolicy>,
}

impl PipelineArg {
    /// Load the configuration file, then apply command-line overrides.
    pub(crate) fn load_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())?;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(n) = self.train_per_class {
            config.train_per_class = n;
        }
        if let Some(n) = self.eval_per_class {
            config.eval_per_class = n;
        }
        if let Some(date) = self.reference_date {
            config.reference_date = Some(date);
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        Ok(config)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Profile(arg) => profile::run(&arg)?,
        Mode::Split(arg) => split::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = CommandArgs::try_parse_from([
            "fraudlens",
            "analyze",
            "tx.csv",
            "--seed",
            "9",
            "--train-per-class",
            "200",
            "--reference-date",
            "2021-01-01",
            "--policy",
            "abort",
        ])
        .unwrap();
        let Mode::Analyze(arg) = args.mode else {
            panic!("expected analyze");
        };
        let config = arg.pipeline.load_config().unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.train_per_class, 200);
        assert_eq!(config.eval_per_class, PipelineConfig::default().eval_per_class);
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(config.policy, DerivePolicy::Abort);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = CommandArgs::try_parse_from([
            "fraudlens",
            "split",
            "tx.csv",
            "--config",
            "/nonexistent/fraudlens.json",
        ])
        .unwrap();
        let Mode::Split(arg) = args.mode else {
            panic!("expected split");
        };
        assert!(arg.pipeline.load_config().is_err());
    }
}

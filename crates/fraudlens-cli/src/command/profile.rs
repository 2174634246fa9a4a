use clap::Args;
use fraudlens_features::{
    column::{CategoricalColumn, NumericColumn},
    profile,
};

use crate::{command::PipelineArg, pipeline, report, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct ProfileArg {
    #[clap(flatten)]
    pub pipeline: PipelineArg,

    /// Categorical columns to profile (comma-separated, default all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<CategoricalColumn>,

    /// Hide levels seen fewer times than this
    #[arg(long)]
    pub min_count: Option<usize>,

    /// Levels shown per column
    #[arg(long)]
    pub top_n: Option<usize>,
}

pub(crate) fn run(arg: &ProfileArg) -> anyhow::Result<()> {
    let config = arg.pipeline.load_config()?;
    let min_count = arg.min_count.unwrap_or(config.profile.min_count);
    let top_n = arg.top_n.unwrap_or(config.profile.top_n);
    let columns = if arg.columns.is_empty() {
        CategoricalColumn::ALL.to_vec()
    } else {
        arg.columns.clone()
    };

    let raws = util::read_records(&arg.pipeline.input)?;
    let table = pipeline::derive(&config, &raws)?;
    let (fraud, legit) = table
        .records
        .iter()
        .fold((0, 0), |(f, l), r| if r.is_fraud() { (f + 1, l) } else { (f, l + 1) });

    println!("Class Profile");
    println!("=============");
    report::print_derive_summary(&table.summary);
    println!("Classes: {fraud} fraud, {legit} legitimate");
    println!();

    for column in columns {
        let rates = profile::fraud_rate_by_level(&table.records, column, min_count);
        report::print_level_rates(column, &rates, top_n);
        println!();
    }

    let summaries = NumericColumn::ALL
        .iter()
        .map(|&column| profile::summarize_by_class(&table.records, column))
        .collect::<Vec<_>>();
    report::print_class_summaries(&summaries);
    Ok(())
}

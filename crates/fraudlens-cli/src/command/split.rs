use std::path::PathBuf;

use clap::Args;

use crate::{
    command::PipelineArg,
    pipeline,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SplitArg {
    #[clap(flatten)]
    pub pipeline: PipelineArg,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SplitArg) -> anyhow::Result<()> {
    let config = arg.pipeline.load_config()?;
    let raws = util::read_records(&arg.pipeline.input)?;
    let table = pipeline::derive(&config, &raws)?;
    let split = pipeline::sample(&config, &table.records)?;

    let ids = split.ids(&table.records, config.seed);
    Output::save_json(&ids, arg.output.clone())
}

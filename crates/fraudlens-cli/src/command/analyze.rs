use std::path::PathBuf;

use clap::Args;

use crate::{command::PipelineArg, pipeline, report, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    #[clap(flatten)]
    pub pipeline: PipelineArg,

    /// Write the full analysis report as JSON to this path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let config = arg.pipeline.load_config()?;
    let raws = util::read_records(&arg.pipeline.input)?;
    let analysis = pipeline::analyze(&config, &raws)?;

    report::print_analysis(&analysis);
    if let Some(path) = &arg.output {
        util::Output::save_json(&analysis, Some(path.clone()))?;
    }
    Ok(())
}

mod command;
mod config;
mod pipeline;
mod report;
mod util;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fraudlens=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    command::run()
}

use anyhow::Context;
use clap::Parser;
use drone::cli::Args;
use drone::config::RunConfig;
use drone::runner::ConsoleRunner;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::{self, BufReader};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => RunConfig::read(path)?,
        None => RunConfig::default(),
    };
    args.apply(&mut config);

    let out = io::stdout().lock();
    let mut runner = match &args.load {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("could not open save {}", path.display()))?;
            ConsoleRunner::resume(config, &mut BufReader::new(file), out)?
        }
        None => ConsoleRunner::new(config, out)?,
    };
    runner.run()?;
    Ok(())
}

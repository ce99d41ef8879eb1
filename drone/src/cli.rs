use crate::config::{AlgorithmChoice, RunConfig};

use clap::Parser;

use std::path::PathBuf;

/// Evolves neural controllers for a 2D drone without a display.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// RON run configuration; defaults are used when absent.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Resume from a saved population instead of starting afresh.
    #[arg(short, long)]
    pub load: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    pub algorithm: Option<AlgorithmChoice>,
    #[arg(short, long)]
    pub population: Option<usize>,
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// Stop after this many generations.
    #[arg(short, long)]
    pub generations: Option<usize>,
    /// Fit the drones with distance sensors.
    #[arg(long)]
    pub sensors: bool,
    #[arg(long)]
    pub save_directory: Option<PathBuf>,
}

impl Args {
    /// Overrides the values of `config` given on the command line.
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if self.population.is_some() {
            config.population_size = self.population;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.generations.is_some() {
            config.generation_limit = self.generations;
        }
        if self.sensors {
            config.sensors = true;
        }
        if let Some(directory) = &self.save_directory {
            config.save_directory = directory.clone();
        }
    }
}

//! The headless training loop.
use crate::body::{Drone, START};
use crate::config::{AlgorithmChoice, RunConfig};
use crate::errors::RunError;
use crate::levels::Level;

use cosyne::logging::EvolutionLogger;
use cosyne::rng::{self, EaRng};
use cosyne::{load_algorithm, Agent, Controller, Cosyne, DynAlgorithm, EasyEa};
use cosyne_nn::{Network, Topology};
use tracing::info;

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Stream of the level randomization, kept apart
/// from the algorithm's stream.
const LEVEL_STREAM: u64 = 1;

/// Trains a population generation by generation without a
/// display, writing one report line per generation to `out`.
pub struct ConsoleRunner<W: Write> {
    algorithm: DynAlgorithm<Network, Drone>,
    levels: Vec<Level>,
    current_level: usize,
    level_rng: EaRng,
    logger: EvolutionLogger,
    config: RunConfig,
    out: W,
}

impl<W: Write> ConsoleRunner<W> {
    /// Starts training a fresh population of tanh perceptrons
    /// with one hidden layer.
    ///
    /// # Errors
    /// Returns an error if the levels or the algorithm
    /// configuration are invalid.
    pub fn new(config: RunConfig, out: W) -> Result<ConsoleRunner<W>, RunError> {
        config.validate()?;
        let topology =
            Topology::tanh_perceptron(&[config.observation_size(), config.hidden_width, 4])?;
        let mother = Network::new(&topology);
        let drone = config.drone();
        let (easy_config, cosyne_config) = config.algorithm_configs();
        let algorithm_rng = rng::seeded(config.seed);
        let algorithm: DynAlgorithm<Network, Drone> = match config.algorithm {
            AlgorithmChoice::EasyEa => {
                Box::new(EasyEa::new(easy_config, &mother, &drone, algorithm_rng)?)
            }
            AlgorithmChoice::Cosyne => {
                Box::new(Cosyne::new(cosyne_config, &mother, &drone, algorithm_rng)?)
            }
        };
        info!(
            kind = %algorithm.kind(),
            population = algorithm.population().len(),
            genome = algorithm.population().genome_size(),
            "starting a fresh population"
        );
        Ok(ConsoleRunner::with_algorithm(algorithm, config, out))
    }

    /// Resumes training from a saved population. The saved
    /// document decides the algorithm kind, population size
    /// and controller topology; everything else comes from
    /// `config`.
    ///
    /// # Errors
    /// Returns an error if the document cannot be loaded or
    /// its controllers do not fit the configured drone.
    pub fn resume(config: RunConfig, reader: &mut dyn Read, out: W) -> Result<ConsoleRunner<W>, RunError> {
        config.validate()?;
        let drone = config.drone();
        let (easy_config, cosyne_config) = config.algorithm_configs();
        let algorithm = load_algorithm::<Network, Drone>(
            reader,
            &drone,
            easy_config,
            cosyne_config,
            rng::seeded(config.seed),
        )?;
        if let Some((controller, _)) = algorithm.individual(0) {
            let expected = controller.topology().input_width();
            if expected != drone.observation_size() {
                return Err(RunError::ObservationMismatch {
                    expected,
                    found: drone.observation_size(),
                });
            }
        }
        Ok(ConsoleRunner::with_algorithm(algorithm, config, out))
    }

    fn with_algorithm(algorithm: DynAlgorithm<Network, Drone>, config: RunConfig, out: W) -> ConsoleRunner<W> {
        let mut level_rng = rng::seeded(config.seed);
        level_rng.set_stream(LEVEL_STREAM);
        ConsoleRunner {
            algorithm,
            levels: config.levels.clone(),
            current_level: 0,
            level_rng,
            logger: EvolutionLogger::new(config.reporting),
            config,
            out,
        }
    }

    /// Runs generations until the configured limit is reached,
    /// or forever if there is none.
    pub fn run(&mut self) -> Result<(), RunError> {
        while !self.finished() {
            self.run_generation()?;
        }
        Ok(())
    }

    fn finished(&self) -> bool {
        self.config
            .generation_limit
            .map_or(false, |limit| self.algorithm.generation() >= limit)
    }

    /// Simulates one episode on the current level, breeds
    /// the next generation and reports on it. Saves the
    /// population if the new generation number is a multiple
    /// of the save interval.
    pub fn run_generation(&mut self) -> Result<(), RunError> {
        let level = &mut self.levels[self.current_level];
        level.randomize(START, &mut self.level_rng)?;
        while !self.algorithm.update(self.config.dt, &level.world)? {}
        self.algorithm.process()?;
        self.logger.log(self.algorithm.as_ref());

        self.report()?;
        self.level_up();
        let generation = self.algorithm.generation();
        if self.config.save_interval > 0 && generation % self.config.save_interval == 0 {
            self.save()?;
        }
        Ok(())
    }

    /// Writes `Gen: <g> Lvl: <level> --- BF: <best> AVGF: <mean>`.
    fn report(&mut self) -> Result<(), RunError> {
        if let Some(stats) = self.algorithm.last_stats() {
            writeln!(
                self.out,
                "Gen: {} Lvl: {} --- BF: {:.3} AVGF: {:.3}",
                self.algorithm.generation(),
                self.current_level,
                stats.maximum,
                stats.mean
            )
            .map_err(RunError::Report)?;
        }
        Ok(())
    }

    fn level_up(&mut self) {
        let (threshold, stats) = match (self.config.level_up_fitness, self.algorithm.last_stats()) {
            (Some(threshold), Some(stats)) => (threshold, stats),
            _ => return,
        };
        if stats.maximum > threshold && self.current_level + 1 < self.levels.len() {
            self.current_level += 1;
            info!(level = self.current_level, best = stats.maximum, "levelling up");
        }
    }

    /// Writes the population to
    /// `<save directory>/ea_save_<generation>_<timestamp>.json`
    /// and returns the path written.
    pub fn save(&self) -> Result<PathBuf, RunError> {
        let directory = &self.config.save_directory;
        fs::create_dir_all(directory).map_err(|source| RunError::Io {
            path: directory.clone(),
            source,
        })?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos());
        let path = directory.join(format!(
            "ea_save_{}_{}.json",
            self.algorithm.generation(),
            timestamp
        ));
        let file = File::create(&path).map_err(|source| RunError::Io {
            path: path.clone(),
            source,
        })?;
        self.algorithm.save(&mut BufWriter::new(file))?;
        Ok(path)
    }

    pub fn algorithm(&self) -> &DynAlgorithm<Network, Drone> {
        &self.algorithm
    }

    /// Index of the level currently trained on.
    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn logger(&self) -> &EvolutionLogger {
        &self.logger
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}

use crate::body::{self, Drone, START};
use crate::errors::RunError;
use crate::levels::{self, Level};

use clap::ValueEnum;
use cosyne::logging::ReportingLevel;
use cosyne::{CosyneConfig, EasyEaConfig};
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::{Path, PathBuf};

/// The evolutionary algorithm to train with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum AlgorithmChoice {
    #[value(name = "easyea")]
    EasyEa,
    #[value(name = "cosyne")]
    Cosyne,
}

/// Settings of a training session, read from a RON document.
///
/// Omitted fields take their default value.
///
/// # Examples
/// ```
/// use drone::config::{AlgorithmChoice, RunConfig};
///
/// let config = RunConfig::from_ron(
///     "(algorithm: EasyEa, seed: Some(7), sensors: true, generation_limit: Some(10))",
/// )
/// .unwrap();
/// assert_eq!(config.algorithm, AlgorithmChoice::EasyEa);
/// assert_eq!(config.population_size(), 128);
/// assert_eq!(config.observation_size(), 15);
/// assert_eq!(config.levels.len(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub algorithm: AlgorithmChoice,
    /// Overrides the population size of the chosen algorithm.
    pub population_size: Option<usize>,
    /// Seeds both the algorithm's and the level stream;
    /// entropy is used when absent.
    pub seed: Option<u64>,
    pub easy_ea: EasyEaConfig,
    pub cosyne: CosyneConfig,
    /// Width of the controller's hidden tanh layer.
    pub hidden_width: usize,
    /// Whether drones carry distance sensors.
    pub sensors: bool,
    pub levels: Vec<Level>,
    /// Simulation step in seconds.
    pub dt: f32,
    /// The population is saved every this many generations;
    /// zero disables saving.
    pub save_interval: usize,
    pub save_directory: PathBuf,
    /// Training stops after this many generations.
    pub generation_limit: Option<usize>,
    /// Moves on to the next level once the best fitness of a
    /// generation exceeds this value.
    pub level_up_fitness: Option<f32>,
    pub reporting: ReportingLevel,
}

impl Default for RunConfig {
    fn default() -> RunConfig {
        RunConfig {
            algorithm: AlgorithmChoice::Cosyne,
            population_size: None,
            seed: None,
            easy_ea: EasyEaConfig::default(),
            cosyne: CosyneConfig::default(),
            hidden_width: 16,
            sensors: false,
            levels: levels::default_levels(),
            dt: 1.0 / 60.0,
            save_interval: 1000,
            save_directory: PathBuf::from("saves"),
            generation_limit: None,
            level_up_fitness: None,
            reporting: ReportingLevel::NoGenomes,
        }
    }
}

impl RunConfig {
    pub fn from_ron(document: &str) -> Result<RunConfig, RunError> {
        Ok(ron::from_str(document)?)
    }

    /// Reads a RON document from `path`.
    pub fn read(path: &Path) -> Result<RunConfig, RunError> {
        let document = fs::read_to_string(path).map_err(|source| RunError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        RunConfig::from_ron(&document)
    }

    /// Population size of the chosen algorithm.
    pub fn population_size(&self) -> usize {
        self.population_size.unwrap_or(match self.algorithm {
            AlgorithmChoice::EasyEa => self.easy_ea.population_size,
            AlgorithmChoice::Cosyne => self.cosyne.population_size,
        })
    }

    /// Algorithm configurations with the population
    /// size override applied.
    pub fn algorithm_configs(&self) -> (EasyEaConfig, CosyneConfig) {
        let mut easy_ea = self.easy_ea.clone();
        let mut cosyne = self.cosyne.clone();
        if let Some(size) = self.population_size {
            easy_ea.population_size = size;
            cosyne.population_size = size;
        }
        (easy_ea, cosyne)
    }

    /// Returns a drone at the start position, fitted out as configured.
    pub fn drone(&self) -> Drone {
        if self.sensors {
            Drone::with_sensors(START)
        } else {
            Drone::new(START)
        }
    }

    pub fn observation_size(&self) -> usize {
        if self.sensors {
            body::BASE_OBSERVATIONS + body::SENSOR_COUNT
        } else {
            body::BASE_OBSERVATIONS
        }
    }

    /// Checks that every level can be trained on.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.levels.is_empty() {
            return Err(RunError::NoLevels);
        }
        for (index, level) in self.levels.iter().enumerate() {
            if level.world.goals.is_empty() {
                return Err(RunError::NoGoals(index));
            }
            if !levels::start_is_clear(&level.world) {
                return Err(RunError::BlockedStart(index));
            }
            if level.randomized && !levels::can_randomize(&level.world) {
                return Err(RunError::CrampedLevel(index));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosyne::{Vec2, World};

    #[test]
    fn defaults_match_the_training_setup() {
        let config = RunConfig::default();
        assert_eq!(config.population_size(), 256);
        assert_eq!(config.observation_size(), 7);
        assert_eq!(config.save_interval, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn population_override_applies_to_both_algorithms() {
        let config = RunConfig {
            population_size: Some(32),
            ..RunConfig::default()
        };
        let (easy_ea, cosyne) = config.algorithm_configs();
        assert_eq!(easy_ea.population_size, 32);
        assert_eq!(cosyne.population_size, 32);
        assert_eq!(config.population_size(), 32);
    }

    #[test]
    fn nested_algorithm_settings() {
        let config = RunConfig::from_ron(
            "(
                algorithm: Cosyne,
                cosyne: (population_size: 64, parent_fraction: 0.5),
            )",
        )
        .unwrap();
        assert_eq!(config.population_size(), 64);
        assert_eq!(config.cosyne.parent_fraction, 0.5);
        assert_eq!(config.cosyne.protected_count, 1);
    }

    #[test]
    fn custom_levels() {
        let custom = vec![Level::randomized(World {
            goals: vec![Vec2::new(10.0, 10.0)],
            ..levels::open_world()
        })];
        let document = format!("(levels: {})", ron::to_string(&custom).unwrap());
        let config = RunConfig::from_ron(&document).unwrap();
        assert_eq!(config.levels, custom);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_configuration() {
        let config = RunConfig::from_ron(include_str!("../run.ron")).unwrap();
        assert_eq!(config.seed, Some(2024));
        assert_eq!(config.observation_size(), 15);
        assert_eq!(config.level_up_fitness, Some(50000.0));
        assert_eq!(config.easy_ea, EasyEaConfig::default());
        assert_eq!(config.cosyne, CosyneConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_document() {
        assert!(matches!(
            RunConfig::from_ron("(algorithm: Neat)"),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn levels_are_validated() {
        let mut config = RunConfig {
            levels: vec![],
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(RunError::NoLevels)));

        config.levels = vec![Level::fixed(World {
            goals: vec![],
            ..levels::open_world()
        })];
        assert!(matches!(config.validate(), Err(RunError::NoGoals(0))));

        config.levels = levels::default_levels();
        config.levels[2].world.walls[0].position = START;
        assert!(matches!(config.validate(), Err(RunError::BlockedStart(2))));

        let cramped = World {
            boundary: Vec2::new(40.0, 40.0),
            walls: vec![],
            goals: vec![Vec2::new(20.0, 20.0)],
        };
        config.levels = vec![Level::fixed(cramped.clone())];
        assert!(config.validate().is_ok());
        config.levels = vec![Level::fixed(cramped.clone()), Level::randomized(cramped)];
        assert!(matches!(config.validate(), Err(RunError::CrampedLevel(1))));
    }

    #[test]
    fn read_from_disk() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("run.ron");
        fs::write(&path, "(hidden_width: 8, save_interval: 0)").unwrap();
        let config = RunConfig::read(&path).unwrap();
        assert_eq!(config.hidden_width, 8);
        assert_eq!(config.save_interval, 0);

        let missing = RunConfig::read(&directory.path().join("missing.ron"));
        assert!(matches!(missing, Err(RunError::Io { .. })));
    }
}

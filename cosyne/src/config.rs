//! Configuration data for the evolutionary algorithms.
//!
//! # Note
//! All quantities expressing probabilities
//! should be in the range [0.0, 1.0]; algorithm
//! constructors reject configurations that are not.
use crate::errors::ConfigError;

use serde::{Deserialize, Serialize};

/// Fitness shaping parameters of the evaluation loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingConfig {
    /// Distance from a goal within which an agent
    /// counts as hovering over it.
    pub capture_radius: f32,
    /// A goal is collected once an agent has hovered
    /// over it for more than this many consecutive steps.
    pub capture_steps: usize,
    /// Step budget the speed reward of a collected goal
    /// is measured against.
    pub time_budget: f32,
    /// Fitness added per collected goal when ranking.
    pub goal_bonus: f32,
}

impl Default for ShapingConfig {
    fn default() -> ShapingConfig {
        ShapingConfig {
            capture_radius: 10.0,
            capture_steps: 30,
            time_budget: 600.0,
            goal_bonus: 1000.0,
        }
    }
}

/// Perturbation distribution of a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Noise {
    /// Uniform over [-bound, bound).
    Uniform { bound: f32 },
    /// Cauchy-distributed around 0.
    Cauchy { scale: f32 },
}

/// Point mutation applied to offspring genomes.
/// Weights are never clamped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    /// Replace the weight with a fresh sample in [-1, 1).
    Reset { chance: f32 },
    /// Add noise to the weight.
    Perturb { chance: f32, noise: Noise },
}

impl Mutation {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Mutation::Reset { chance } => check_probability("mutation chance", chance),
            Mutation::Perturb { chance, noise } => {
                check_probability("mutation chance", chance)?;
                match noise {
                    Noise::Uniform { bound } => check_positive("mutation noise bound", bound),
                    Noise::Cauchy { scale } => check_positive("mutation noise scale", scale),
                }
            }
        }
    }
}

/// Parent selection strategy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Selection {
    StochasticUniversal,
    /// Keep the fittest of `size` uniformly drawn individuals.
    Tournament { size: usize },
}

/// Offspring generation scheme of [`EasyEa`].
///
/// [`EasyEa`]: crate::EasyEa
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EasyScheme {
    /// The top `ceil(retain_fraction × N)` individuals are
    /// kept and cloned, with each clone weight nudged by
    /// uniform noise in [-clone_noise, clone_noise) with
    /// probability `clone_chance`, until N are filled.
    Upscaling {
        retain_fraction: f32,
        clone_chance: f32,
        clone_noise: f32,
    },
    /// N parents are selected and consecutive pairs
    /// produce two offspring by uniform crossover.
    Crossover { selection: Selection },
}

/// Configuration data for the generational [`EasyEa`].
///
/// [`EasyEa`]: crate::EasyEa
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasyEaConfig {
    /// Size of the population.
    pub population_size: usize,
    pub scheme: EasyScheme,
    /// Top % of the population copied as-is
    /// to the next generation.
    pub elite_fraction: f32,
    pub mutation: Mutation,
    pub shaping: ShapingConfig,
}

impl Default for EasyEaConfig {
    fn default() -> EasyEaConfig {
        EasyEaConfig {
            population_size: 128,
            scheme: EasyScheme::Upscaling {
                retain_fraction: 0.2,
                clone_chance: 0.25,
                clone_noise: 0.1,
            },
            elite_fraction: 0.05,
            mutation: Mutation::Reset { chance: 0.025 },
            shaping: ShapingConfig::default(),
        }
    }
}

impl EasyEaConfig {
    /// Number of elites preserved each generation.
    ///
    /// # Examples
    /// ```
    /// use cosyne::EasyEaConfig;
    ///
    /// let config = EasyEaConfig {
    ///     population_size: 128,
    ///     ..EasyEaConfig::default()
    /// };
    /// assert_eq!(config.elite_count(), 6);
    /// ```
    pub fn elite_count(&self) -> usize {
        (self.population_size as f32 * self.elite_fraction) as usize
    }

    /// Number of individuals retained by the
    /// upscaling scheme, or 0 for crossover.
    pub fn retained_count(&self) -> usize {
        match self.scheme {
            EasyScheme::Upscaling {
                retain_fraction, ..
            } => (self.population_size as f32 * retain_fraction).ceil() as usize,
            EasyScheme::Crossover { .. } => 0,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_population(self.population_size)?;
        check_probability("elite fraction", self.elite_fraction)?;
        self.mutation.validate()?;
        match self.scheme {
            EasyScheme::Upscaling {
                retain_fraction,
                clone_chance,
                clone_noise,
            } => {
                check_probability("retain fraction", retain_fraction)?;
                check_probability("clone chance", clone_chance)?;
                check_positive("clone noise", clone_noise)?;
                let retained = self.retained_count();
                if retained == 0 {
                    return Err(ConfigError::NoParents {
                        fraction: retain_fraction,
                        size: self.population_size,
                    });
                }
                // Elite 0 takes slot 0, the rest follow the retained block.
                let elites = self.elite_count();
                if elites > 0 && retained + elites > self.population_size {
                    return Err(ConfigError::ElitesDoNotFit {
                        elites,
                        retained,
                        size: self.population_size,
                    });
                }
            }
            EasyScheme::Crossover { selection } => {
                if let Selection::Tournament { size: 0 } = selection {
                    return Err(ConfigError::EmptyTournament);
                }
            }
        }
        Ok(())
    }
}

/// Configuration data for [`Cosyne`].
///
/// [`Cosyne`]: crate::Cosyne
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosyneConfig {
    /// Size of the population.
    pub population_size: usize,
    /// Top % of the population carried over as parents.
    pub parent_fraction: f32,
    /// Number of top-ranked slots whose synapses are
    /// never permuted.
    pub protected_count: usize,
    pub mutation: Mutation,
    pub shaping: ShapingConfig,
}

impl Default for CosyneConfig {
    fn default() -> CosyneConfig {
        CosyneConfig {
            population_size: 256,
            parent_fraction: 0.25,
            protected_count: 1,
            mutation: Mutation::Perturb {
                chance: 0.025,
                noise: Noise::Uniform { bound: 0.1 },
            },
            shaping: ShapingConfig::default(),
        }
    }
}

impl CosyneConfig {
    /// Number of parents carried over each generation.
    ///
    /// # Examples
    /// ```
    /// use cosyne::CosyneConfig;
    ///
    /// let config = CosyneConfig {
    ///     population_size: 256,
    ///     parent_fraction: 0.25,
    ///     ..CosyneConfig::default()
    /// };
    /// assert_eq!(config.parent_count(), 64);
    /// ```
    pub fn parent_count(&self) -> usize {
        (self.population_size as f32 * self.parent_fraction) as usize
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_population(self.population_size)?;
        check_probability("parent fraction", self.parent_fraction)?;
        self.mutation.validate()?;
        let parents = self.parent_count();
        if parents == 0 {
            return Err(ConfigError::NoParents {
                fraction: self.parent_fraction,
                size: self.population_size,
            });
        }
        let remainder = self.population_size - parents;
        if remainder % 2 != 0 {
            return Err(ConfigError::OddOffspring {
                size: self.population_size,
                parents,
                remainder,
            });
        }
        if self.protected_count > parents {
            return Err(ConfigError::TooManyProtected {
                protected: self.protected_count,
                parents,
            });
        }
        Ok(())
    }
}

fn check_population(size: usize) -> Result<(), ConfigError> {
    if size < 2 {
        Err(ConfigError::PopulationTooSmall(size))
    } else if size % 2 != 0 {
        Err(ConfigError::OddPopulation(size))
    } else {
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

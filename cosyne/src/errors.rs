use crate::algorithms::EaKind;

use thiserror::Error;

/// An error type indicating an algorithm configuration
/// that cannot be run with the requested population.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Crossover pairs individuals, so the population must be even.
    #[error("population size {0} is not a positive even number")]
    OddPopulation(usize),
    /// The population must contain at least two individuals.
    #[error("population size {0} is too small, at least 2 individuals are required")]
    PopulationTooSmall(usize),
    /// A probability-like parameter is outside of [0, 1].
    #[error("{name} = {value} is not a probability in [0, 1]")]
    InvalidProbability { name: &'static str, value: f32 },
    /// A noise bound or scale is not strictly positive.
    #[error("{name} = {value} must be positive")]
    NonPositive { name: &'static str, value: f32 },
    /// No parents would be carried into the next generation.
    #[error("parent fraction {fraction} selects no parents from {size} individuals")]
    NoParents { fraction: f32, size: usize },
    /// The offspring slots cannot be filled by crossover pairs.
    #[error("{remainder} offspring slots ({size} individuals, {parents} parents) cannot be filled in pairs")]
    OddOffspring {
        size: usize,
        parents: usize,
        remainder: usize,
    },
    /// More slots are protected from synapse permutation
    /// than there are parents.
    #[error("{protected} protected individuals exceed the {parents} carried-over parents")]
    TooManyProtected { protected: usize, parents: usize },
    /// Elites would be reinserted past the end of the population.
    #[error("{elites} elites after {retained} retained individuals do not fit in {size} slots")]
    ElitesDoNotFit {
        elites: usize,
        retained: usize,
        size: usize,
    },
    #[error("tournament size must be at least 1")]
    EmptyTournament,
}

/// An error type indicating invalid replacement weights.
#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("expected weights for {expected} individuals, got {found}")]
    PopulationSize { expected: usize, found: usize },
    #[error("genome {index} has {found} weights, expected {expected}")]
    GenomeLength {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// An error type indicating a failure to run
/// the population through an episode.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("world has no goals to evaluate against")]
    NoGoals,
    #[error("controller of individual {index} failed")]
    Controller {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("controller of individual {index} produced {found} outputs, agent expects {expected}")]
    ControlSize {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Weights(#[from] WeightsError),
}

/// An error type indicating a failure to save or
/// restore an algorithm's population.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not access saved population")]
    Io(#[from] std::io::Error),
    #[error("malformed saved population")]
    Decode(#[from] serde_json::Error),
    #[error("saved population belongs to {found:?}, expected {expected:?}")]
    KindMismatch { expected: EaKind, found: EaKind },
    #[error("saved population has {found} individuals, expected {expected}")]
    PopulationSize { expected: usize, found: usize },
    #[error("saved controller topology differs from the population's")]
    TopologyMismatch,
    #[error("could not rebuild controller from saved topology")]
    Controller(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Weights(#[from] WeightsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

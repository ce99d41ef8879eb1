//! The generation controllers: a shared contract and
//! its two implementations.
mod cosyne;
mod easy_ea;

pub use self::cosyne::Cosyne;
pub use easy_ea::EasyEa;

use crate::config::ShapingConfig;
use crate::errors::{EvaluationError, PersistenceError};
use crate::logging::Stats;
use crate::rng::EaRng;
use crate::selection::Ranking;
use crate::{Agent, Controller, Population, Weights, World};

use serde::{Deserialize, Serialize};
use tracing::debug;

use std::fmt;
use std::io::{Read, Write};

/// Identifies an algorithm in saved populations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EaKind {
    EasyEa,
    Cosyne,
}

impl fmt::Display for EaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EaKind::EasyEa => write!(f, "EasyEA"),
            EaKind::Cosyne => write!(f, "CoSyNE"),
        }
    }
}

/// The best individual of a ranked generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    /// Index of the individual in its generation.
    pub index: usize,
    /// The generation it was ranked in.
    pub generation: usize,
    pub weights: Weights,
    /// Effective fitness, goal bonus included.
    pub fitness: f32,
    pub goals_reached: usize,
}

/// The contract shared by all generation controllers.
///
/// A generation is driven by calling [`update`] until it
/// reports the episode finished, then [`process`] once to
/// rank the population and breed the next generation.
///
/// # Examples
/// ```
/// use cosyne::{EvolutionaryAlgorithm, World};
///
/// fn run_generation<E: EvolutionaryAlgorithm + ?Sized>(
///     algorithm: &mut E,
///     world: &World,
/// ) -> Result<(), cosyne::errors::EvaluationError> {
///     while !algorithm.update(1.0 / 60.0, world)? {}
///     algorithm.process()
/// }
/// ```
///
/// [`update`]: EvolutionaryAlgorithm::update
/// [`process`]: EvolutionaryAlgorithm::process
pub trait EvolutionaryAlgorithm {
    type Controller: Controller;
    type Agent: Agent;

    fn kind(&self) -> EaKind;

    /// Runs one evaluation step of `dt` seconds for the
    /// whole population. Returns `true` once every agent
    /// is dead.
    fn update(&mut self, dt: f32, world: &World) -> Result<bool, EvaluationError>;

    /// Ranks the finished generation, replaces the population
    /// with its offspring and starts a new episode.
    fn process(&mut self) -> Result<(), EvaluationError>;

    /// Writes the population to `writer` as a JSON document.
    fn save(&self, writer: &mut dyn Write) -> Result<(), PersistenceError>;

    /// Replaces the population with one previously written
    /// by [`save`], and starts a new episode.
    ///
    /// # Errors
    /// Fails, leaving the population untouched, if the
    /// document was saved by another kind of algorithm, for
    /// another population size or controller topology.
    ///
    /// [`save`]: EvolutionaryAlgorithm::save
    fn load(&mut self, reader: &mut dyn Read) -> Result<(), PersistenceError>;

    /// Number of generations processed so far.
    fn generation(&self) -> usize;

    fn population(&self) -> &Population<Self::Controller, Self::Agent>;

    /// Ranking of the last processed generation.
    fn last_ranking(&self) -> Option<&Ranking>;

    /// Fitness statistics of the last processed generation.
    fn last_stats(&self) -> Option<&Stats> {
        self.last_ranking().map(|ranking| &ranking.stats)
    }

    /// Best individual of the last processed generation.
    fn champion(&self) -> Option<&Champion>;

    /// Returns the controller and agent of an individual.
    fn individual(&self, index: usize) -> Option<(&Self::Controller, &Self::Agent)> {
        self.population().individual(index)
    }
}

/// State common to every algorithm.
#[derive(Clone, Debug)]
pub(crate) struct EaState<C: Controller, A> {
    pub population: Population<C, A>,
    pub rng: EaRng,
    pub generation: usize,
    pub ranking: Option<Ranking>,
    pub champion: Option<Champion>,
    pub topology: C::Topology,
    pub shaping: ShapingConfig,
}

impl<C, A> EaState<C, A>
where
    C: Controller,
    A: Agent,
{
    pub fn new(
        size: usize,
        mother: &C,
        agent: &A,
        mut rng: EaRng,
        shaping: ShapingConfig,
    ) -> EaState<C, A> {
        let population = Population::new(size, mother, agent, &mut rng);
        EaState {
            population,
            rng,
            generation: 0,
            ranking: None,
            champion: None,
            topology: mother.topology(),
            shaping,
        }
    }

    pub fn update(&mut self, dt: f32, world: &World) -> Result<bool, EvaluationError> {
        self.population.step(dt, world, &self.shaping)
    }

    /// Adds the goal bonus to every individual's fitness,
    /// then ranks the generation and records its champion.
    pub fn rank(&mut self) -> Ranking {
        self.population.add_goal_bonus(self.shaping.goal_bonus);
        let ranking = Ranking::new(self.population.fitness());
        self.champion = ranking.best().map(|index| Champion {
            index,
            generation: self.generation,
            weights: self.population.weights()[index].clone(),
            fitness: self.population.fitness()[index],
            goals_reached: self.population.agents()[index].progress().goals_reached,
        });
        self.ranking = Some(ranking.clone());
        ranking
    }

    /// Installs the next generation's genomes and starts
    /// a new episode.
    pub fn advance(&mut self, kind: EaKind, next: Vec<Weights>) -> Result<(), EvaluationError> {
        self.population.replace_weights(next)?;
        if let Some(ranking) = &self.ranking {
            debug!(
                algorithm = %kind,
                generation = self.generation,
                best = ranking.stats.maximum,
                mean = ranking.stats.mean,
                "processed generation"
            );
        }
        self.generation += 1;
        self.population.reset()
    }
}

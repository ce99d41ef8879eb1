//! A Population pairs every genome with a live
//! controller, a simulated agent and a fitness
//! accumulator.
//!
//! The four are kept as parallel arrays addressed
//! by a shared individual index, which never changes
//! during a generation.
use crate::errors::{EvaluationError, WeightsError};
use crate::{Agent, Controller, Weights};

use rand::Rng;

/// A fixed-size population of individuals.
#[derive(Clone, Debug)]
pub struct Population<C, A> {
    controllers: Vec<C>,
    agents: Vec<A>,
    weights: Vec<Weights>,
    pub(crate) fitness: Vec<f32>,
    genome_size: usize,
}

impl<C, A> Population<C, A>
where
    C: Controller,
    A: Agent,
{
    /// Creates `size` individuals shaped like `mother`, each
    /// independently initialized, paired with copies of `agent`.
    ///
    /// Initialization draws from `rng` individual by individual.
    pub fn new<R: Rng + ?Sized>(size: usize, mother: &C, agent: &A, rng: &mut R) -> Population<C, A> {
        let mut controllers = Vec::with_capacity(size);
        let mut weights = Vec::with_capacity(size);
        for _ in 0..size {
            let mut controller = mother.clone();
            controller.initialize(rng);
            weights.push(controller.weights());
            controllers.push(controller);
        }
        let mut agents: Vec<A> = (0..size).map(|_| agent.clone()).collect();
        agents.iter_mut().for_each(Agent::reset);

        Population {
            controllers,
            agents,
            weights,
            fitness: vec![0.0; size],
            genome_size: mother.weight_count(),
        }
    }

    /// Returns the number of individuals.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Returns the number of weights in every genome.
    pub fn genome_size(&self) -> usize {
        self.genome_size
    }

    /// Returns the controller and agent of an individual.
    pub fn individual(&self, index: usize) -> Option<(&C, &A)> {
        Some((self.controllers.get(index)?, self.agents.get(index)?))
    }

    /// Returns all stored genomes, by individual.
    pub fn weights(&self) -> &[Weights] {
        &self.weights
    }

    /// Returns the fitness accumulated so far this episode.
    pub fn fitness(&self) -> &[f32] {
        &self.fitness
    }

    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    pub fn controllers(&self) -> &[C] {
        &self.controllers
    }

    /// Returns whether any agent is still alive.
    pub fn any_alive(&self) -> bool {
        self.agents.iter().any(Agent::alive)
    }

    /// Replaces every stored genome. Controllers keep their
    /// current weights until the next [`reset`].
    ///
    /// # Errors
    /// Returns an error, leaving the population untouched,
    /// if the number of genomes or any genome's length is wrong.
    ///
    /// [`reset`]: Population::reset
    pub fn replace_weights(&mut self, weights: Vec<Weights>) -> Result<(), WeightsError> {
        if weights.len() != self.len() {
            return Err(WeightsError::PopulationSize {
                expected: self.len(),
                found: weights.len(),
            });
        }
        if let Some((index, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| w.len() != self.genome_size)
        {
            return Err(WeightsError::GenomeLength {
                index,
                expected: self.genome_size,
                found: w.len(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    /// Prepares a new episode: every agent returns to its
    /// start state, every controller reloads its stored
    /// genome, and all fitness is zeroed.
    pub fn reset(&mut self) -> Result<(), EvaluationError> {
        for (index, ((agent, controller), weights)) in self
            .agents
            .iter_mut()
            .zip(&mut self.controllers)
            .zip(&self.weights)
            .enumerate()
        {
            agent.reset();
            controller
                .load_weights(weights)
                .map_err(|e| EvaluationError::Controller {
                    index,
                    source: Box::new(e),
                })?;
        }
        self.fitness.iter_mut().for_each(|f| *f = 0.0);
        Ok(())
    }

    /// Adds `goal_bonus` per collected goal to every
    /// individual's fitness.
    pub(crate) fn add_goal_bonus(&mut self, goal_bonus: f32) {
        for (fitness, agent) in self.fitness.iter_mut().zip(&self.agents) {
            *fitness += goal_bonus * agent.progress().goals_reached as f32;
        }
    }

    /// Splits the population into its parallel
    /// arrays for per-individual evaluation.
    pub(crate) fn evaluation_slots(&mut self) -> (&mut [A], &[C], &mut [f32]) {
        (&mut self.agents, &self.controllers, &mut self.fitness)
    }

    #[cfg(test)]
    pub(crate) fn set_agents(&mut self, agents: Vec<A>) {
        assert_eq!(agents.len(), self.len());
        self.agents = agents;
    }

    #[cfg(test)]
    pub(crate) fn agents_mut(&mut self) -> &mut [A] {
        &mut self.agents
    }
}

use super::{Champion, EaKind, EaState, EvolutionaryAlgorithm};
use crate::config::CosyneConfig;
use crate::errors::{ConfigError, EvaluationError, PersistenceError};
use crate::meta::{mark_probabilities, MetaPopulation};
use crate::reproduction::{uniform_crossover, Mutator};
use crate::rng::EaRng;
use crate::selection::Ranking;
use crate::{Agent, Controller, Population, Weights, World};

use rand::Rng;
use tracing::debug;

use std::io::{Read, Write};

/// Cooperative Synapse NeuroEvolution.
///
/// Each generation, the top `parent_fraction` of the
/// population is carried over unchanged and the remaining
/// slots are filled with mutated crossover offspring of
/// those parents. The combined population is then
/// recombined synapse by synapse: in every synapse row,
/// slots are marked with a probability that grows as their
/// rank falls, and the marked values are rotated among
/// themselves.
///
/// The first `protected_count` slots, holding the best
/// parents, are never marked, so they reach the next
/// generation untouched.
#[derive(Clone, Debug)]
pub struct Cosyne<C: Controller, A> {
    pub(crate) state: EaState<C, A>,
    config: CosyneConfig,
    mutator: Mutator,
}

impl<C, A> Cosyne<C, A>
where
    C: Controller,
    A: Agent,
{
    /// Creates a population of `config.population_size`
    /// copies of `mother`, each initialized from `rng`,
    /// paired with copies of `agent`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: CosyneConfig, mother: &C, agent: &A, rng: EaRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let mutator = Mutator::new(&config.mutation)?;
        Ok(Cosyne {
            state: EaState::new(
                config.population_size,
                mother,
                agent,
                rng,
                config.shaping.clone(),
            ),
            config,
            mutator,
        })
    }

    pub fn config(&self) -> &CosyneConfig {
        &self.config
    }

    /// Breeds the genomes of the next generation.
    fn breed(&mut self, ranking: &Ranking) -> Vec<Weights> {
        let EaState {
            population, rng, ..
        } = &mut self.state;
        let weights = population.weights();
        let parents = self.config.parent_count();

        let mut offspring = Vec::with_capacity(weights.len() - parents);
        while offspring.len() < weights.len() - parents {
            let p1 = ranking.order[rng.gen_range(0..parents)];
            let p2 = ranking.order[rng.gen_range(0..parents)];
            let (a, b) = uniform_crossover(&weights[p1], &weights[p2], rng);
            offspring.push(a);
            offspring.push(b);
        }
        for genome in &mut offspring {
            self.mutator.mutate(genome, rng);
        }

        let next: Vec<Weights> = ranking
            .elites(parents)
            .iter()
            .map(|&i| weights[i].clone())
            .chain(offspring)
            .collect();

        // Slot i is marked with the probability of rank i.
        let probabilities = mark_probabilities(population.fitness(), &ranking.order);
        let mut meta = MetaPopulation::from_weights(&next);
        let moved = meta.permute(&probabilities, self.config.protected_count, rng);
        debug!(
            moved,
            synapses = meta.synapse_count(),
            "permuted marked synapses"
        );
        meta.to_weights()
    }
}

impl<C, A> EvolutionaryAlgorithm for Cosyne<C, A>
where
    C: Controller,
    A: Agent,
{
    type Controller = C;
    type Agent = A;

    fn kind(&self) -> EaKind {
        EaKind::Cosyne
    }

    fn update(&mut self, dt: f32, world: &World) -> Result<bool, EvaluationError> {
        self.state.update(dt, world)
    }

    fn process(&mut self) -> Result<(), EvaluationError> {
        let ranking = self.state.rank();
        let next = self.breed(&ranking);
        self.state.advance(EaKind::Cosyne, next)
    }

    fn save(&self, writer: &mut dyn Write) -> Result<(), PersistenceError> {
        self.state.save(EaKind::Cosyne, writer)
    }

    fn load(&mut self, reader: &mut dyn Read) -> Result<(), PersistenceError> {
        self.state.load(EaKind::Cosyne, reader)
    }

    fn generation(&self) -> usize {
        self.state.generation
    }

    fn population(&self) -> &Population<C, A> {
        &self.state.population
    }

    fn last_ranking(&self) -> Option<&Ranking> {
        self.state.ranking.as_ref()
    }

    fn champion(&self) -> Option<&Champion> {
        self.state.champion.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{affine, Affine, ScriptedAgent};
    use crate::{rng, Vec2};

    fn world() -> World {
        World {
            boundary: Vec2::new(10.0, 10.0),
            walls: vec![],
            goals: vec![Vec2::zeros()],
        }
    }

    fn cosyne(config: CosyneConfig) -> Cosyne<Affine, ScriptedAgent> {
        let agent = ScriptedAgent::new(2).with_observation_size(3);
        Cosyne::new(config, &affine(3, 2), &agent, rng::seeded(Some(3))).unwrap()
    }

    #[test]
    fn rejects_odd_offspring() {
        let result = Cosyne::new(
            CosyneConfig {
                population_size: 4,
                ..CosyneConfig::default()
            },
            &affine(2, 2),
            &ScriptedAgent::new(2),
            rng::seeded(None),
        );
        assert!(matches!(result, Err(ConfigError::OddOffspring { .. })));
    }

    #[test]
    fn best_individual_survives_untouched() {
        let mut ea = cosyne(CosyneConfig {
            population_size: 16,
            ..CosyneConfig::default()
        });
        for generation in 0..5 {
            while !ea.update(0.1, &world()).unwrap() {}
            let fitness: Vec<f32> = (0..16).map(|i| ((i * 7) % 16) as f32).collect();
            ea.state.population.fitness = fitness;
            let best = ea.state.population.fitness().iter().position(|&f| f == 15.0).unwrap();
            let champion = ea.population().weights()[best].clone();

            ea.process().unwrap();
            assert_eq!(ea.generation(), generation + 1);
            assert_eq!(ea.population().weights()[0], champion);
            assert_eq!(ea.champion().map(|c| &c.weights), Some(&champion));
        }
    }

    #[test]
    fn recombination_preserves_genome_shape() {
        let mut ea = cosyne(CosyneConfig {
            population_size: 8,
            parent_fraction: 0.5,
            protected_count: 2,
            ..CosyneConfig::default()
        });
        while !ea.update(0.1, &world()).unwrap() {}
        let before = ea.population().weights().to_vec();
        let order = crate::selection::rank(ea.population().fitness());
        ea.process().unwrap();

        let after = ea.population().weights();
        assert_eq!(after.len(), 8);
        assert!(after.iter().all(|w| w.len() == 8));
        assert_eq!(after[0], before[order[0]]);
        assert_eq!(after[1], before[order[1]]);
        assert!(ea.last_ranking().is_some());
    }
}

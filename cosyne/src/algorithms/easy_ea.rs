use super::{Champion, EaKind, EaState, EvolutionaryAlgorithm};
use crate::config::{EasyEaConfig, EasyScheme};
use crate::errors::{ConfigError, EvaluationError, PersistenceError};
use crate::reproduction::{uniform_crossover, upscale, Mutator};
use crate::rng::EaRng;
use crate::selection::Ranking;
use crate::{Agent, Controller, Population, Weights, World};

use std::io::{Read, Write};

/// A generational EA operating on whole genomes.
///
/// Each generation, the top `elite_fraction` of the
/// population is set aside unchanged. The rest is bred
/// according to the configured [`EasyScheme`], every bred
/// genome is mutated, and the elites are written back.
///
/// # Examples
/// ```
/// # use cosyne_nn::{LayerSpec, Network, Topology};
/// # use cosyne::{Agent, GoalProgress, Vec2, World};
/// # #[derive(Clone)]
/// # struct Dummy(GoalProgress);
/// # impl Agent for Dummy {
/// #     fn reset(&mut self) {}
/// #     fn update(&mut self, _: f32, _: &World) {}
/// #     fn alive(&self) -> bool { false }
/// #     fn position(&self) -> Vec2 { Vec2::zeros() }
/// #     fn observation_size(&self) -> usize { 2 }
/// #     fn observe(&self, _: &World, _: &mut [f32]) {}
/// #     fn actuator_count(&self) -> usize { 2 }
/// #     fn control(&mut self, _: &[f32]) {}
/// #     fn progress(&self) -> &GoalProgress { &self.0 }
/// #     fn progress_mut(&mut self) -> &mut GoalProgress { &mut self.0 }
/// # }
/// use cosyne::{rng, EasyEa, EasyEaConfig, EvolutionaryAlgorithm};
///
/// let topology = Topology::new(vec![LayerSpec::Linear { inputs: 2, outputs: 2 }]).unwrap();
/// let mother = Network::new(&topology);
/// let config = EasyEaConfig {
///     population_size: 20,
///     ..EasyEaConfig::default()
/// };
/// let mut ea = EasyEa::new(config, &mother, &Dummy(GoalProgress::default()), rng::seeded(Some(0)))
///     .unwrap();
/// assert_eq!(ea.population().len(), 20);
/// assert_eq!(ea.generation(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct EasyEa<C: Controller, A> {
    pub(crate) state: EaState<C, A>,
    config: EasyEaConfig,
    mutator: Mutator,
}

impl<C, A> EasyEa<C, A>
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
    pub fn new(config: EasyEaConfig, mother: &C, agent: &A, rng: EaRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let mutator = Mutator::new(&config.mutation)?;
        Ok(EasyEa {
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

    pub fn config(&self) -> &EasyEaConfig {
        &self.config
    }

    /// Breeds the genomes of the next generation.
    fn breed(&mut self, ranking: &Ranking) -> Vec<Weights> {
        let EaState {
            population, rng, ..
        } = &mut self.state;
        let weights = population.weights();
        let elites: Vec<Weights> = ranking
            .elites(self.config.elite_count())
            .iter()
            .map(|&i| weights[i].clone())
            .collect();

        match self.config.scheme {
            EasyScheme::Upscaling {
                clone_chance,
                clone_noise,
                ..
            } => {
                let retained = self.config.retained_count();
                let parents: Vec<&Weights> = ranking
                    .elites(retained)
                    .iter()
                    .map(|&i| &weights[i])
                    .collect();
                let mut next = upscale(&parents, weights.len(), clone_chance, clone_noise, rng);
                for genome in &mut next {
                    self.mutator.mutate(genome, rng);
                }
                // The best elite leads the population, the others
                // follow the retained block.
                for (i, elite) in elites.into_iter().enumerate() {
                    let slot = if i == 0 { 0 } else { retained + i };
                    next[slot] = elite;
                }
                next
            }
            EasyScheme::Crossover { selection } => {
                let selected = selection.select(population.fitness(), weights.len(), rng);
                let mut next = Vec::with_capacity(weights.len());
                for pair in selected.chunks_exact(2) {
                    let (a, b) = uniform_crossover(&weights[pair[0]], &weights[pair[1]], rng);
                    next.push(a);
                    next.push(b);
                }
                for genome in &mut next {
                    self.mutator.mutate(genome, rng);
                }
                for (slot, elite) in next.iter_mut().zip(elites) {
                    *slot = elite;
                }
                next
            }
        }
    }
}

impl<C, A> EvolutionaryAlgorithm for EasyEa<C, A>
where
    C: Controller,
    A: Agent,
{
    type Controller = C;
    type Agent = A;

    fn kind(&self) -> EaKind {
        EaKind::EasyEa
    }

    fn update(&mut self, dt: f32, world: &World) -> Result<bool, EvaluationError> {
        self.state.update(dt, world)
    }

    fn process(&mut self) -> Result<(), EvaluationError> {
        let ranking = self.state.rank();
        let next = self.breed(&ranking);
        self.state.advance(EaKind::EasyEa, next)
    }

    fn save(&self, writer: &mut dyn Write) -> Result<(), PersistenceError> {
        self.state.save(EaKind::EasyEa, writer)
    }

    fn load(&mut self, reader: &mut dyn Read) -> Result<(), PersistenceError> {
        self.state.load(EaKind::EasyEa, reader)
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
    use crate::config::{Mutation, Selection};
    use crate::testing::{affine, Affine, ScriptedAgent};
    use crate::{rng, Vec2};

    fn world() -> World {
        World {
            boundary: Vec2::new(10.0, 10.0),
            walls: vec![],
            goals: vec![Vec2::zeros()],
        }
    }

    fn easy_ea(config: EasyEaConfig) -> EasyEa<Affine, ScriptedAgent> {
        EasyEa::new(config, &affine(2, 2), &ScriptedAgent::new(2), rng::seeded(Some(7))).unwrap()
    }

    fn run_generation(ea: &mut EasyEa<Affine, ScriptedAgent>, fitness: &[f32]) -> Vec<Weights> {
        while !ea.update(0.1, &world()).unwrap() {}
        ea.state.population.fitness = fitness.to_vec();
        let before = ea.population().weights().to_vec();
        ea.process().unwrap();
        before
    }

    #[test]
    fn rejects_invalid_config() {
        let result = EasyEa::new(
            EasyEaConfig {
                population_size: 5,
                ..EasyEaConfig::default()
            },
            &affine(2, 2),
            &ScriptedAgent::new(2),
            rng::seeded(Some(7)),
        );
        assert_eq!(result.err(), Some(ConfigError::OddPopulation(5)));
    }

    #[test]
    fn upscaling_keeps_elites_in_place() {
        // 20 individuals: 2 elites, 4 retained, 16 clones.
        let mut ea = easy_ea(EasyEaConfig {
            population_size: 20,
            elite_fraction: 0.1,
            mutation: Mutation::Reset { chance: 1.0 },
            ..EasyEaConfig::default()
        });
        let fitness: Vec<f32> = (0..20).map(|i| i as f32).collect();
        let before = run_generation(&mut ea, &fitness);
        let after = ea.population().weights();

        assert_eq!(ea.generation(), 1);
        assert_eq!(after.len(), 20);
        // Elites 19 and 18 land in slot 0 and after the retained block.
        assert_eq!(after[0], before[19]);
        assert_eq!(after[5], before[18]);
        // Everything else was mutated.
        assert_ne!(after[1], before[18]);
    }

    #[test]
    fn crossover_scheme_keeps_elites_first() {
        let mut ea = easy_ea(EasyEaConfig {
            population_size: 8,
            elite_fraction: 0.25,
            scheme: EasyScheme::Crossover {
                selection: Selection::Tournament { size: 2 },
            },
            ..EasyEaConfig::default()
        });
        let fitness = [1.0, 8.0, 2.0, 7.0, 3.0, 6.0, 4.0, 5.0];
        let before = run_generation(&mut ea, &fitness);
        let after = ea.population().weights();
        assert_eq!(after[0], before[1]);
        assert_eq!(after[1], before[3]);
        assert!(after.iter().all(|w| w.len() == 6));
    }

    #[test]
    fn sus_crossover_runs() {
        let mut ea = easy_ea(EasyEaConfig {
            population_size: 6,
            scheme: EasyScheme::Crossover {
                selection: Selection::StochasticUniversal,
            },
            ..EasyEaConfig::default()
        });
        for _ in 0..3 {
            while !ea.update(0.1, &world()).unwrap() {}
            ea.process().unwrap();
        }
        assert_eq!(ea.generation(), 3);
        assert!(ea.last_stats().is_some());
        assert_eq!(ea.champion().map(|c| c.generation), Some(2));
    }
}

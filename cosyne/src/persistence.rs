//! Saving and restoring populations.
//!
//! A saved population is a pretty-printed JSON document
//! holding everything needed to resume evaluation: the
//! algorithm kind, the controller topology and every
//! individual's genome. Floats are written in their
//! shortest round-tripping form, so loading reproduces
//! the genomes exactly.
use crate::algorithms::{EaKind, EaState};
use crate::config::{CosyneConfig, EasyEaConfig};
use crate::errors::PersistenceError;
use crate::rng::EaRng;
use crate::{Agent, Controller, Cosyne, EasyEa, EvolutionaryAlgorithm, Weights};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use std::io::{Read, Write};

/// The document written by [`EvolutionaryAlgorithm::save`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedPopulation<T> {
    pub kind: EaKind,
    pub population_size: usize,
    pub generation: usize,
    pub topology: T,
    pub weights: Vec<Weights>,
}

impl<T: DeserializeOwned> SavedPopulation<T> {
    /// Decodes a document.
    pub fn read(reader: &mut dyn Read) -> Result<SavedPopulation<T>, PersistenceError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Borrowing counterpart of [`SavedPopulation`] used when writing.
#[derive(Serialize)]
struct SavedPopulationRef<'a, T> {
    kind: EaKind,
    population_size: usize,
    generation: usize,
    topology: &'a T,
    weights: &'a [Weights],
}

impl<C, A> EaState<C, A>
where
    C: Controller,
    A: Agent,
{
    pub(crate) fn save(&self, kind: EaKind, writer: &mut dyn Write) -> Result<(), PersistenceError> {
        let saved = SavedPopulationRef {
            kind,
            population_size: self.population.len(),
            generation: self.generation,
            topology: &self.topology,
            weights: self.population.weights(),
        };
        serde_json::to_writer_pretty(&mut *writer, &saved)?;
        writer.flush()?;
        info!(algorithm = %kind, generation = self.generation, "saved population");
        Ok(())
    }

    pub(crate) fn load(&mut self, kind: EaKind, reader: &mut dyn Read) -> Result<(), PersistenceError> {
        self.restore(kind, SavedPopulation::read(reader)?)
    }

    /// Checks a decoded document against this population
    /// and, if it fits, installs its genomes and starts a
    /// new episode.
    pub(crate) fn restore(
        &mut self,
        kind: EaKind,
        saved: SavedPopulation<C::Topology>,
    ) -> Result<(), PersistenceError> {
        if saved.kind != kind {
            return Err(PersistenceError::KindMismatch {
                expected: kind,
                found: saved.kind,
            });
        }
        if saved.population_size != self.population.len() {
            return Err(PersistenceError::PopulationSize {
                expected: self.population.len(),
                found: saved.population_size,
            });
        }
        if saved.topology != self.topology {
            return Err(PersistenceError::TopologyMismatch);
        }
        self.population.replace_weights(saved.weights)?;
        self.generation = saved.generation;
        self.ranking = None;
        self.champion = None;
        self.population.reset()?;
        info!(algorithm = %kind, generation = self.generation, "loaded population");
        Ok(())
    }
}

/// A boxed algorithm of either kind.
pub type DynAlgorithm<C, A> = Box<dyn EvolutionaryAlgorithm<Controller = C, Agent = A>>;

/// Rebuilds whichever algorithm wrote the document in
/// `reader`, with a mother controller built from the saved
/// topology and copies of `agent`.
///
/// The configuration matching the saved kind is used with
/// its population size replaced by the saved one; the
/// other is ignored.
///
/// # Errors
/// Returns an error if the document cannot be decoded,
/// its topology cannot be built, the adjusted configuration
/// is invalid, or the genomes do not fit the topology.
pub fn load_algorithm<C, A>(
    reader: &mut dyn Read,
    agent: &A,
    easy_config: EasyEaConfig,
    cosyne_config: CosyneConfig,
    rng: EaRng,
) -> Result<DynAlgorithm<C, A>, PersistenceError>
where
    C: Controller + 'static,
    A: Agent + 'static,
{
    let saved: SavedPopulation<C::Topology> = SavedPopulation::read(reader)?;
    let mother = C::from_topology(&saved.topology)
        .map_err(|e| PersistenceError::Controller(Box::new(e)))?;
    let size = saved.population_size;
    Ok(match saved.kind {
        EaKind::EasyEa => {
            let config = EasyEaConfig {
                population_size: size,
                ..easy_config
            };
            let mut algorithm = EasyEa::new(config, &mother, agent, rng)?;
            algorithm.state.restore(EaKind::EasyEa, saved)?;
            Box::new(algorithm)
        }
        EaKind::Cosyne => {
            let config = CosyneConfig {
                population_size: size,
                ..cosyne_config
            };
            let mut algorithm = Cosyne::new(config, &mother, agent, rng)?;
            algorithm.state.restore(EaKind::Cosyne, saved)?;
            Box::new(algorithm)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{affine, Affine, ScriptedAgent};
    use crate::{rng, Vec2, World};

    fn world() -> World {
        World {
            boundary: Vec2::new(10.0, 10.0),
            walls: vec![],
            goals: vec![Vec2::zeros()],
        }
    }

    fn cosyne(seed: u64) -> Cosyne<Affine, ScriptedAgent> {
        let config = CosyneConfig {
            population_size: 8,
            parent_fraction: 0.5,
            ..CosyneConfig::default()
        };
        Cosyne::new(config, &affine(2, 2), &ScriptedAgent::new(2), rng::seeded(Some(seed))).unwrap()
    }

    #[test]
    fn save_load_round_trip() {
        let mut source = cosyne(1);
        while !source.update(0.1, &world()).unwrap() {}
        source.process().unwrap();
        let mut document = vec![];
        source.save(&mut document).unwrap();

        let mut target = cosyne(2);
        assert_ne!(target.population().weights(), source.population().weights());
        target.load(&mut document.as_slice()).unwrap();
        assert_eq!(target.population().weights(), source.population().weights());
        assert_eq!(target.generation(), 1);
        let controllers = target.population().controllers();
        for (controller, weights) in controllers.iter().zip(source.population().weights()) {
            assert_eq!(&controller.weights(), weights);
        }
    }

    #[test]
    fn document_layout() {
        let source = cosyne(1);
        let mut document = vec![];
        source.save(&mut document).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&document).unwrap();
        assert_eq!(value["kind"], "Cosyne");
        assert_eq!(value["population_size"], 8);
        assert_eq!(value["generation"], 0);
        assert_eq!(value["topology"], serde_json::json!([2, 2]));
        assert_eq!(value["weights"].as_array().map(Vec::len), Some(8));
    }

    #[test]
    fn rejects_other_kind() {
        let mut document = vec![];
        cosyne(1).save(&mut document).unwrap();
        let mut easy = EasyEa::new(
            EasyEaConfig {
                population_size: 8,
                ..EasyEaConfig::default()
            },
            &affine(2, 2),
            &ScriptedAgent::new(2),
            rng::seeded(Some(1)),
        )
        .unwrap();
        let before = easy.population().weights().to_vec();
        assert!(matches!(
            easy.load(&mut document.as_slice()),
            Err(PersistenceError::KindMismatch {
                expected: EaKind::EasyEa,
                found: EaKind::Cosyne
            })
        ));
        assert_eq!(easy.population().weights(), &before[..]);
    }

    #[test]
    fn rejects_other_topology() {
        let mut document = vec![];
        cosyne(1).save(&mut document).unwrap();
        let config = CosyneConfig {
            population_size: 8,
            parent_fraction: 0.5,
            ..CosyneConfig::default()
        };
        let agent = ScriptedAgent::new(2).with_observation_size(3);
        let mut other = Cosyne::new(config, &affine(3, 2), &agent, rng::seeded(Some(1))).unwrap();
        assert!(matches!(
            other.load(&mut document.as_slice()),
            Err(PersistenceError::TopologyMismatch)
        ));
    }

    #[test]
    fn rejects_garbage() {
        let mut source = cosyne(1);
        assert!(matches!(
            source.load(&mut &b"{\"kind\": \"Neat\"}"[..]),
            Err(PersistenceError::Decode(_))
        ));
    }

    #[test]
    fn loader_picks_saved_kind() {
        let mut source = cosyne(4);
        while !source.update(0.1, &world()).unwrap() {}
        source.process().unwrap();
        let mut document = vec![];
        source.save(&mut document).unwrap();

        let loaded: DynAlgorithm<Affine, ScriptedAgent> = load_algorithm(
            &mut document.as_slice(),
            &ScriptedAgent::new(2),
            EasyEaConfig::default(),
            CosyneConfig {
                parent_fraction: 0.5,
                ..CosyneConfig::default()
            },
            rng::seeded(Some(9)),
        )
        .unwrap();
        assert_eq!(loaded.kind(), EaKind::Cosyne);
        assert_eq!(loaded.population().len(), 8);
        assert_eq!(loaded.generation(), 1);
        assert_eq!(loaded.population().weights(), source.population().weights());
    }
}

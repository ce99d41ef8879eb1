//! Neuroevolution of fixed-topology controllers for goal-seeking
//! agents, through a simple generational EA and Cooperative Synapse
//! NeuroEvolution (CoSyNE, Gomez et al. 2008).
//!
//! Controllers are any weight-parameterized function implementing the
//! [`Controller`] trait; a feed-forward network implementation is
//! supplied by the `cosyne-nn` crate. Agents are simulated bodies
//! implementing [`Agent`], evaluated in parallel in a shared [`World`]
//! and rewarded for reaching its goals in order, quickly.
//!
//! Both algorithms implement [`EvolutionaryAlgorithm`]: call `update`
//! until every agent is dead, then `process` to breed the next
//! generation. Populations can be saved to and restored from JSON.
//!
//! # Example usage: a point mass steering towards goals
//! ```
//! use cosyne::{rng, Agent, Cosyne, CosyneConfig, EvolutionaryAlgorithm, GoalProgress, Vec2, World};
//! use cosyne::logging::{EvolutionLogger, ReportingLevel};
//! use cosyne_nn::{LayerSpec, Network, Topology};
//!
//! #[derive(Clone)]
//! struct Point {
//!     position: Vec2,
//!     velocity: Vec2,
//!     steps: u32,
//!     progress: GoalProgress,
//! }
//!
//! impl Agent for Point {
//!     fn reset(&mut self) {
//!         *self = Point { position: Vec2::new(50.0, 50.0), velocity: Vec2::zeros(), steps: 0, progress: GoalProgress::default() };
//!     }
//!     fn update(&mut self, _dt: f32, _world: &World) {
//!         if self.alive() {
//!             self.position += self.velocity;
//!             self.steps += 1;
//!             self.progress.elapsed_alive_steps += 1;
//!         }
//!     }
//!     fn alive(&self) -> bool { self.steps < 50 }
//!     fn position(&self) -> Vec2 { self.position }
//!     fn observation_size(&self) -> usize { 2 }
//!     fn observe(&self, world: &World, observation: &mut [f32]) {
//!         let goal = world.goal(self.progress.goals_reached).unwrap_or(Vec2::zeros());
//!         let offset = goal - self.position;
//!         observation.copy_from_slice(&[offset.x / 100.0, offset.y / 100.0]);
//!     }
//!     fn actuator_count(&self) -> usize { 2 }
//!     fn control(&mut self, controls: &[f32]) {
//!         self.velocity = Vec2::new(controls[0], controls[1]);
//!     }
//!     fn progress(&self) -> &GoalProgress { &self.progress }
//!     fn progress_mut(&mut self) -> &mut GoalProgress { &mut self.progress }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let world = World {
//!         boundary: Vec2::new(100.0, 100.0),
//!         walls: vec![],
//!         goals: vec![Vec2::new(60.0, 40.0), Vec2::new(40.0, 60.0)],
//!     };
//!     let topology = Topology::new(vec![
//!         LayerSpec::Linear { inputs: 2, outputs: 4 },
//!         LayerSpec::Tanh { width: 4 },
//!         LayerSpec::Linear { inputs: 4, outputs: 2 },
//!         LayerSpec::Tanh { width: 2 },
//!     ])?;
//!     let mother = Network::new(&topology);
//!     let mut agent = Point { position: Vec2::zeros(), velocity: Vec2::zeros(), steps: 0, progress: GoalProgress::default() };
//!     agent.reset();
//!
//!     let config = CosyneConfig { population_size: 32, ..CosyneConfig::default() };
//!     let mut cosyne = Cosyne::new(config, &mother, &agent, rng::seeded(Some(1)))?;
//!     let mut logger = EvolutionLogger::new(ReportingLevel::PopulationChampion);
//!     for _ in 0..5 {
//!         while !cosyne.update(1.0 / 60.0, &world)? {}
//!         cosyne.process()?;
//!         logger.log(&cosyne);
//!     }
//!     assert_eq!(cosyne.generation(), 5);
//!     for log in logger.iter() {
//!         println!("{}", log);
//!     }
//!     Ok(())
//! }
//! ```

mod agent;
mod algorithms;
mod config;
mod controller;
mod evaluation;
mod population;
mod world;

pub mod errors;
pub mod logging;
pub mod meta;
pub mod persistence;
pub mod reproduction;
pub mod rng;
pub mod selection;

#[cfg(test)]
mod testing;

pub use agent::*;
pub use algorithms::{Champion, Cosyne, EaKind, EasyEa, EvolutionaryAlgorithm};
pub use config::*;
pub use controller::*;
pub use evaluation::proximity;
pub use meta::MetaPopulation;
pub use persistence::{load_algorithm, DynAlgorithm, SavedPopulation};
pub use population::Population;
pub use selection::Ranking;
pub use world::*;

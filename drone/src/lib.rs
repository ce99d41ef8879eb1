//! # Drone
//! Trains neural controllers that fly a two-thruster drone
//! through a loop of goals, using the [`cosyne`] engine.
//!
//! The [`body`] module simulates the drone and implements
//! [`cosyne::Agent`] for it; [`levels`] holds the training
//! worlds; [`runner`] drives training generation by
//! generation, reporting and saving as it goes.
//!
//! A short session on a small population:
//! ```
//! use drone::config::RunConfig;
//! use drone::runner::ConsoleRunner;
//!
//! let config = RunConfig {
//!     population_size: Some(8),
//!     seed: Some(1),
//!     generation_limit: Some(2),
//!     save_interval: 0,
//!     ..RunConfig::default()
//! };
//! let mut runner = ConsoleRunner::new(config, vec![]).unwrap();
//! runner.run().unwrap();
//!
//! let report = String::from_utf8(runner.output().clone()).unwrap();
//! assert_eq!(report.lines().count(), 2);
//! assert!(report.starts_with("Gen: 1 Lvl: 0 --- BF: "));
//! ```

pub mod body;
pub mod cli;
pub mod config;
pub mod errors;
pub mod levels;
pub mod runner;

pub use errors::RunError;

use cosyne::errors::{ConfigError, EvaluationError, PersistenceError};
use cosyne_nn::ShapeError;
use thiserror::Error;

use std::io;
use std::path::PathBuf;

/// An error raised while setting up or running a training session.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed run configuration: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("could not write the generation report: {0}")]
    Report(#[source] io::Error),
    #[error("invalid controller shape: {0}")]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Algorithm(#[from] ConfigError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("no levels to train on")]
    NoLevels,
    #[error("level {0} has no goals")]
    NoGoals(usize),
    #[error("the start position of level {0} lies inside a wall")]
    BlockedStart(usize),
    #[error("level {0} is too small to randomize")]
    CrampedLevel(usize),
    #[error("could not place {item} {index} clear of its surroundings")]
    Placement { item: &'static str, index: usize },
    #[error("saved controllers expect {expected} observations, but the drone provides {found}")]
    ObservationMismatch { expected: usize, found: usize },
}

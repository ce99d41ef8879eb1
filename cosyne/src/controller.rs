use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};

use std::fmt;

/// A flat genome: every trainable parameter
/// of a controller, in a fixed order.
pub type Weights = Vec<f32>;

/// An interface for weight-parameterized controllers
/// that can be evolved by the algorithms in this crate.
///
/// The topology of a controller is fixed at construction
/// and shared by the whole population; only the weights
/// change between generations.
pub trait Controller: Clone + Send + Sync {
    /// A serializable description of the controller's shape,
    /// sufficient to rebuild an uninitialized controller.
    type Topology: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds a controller with the described shape.
    fn from_topology(topology: &Self::Topology) -> Result<Self, Self::Error>;

    /// Returns the controller's shape.
    fn topology(&self) -> Self::Topology;

    /// Fills all trainable parameters with
    /// independent uniform noise in [-1, 1].
    fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Maps an observation to a control vector.
    ///
    /// Fails if `observation.len()` differs from the
    /// controller's input width.
    fn forward(&self, observation: &[f32]) -> Result<Vec<f32>, Self::Error>;

    /// Returns a copy of all trainable parameters.
    fn weights(&self) -> Weights;

    /// Replaces all trainable parameters.
    ///
    /// Fails if `weights.len()` differs from [`weight_count`].
    ///
    /// [`weight_count`]: Controller::weight_count
    fn load_weights(&mut self, weights: &[f32]) -> Result<(), Self::Error>;

    /// Returns the genome size.
    fn weight_count(&self) -> usize;
}

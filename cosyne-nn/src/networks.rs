mod layers;

pub use layers::{Layer, Linear};

use crate::{ShapeError, Topology};

use cosyne::{Controller, Weights};
use rand::Rng;

/// A feed-forward network evaluating its layers in order.
///
/// # Examples
/// ```
/// use cosyne::Controller;
/// use cosyne_nn::{Network, Topology};
///
/// let topology = Topology::tanh_perceptron(&[3, 4, 2]).unwrap();
/// let mut network = Network::new(&topology);
/// network.initialize(&mut cosyne::rng::seeded(Some(0)));
///
/// let output = network.forward(&[0.1, -0.2, 0.3]).unwrap();
/// assert_eq!(output.len(), 2);
/// assert!(output.iter().all(|y| (-1.0..=1.0).contains(y)));
/// assert!(network.forward(&[0.1]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    topology: Topology,
    layers: Vec<Layer>,
    parameter_count: usize,
}

impl Network {
    /// Returns a network shaped by `topology`,
    /// with every parameter set to zero.
    pub fn new(topology: &Topology) -> Network {
        Network {
            topology: topology.clone(),
            layers: topology.layers().iter().map(Layer::from).collect(),
            parameter_count: topology.parameter_count(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn linear_layers(&self) -> impl Iterator<Item = &Linear> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Linear(linear) => Some(linear),
            _ => None,
        })
    }
}

impl Controller for Network {
    type Topology = Topology;
    type Error = ShapeError;

    fn from_topology(topology: &Topology) -> Result<Network, ShapeError> {
        Ok(Network::new(topology))
    }

    fn topology(&self) -> Topology {
        self.topology.clone()
    }

    fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for layer in &mut self.layers {
            if let Layer::Linear(linear) = layer {
                linear.initialize(rng);
            }
        }
    }

    fn forward(&self, observation: &[f32]) -> Result<Vec<f32>, ShapeError> {
        let expected = self.topology.input_width();
        if observation.len() != expected {
            return Err(ShapeError::InputWidth {
                expected,
                found: observation.len(),
            });
        }
        Ok(self
            .layers
            .iter()
            .fold(observation.to_vec(), |activation, layer| layer.forward(activation)))
    }

    fn weights(&self) -> Weights {
        let mut weights = Vec::with_capacity(self.parameter_count);
        for linear in self.linear_layers() {
            linear.write_parameters(&mut weights);
        }
        weights
    }

    fn load_weights(&mut self, weights: &[f32]) -> Result<(), ShapeError> {
        if weights.len() != self.parameter_count {
            return Err(ShapeError::WeightCount {
                expected: self.parameter_count,
                found: weights.len(),
            });
        }
        let mut rest = weights;
        for layer in &mut self.layers {
            if let Layer::Linear(linear) = layer {
                let (own, tail) = rest.split_at(linear.parameter_count());
                linear.read_parameters(own);
                rest = tail;
            }
        }
        Ok(())
    }

    fn weight_count(&self) -> usize {
        self.parameter_count
    }
}

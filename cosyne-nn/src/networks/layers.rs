use crate::LayerSpec;

use cosyne::rng;
use rand::Rng;

/// A dense layer computing `W x + b`.
///
/// `W` is stored row-major, one row per output,
/// so `weights[i * inputs + j]` connects input `j`
/// to output `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct Linear {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Linear {
    /// Returns a zeroed layer.
    pub fn new(inputs: usize, outputs: usize) -> Linear {
        Linear {
            inputs,
            outputs,
            weights: vec![0.0; inputs * outputs],
            biases: vec![0.0; outputs],
        }
    }

    /// Draws every parameter from U[-1, 1), output by output:
    /// first the output's row of weights, then its bias.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for (row, bias) in self.weights.chunks_mut(self.inputs).zip(&mut self.biases) {
            row.iter_mut().for_each(|w| *w = rng::unit_weight(rng));
            *bias = rng::unit_weight(rng);
        }
    }

    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .chunks(self.inputs)
            .zip(&self.biases)
            .map(|(row, bias)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + bias)
            .collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Appends the weight matrix, then the biases.
    pub fn write_parameters(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.weights);
        out.extend_from_slice(&self.biases);
    }

    /// Reads parameters in the order of [`write_parameters`].
    /// `parameters` must hold exactly [`parameter_count`] values.
    ///
    /// [`write_parameters`]: Linear::write_parameters
    /// [`parameter_count`]: Linear::parameter_count
    pub fn read_parameters(&mut self, parameters: &[f32]) {
        let (weights, biases) = parameters.split_at(self.weights.len());
        self.weights.copy_from_slice(weights);
        self.biases.copy_from_slice(biases);
    }

    pub fn spec(&self) -> LayerSpec {
        LayerSpec::Linear {
            inputs: self.inputs,
            outputs: self.outputs,
        }
    }
}

/// A network layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Layer {
    Linear(Linear),
    Tanh(usize),
    ReLU(usize),
}

impl From<&LayerSpec> for Layer {
    fn from(spec: &LayerSpec) -> Layer {
        match *spec {
            LayerSpec::Linear { inputs, outputs } => Layer::Linear(Linear::new(inputs, outputs)),
            LayerSpec::Tanh { width } => Layer::Tanh(width),
            LayerSpec::ReLU { width } => Layer::ReLU(width),
        }
    }
}

impl Layer {
    pub fn forward(&self, mut input: Vec<f32>) -> Vec<f32> {
        match self {
            Layer::Linear(linear) => linear.forward(&input),
            Layer::Tanh(_) => {
                input.iter_mut().for_each(|x| *x = x.tanh());
                input
            }
            Layer::ReLU(_) => {
                input.iter_mut().for_each(|x| *x = x.max(0.0));
                input
            }
        }
    }

    pub fn spec(&self) -> LayerSpec {
        match self {
            Layer::Linear(linear) => linear.spec(),
            Layer::Tanh(width) => LayerSpec::Tanh { width: *width },
            Layer::ReLU(width) => LayerSpec::ReLU { width: *width },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn linear_arithmetic() {
        let mut linear = Linear::new(2, 2);
        linear.read_parameters(&[1.0, 2.0, -1.0, 0.5, 0.25, -0.25]);
        assert_eq!(linear.forward(&[3.0, 4.0]), [11.25, -1.25]);
    }

    #[test]
    fn initialization_is_interleaved_by_output() {
        let mut linear = Linear::new(2, 2);
        linear.initialize(&mut ChaCha8Rng::seed_from_u64(6));

        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let draws: Vec<f32> = (0..6).map(|_| rng::unit_weight(&mut rng)).collect();
        let mut parameters = vec![];
        linear.write_parameters(&mut parameters);
        // w00 w01 b0 w10 w11 b1 are drawn in that order.
        assert_eq!(parameters, [draws[0], draws[1], draws[3], draws[4], draws[2], draws[5]]);
        assert!(parameters.iter().all(|p| (-1.0..1.0).contains(p)));
    }

    #[test]
    fn activations() {
        let input = vec![-2.0, 0.0, 0.5];
        assert_eq!(Layer::ReLU(3).forward(input.clone()), [0.0, 0.0, 0.5]);
        let tanh = Layer::Tanh(3).forward(input);
        assert_eq!(tanh[1], 0.0);
        assert!(tanh[0] < -0.96 && tanh[0] > -1.0);
        assert!((tanh[2] - 0.5f32.tanh()).abs() < f32::EPSILON);
    }

    #[test]
    fn spec_round_trip() {
        for spec in [
            LayerSpec::Linear {
                inputs: 3,
                outputs: 1,
            },
            LayerSpec::Tanh { width: 2 },
            LayerSpec::ReLU { width: 4 },
        ] {
            assert_eq!(Layer::from(&spec).spec(), spec);
        }
    }
}

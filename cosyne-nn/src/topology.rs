use crate::errors::ShapeError;

use serde::{Deserialize, Serialize};

/// Description of a single network layer.
///
/// Serialized externally tagged, e.g.
/// `{"Linear": {"inputs": 7, "outputs": 16}}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerSpec {
    /// Dense `outputs × inputs` matrix plus bias.
    Linear { inputs: usize, outputs: usize },
    /// Elementwise hyperbolic tangent.
    Tanh { width: usize },
    /// Elementwise `max(x, 0)`.
    ReLU { width: usize },
}

impl LayerSpec {
    pub fn input_width(&self) -> usize {
        match *self {
            LayerSpec::Linear { inputs, .. } => inputs,
            LayerSpec::Tanh { width } | LayerSpec::ReLU { width } => width,
        }
    }

    pub fn output_width(&self) -> usize {
        match *self {
            LayerSpec::Linear { outputs, .. } => outputs,
            LayerSpec::Tanh { width } | LayerSpec::ReLU { width } => width,
        }
    }

    /// Number of trainable parameters, biases included.
    pub fn parameter_count(&self) -> usize {
        match *self {
            LayerSpec::Linear { inputs, outputs } => inputs * outputs + outputs,
            LayerSpec::Tanh { .. } | LayerSpec::ReLU { .. } => 0,
        }
    }
}

/// A validated, ordered sequence of layers in which every
/// layer consumes exactly what the previous one produces.
///
/// Serialized as the plain list of its layers; decoding
/// re-validates the list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LayerSpec>", into = "Vec<LayerSpec>")]
pub struct Topology {
    layers: Vec<LayerSpec>,
}

impl Topology {
    /// Validates a layer sequence.
    ///
    /// # Errors
    /// Returns an error if the sequence is empty, any layer
    /// has zero width, or adjacent widths do not match.
    ///
    /// # Examples
    /// ```
    /// use cosyne_nn::{LayerSpec, ShapeError, Topology};
    ///
    /// let topology = Topology::new(vec![
    ///     LayerSpec::Linear { inputs: 3, outputs: 5 },
    ///     LayerSpec::ReLU { width: 5 },
    /// ])
    /// .unwrap();
    /// assert_eq!(topology.parameter_count(), 20);
    ///
    /// let mismatched = Topology::new(vec![
    ///     LayerSpec::Linear { inputs: 3, outputs: 5 },
    ///     LayerSpec::Tanh { width: 4 },
    /// ]);
    /// assert_eq!(
    ///     mismatched,
    ///     Err(ShapeError::LayerMismatch { layer: 1, expected: 5, found: 4 })
    /// );
    /// ```
    pub fn new(layers: Vec<LayerSpec>) -> Result<Topology, ShapeError> {
        if layers.is_empty() {
            return Err(ShapeError::EmptyTopology);
        }
        for (layer, spec) in layers.iter().enumerate() {
            if spec.input_width() == 0 || spec.output_width() == 0 {
                return Err(ShapeError::ZeroWidth { layer });
            }
        }
        for (layer, pair) in layers.windows(2).enumerate() {
            if pair[0].output_width() != pair[1].input_width() {
                return Err(ShapeError::LayerMismatch {
                    layer: layer + 1,
                    expected: pair[0].output_width(),
                    found: pair[1].input_width(),
                });
            }
        }
        Ok(Topology { layers })
    }

    /// Builds a fully connected perceptron through the given
    /// widths, with a tanh after every linear layer.
    ///
    /// # Examples
    /// ```
    /// use cosyne_nn::{LayerSpec, Topology};
    ///
    /// let topology = Topology::tanh_perceptron(&[7, 16, 4]).unwrap();
    /// assert_eq!(
    ///     topology.layers(),
    ///     &[
    ///         LayerSpec::Linear { inputs: 7, outputs: 16 },
    ///         LayerSpec::Tanh { width: 16 },
    ///         LayerSpec::Linear { inputs: 16, outputs: 4 },
    ///         LayerSpec::Tanh { width: 4 },
    ///     ]
    /// );
    /// ```
    pub fn tanh_perceptron(widths: &[usize]) -> Result<Topology, ShapeError> {
        let layers = widths
            .windows(2)
            .flat_map(|pair| {
                [
                    LayerSpec::Linear {
                        inputs: pair[0],
                        outputs: pair[1],
                    },
                    LayerSpec::Tanh { width: pair[1] },
                ]
            })
            .collect();
        Topology::new(layers)
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].input_width()
    }

    pub fn output_width(&self) -> usize {
        self.layers[self.layers.len() - 1].output_width()
    }

    /// Total number of trainable parameters, i.e. the genome size.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(LayerSpec::parameter_count).sum()
    }
}

impl TryFrom<Vec<LayerSpec>> for Topology {
    type Error = ShapeError;

    fn try_from(layers: Vec<LayerSpec>) -> Result<Topology, ShapeError> {
        Topology::new(layers)
    }
}

impl From<Topology> for Vec<LayerSpec> {
    fn from(topology: Topology) -> Vec<LayerSpec> {
        topology.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_topology() {
        assert_eq!(Topology::new(vec![]), Err(ShapeError::EmptyTopology));
        assert_eq!(
            Topology::tanh_perceptron(&[3]),
            Err(ShapeError::EmptyTopology)
        );
    }

    #[test]
    fn zero_width() {
        assert_eq!(
            Topology::new(vec![
                LayerSpec::Linear {
                    inputs: 2,
                    outputs: 2
                },
                LayerSpec::Tanh { width: 0 },
            ]),
            Err(ShapeError::ZeroWidth { layer: 1 })
        );
    }

    #[test]
    fn widths_and_counts() {
        let topology = Topology::tanh_perceptron(&[15, 16, 4]).unwrap();
        assert_eq!(topology.input_width(), 15);
        assert_eq!(topology.output_width(), 4);
        assert_eq!(topology.parameter_count(), 15 * 16 + 16 + 16 * 4 + 4);
    }

    #[test]
    fn json_layout() {
        let topology = Topology::new(vec![
            LayerSpec::Linear {
                inputs: 2,
                outputs: 3,
            },
            LayerSpec::ReLU { width: 3 },
        ])
        .unwrap();
        let json = serde_json::to_string(&topology).unwrap();
        assert_eq!(
            json,
            r#"[{"Linear":{"inputs":2,"outputs":3}},{"ReLU":{"width":3}}]"#
        );
        let decoded: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, topology);
    }

    #[test]
    fn unknown_layer_is_rejected() {
        let json = r#"[{"Sigmoid":{"width":3}}]"#;
        assert!(serde_json::from_str::<Topology>(json).is_err());
    }

    #[test]
    fn decoding_validates_widths() {
        let json = r#"[{"Linear":{"inputs":2,"outputs":3}},{"Tanh":{"width":2}}]"#;
        let error = serde_json::from_str::<Topology>(json).unwrap_err();
        assert!(error.to_string().contains("layer 1"));
    }
}

use thiserror::Error;

/// An error type indicating a mismatch between a network's
/// shape and the data handed to it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// The observation does not match the first layer's input width.
    #[error("expected {expected} inputs, got {found}")]
    InputWidth { expected: usize, found: usize },
    /// The weight vector does not match the network's parameter count.
    #[error("expected {expected} weights, got {found}")]
    WeightCount { expected: usize, found: usize },
    /// A topology must contain at least one layer.
    #[error("topology has no layers")]
    EmptyTopology,
    /// A layer's input width differs from the previous layer's output width.
    #[error("layer {layer} expects {found} inputs, but the previous layer outputs {expected}")]
    LayerMismatch {
        layer: usize,
        expected: usize,
        found: usize,
    },
    /// Layers must have non-zero widths.
    #[error("layer {layer} has zero width")]
    ZeroWidth { layer: usize },
}

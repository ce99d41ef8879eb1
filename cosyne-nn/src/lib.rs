//! # CoSyNE-NN
//! A feed-forward neural-network implementation of the
//! [`cosyne`] crate's `Controller` trait.
//!
//! A [`Network`] is built from a [`Topology`]: an ordered list of
//! [`LayerSpec`]s (dense linear layers, tanh and ReLU activations) in
//! which each layer consumes the previous layer's output. The genome of
//! a network is the concatenation, in layer order, of every linear
//! layer's weight matrix followed by its biases.
//!
//! Topologies serialize as a list of externally tagged layers, and
//! decoding rejects unknown layer kinds and mismatched widths:
//! ```
//! use cosyne_nn::Topology;
//!
//! let json = r#"[
//!     {"Linear": {"inputs": 7, "outputs": 16}},
//!     {"Tanh": {"width": 16}},
//!     {"Linear": {"inputs": 16, "outputs": 4}},
//!     {"Tanh": {"width": 4}}
//! ]"#;
//! let topology: Topology = serde_json::from_str(json).unwrap();
//! assert_eq!(topology.parameter_count(), 7 * 16 + 16 + 16 * 4 + 4);
//!
//! assert!(serde_json::from_str::<Topology>(r#"[{"Softmax": {"width": 4}}]"#).is_err());
//! ```

pub mod errors;
pub mod networks;
mod topology;

pub use errors::ShapeError;
pub use networks::Network;
pub use topology::{LayerSpec, Topology};

//! Random streams.
//!
//! Every algorithm owns exactly one stream, which
//! all of its stochastic operations draw from in a
//! fixed order, so equal seeds give equal runs.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The random stream type owned by algorithms.
pub type EaRng = ChaCha8Rng;

/// Returns a stream seeded from `seed`, or
/// from system entropy if none is given.
///
/// # Examples
/// ```
/// use cosyne::rng;
/// use rand::Rng;
///
/// let mut a = rng::seeded(Some(7));
/// let mut b = rng::seeded(Some(7));
/// assert_eq!(a.gen::<u64>(), b.gen::<u64>());
/// ```
pub fn seeded(seed: Option<u64>) -> EaRng {
    match seed {
        Some(seed) => EaRng::seed_from_u64(seed),
        None => EaRng::from_entropy(),
    }
}

/// Bernoulli trial: draws a uniform sample in
/// [0, 1) and checks whether it is below `chance`.
///
/// Exactly one sample is consumed regardless of
/// `chance`, so gating never shifts the stream.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    rng.gen::<f32>() < chance
}

/// Uniform sample in [-1, 1).
pub fn unit_weight<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-1.0..1.0)
}

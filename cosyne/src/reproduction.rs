//! Whole-individual reproduction operators.
use crate::config::{Mutation, Noise};
use crate::errors::ConfigError;
use crate::{rng, Weights};

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Cauchy;

/// Uniform crossover: for every weight position, the
/// parents' values stay with their own offspring with
/// probability 0.5, and are swapped otherwise.
///
/// # Panics
/// Panics if the parents differ in length.
///
/// # Examples
/// ```
/// use cosyne::reproduction::uniform_crossover;
/// use cosyne::rng;
///
/// let mut rng = rng::seeded(Some(42));
/// let (a, b) = uniform_crossover(&[1.0, 2.0, 3.0], &[-1.0, -2.0, -3.0], &mut rng);
/// for k in 0..3 {
///     assert_eq!(a[k], -b[k]);
/// }
/// ```
pub fn uniform_crossover<R: Rng + ?Sized>(
    parent1: &[f32],
    parent2: &[f32],
    rng: &mut R,
) -> (Weights, Weights) {
    assert_eq!(
        parent1.len(),
        parent2.len(),
        "crossover parents must have equal genome sizes"
    );
    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();
    for (a, b) in child1.iter_mut().zip(child2.iter_mut()) {
        if !rng::chance(rng, 0.5) {
            std::mem::swap(a, b);
        }
    }
    (child1, child2)
}

/// Perturbation noise ready for sampling.
#[derive(Clone, Copy, Debug)]
pub enum NoiseSampler {
    Uniform(Uniform<f32>),
    Cauchy(Cauchy<f32>),
}

impl NoiseSampler {
    pub fn new(noise: Noise) -> Result<NoiseSampler, ConfigError> {
        match noise {
            Noise::Uniform { bound } => {
                if !(bound > 0.0 && bound.is_finite()) {
                    return Err(ConfigError::NonPositive {
                        name: "mutation noise bound",
                        value: bound,
                    });
                }
                Ok(NoiseSampler::Uniform(Uniform::new(-bound, bound)))
            }
            Noise::Cauchy { scale } => Cauchy::new(0.0, scale)
                .map(NoiseSampler::Cauchy)
                .map_err(|_| ConfigError::NonPositive {
                    name: "mutation noise scale",
                    value: scale,
                }),
        }
    }
}

impl Distribution<f32> for NoiseSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match self {
            NoiseSampler::Uniform(u) => u.sample(rng),
            NoiseSampler::Cauchy(c) => c.sample(rng),
        }
    }
}

/// Applies a configured point mutation to genomes.
#[derive(Clone, Copy, Debug)]
pub struct Mutator {
    chance: f32,
    perturbation: Option<NoiseSampler>,
}

impl Mutator {
    pub fn new(mutation: &Mutation) -> Result<Mutator, ConfigError> {
        mutation.validate()?;
        Ok(match *mutation {
            Mutation::Reset { chance } => Mutator {
                chance,
                perturbation: None,
            },
            Mutation::Perturb { chance, noise } => Mutator {
                chance,
                perturbation: Some(NoiseSampler::new(noise)?),
            },
        })
    }

    /// Mutates every weight independently with the
    /// configured chance.
    ///
    /// One gate sample is drawn per weight, followed by
    /// one value sample for each weight that mutates.
    pub fn mutate<R: Rng + ?Sized>(&self, genome: &mut [f32], rng: &mut R) {
        for w in genome {
            if rng::chance(rng, self.chance) {
                match &self.perturbation {
                    Some(noise) => *w += noise.sample(rng),
                    None => *w = rng::unit_weight(rng),
                }
            }
        }
    }
}

/// Builds a population of `size` genomes from `parents`
/// (given fittest first): the parents themselves, followed
/// by clones of each parent in turn.
///
/// Clones are spread as evenly as possible, with the
/// fitter parents receiving the extras. Each clone weight
/// is nudged by uniform noise in `[-noise, noise)` with
/// probability `chance`.
///
/// # Panics
/// Panics if `parents` is empty or larger than `size`,
/// or `noise` is not positive.
pub fn upscale<R: Rng + ?Sized>(
    parents: &[&Weights],
    size: usize,
    chance: f32,
    noise: f32,
    rng: &mut R,
) -> Vec<Weights> {
    assert!(!parents.is_empty() && parents.len() <= size);
    let nudge = Uniform::new(-noise, noise);
    let clones = size - parents.len();
    let (per_parent, extra) = (clones / parents.len(), clones % parents.len());

    let mut next: Vec<Weights> = parents.iter().map(|&p| p.clone()).collect();
    for (j, parent) in parents.iter().enumerate() {
        let copies = per_parent + usize::from(j < extra);
        for _ in 0..copies {
            let mut clone = (*parent).clone();
            for w in clone.iter_mut() {
                if rng::chance(rng, chance) {
                    *w += nudge.sample(rng);
                }
            }
            next.push(clone);
        }
    }
    next
}

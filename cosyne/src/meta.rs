//! The synapse-major view of a population used by
//! CoSyNE's gene-level recombination.
//!
//! Row `s` of a [`MetaPopulation`] holds synapse `s` of
//! every genome, so `meta.row(s)[i] == weights[i][s]`.
//! The two views are converted in bulk, never kept in
//! sync incrementally.
use crate::Weights;

use rand::Rng;
use tracing::warn;

/// A transposed population weight matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaPopulation {
    rows: Vec<Vec<f32>>,
    individuals: usize,
}

impl MetaPopulation {
    /// Transposes per-individual genomes into synapse rows.
    ///
    /// # Panics
    /// Panics if the genomes differ in length.
    ///
    /// # Examples
    /// ```
    /// use cosyne::MetaPopulation;
    ///
    /// let weights = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
    /// let meta = MetaPopulation::from_weights(&weights);
    /// assert_eq!(meta.synapse_count(), 3);
    /// assert_eq!(meta.row(1), &[2.0, 5.0]);
    /// assert_eq!(meta.to_weights(), weights);
    /// ```
    pub fn from_weights(weights: &[Weights]) -> MetaPopulation {
        let synapses = weights.first().map_or(0, Vec::len);
        assert!(
            weights.iter().all(|w| w.len() == synapses),
            "all genomes must have the same size"
        );
        let rows = (0..synapses)
            .map(|s| weights.iter().map(|w| w[s]).collect())
            .collect();
        MetaPopulation {
            rows,
            individuals: weights.len(),
        }
    }

    /// Transposes synapse rows back into per-individual genomes.
    pub fn to_weights(&self) -> Vec<Weights> {
        (0..self.individuals)
            .map(|i| self.rows.iter().map(|row| row[i]).collect())
            .collect()
    }

    pub fn synapse_count(&self) -> usize {
        self.rows.len()
    }

    pub fn individual_count(&self) -> usize {
        self.individuals
    }

    /// Returns synapse `s` of every individual.
    pub fn row(&self, s: usize) -> &[f32] {
        &self.rows[s]
    }

    /// Recombines synapses between individuals.
    ///
    /// For every row independently, each slot `i` is marked
    /// with probability `probabilities[i]`, and the values at
    /// marked slots are rotated along a random single cycle,
    /// so every marked slot receives another marked slot's
    /// value. Unmarked slots are left untouched.
    ///
    /// The first `protected` slots are never marked, but a
    /// draw is still made for them. Draws run row by row,
    /// slot by slot, followed by the row's permutation.
    ///
    /// Returns the number of values moved.
    ///
    /// # Panics
    /// Panics if `probabilities` does not have one entry
    /// per individual.
    pub fn permute<R: Rng + ?Sized>(
        &mut self,
        probabilities: &[f32],
        protected: usize,
        rng: &mut R,
    ) -> usize {
        assert_eq!(probabilities.len(), self.individuals);
        let mut moved = 0;
        let mut marked = Vec::with_capacity(self.individuals);
        for row in &mut self.rows {
            marked.clear();
            for (i, &p) in probabilities.iter().enumerate() {
                let draw: f32 = rng.gen();
                if i >= protected && draw < p {
                    marked.push(i);
                }
            }
            if marked.len() < 2 {
                continue;
            }
            let permutation = cyclic_permutation(marked.len(), rng);
            let original = row.clone();
            for (&slot, &source) in marked.iter().zip(&permutation) {
                row[slot] = original[marked[source]];
            }
            moved += marked.len();
        }
        moved
    }
}

/// Returns per-slot mark probabilities for a population
/// whose slot `i` holds the individual ranked `i`-th:
/// `1 - sqrt((f - min) / (max - min))`, so the best slot
/// gets 0 and the worst gets 1.
///
/// NaN fitness is marked as surely as the worst. If all
/// other fitness values are equal (or not finite), the
/// best slot gets 0 and every other slot 0.5.
///
/// # Examples
/// ```
/// use cosyne::meta::mark_probabilities;
///
/// let p = mark_probabilities(&[0.0, 100.0, 50.0], &[1, 2, 0]);
/// assert_eq!(p[0], 0.0);
/// assert_eq!(p[2], 1.0);
/// assert!((p[1] - (1.0 - 0.5f32.sqrt())).abs() < 1e-6);
/// ```
pub fn mark_probabilities(fitness: &[f32], order: &[usize]) -> Vec<f32> {
    if order.is_empty() {
        return vec![];
    }
    let mut ranked = order.iter().map(|&i| fitness[i]).filter(|f| !f.is_nan());
    let max = ranked.next().unwrap_or(f32::NAN);
    let min = ranked.last().unwrap_or(max);
    let spread = max - min;
    if !(spread > 0.0 && spread.is_finite()) {
        warn!(max, min, "no fitness spread, marking uniformly");
        let mut probabilities = vec![0.5; order.len()];
        probabilities[0] = 0.0;
        return probabilities;
    }
    order
        .iter()
        .map(|&i| {
            let scaled = (fitness[i] - min) / spread;
            if scaled.is_nan() {
                1.0
            } else {
                1.0 - scaled.clamp(0.0, 1.0).sqrt()
            }
        })
        .collect()
}

/// Returns a uniformly random permutation of `0..len`
/// consisting of a single cycle (Sattolo's algorithm),
/// so no element maps to itself when `len > 1`.
pub fn cyclic_permutation<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut permutation: Vec<usize> = (0..len).collect();
    for i in 0..len.saturating_sub(1) {
        let j = rng.gen_range(i + 1..len);
        permutation.swap(i, j);
    }
    permutation
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn weights(individuals: usize, synapses: usize) -> Vec<Weights> {
        (0..individuals)
            .map(|i| (0..synapses).map(|s| (i * 100 + s) as f32).collect())
            .collect()
    }

    #[test]
    fn transpose_round_trip() {
        let w = weights(5, 7);
        let meta = MetaPopulation::from_weights(&w);
        assert_eq!(meta.synapse_count(), 7);
        assert_eq!(meta.individual_count(), 5);
        for s in 0..7 {
            for i in 0..5 {
                assert_eq!(meta.row(s)[i], w[i][s]);
            }
        }
        assert_eq!(meta.to_weights(), w);
    }

    #[test]
    fn rank_based_probabilities() {
        let p = mark_probabilities(&[100.0, 50.0, 0.0], &[0, 1, 2]);
        assert_eq!(p[0], 0.0);
        assert_relative_eq!(p[1], 1.0 - 0.5f32.sqrt());
        assert_eq!(p[2], 1.0);
    }

    #[test]
    fn flat_fitness_probabilities() {
        let p = mark_probabilities(&[3.0, 3.0, 3.0, 3.0], &[0, 1, 2, 3]);
        assert_eq!(p, [0.0, 0.5, 0.5, 0.5]);
        assert!(mark_probabilities(&[], &[]).is_empty());
    }

    #[test]
    fn nan_fitness_is_marked_like_the_worst() {
        let fitness = [f32::NAN, 100.0, 0.0];
        let order = crate::selection::rank(&fitness);
        assert_eq!(mark_probabilities(&fitness, &order), [0.0, 1.0, 1.0]);

        let fitness = [f32::NAN, f32::NAN];
        assert_eq!(mark_probabilities(&fitness, &[0, 1]), [0.0, 0.5]);
    }

    #[test]
    fn single_cycle() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for len in 2..12 {
            let permutation = cyclic_permutation(len, &mut rng);
            let mut position = 0;
            for step in 1..=len {
                position = permutation[position];
                assert_eq!(position == 0, step == len);
            }
        }
        assert_eq!(cyclic_permutation(1, &mut rng), [0]);
        assert!(cyclic_permutation(0, &mut rng).is_empty());
    }

    #[test]
    fn permutation_moves_only_marked_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let w = weights(6, 40);
        let mut meta = MetaPopulation::from_weights(&w);
        let probabilities = [0.0, 1.0, 0.0, 1.0, 1.0, 0.5];
        meta.permute(&probabilities, 0, &mut rng);

        for s in 0..40 {
            let before = MetaPopulation::from_weights(&w);
            let (before, after) = (before.row(s), meta.row(s));
            // Never-marked slots are untouched.
            assert_eq!(after[0], before[0]);
            assert_eq!(after[2], before[2]);
            // Always-marked slots never keep their own value.
            for i in [1, 3, 4] {
                assert_ne!(after[i], before[i]);
            }
            // The row holds the same multiset of values.
            let mut sorted_before = before.to_vec();
            let mut sorted_after = after.to_vec();
            sorted_before.sort_by(f32::total_cmp);
            sorted_after.sort_by(f32::total_cmp);
            assert_eq!(sorted_before, sorted_after);
        }
    }

    #[test]
    fn protected_slots_are_never_marked() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let w = weights(4, 30);
        let mut meta = MetaPopulation::from_weights(&w);
        let moved = meta.permute(&[1.0; 4], 1, &mut rng);
        assert_eq!(moved, 3 * 30);
        let after = meta.to_weights();
        assert_eq!(after[0], w[0]);
        assert!(after[1..].iter().zip(&w[1..]).all(|(a, b)| a != b));
    }

    #[test]
    fn lone_mark_is_left_in_place() {
        let mut rng = ChaCha8Rng::seed_from_u64(25);
        let w = weights(3, 10);
        let mut meta = MetaPopulation::from_weights(&w);
        assert_eq!(meta.permute(&[0.0, 0.0, 1.0], 0, &mut rng), 0);
        assert_eq!(meta.to_weights(), w);
    }
}

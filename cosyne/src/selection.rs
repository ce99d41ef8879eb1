//! Ranking and parent selection.
use crate::config::Selection;
use crate::logging::Stats;

use rand::Rng;
use tracing::warn;

/// The outcome of ranking a finished generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
    /// Individual indices, fittest first.
    pub order: Vec<usize>,
    /// Fitness statistics of the ranked generation.
    pub stats: Stats,
}

impl Ranking {
    /// Ranks `fitness` in descending order. Ties keep
    /// ascending index order.
    ///
    /// # Examples
    /// ```
    /// use cosyne::Ranking;
    ///
    /// let ranking = Ranking::new(&[1.0, 7.0, 3.0, 7.0]);
    /// assert_eq!(ranking.order, [1, 3, 2, 0]);
    /// assert_eq!(ranking.stats.maximum, 7.0);
    /// assert_eq!(ranking.stats.minimum, 1.0);
    /// assert_eq!(ranking.stats.median, 3.0);
    /// assert_eq!(ranking.stats.mean, 4.5);
    /// ```
    pub fn new(fitness: &[f32]) -> Ranking {
        let order = rank(fitness);
        let stats = Stats::from_ranking(fitness, &order);
        Ranking { order, stats }
    }

    /// Returns the index of the fittest individual.
    pub fn best(&self) -> Option<usize> {
        self.order.first().copied()
    }

    /// Returns the indices of the `count` fittest individuals.
    pub fn elites(&self, count: usize) -> &[usize] {
        &self.order[..count.min(self.order.len())]
    }
}

/// Returns individual indices sorted by fitness,
/// fittest first. NaN fitness ranks last.
pub fn rank(fitness: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    // Stable, so equal fitness keeps index order.
    order.sort_by(|&a, &b| {
        let (a, b) = (fitness[a], fitness[b]);
        a.is_nan().cmp(&b.is_nan()).then_with(|| b.total_cmp(&a))
    });
    order
}

impl Selection {
    /// Picks `count` parent indices from `fitness`.
    pub fn select<R: Rng + ?Sized>(&self, fitness: &[f32], count: usize, rng: &mut R) -> Vec<usize> {
        match *self {
            Selection::StochasticUniversal => stochastic_universal_sampling(fitness, count, rng),
            Selection::Tournament { size } => {
                (0..count).map(|_| tournament(fitness, size, rng)).collect()
            }
        }
    }
}

/// Stochastic universal sampling: `count` evenly spaced
/// pointers with a single random offset sweep the
/// cumulative fitness, so each individual is picked
/// about `count × f / total` times.
///
/// Fitness is assumed non-negative. If the total is not
/// a positive finite number, indices are drawn uniformly
/// instead.
pub fn stochastic_universal_sampling<R: Rng + ?Sized>(
    fitness: &[f32],
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    if fitness.is_empty() || count == 0 {
        return vec![];
    }
    let total: f32 = fitness.iter().sum();
    let spacing = total / count as f32;
    if !(total.is_finite() && spacing > 0.0) {
        warn!(total, "degenerate fitness total, sampling parents uniformly");
        return (0..count).map(|_| rng.gen_range(0..fitness.len())).collect();
    }

    let start = rng.gen_range(0.0..spacing);
    let last = fitness.len() - 1;
    let mut selected = Vec::with_capacity(count);
    let mut index = 0;
    let mut cumulative = fitness[0];
    for i in 0..count {
        let pointer = start + i as f32 * spacing;
        while pointer > cumulative && index < last {
            index += 1;
            cumulative += fitness[index];
        }
        selected.push(index);
    }
    selected
}

/// Draws `size` indices uniformly and returns the fittest.
/// On ties the earliest draw wins.
///
/// # Panics
/// Panics if `fitness` is empty or `size` is 0.
pub fn tournament<R: Rng + ?Sized>(fitness: &[f32], size: usize, rng: &mut R) -> usize {
    assert!(size > 0, "tournament needs at least one contestant");
    let mut best = rng.gen_range(0..fitness.len());
    for _ in 1..size {
        let contestant = rng.gen_range(0..fitness.len());
        if fitness[contestant] > fitness[best] {
            best = contestant;
        }
    }
    best
}

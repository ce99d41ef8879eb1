use crate::algorithms::{Champion, EvolutionaryAlgorithm};
use crate::selection::rank;
use crate::Weights;

use serde::{Deserialize, Serialize};

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Clones every genome of the population.
    AllGenomes,
    /// Clones only the best individual of the generation.
    PopulationChampion,
    /// Clones no genomes.
    NoGenomes,
}

/// A snapshot of a ranked generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Log {
    pub generation_number: usize,
    pub fitness: Stats,
    /// Goals collected by the best individual.
    pub best_goals_reached: usize,
    pub sample: GenerationMemberRecord,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{\n\
            \tgeneration_number: {:?}\n\
            \tbest_goals_reached: {:?}\n\
            \tfitness: {:?}\n\
            }}",
            self.generation_number, self.best_goals_reached, self.fitness,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// For an even count the median is the lower of the two
    /// middle elements. All fields are NaN for an empty sequence.
    ///
    /// # Examples
    /// ```
    /// use cosyne::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Stats {
        let data: Vec<f32> = data.collect();
        Stats::from_ranking(&data, &rank(&data))
    }

    /// Returns statistics of `fitness`, given `order`, its
    /// indices sorted by descending value.
    ///
    /// `maximum` and `minimum` are read from the ends of
    /// the order and `median` from its position `N / 2`.
    pub fn from_ranking(fitness: &[f32], order: &[usize]) -> Stats {
        let (first, last) = match (order.first(), order.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                return Stats {
                    maximum: f32::NAN,
                    minimum: f32::NAN,
                    mean: f32::NAN,
                    median: f32::NAN,
                }
            }
        };
        Stats {
            maximum: fitness[first],
            minimum: fitness[last],
            mean: fitness.iter().sum::<f32>() / fitness.len() as f32,
            median: fitness[order[order.len() / 2]],
        }
    }
}

/// A reporting-level dependant store
/// of genomes from a generation.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationMemberRecord {
    /// Every genome bred from the generation, by slot.
    Genomes(Vec<Weights>),
    /// Only the generation's best individual.
    PopulationChampion(Champion),
    /// Empty.
    None,
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    ///
    /// # Examples
    /// ```
    /// use cosyne::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::NoGenomes);
    /// assert_eq!(logger.iter().count(), 0);
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Stores a snapshot of the generation last
    /// processed by `algorithm`.
    ///
    /// Returns `false`, storing nothing, if the algorithm
    /// has not processed a generation yet.
    pub fn log<E>(&mut self, algorithm: &E) -> bool
    where
        E: EvolutionaryAlgorithm + ?Sized,
    {
        let (ranking, champion) = match (algorithm.last_ranking(), algorithm.champion()) {
            (Some(ranking), Some(champion)) => (ranking, champion),
            _ => return false,
        };
        let sample = match self.reporting_level {
            ReportingLevel::AllGenomes => {
                GenerationMemberRecord::Genomes(algorithm.population().weights().to_vec())
            }
            ReportingLevel::PopulationChampion => {
                GenerationMemberRecord::PopulationChampion(champion.clone())
            }
            ReportingLevel::NoGenomes => GenerationMemberRecord::None,
        };
        self.logs.push(Log {
            generation_number: champion.generation,
            fitness: ranking.stats,
            best_goals_reached: champion.goals_reached,
            sample,
        });
        true
    }

    /// Iterate over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }

    /// Returns the most recent snapshot.
    pub fn last(&self) -> Option<&Log> {
        self.logs.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_follow_rank_order() {
        let fitness = [4.0, 1.0, 3.0, 2.0];
        let stats = Stats::from_ranking(&fitness, &[0, 2, 3, 1]);
        assert_eq!(stats.maximum, 4.0);
        assert_eq!(stats.minimum, 1.0);
        assert_eq!(stats.mean, 2.5);
        // Lower middle of four.
        assert_eq!(stats.median, 2.0);

        let stats = Stats::from([10.0, 40.0, 20.0, 30.0].iter().copied());
        assert_eq!(stats.median, 20.0);
    }

    #[test]
    fn stats_of_nothing() {
        let stats = Stats::from(std::iter::empty());
        assert!(stats.maximum.is_nan());
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn log_display_names_fields() {
        let log = Log {
            generation_number: 3,
            fitness: Stats::from([1.0, 2.0].iter().copied()),
            best_goals_reached: 2,
            sample: GenerationMemberRecord::None,
        };
        let text = log.to_string();
        assert!(text.contains("generation_number: 3"));
        assert!(text.contains("best_goals_reached: 2"));
    }
}

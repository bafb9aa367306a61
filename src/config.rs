//! Run configuration and its reconciliation against a concrete dataset.

use std::str::FromStr;

use typed_builder::TypedBuilder;

use crate::{
  error::{ConfigError, Result},
  representation::Representation,
};

/// Evolutionary algorithm driving the search. NSGA-II is the only one
/// available.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Algorithm {
  /// Non-dominated Sorting Genetic Algorithm II.
  #[default]
  Nsga2,
}

impl FromStr for Algorithm {
  type Err = ConfigError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "nsga2" | "nsga-ii" => Ok(Algorithm::Nsga2),
      _ => Err(ConfigError::UnknownAlgorithm(s.to_owned())),
    }
  }
}

/// User-facing configuration of an optimization run.
///
/// # Examples
/// ```
/// # use delta_mock::{Config, Representation};
/// let config = Config::builder()
///   .population_size(40)
///   .representation(Representation::Split)
///   .delta(90.0)
///   .build();
/// assert_eq!(config.max_generations, 101);
/// ```
#[derive(TypedBuilder, Clone, Debug, PartialEq)]
pub struct Config {
  /// Algorithm to run.
  #[builder(default)]
  pub algorithm: Algorithm,
  /// Number of solutions kept between generations. Must be a positive
  /// multiple of 4.
  #[builder(default = 100)]
  pub population_size: usize,
  /// Probability that a pair of parents is recombined at all.
  #[builder(default = 1.0)]
  pub crossover_prob: f64,
  /// Expected number of mutations per genotype, before the neighbour bias.
  #[builder(default = 1.0)]
  pub mutation_prob: f64,
  /// Number of generations used to derive the evaluation budget.
  #[builder(default = 101)]
  pub max_generations: usize,
  /// Explicit evaluation budget overriding the derived one.
  #[builder(default, setter(strip_option))]
  pub max_evaluations: Option<u64>,
  /// Encoding of candidate solutions.
  #[builder(default)]
  pub representation: Representation,
  /// Percentage of MST edges held fixed by the reduced representations.
  #[builder(
    default = 0.0,
    setter(transform = |delta: f64| delta.clamp(0.0, 100.0))
  )]
  pub delta: f64,
  /// Largest cluster count targeted by seeding. Falls back to the seed pool
  /// size.
  #[builder(default, setter(strip_option))]
  pub kmax: Option<usize>,
  /// Number of seed solutions. Falls back to the population size.
  #[builder(default, setter(strip_option))]
  pub seed_pool_size: Option<usize>,
  /// Seed of the random stream shared by the whole run.
  #[builder(default = 0)]
  pub seed: u64,
}

impl Default for Config {
  fn default() -> Self {
    Config::builder().build()
  }
}

/// A configuration reconciled against a dataset of known size.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
  /// Size of the main population.
  pub population_size: usize,
  /// Crossover gate probability.
  pub crossover_prob: f64,
  /// Mutation scale.
  pub mutation_prob: f64,
  /// Total number of evaluations after which the run stops.
  pub max_evaluations: u64,
  /// Encoding of candidate solutions.
  pub representation: Representation,
  /// Percentage of fixed MST edges, in `[0, 100]`.
  pub delta: f64,
  /// Largest seeded cluster count, in `[2, ndata]`.
  pub kmax: usize,
  /// Number of seed solutions.
  pub seed_pool_size: usize,
}

impl Settings {
  /// Capacity of the buffer holding every solution alive at once.
  pub fn max_solutions(&self) -> usize {
    self.seed_pool_size.max(2 * self.population_size)
  }
}

impl Config {
  /// Checks the configuration and derives the settings of a run over
  /// `ndata` elements.
  pub fn validate(&self, ndata: usize) -> Result<Settings> {
    let population_size = self.population_size;
    if population_size == 0 || population_size % 4 != 0 {
      return Err(ConfigError::PopulationSize(population_size).into());
    }
    for (name, value) in [
      ("crossover probability", self.crossover_prob),
      ("mutation probability", self.mutation_prob),
    ] {
      if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Probability { name, value }.into());
      }
    }
    if self.max_generations == 0 && self.max_evaluations.is_none() {
      return Err(ConfigError::Generations.into());
    }

    let seed_pool_size = self.seed_pool_size.unwrap_or(population_size);
    if seed_pool_size < population_size {
      return Err(
        ConfigError::SeedPool {
          seed_pool_size,
          population_size,
        }
        .into(),
      );
    }

    let max_evaluations = self.max_evaluations.unwrap_or_else(|| {
      (population_size * self.max_generations.saturating_sub(1)
        + seed_pool_size) as u64
    });
    let kmax = self.kmax.unwrap_or(seed_pool_size).clamp(2, ndata.max(2));

    Ok(Settings {
      population_size,
      crossover_prob: self.crossover_prob,
      mutation_prob: self.mutation_prob,
      max_evaluations,
      representation: self.representation,
      delta: self.delta.clamp(0.0, 100.0),
      kmax,
      seed_pool_size,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;

  #[test]
  fn test_defaults() {
    let settings = Config::default().validate(50).unwrap();
    assert_eq!(settings.population_size, 100);
    assert_eq!(settings.seed_pool_size, 100);
    assert_eq!(settings.max_evaluations, 100 * 100 + 100);
    assert_eq!(settings.kmax, 50);
    assert_eq!(settings.max_solutions(), 200);
    assert_eq!(settings.representation, Representation::Locus);
  }

  #[test]
  fn test_clamping() {
    let config = Config::builder().delta(140.0).kmax(1).build();
    assert_eq!(config.delta, 100.0);
    let settings = config.validate(10).unwrap();
    assert_eq!(settings.kmax, 2);

    let settings = Config::builder()
      .population_size(8)
      .seed_pool_size(30)
      .max_evaluations(77)
      .build()
      .validate(10)
      .unwrap();
    assert_eq!(settings.kmax, 10);
    assert_eq!(settings.max_evaluations, 77);
    assert_eq!(settings.max_solutions(), 30);
  }

  #[test]
  fn test_rejections() {
    let err = |config: Config| match config.validate(10) {
      Err(Error::Config(err)) => err,
      other => panic!("expected a configuration error, got {other:?}"),
    };
    assert_eq!(
      err(Config::builder().population_size(6).build()),
      ConfigError::PopulationSize(6)
    );
    assert_eq!(
      err(Config::builder().population_size(0).build()),
      ConfigError::PopulationSize(0)
    );
    assert_eq!(
      err(Config::builder().population_size(8).seed_pool_size(4).build()),
      ConfigError::SeedPool {
        seed_pool_size: 4,
        population_size: 8
      }
    );
    assert!(matches!(
      err(Config::builder().mutation_prob(1.5).build()),
      ConfigError::Probability { .. }
    ));
    assert_eq!(
      err(Config::builder().max_generations(0).build()),
      ConfigError::Generations
    );
  }

  #[test]
  fn test_names() {
    assert_eq!("NSGA2".parse::<Algorithm>(), Ok(Algorithm::Nsga2));
    assert_eq!(
      "spea2".parse::<Algorithm>(),
      Err(ConfigError::UnknownAlgorithm("spea2".into()))
    );
  }
}

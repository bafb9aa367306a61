//! **delta-mock** is a multi-objective evolutionary clustering engine. It
//! searches for partitions of a dataset that balance two competing
//! objectives, overall intra-cluster *variance* and neighbourhood
//! *connectivity*, and returns the Pareto front of the clusterings it found.
//!
//! Here's a [quick start example](#example) for the impatient.
//!
//! # How it works
//!
//! Candidate clusterings are encoded as graphs derived from the minimum
//! spanning tree (MST) of the data: element `i` links to some other element
//! and clusters are the connected components of the resulting graph.
//! - A [`ClusteringProblem`] preprocesses a [`Dataset`] once: distances,
//!   nearest neighbour lists, the MST and the *priority* of every MST edge.
//!   Everything else only sees it through the [`Problem`] trait.
//! - A [`Representation`] decides what an encoding stores. The full *locus*
//!   encoding has one link per element. The reduced *short* and *split*
//!   encodings only cover the *relevant* MST edges, the most interesting
//!   `100 - delta` percent of them, and hold every other edge fixed.
//! - An [evaluator](crate::evaluator) scores solutions. Reduced encodings are
//!   scored incrementally by the [`DeltaEvaluator`], which clusters the fixed
//!   edges once and only merges those cached components per evaluation.
//! - The [`Nsga2`] optimizer seeds a population from the MST with its most
//!   interesting edges cut, then evolves it with crowded binary tournaments,
//!   uniform crossover and neighbourhood-biased mutation until its
//!   evaluation budget is spent.
//!
//! # Operators
//!
//! Genetic operators are represented with traits, each with a default
//! implementation used by [`Nsga2`]:
//!
//! | Operator          | Trait             | Implementation                  |
//! |:------------------|:-----------------:|:-------------------------------:|
//! | **Selection**     | [`Selection`]     | [`BinaryTournament`]            |
//! | **Recombination** | [`Recombination`] | [`UniformCrossover`]            |
//! | **Mutation**      | [`Mutation`]      | [`NeighbourhoodBiasedMutation`] |
//! | **Termination**   | [`Termination`]   | [`EvaluationBudget`]            |
//!
//! [`Termination`] is also implemented for closures of type
//! `FnMut(usize, u64) -> bool`, so a run can be stopped after a number of
//! generations instead:
//! ```no_run
//! # use delta_mock::{ClusteringProblem, Config, Dataset, Nsga2};
//! # use rand::{rngs::StdRng, SeedableRng};
//! # fn main() -> delta_mock::Result<()> {
//! # let dataset = Dataset::from_points(vec![vec![0.0], vec![1.0]])?;
//! # let mut rng = StdRng::seed_from_u64(0);
//! # let problem = ClusteringProblem::new(dataset, 10, &mut rng)?;
//! let nsga = Nsga2::new(problem, &Config::default(), rng)?
//!   .with_termination(|generation: usize, _: u64| generation >= 50);
//! # Ok(())
//! # }
//! ```
//!
//! # Reproducibility
//!
//! A run draws every random number from a single [`StdRng`] seeded with
//! [`Config::seed`]. The MST root is drawn from that stream too, before any
//! solution is created, so the same seed and configuration always produce the
//! same sequence of evaluated solutions.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> delta_mock::Result<()> {
//! use std::fs::File;
//!
//! use delta_mock::{Config, Dataset, Representation};
//!
//! let mut dataset = Dataset::parse(File::open("data.txt")?)?;
//! dataset.normalise();
//! let config = Config::builder()
//!   .representation(Representation::Split)
//!   .delta(90.0)
//!   .seed(7)
//!   .build();
//! // 10 nearest neighbours drive mutation and connectivity
//! let report = delta_mock::optimize(dataset, 10, &config)?;
//! report.write_measures(std::io::stdout())?;
//! # Ok(())
//! # }
//! ```
//!
//! [`StdRng`]: rand::rngs::StdRng
//! [`DeltaEvaluator`]: crate::evaluator::DeltaEvaluator
//! [`Selection`]: crate::selection::Selection
//! [`BinaryTournament`]: crate::selection::BinaryTournament
//! [`Recombination`]: crate::recombination::Recombination
//! [`UniformCrossover`]: crate::recombination::UniformCrossover
//! [`Mutation`]: crate::mutation::Mutation
//! [`NeighbourhoodBiasedMutation`]: crate::mutation::NeighbourhoodBiasedMutation
//! [`Termination`]: crate::termination::Termination
//! [`EvaluationBudget`]: crate::termination::EvaluationBudget

#![warn(missing_docs)]

pub mod clustering;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
#[cfg(test)]
mod fixtures;
pub mod mutation;
pub mod optimizer;
pub mod population;
pub mod problem;
pub mod recombination;
pub mod report;
pub mod representation;
pub mod score;
pub mod selection;
pub mod solution;
pub mod termination;

use rand::{rngs::StdRng, SeedableRng};

pub use crate::{
  clustering::Clustering,
  config::{Algorithm, Config, Settings},
  dataset::Dataset,
  error::{Error, Result},
  optimizer::{Nsga2, State},
  problem::{ClusteringProblem, Problem, DEFAULT_NEIGHBOURS},
  report::{Report, ReportEntry},
  representation::Representation,
  solution::Solution,
};

/// Clusters `dataset` with the optimizer chosen by `config`, using
/// `neighbours` nearest neighbours per element, and reports the final
/// nondominated clusterings.
///
/// The dataset is used as given; normalise it beforehand if its dimensions
/// have different scales.
///
/// # Errors
///
/// Fails if `config` is invalid for `dataset`, or if an internal invariant
/// breaks during the run.
pub fn optimize(
  dataset: Dataset,
  neighbours: usize,
  config: &Config,
) -> Result<Report> {
  let mut rng = StdRng::seed_from_u64(config.seed);
  let problem = ClusteringProblem::new(dataset, neighbours, &mut rng)?;
  match config.algorithm {
    Algorithm::Nsga2 => Nsga2::new(problem, config, rng)?.run(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_two_groups_on_a_line() {
    let config = Config::builder()
      .population_size(8)
      .max_generations(5)
      .seed(3)
      .build();
    let report = optimize(fixtures::line_dataset(), 3, &config).unwrap();
    assert_eq!(report.evaluations, 8 * 4 + 8);
    assert!(report.entries.iter().all(|entry| entry.ari.is_none()));

    let split = report
      .entries
      .iter()
      .find(|entry| entry.clusters == 2)
      .expect("two clusters on the front");
    let a = &split.assignment;
    assert!(a[0] == a[1] && a[1] == a[2]);
    assert!(a[3] == a[4] && a[4] == a[5]);
    assert_ne!(a[0], a[3]);
    // squared deviations 1 + 0 + 1 on both sides
    assert!((split.variance - 4.0 / 6.0).abs() < 1e-12);
    assert_eq!(split.connectivity, 0.0);
  }

  #[test]
  fn test_same_seed_same_report() {
    let config = Config::builder()
      .population_size(12)
      .max_generations(4)
      .representation(Representation::Short)
      .delta(40.0)
      .seed(11)
      .build();
    let run = || {
      let mut dataset = fixtures::gaussian_blobs(
        &[[0.0, 0.0], [5.0, 5.0]],
        15,
        1.0,
        21,
      );
      dataset.normalise();
      optimize(dataset, 6, &config).unwrap()
    };
    assert_eq!(run(), run());
  }
}

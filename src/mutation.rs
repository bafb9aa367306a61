//! Mutation operators.

use rand::Rng;

use crate::{problem::Problem, representation::Representation};

/// An operator that mutates a single encoding in place.
pub trait Mutation {
  /// Mutates `encoding`.
  fn mutate<P: Problem, R: Rng + ?Sized>(
    &self,
    problem: &P,
    rng: &mut R,
    encoding: &mut [usize],
  );
}

/// Neighbourhood-biased mutation.
///
/// Every position mutates with probability `probability / length`, raised by
/// `(rank / length)^2` where `rank` is the neighbour rank of the link it
/// currently encodes, so links to distant neighbours are perturbed more
/// often. A mutated position takes a random legal allele different from the
/// current one.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct NeighbourhoodBiasedMutation {
  /// Expected number of unbiased mutations per encoding.
  pub probability: f64,
  /// Encoding the operator works on.
  pub representation: Representation,
}

impl Mutation for NeighbourhoodBiasedMutation {
  fn mutate<P: Problem, R: Rng + ?Sized>(
    &self,
    problem: &P,
    rng: &mut R,
    encoding: &mut [usize],
  ) {
    let length = encoding.len() as f64;
    let base = self.probability / length;
    for pos in 0..encoding.len() {
      let current = encoding[pos];
      let bias = self
        .representation
        .link_rank(problem, pos, current)
        .map_or(0.0, |rank| (rank as f64 / length).powi(2));
      if rng.gen::<f64>() < base + bias {
        encoding[pos] =
          self
            .representation
            .random_allele(problem, rng, pos, Some(current));
      }
    }
  }
}

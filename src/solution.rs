//! Candidate clusterings and their evaluation record.

use crate::score::Scores;

/// An encoded clustering with the results of its latest evaluation.
///
/// The meaning of the encoding depends on the active
/// [`Representation`](crate::Representation); objectives, cluster count and
/// evaluation index are written by evaluators, rank and crowding distance by
/// the optimizer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Solution {
  encoding: Vec<usize>,
  objectives: Scores,
  clusters: usize,
  evaluation: u64,
  rank: usize,
  crowding_distance: f64,
}

impl Solution {
  /// Creates an unevaluated solution.
  pub fn new(encoding: Vec<usize>) -> Self {
    Self {
      encoding,
      ..Default::default()
    }
  }

  /// The encoding.
  pub fn encoding(&self) -> &[usize] {
    &self.encoding
  }

  pub(crate) fn encoding_mut(&mut self) -> &mut Vec<usize> {
    &mut self.encoding
  }

  /// `[variance, connectivity]`, both minimized.
  pub fn objectives(&self) -> &Scores {
    &self.objectives
  }

  /// Number of clusters found by the latest evaluation.
  pub fn clusters(&self) -> usize {
    self.clusters
  }

  /// Index of the latest evaluation of this solution, starting at 1.
  pub fn evaluation(&self) -> u64 {
    self.evaluation
  }

  /// Pareto rank, 1 for the first front.
  pub fn rank(&self) -> usize {
    self.rank
  }

  /// Crowding distance within its front.
  pub fn crowding_distance(&self) -> f64 {
    self.crowding_distance
  }

  pub(crate) fn set_evaluation(
    &mut self,
    objectives: Scores,
    clusters: usize,
    evaluation: u64,
  ) {
    self.objectives = objectives;
    self.clusters = clusters;
    self.evaluation = evaluation;
  }

  pub(crate) fn set_rank(&mut self, rank: usize) {
    self.rank = rank;
  }

  pub(crate) fn set_crowding_distance(&mut self, crowding_distance: f64) {
    self.crowding_distance = crowding_distance;
  }
}

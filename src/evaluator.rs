//! Scoring of solutions on variance and connectivity.
//!
//! [`FullEvaluator`] decodes every solution from scratch. [`DeltaEvaluator`]
//! scores reduced encodings against a clustering of the fixed MST edges that
//! is computed once. Both produce identical objective values for the same
//! clustering.

use crate::{
  problem::Problem,
  representation::Representation,
  solution::Solution,
};

pub mod delta;
pub mod full;

pub use delta::DeltaEvaluator;
pub use full::FullEvaluator;

/// Scores solutions and counts how many evaluations were performed.
pub trait Evaluator {
  /// Writes objectives, cluster count and evaluation index into `solution`.
  fn evaluate<P: Problem>(&mut self, problem: &P, solution: &mut Solution);

  /// Number of evaluations performed so far.
  fn evaluations(&self) -> u64;
}

/// The evaluation strategy of a run, fixed at configuration time.
#[derive(Clone, Debug)]
pub enum Evaluation {
  /// Decode and score from scratch.
  Full(FullEvaluator),
  /// Score incrementally against cached fixed-edge components.
  Delta(DeltaEvaluator),
}

impl Evaluation {
  /// Picks the evaluator suited to `representation`: full for locus
  /// encodings, delta for reduced ones. Relevant edges must be determined
  /// beforehand.
  pub fn for_representation<P: Problem>(
    problem: &P,
    representation: Representation,
  ) -> Self {
    if representation.is_reduced() {
      Evaluation::Delta(DeltaEvaluator::new(problem, representation))
    } else {
      Evaluation::Full(FullEvaluator::new(representation))
    }
  }
}

impl Evaluator for Evaluation {
  fn evaluate<P: Problem>(&mut self, problem: &P, solution: &mut Solution) {
    match self {
      Evaluation::Full(evaluator) => evaluator.evaluate(problem, solution),
      Evaluation::Delta(evaluator) => evaluator.evaluate(problem, solution),
    }
  }

  fn evaluations(&self) -> u64 {
    match self {
      Evaluation::Full(evaluator) => evaluator.evaluations(),
      Evaluation::Delta(evaluator) => evaluator.evaluations(),
    }
  }
}

//! Objective values and Pareto dominance between them.

/// Number of objectives every solution is scored on: variance and
/// connectivity.
pub const OBJECTIVE_NUM: usize = 2;

/// An alias for a single objective value. Both objectives are minimized.
pub type Score = f64;

/// An alias for the objective vector of a solution, `[variance, connectivity]`.
pub type Scores = [Score; OBJECTIVE_NUM];

/// Outcome of comparing two objective vectors under Pareto dominance.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dominance {
  /// The left vector dominates the right one.
  Dominates,
  /// The right vector dominates the left one.
  Dominated,
  /// Both vectors are equal.
  Indifferent,
  /// Each vector is better in at least one objective.
  Incomparable,
}

/// Describes pareto dominance for arrays of `Score`s.
pub trait ParetoDominance {
  /// Compares `self` against `other`, assuming minimization. `self`
  /// dominates `other` if it is no worse in every objective and strictly
  /// better in at least one.
  fn dominance(&self, other: &Self) -> Dominance;
}

impl ParetoDominance for [Score] {
  fn dominance(&self, other: &Self) -> Dominance {
    let (mut better, mut worse) = (false, false);
    for (a, b) in self.iter().zip(other) {
      if a < b {
        better = true;
      } else if a > b {
        worse = true;
      }
    }
    match (better, worse) {
      (true, false) => Dominance::Dominates,
      (false, true) => Dominance::Dominated,
      (false, false) => Dominance::Indifferent,
      (true, true) => Dominance::Incomparable,
    }
  }
}

impl ParetoDominance for Scores {
  fn dominance(&self, other: &Self) -> Dominance {
    self.as_slice().dominance(other.as_slice())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pareto_dominance() {
    assert_eq!([1.0, 2.0].dominance(&[1.0, 2.0]), Dominance::Indifferent);
    assert_eq!([1.0, 2.0].dominance(&[2.0, 1.0]), Dominance::Incomparable);
    assert_eq!([1.0, 2.0].dominance(&[1.0, 3.0]), Dominance::Dominates);
    assert_eq!([0.5, 2.0].dominance(&[1.0, 3.0]), Dominance::Dominates);
    assert_eq!([1.0, 3.0].dominance(&[1.0, 2.0]), Dominance::Dominated);
    assert_eq!([2.0, 2.0].dominance(&[1.0, 2.0]), Dominance::Dominated);
    // no absolute values involved, negative scores are simply smaller
    assert_eq!([-2.0, 0.0].dominance(&[1.0, 0.0]), Dominance::Dominates);
  }
}

//! Mating selection operators.

use rand::Rng;

use crate::{
  score::{Dominance, ParetoDominance},
  solution::Solution,
};

/// An operator that picks one of two contenders as a parent.
pub trait Selection {
  /// Returns the index, `0` or `1`, of the winning contender.
  fn select<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    contenders: [&Solution; 2],
  ) -> usize;
}

/// Crowded binary tournament: the dominating contender wins, then the one
/// with larger crowding distance, otherwise a fair coin decides.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct BinaryTournament;

impl Selection for BinaryTournament {
  fn select<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    [a, b]: [&Solution; 2],
  ) -> usize {
    match a.objectives().dominance(b.objectives()) {
      Dominance::Dominates => return 0,
      Dominance::Dominated => return 1,
      Dominance::Indifferent | Dominance::Incomparable => {}
    }
    if a.crowding_distance() > b.crowding_distance() {
      0
    } else if a.crowding_distance() < b.crowding_distance() {
      1
    } else if rng.gen::<f64>() < 0.5 {
      0
    } else {
      1
    }
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;

  fn contender(objectives: [f64; 2], crowding: f64) -> Solution {
    let mut solution = Solution::new(vec![]);
    solution.set_evaluation(objectives, 1, 1);
    solution.set_crowding_distance(crowding);
    solution
  }

  #[test]
  fn test_binary_tournament() {
    let mut rng = StdRng::seed_from_u64(0);
    let t = BinaryTournament;
    let good = contender([1.0, 1.0], 0.0);
    let bad = contender([2.0, 1.0], f64::INFINITY);
    assert_eq!(t.select(&mut rng, [&good, &bad]), 0);
    assert_eq!(t.select(&mut rng, [&bad, &good]), 1);

    let sparse = contender([0.0, 3.0], 2.5);
    let dense = contender([3.0, 0.0], 0.5);
    assert_eq!(t.select(&mut rng, [&sparse, &dense]), 0);
    assert_eq!(t.select(&mut rng, [&dense, &sparse]), 1);

    let twin = contender([0.0, 3.0], 2.5);
    let wins = (0..1000)
      .filter(|_| t.select(&mut rng, [&sparse, &twin]) == 0)
      .count();
    assert!((350..650).contains(&wins));
  }
}

//! Recombination operators.

use rand::Rng;

/// An operator that fills two children encodings from two parent encodings
/// of equal length.
pub trait Recombination {
  /// Overwrites `children` with recombined copies of `parents`.
  fn recombine<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    parents: [&[usize]; 2],
    children: [&mut Vec<usize>; 2],
  );
}

/// Uniform crossover. With probability `probability` every position is
/// swapped between the children with probability one half, otherwise the
/// children are exact copies of their parents.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct UniformCrossover {
  /// Probability that a pair of parents is recombined at all.
  pub probability: f64,
}

impl Recombination for UniformCrossover {
  fn recombine<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    [p1, p2]: [&[usize]; 2],
    [c1, c2]: [&mut Vec<usize>; 2],
  ) {
    c1.clear();
    c1.extend_from_slice(p1);
    c2.clear();
    c2.extend_from_slice(p2);
    if rng.gen::<f64>() < self.probability {
      for (a, b) in c1.iter_mut().zip(c2.iter_mut()) {
        if rng.gen::<f64>() >= 0.5 {
          std::mem::swap(a, b);
        }
      }
    }
  }
}

//! Solution storage.
//!
//! Solutions live in an [`Arena`] and are referred to by [`SolutionId`]s.
//! A [`Population`] is a fixed-capacity, insertion-ordered list of ids, so
//! moving solutions between populations never copies an encoding.

use std::ops::{Index, IndexMut};

use crate::{
  error::{InvariantViolation, Result},
  solution::Solution,
};

/// Handle of a solution stored in an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SolutionId(usize);

impl SolutionId {
  /// Position of the solution in its arena.
  pub fn index(self) -> usize {
    self.0
  }
}

/// Owner of every solution of a run.
#[derive(Clone, Debug, Default)]
pub struct Arena {
  solutions: Vec<Solution>,
}

impl Arena {
  /// Creates an empty arena with room for `capacity` solutions.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      solutions: Vec::with_capacity(capacity),
    }
  }

  /// Stores `solution` and returns its handle.
  pub fn push(&mut self, solution: Solution) -> SolutionId {
    self.solutions.push(solution);
    SolutionId(self.solutions.len() - 1)
  }

  /// Number of stored solutions.
  pub fn len(&self) -> usize {
    self.solutions.len()
  }

  /// Whether the arena is empty.
  pub fn is_empty(&self) -> bool {
    self.solutions.is_empty()
  }

  /// Keeps only the solutions in `survivors`, in that order, and returns
  /// their new handles `0..survivors.len()`.
  pub(crate) fn compact(
    &mut self,
    survivors: &[SolutionId],
  ) -> Vec<SolutionId> {
    let capacity = self.solutions.capacity();
    let mut slots: Vec<_> = std::mem::replace(
      &mut self.solutions,
      Vec::with_capacity(capacity),
    )
    .into_iter()
    .map(Some)
    .collect();
    self.solutions.extend(
      survivors
        .iter()
        .filter_map(|id| slots.get_mut(id.0).and_then(Option::take)),
    );
    (0..self.solutions.len()).map(SolutionId).collect()
  }
}

impl Index<SolutionId> for Arena {
  type Output = Solution;

  fn index(&self, id: SolutionId) -> &Solution {
    &self.solutions[id.0]
  }
}

impl IndexMut<SolutionId> for Arena {
  fn index_mut(&mut self, id: SolutionId) -> &mut Solution {
    &mut self.solutions[id.0]
  }
}

/// A fixed-capacity, insertion-ordered collection of solution handles.
#[derive(Clone, Debug, PartialEq)]
pub struct Population {
  slots: Vec<SolutionId>,
  capacity: usize,
}

impl Population {
  /// Creates an empty population holding at most `capacity` solutions.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      slots: Vec::with_capacity(capacity),
      capacity,
    }
  }

  /// Appends a solution handle.
  ///
  /// # Errors
  ///
  /// Fails with [`InvariantViolation::Capacity`] if the population is full.
  pub fn add(&mut self, id: SolutionId) -> Result<()> {
    if self.slots.len() == self.capacity {
      return Err(
        InvariantViolation::Capacity {
          capacity: self.capacity,
        }
        .into(),
      );
    }
    self.slots.push(id);
    Ok(())
  }

  /// Detaches every handle. Referenced solutions are left untouched.
  pub fn clear(&mut self) {
    self.slots.clear();
  }

  /// Number of held solutions.
  pub fn len(&self) -> usize {
    self.slots.len()
  }

  /// Whether the population is empty.
  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  /// Maximum number of held solutions.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Handles in insertion order.
  pub fn ids(&self) -> &[SolutionId] {
    &self.slots
  }

  /// Iterates over handles in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = SolutionId> + '_ {
    self.slots.iter().copied()
  }
}

impl Index<usize> for Population {
  type Output = SolutionId;

  fn index(&self, idx: usize) -> &SolutionId {
    &self.slots[idx]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;

  #[test]
  fn test_capacity() {
    let mut arena = Arena::with_capacity(3);
    let mut population = Population::with_capacity(2);
    for i in 0..2 {
      population.add(arena.push(Solution::new(vec![i]))).unwrap();
    }
    let extra = arena.push(Solution::new(vec![2]));
    let err = population.add(extra).unwrap_err();
    assert!(err.is_invariant_violation());
    assert!(matches!(
      err,
      Error::Invariant(InvariantViolation::Capacity { capacity: 2 })
    ));
    assert_eq!(population.len(), 2);
  }

  #[test]
  fn test_clear_keeps_solutions() {
    let mut arena = Arena::default();
    let mut parents = Population::with_capacity(2);
    let mut auxiliary = Population::with_capacity(4);
    parents.add(arena.push(Solution::new(vec![7, 7]))).unwrap();
    parents.add(arena.push(Solution::new(vec![8, 8]))).unwrap();
    parents.iter().for_each(|id| auxiliary.add(id).unwrap());
    parents.clear();
    assert!(parents.is_empty());
    assert_eq!(auxiliary.len(), 2);
    assert_eq!(arena[auxiliary[1]].encoding(), &[8, 8]);
  }

  #[test]
  fn test_compact() {
    let mut arena = Arena::with_capacity(8);
    let ids: Vec<_> =
      (0..5).map(|i| arena.push(Solution::new(vec![i]))).collect();
    let survivors = arena.compact(&[ids[3], ids[0]]);
    assert_eq!(arena.len(), 2);
    assert_eq!(arena[survivors[0]].encoding(), &[3]);
    assert_eq!(arena[survivors[1]].encoding(), &[0]);
    assert!(arena.solutions.capacity() >= 8);
  }
}

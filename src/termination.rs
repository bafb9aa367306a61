//! Termination operators.

/// Decides when the optimizer stops.
///
/// This trait is implemented for closures of type
/// `FnMut(usize, u64) -> bool` taking the number of completed generations and
/// the number of evaluations performed so far.
///
/// # Examples
/// ```
/// # use delta_mock::termination::*;
/// let mut t = |generation: usize, _evaluations: u64| generation >= 10;
/// assert!(!t.terminate(3, 400));
/// ```
pub trait Termination {
  /// If returns `true`, the run is terminated.
  fn terminate(&mut self, generation: usize, evaluations: u64) -> bool;
}

impl<F> Termination for F
where
  F: FnMut(usize, u64) -> bool,
{
  fn terminate(&mut self, generation: usize, evaluations: u64) -> bool {
    self(generation, evaluations)
  }
}

/// Terminates as soon as the evaluator has performed a certain number of
/// evaluations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EvaluationBudget(pub u64);

impl Termination for EvaluationBudget {
  fn terminate(&mut self, _: usize, evaluations: u64) -> bool {
    evaluations >= self.0
  }
}

//! The NSGA-II engine and its Pareto ranking.

pub mod nsga;
mod ranking;

pub use nsga::Nsga2;
pub use ranking::{crowding_distances, nondominated_ranks};

/// Stage of a run. [`Nsga2::step`] moves from one stage to the next.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum State {
  /// The seed pool is about to be created.
  Seeding,
  /// The seed pool is about to be evaluated and cut down to the population.
  InitialSurvival,
  /// Generations are running.
  Generation,
  /// The termination condition was met.
  Terminated,
}

//! Non-dominated Sorting Genetic Algorithm II.
//!
//! A run seeds an oversized pool from the MST, cuts it down to the
//! population and then repeats generations of crowded binary tournament,
//! uniform crossover, neighbourhood-biased mutation and survival of the
//! best `population_size` out of parents and offspring. All solutions live
//! in one arena allocated up front; survival only moves handles between
//! populations.

use std::mem;

use rand::{rngs::StdRng, seq::SliceRandom};
use tracing::{debug, info, instrument};

use crate::{
  config::{Config, Settings},
  error::{InvariantViolation, Result},
  evaluator::{full::adjusted_rand_index, Evaluation, Evaluator, FullEvaluator},
  mutation::{Mutation, NeighbourhoodBiasedMutation},
  optimizer::{
    ranking::{nondominated_ranks, Ranking},
    State,
  },
  population::{Arena, Population, SolutionId},
  problem::Problem,
  recombination::{Recombination, UniformCrossover},
  report::{Report, ReportEntry},
  score::Scores,
  selection::{BinaryTournament, Selection},
  solution::Solution,
  termination::{EvaluationBudget, Termination},
};

/// Scratch space of survival selection.
#[derive(Clone, Debug)]
struct Survival {
  ranking: Ranking,
  scores: Vec<Scores>,
}

impl Survival {
  fn with_capacity(capacity: usize) -> Self {
    Self {
      ranking: Ranking::with_capacity(capacity),
      scores: Vec::with_capacity(capacity),
    }
  }

  /// Fills `survivors` up to its capacity with the best solutions of
  /// `source`, front by front, and moves the rest into `rejected`. Ranks and
  /// crowding distances of every surviving front are written back to the
  /// solutions. Returns the size of the first front.
  #[instrument(level = "debug", skip_all, fields(source = source.len()))]
  fn select(
    &mut self,
    arena: &mut Arena,
    source: &Population,
    survivors: &mut Population,
    rejected: &mut Population,
  ) -> Result<usize> {
    let target = survivors.capacity();
    survivors.clear();
    rejected.clear();
    self.scores.clear();
    self
      .scores
      .extend(source.iter().map(|id| *arena[id].objectives()));
    self.ranking.sort(&self.scores);

    for f in 0..self.ranking.num_fronts() {
      let room = target - survivors.len();
      if room == 0 {
        for &p in self.ranking.front(f) {
          arena[source[p]].set_rank(f + 1);
          rejected.add(source[p])?;
        }
        continue;
      }
      self.ranking.crowd(&self.scores, f);
      if self.ranking.front(f).len() > room {
        self.ranking.sort_front_by_crowding(f);
      }
      for (k, &p) in self.ranking.front(f).iter().enumerate() {
        let solution = &mut arena[source[p]];
        solution.set_rank(f + 1);
        solution.set_crowding_distance(self.ranking.crowding()[p]);
        if k < room {
          survivors.add(source[p])?;
        } else {
          rejected.add(source[p])?;
        }
      }
    }

    if survivors.len() != target {
      return Err(
        InvariantViolation::PopulationSize {
          population: "main",
          expected: target,
          found: survivors.len(),
        }
        .into(),
      );
    }
    if survivors.len() + rejected.len() != source.len() {
      return Err(
        InvariantViolation::Survival {
          survivors: survivors.len(),
          rejected: rejected.len(),
          source_size: source.len(),
        }
        .into(),
      );
    }
    Ok(if self.ranking.num_fronts() > 0 {
      self.ranking.front(0).len()
    } else {
      0
    })
  }
}

fn evaluate_all<P: Problem>(
  evaluator: &mut Evaluation,
  problem: &P,
  arena: &mut Arena,
  population: &Population,
  evaluated: &mut Vec<Scores>,
) {
  for id in population.iter() {
    evaluator.evaluate(problem, &mut arena[id]);
    evaluated.push(*arena[id].objectives());
  }
}

/// NSGA-II optimizer of clusterings.
///
/// Runs until its [`Termination`] operator says so, by default until the
/// evaluation budget of the [`Settings`] is spent.
///
/// # Examples
/// ```no_run
/// # use delta_mock::{ClusteringProblem, Config, Dataset, Nsga2};
/// # use rand::{rngs::StdRng, SeedableRng};
/// # fn main() -> delta_mock::Result<()> {
/// # let dataset = Dataset::from_points(vec![vec![0.0], vec![1.0]])?;
/// let mut rng = StdRng::seed_from_u64(0);
/// let problem = ClusteringProblem::new(dataset, 10, &mut rng)?;
/// let report = Nsga2::new(problem, &Config::default(), rng)?
///   .with_termination(|generation: usize, _: u64| generation >= 20)
///   .run()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Nsga2<P: Problem, Ter: Termination = EvaluationBudget> {
  settings: Settings,
  problem: P,
  rng: StdRng,
  evaluator: Evaluation,
  selection: BinaryTournament,
  crossover: UniformCrossover,
  mutation: NeighbourhoodBiasedMutation,
  terminator: Ter,
  arena: Arena,
  population: Population,
  offspring: Population,
  auxiliary: Population,
  rejected: Population,
  survival: Survival,
  parents: Vec<usize>,
  state: State,
  generation: usize,
  last_evaluated: Vec<Scores>,
}

impl<P: Problem> Nsga2<P> {
  /// Validates `config` against `problem` and allocates every buffer of the
  /// run. Reduced representations fix the relevant edges of `problem` here,
  /// before the evaluator caches anything.
  ///
  /// # Errors
  ///
  /// Fails with a configuration error if `config` is invalid.
  pub fn new(mut problem: P, config: &Config, rng: StdRng) -> Result<Self> {
    let settings = config.validate(problem.ndata())?;
    let representation = settings.representation;
    if representation.is_reduced() {
      problem.determine_relevant_edges(settings.delta);
    }
    let evaluator = Evaluation::for_representation(&problem, representation);
    let population_size = settings.population_size;
    let capacity = settings.max_solutions();
    info!(
      ?representation,
      population_size,
      max_evaluations = settings.max_evaluations,
      encoding_length = representation.encoding_length(&problem),
      "optimizer configured"
    );

    Ok(Self {
      selection: BinaryTournament,
      crossover: UniformCrossover {
        probability: settings.crossover_prob,
      },
      mutation: NeighbourhoodBiasedMutation {
        probability: settings.mutation_prob,
        representation,
      },
      terminator: EvaluationBudget(settings.max_evaluations),
      arena: Arena::with_capacity(capacity),
      population: Population::with_capacity(population_size),
      offspring: Population::with_capacity(population_size),
      auxiliary: Population::with_capacity(capacity),
      rejected: Population::with_capacity(capacity),
      survival: Survival::with_capacity(capacity),
      parents: (0..population_size).collect(),
      state: State::Seeding,
      generation: 0,
      last_evaluated: Vec::with_capacity(capacity),
      settings,
      problem,
      rng,
      evaluator,
    })
  }
}

impl<P: Problem, Ter: Termination> Nsga2<P, Ter> {
  /// Replaces the termination operator.
  pub fn with_termination<T: Termination>(self, terminator: T) -> Nsga2<P, T> {
    Nsga2 {
      settings: self.settings,
      problem: self.problem,
      rng: self.rng,
      evaluator: self.evaluator,
      selection: self.selection,
      crossover: self.crossover,
      mutation: self.mutation,
      terminator,
      arena: self.arena,
      population: self.population,
      offspring: self.offspring,
      auxiliary: self.auxiliary,
      rejected: self.rejected,
      survival: self.survival,
      parents: self.parents,
      state: self.state,
      generation: self.generation,
      last_evaluated: self.last_evaluated,
    }
  }

  /// Advances the run by one stage and returns the new one. Stepping a
  /// terminated run does nothing.
  ///
  /// # Errors
  ///
  /// Fails if an internal invariant of the populations breaks.
  pub fn step(&mut self) -> Result<State> {
    self.last_evaluated.clear();
    self.state = match self.state {
      State::Seeding => {
        self.seed()?;
        State::InitialSurvival
      }
      State::InitialSurvival => {
        self.initial_survival()?;
        self.next_state()
      }
      State::Generation => {
        self.evolve()?;
        self.generation += 1;
        self.next_state()
      }
      State::Terminated => State::Terminated,
    };
    Ok(self.state)
  }

  /// Steps until termination and reports the final nondominated solutions.
  pub fn run(mut self) -> Result<Report> {
    while self.step()? != State::Terminated {}
    Ok(self.report())
  }

  /// Measures every rank-1 solution of the current population from
  /// scratch. These measurements are not counted as evaluations.
  pub fn report(&self) -> Report {
    let scores: Vec<Scores> = self
      .population
      .iter()
      .map(|id| *self.arena[id].objectives())
      .collect();
    let measure = FullEvaluator::new(self.settings.representation);
    let entries = self
      .population
      .iter()
      .zip(nondominated_ranks(&scores))
      .filter(|&(_, rank)| rank == 1)
      .map(|(id, _)| {
        let (clustering, [variance, connectivity]) =
          measure.measure(&self.problem, self.arena[id].encoding());
        ReportEntry {
          variance,
          connectivity,
          clusters: clustering.total_clusters(),
          ari: adjusted_rand_index(&self.problem, &clustering),
          assignment: clustering.assignment().to_vec(),
        }
      })
      .collect();
    Report {
      generation: self.generation,
      evaluations: self.evaluator.evaluations(),
      entries,
    }
  }

  /// Current stage.
  pub fn state(&self) -> State {
    self.state
  }

  /// Number of completed generations.
  pub fn generation(&self) -> usize {
    self.generation
  }

  /// Number of evaluations performed so far.
  pub fn evaluations(&self) -> u64 {
    self.evaluator.evaluations()
  }

  /// Objectives evaluated during the latest step, in evaluation order.
  pub fn last_evaluated(&self) -> &[Scores] {
    &self.last_evaluated
  }

  /// Solutions of the main population.
  pub fn population(&self) -> impl Iterator<Item = &Solution> + '_ {
    self.population.iter().map(|id| &self.arena[id])
  }

  /// The problem being solved.
  pub fn problem(&self) -> &P {
    &self.problem
  }

  /// Settings of the run.
  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  fn next_state(&mut self) -> State {
    let evaluations = self.evaluator.evaluations();
    if self.terminator.terminate(self.generation, evaluations) {
      info!(
        generation = self.generation,
        evaluations, "optimization terminated"
      );
      State::Terminated
    } else {
      State::Generation
    }
  }

  /// Creates the seed pool: the MST, then solutions with the top `k - 1`
  /// priority edges redirected for shuffled `k` in `[2, kmax]`.
  #[instrument(
    level = "debug",
    skip_all,
    fields(
      seed_pool_size = self.settings.seed_pool_size,
      kmax = self.settings.kmax
    )
  )]
  fn seed(&mut self) -> Result<()> {
    let representation = self.settings.representation;
    let pool_size = self.settings.seed_pool_size;
    let mst = representation.mst_encoding(&self.problem);
    self.auxiliary.add(self.arena.push(Solution::new(mst)))?;

    let mut cluster_counts: Vec<usize> = (2..=self.settings.kmax).collect();
    while self.auxiliary.len() < pool_size {
      cluster_counts.shuffle(&mut self.rng);
      for &k in &cluster_counts {
        if self.auxiliary.len() == pool_size {
          break;
        }
        let encoding = representation.priority_encoding(
          &self.problem,
          &mut self.rng,
          k - 1,
        );
        self.auxiliary.add(self.arena.push(Solution::new(encoding)))?;
      }
    }
    debug!(pool = self.auxiliary.len(), "seed pool created");
    Ok(())
  }

  /// Evaluates the seed pool and keeps the best of it. The arena is
  /// compacted to the survivors, then refilled with blank offspring.
  fn initial_survival(&mut self) -> Result<()> {
    evaluate_all(
      &mut self.evaluator,
      &self.problem,
      &mut self.arena,
      &self.auxiliary,
      &mut self.last_evaluated,
    );
    let first_front = self.survival.select(
      &mut self.arena,
      &self.auxiliary,
      &mut self.population,
      &mut self.rejected,
    )?;

    let survivors = self.arena.compact(self.population.ids());
    self.auxiliary.clear();
    self.rejected.clear();
    self.population.clear();
    for id in survivors {
      self.population.add(id)?;
    }
    let length = self.settings.representation.encoding_length(&self.problem);
    for _ in 0..self.settings.population_size {
      let id = self.arena.push(Solution::new(vec![0; length]));
      self.offspring.add(id)?;
    }
    debug!(
      evaluations = self.evaluator.evaluations(),
      first_front, "initial population selected"
    );
    Ok(())
  }

  /// One generation: variation into the offspring slots, their evaluation,
  /// and survival of parents and offspring.
  fn evolve(&mut self) -> Result<()> {
    self.vary();
    evaluate_all(
      &mut self.evaluator,
      &self.problem,
      &mut self.arena,
      &self.offspring,
      &mut self.last_evaluated,
    );

    self.auxiliary.clear();
    for i in 0..self.settings.population_size {
      self.auxiliary.add(self.population[i])?;
      self.auxiliary.add(self.offspring[i])?;
    }
    self.population.clear();
    self.offspring.clear();
    let first_front = self.survival.select(
      &mut self.arena,
      &self.auxiliary,
      &mut self.population,
      &mut self.offspring,
    )?;
    if self.offspring.len() != self.settings.population_size {
      return Err(
        InvariantViolation::PopulationSize {
          population: "offspring",
          expected: self.settings.population_size,
          found: self.offspring.len(),
        }
        .into(),
      );
    }
    debug!(
      generation = self.generation + 1,
      evaluations = self.evaluator.evaluations(),
      first_front,
      "generation completed"
    );
    Ok(())
  }

  /// Overwrites every offspring slot. Parents are drawn by tournaments over
  /// two shuffles of the population, four contenders per pair of children.
  fn vary(&mut self) {
    let mut child = 0;
    for _ in 0..2 {
      self.parents.shuffle(&mut self.rng);
      for i in (0..self.parents.len()).step_by(4) {
        let p1 = self.tournament(self.parents[i], self.parents[i + 1]);
        let p2 = self.tournament(self.parents[i + 2], self.parents[i + 3]);
        let (c1, c2) = (self.offspring[child], self.offspring[child + 1]);
        child += 2;

        let mut e1 = mem::take(self.arena[c1].encoding_mut());
        let mut e2 = mem::take(self.arena[c2].encoding_mut());
        self.crossover.recombine(
          &mut self.rng,
          [self.arena[p1].encoding(), self.arena[p2].encoding()],
          [&mut e1, &mut e2],
        );
        for encoding in [&mut e1, &mut e2] {
          self.mutation.mutate(&self.problem, &mut self.rng, encoding);
        }
        *self.arena[c1].encoding_mut() = e1;
        *self.arena[c2].encoding_mut() = e2;
      }
    }
  }

  fn tournament(&mut self, a: usize, b: usize) -> SolutionId {
    let (a, b) = (self.population[a], self.population[b]);
    let contenders = [&self.arena[a], &self.arena[b]];
    match self.selection.select(&mut self.rng, contenders) {
      0 => a,
      _ => b,
    }
  }
}

//! Incremental evaluation of reduced encodings.
//!
//! Fixed MST edges are the same in every candidate, so the components they
//! induce are clustered once: their sizes, centroids, internal sums of
//! squares and the connectivity penalty between every pair of them are
//! cached. Evaluating a candidate then only merges cached components along
//! its relevant links and combines the cached statistics.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{
  clustering::{decode_components, Clustering},
  evaluator::{
    full::{penalty, squared_distance},
    Evaluator,
  },
  problem::Problem,
  representation::Representation,
  solution::Solution,
};

// connectivity below this is rounding noise
const CONNECTIVITY_EPSILON: f64 = 1e-5;

/// Components of the graph made of fixed MST edges only.
#[derive(Clone, Debug)]
struct CachedComponents {
  // cached component of every element
  component_of: Vec<usize>,
  sizes: Vec<usize>,
  mdim: usize,
  centroids: Vec<f64>,
  sums_of_squares: Vec<f64>,
  connectivity: f64,
  // `(a, b, penalty)` with `a < b`, one entry per adjacent pair
  pairs: Vec<(usize, usize, f64)>,
}

impl CachedComponents {
  fn new<P: Problem>(problem: &P) -> Self {
    let ndata = problem.ndata();
    let links: Vec<usize> = (0..ndata)
      .map(|i| if problem.is_fixed(i) { problem.mst_edge(i) } else { i })
      .collect();
    let mut component_of = vec![0; ndata];
    let total = decode_components(&links, &mut component_of, &mut Vec::new());

    let clustering = Clustering::from_assignment(problem, component_of, total);
    let mdim = problem.mdim();
    let mut sums_of_squares = vec![0.0; total];
    for i in 0..ndata {
      let c = clustering.cluster_of(i);
      sums_of_squares[c] +=
        squared_distance(problem.point(i), clustering.centroid(c));
    }

    let mut connectivity = 0.0;
    let mut contributions: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for i in 0..ndata {
      let a = clustering.cluster_of(i);
      for rank in 0..problem.num_neighbours() {
        let b = clustering.cluster_of(problem.neighbour(i, rank));
        if a != b {
          connectivity += penalty(rank);
          *contributions.entry((a.min(b), a.max(b))).or_default() +=
            penalty(rank);
        }
      }
    }

    let sizes = (0..total).map(|c| clustering.size(c)).collect();
    let centroids = (0..total)
      .flat_map(|c| clustering.centroid(c).to_vec())
      .collect();
    Self {
      component_of: clustering.assignment().to_vec(),
      sizes,
      mdim,
      centroids,
      sums_of_squares,
      connectivity,
      pairs: contributions
        .into_iter()
        .map(|((a, b), contribution)| (a, b, contribution))
        .collect(),
    }
  }

  fn len(&self) -> usize {
    self.sizes.len()
  }

  fn centroid(&self, c: usize) -> &[f64] {
    &self.centroids[c * self.mdim..(c + 1) * self.mdim]
  }
}

/// Per-evaluation grouping of cached components, reset before each
/// evaluation.
#[derive(Clone, Debug)]
struct MergeOverlay {
  group_of: Vec<usize>,
  members: Vec<Vec<usize>>,
  groups: usize,
  sizes: Vec<usize>,
  centroids: Vec<f64>,
}

impl MergeOverlay {
  fn new(cache: &CachedComponents) -> Self {
    let n = cache.len();
    Self {
      group_of: (0..n).collect(),
      members: (0..n).map(|c| vec![c]).collect(),
      groups: n,
      sizes: vec![0; n],
      centroids: vec![0.0; n * cache.mdim],
    }
  }

  fn reset(&mut self) {
    for (c, (group, members)) in
      self.group_of.iter_mut().zip(self.members.iter_mut()).enumerate()
    {
      *group = c;
      members.clear();
      members.push(c);
    }
    self.groups = self.group_of.len();
  }

  /// Joins the groups of components `a` and `b`, moving the smaller group
  /// into the larger one.
  fn merge(&mut self, a: usize, b: usize) {
    let (ga, gb) = (self.group_of[a], self.group_of[b]);
    if ga == gb {
      return;
    }
    let (into, from) = if self.members[ga].len() < self.members[gb].len() {
      (gb, ga)
    } else {
      (ga, gb)
    };
    let mut moved = std::mem::take(&mut self.members[from]);
    for &c in &moved {
      self.group_of[c] = into;
    }
    self.members[into].extend_from_slice(&moved);
    moved.clear();
    self.members[from] = moved;
    self.groups -= 1;
  }

  /// Total sum of squares split into the within-component part and the
  /// spread of component centroids around their group centroid.
  fn variance(&mut self, cache: &CachedComponents, ndata: usize) -> f64 {
    let mdim = cache.mdim;
    self.sizes.fill(0);
    self.centroids.fill(0.0);
    let mut total = 0.0;
    for c in 0..cache.len() {
      let g = self.group_of[c];
      let size = cache.sizes[c];
      self.sizes[g] += size;
      total += cache.sums_of_squares[c];
      self.centroids[g * mdim..(g + 1) * mdim]
        .iter_mut()
        .zip(cache.centroid(c))
        .for_each(|(sum, x)| *sum += size as f64 * x);
    }
    for (centroid, &size) in
      self.centroids.chunks_mut(mdim.max(1)).zip(&self.sizes)
    {
      if size > 0 {
        centroid.iter_mut().for_each(|x| *x /= size as f64);
      }
    }
    for c in 0..cache.len() {
      let g = self.group_of[c];
      let centroid = &self.centroids[g * mdim..(g + 1) * mdim];
      total +=
        cache.sizes[c] as f64 * squared_distance(cache.centroid(c), centroid);
    }
    total / ndata as f64
  }

  fn connectivity(&self, cache: &CachedComponents) -> f64 {
    let merged: f64 = cache
      .pairs
      .iter()
      .filter(|(a, b, _)| self.group_of[*a] == self.group_of[*b])
      .map(|(_, _, contribution)| contribution)
      .sum();
    let connectivity = cache.connectivity - merged;
    if connectivity > CONNECTIVITY_EPSILON {
      connectivity
    } else {
      0.0
    }
  }
}

/// Scores reduced encodings against cached fixed-edge components.
///
/// The relevant/fixed partition of the problem must not change during the
/// lifetime of the evaluator.
#[derive(Clone, Debug)]
pub struct DeltaEvaluator {
  representation: Representation,
  cache: CachedComponents,
  overlay: MergeOverlay,
  full_encoding: Vec<usize>,
  processed: Vec<bool>,
  evaluations: u64,
}

impl DeltaEvaluator {
  /// Precomputes the fixed-edge components of `problem`.
  pub fn new<P: Problem>(problem: &P, representation: Representation) -> Self {
    let cache = CachedComponents::new(problem);
    let overlay = MergeOverlay::new(&cache);
    trace!(
      components = cache.len(),
      adjacent_pairs = cache.pairs.len(),
      baseline_connectivity = cache.connectivity,
      "fixed-edge components cached"
    );
    Self {
      representation,
      full_encoding: (0..problem.ndata())
        .map(|i| problem.mst_edge(i))
        .collect(),
      processed: (0..problem.ndata()).map(|i| problem.is_fixed(i)).collect(),
      cache,
      overlay,
      evaluations: 0,
    }
  }

  /// Number of cached fixed-edge components.
  pub fn cached_components(&self) -> usize {
    self.cache.len()
  }
}

impl Evaluator for DeltaEvaluator {
  fn evaluate<P: Problem>(&mut self, problem: &P, solution: &mut Solution) {
    self.evaluations += 1;
    self.overlay.reset();
    for r in 0..problem.num_relevant_edges() {
      self.processed[problem.relevant_edge(r)] = false;
    }
    self.representation.update_full_encoding(
      problem,
      solution.encoding(),
      &mut self.full_encoding,
    );

    for r in 0..problem.num_relevant_edges() {
      let mut node = problem.relevant_edge(r);
      while !self.processed[node] {
        self.processed[node] = true;
        let next = self.full_encoding[node];
        self
          .overlay
          .merge(self.cache.component_of[node], self.cache.component_of[next]);
        node = next;
      }
    }

    let variance = self.overlay.variance(&self.cache, problem.ndata());
    let connectivity = self.overlay.connectivity(&self.cache);
    solution.set_evaluation(
      [variance, connectivity],
      self.overlay.groups,
      self.evaluations,
    );
  }

  fn evaluations(&self) -> u64 {
    self.evaluations
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, Rng, SeedableRng};

  use super::*;
  use crate::{evaluator::FullEvaluator, fixtures};

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()) + 1e-12
  }

  fn random_genotype(
    problem: &impl Problem,
    representation: Representation,
    rng: &mut StdRng,
  ) -> Vec<usize> {
    let change = rng.gen_range(0.0..0.6);
    let mut encoding = representation.mst_encoding(problem);
    for pos in 0..encoding.len() {
      if rng.gen::<f64>() < change {
        encoding[pos] = representation.random_allele(problem, rng, pos, None);
      }
    }
    encoding
  }

  #[test]
  fn test_matches_full_evaluation() {
    let mut rng = StdRng::seed_from_u64(2024);
    for seed in [1, 2] {
      let mut problem = fixtures::blobs_problem(seed);
      for delta in [0.0, 25.0, 50.0, 75.0, 100.0] {
        problem.determine_relevant_edges(delta);
        for representation in [Representation::Short, Representation::Split] {
          let mut delta_evaluator =
            DeltaEvaluator::new(&problem, representation);
          let mut full_evaluator = FullEvaluator::new(Representation::Locus);
          for _ in 0..120 {
            let encoding =
              random_genotype(&problem, representation, &mut rng);
            let mut incremental = Solution::new(encoding.clone());
            delta_evaluator.evaluate(&problem, &mut incremental);
            let mut direct =
              Solution::new(representation.expand(&problem, &encoding));
            full_evaluator.evaluate(&problem, &mut direct);

            assert_eq!(incremental.clusters(), direct.clusters());
            let objectives =
              incremental.objectives().iter().zip(direct.objectives());
            for (a, b) in objectives {
              assert!(
                close(*a, *b),
                "delta {delta}, {representation:?}: {a} != {b}"
              );
            }
          }
          assert_eq!(delta_evaluator.evaluations(), 120);
        }
      }
    }
  }

  #[test]
  fn test_cached_components() {
    let mut problem = fixtures::blobs_problem(5);
    problem.determine_relevant_edges(0.0);
    let evaluator = DeltaEvaluator::new(&problem, Representation::Split);
    assert_eq!(evaluator.cached_components(), problem.ndata());

    problem.determine_relevant_edges(100.0);
    let evaluator = DeltaEvaluator::new(&problem, Representation::Split);
    // a single relevant edge leaves at most two fixed-edge components
    assert!(evaluator.cached_components() <= 2);
  }

  #[test]
  fn test_counts_evaluations() {
    let mut problem = fixtures::blobs_problem(6);
    problem.determine_relevant_edges(90.0);
    let mut evaluator = DeltaEvaluator::new(&problem, Representation::Split);
    let mut solution =
      Solution::new(Representation::Split.mst_encoding(&problem));
    evaluator.evaluate(&problem, &mut solution);
    evaluator.evaluate(&problem, &mut solution);
    assert_eq!(solution.evaluation(), 2);
    assert_eq!(solution.clusters(), 1);
    assert_eq!(solution.objectives()[1], 0.0);
  }
}

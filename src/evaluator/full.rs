//! Evaluation from scratch, and the clustering quality measures.

use crate::{
  clustering::Clustering,
  evaluator::Evaluator,
  problem::Problem,
  representation::Representation,
  score::Scores,
  solution::Solution,
};

/// Overall intra-cluster variance: the mean squared euclidean distance of
/// every element to the centroid of its cluster.
pub fn variance<P: Problem>(problem: &P, clustering: &Clustering) -> f64 {
  let total: f64 = (0..problem.ndata())
    .map(|i| {
      let centroid = clustering.centroid(clustering.cluster_of(i));
      squared_distance(problem.point(i), centroid)
    })
    .sum();
  total / problem.ndata() as f64
}

/// Connectivity penalty: each of the `L` nearest neighbours of an element
/// placed in another cluster adds `1 / (rank + 1)`.
pub fn connectivity<P: Problem>(problem: &P, clustering: &Clustering) -> f64 {
  let mut total = 0.0;
  for i in 0..problem.ndata() {
    let label = clustering.cluster_of(i);
    for rank in 0..problem.num_neighbours() {
      if clustering.cluster_of(problem.neighbour(i, rank)) != label {
        total += penalty(rank);
      }
    }
  }
  total
}

/// Adjusted Rand Index of a clustering against ground-truth labels, or
/// `None` without labels.
pub fn adjusted_rand_index<P: Problem>(
  problem: &P,
  clustering: &Clustering,
) -> Option<f64> {
  if !problem.labels_provided() {
    return None;
  }
  let clusters = clustering.total_clusters();
  let classes = problem.num_real_clusters();
  let mut contingency = vec![0usize; clusters * classes];
  let mut class_sizes = vec![0usize; classes];
  for i in 0..problem.ndata() {
    let class = problem.label(i);
    contingency[clustering.cluster_of(i) * classes + class] += 1;
    class_sizes[class] += 1;
  }

  let pairs = |n: usize| (n * n.saturating_sub(1)) as f64 / 2.0;
  let sum_cells: f64 = contingency.iter().map(|&n| pairs(n)).sum();
  let sum_rows: f64 = (0..clusters).map(|c| pairs(clustering.size(c))).sum();
  let sum_cols: f64 = class_sizes.iter().map(|&n| pairs(n)).sum();
  let expected = sum_rows * sum_cols / pairs(problem.ndata());
  let top = sum_cells - expected;
  let bottom = 0.5 * (sum_rows + sum_cols) - expected;
  // both partitions are trivial and therefore equal
  if bottom == 0.0 {
    return Some(1.0);
  }
  Some(top / bottom)
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

pub(crate) fn penalty(rank: usize) -> f64 {
  1.0 / (rank as f64 + 1.0)
}

/// Decodes each solution and computes both objectives directly.
#[derive(Clone, Debug)]
pub struct FullEvaluator {
  representation: Representation,
  evaluations: u64,
}

impl FullEvaluator {
  /// Creates an evaluator for encodings of `representation`.
  pub fn new(representation: Representation) -> Self {
    Self {
      representation,
      evaluations: 0,
    }
  }

  /// Decodes `encoding` and scores it without counting an evaluation.
  pub fn measure<P: Problem>(
    &self,
    problem: &P,
    encoding: &[usize],
  ) -> (Clustering, Scores) {
    let clustering = self.representation.decode(problem, encoding);
    let scores = [
      variance(problem, &clustering),
      connectivity(problem, &clustering),
    ];
    (clustering, scores)
  }
}

impl Evaluator for FullEvaluator {
  fn evaluate<P: Problem>(&mut self, problem: &P, solution: &mut Solution) {
    self.evaluations += 1;
    let (clustering, scores) = self.measure(problem, solution.encoding());
    solution.set_evaluation(
      scores,
      clustering.total_clusters(),
      self.evaluations,
    );
  }

  fn evaluations(&self) -> u64 {
    self.evaluations
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::{fixtures, problem::ClusteringProblem};

  fn line_problem(neighbours: usize) -> ClusteringProblem {
    let mut rng = StdRng::seed_from_u64(42);
    let dataset = fixtures::line_dataset()
      .with_labels(vec![0, 0, 0, 1, 1, 1])
      .unwrap();
    ClusteringProblem::new(dataset, neighbours, &mut rng).unwrap()
  }

  #[test]
  fn test_severing_the_gap() {
    let problem = line_problem(4);
    let mut encoding = Representation::Locus.mst_encoding(&problem);
    let gap = problem.priority_edge(0);
    encoding[gap] = gap;

    let mut evaluator = FullEvaluator::new(Representation::Locus);
    let mut solution = Solution::new(encoding);
    evaluator.evaluate(&problem, &mut solution);

    assert_eq!(solution.clusters(), 2);
    assert_eq!(solution.evaluation(), 1);
    assert_eq!(evaluator.evaluations(), 1);
    // each side: squared distances 1 + 0 + 1 around its centroid
    let direct = (1.0 + 0.0 + 1.0 + 1.0 + 0.0 + 1.0) / 6.0;
    assert!((solution.objectives()[0] - direct).abs() < 1e-12);
    // every element's 3rd neighbour lies across the gap
    assert!((solution.objectives()[1] - 6.0 * 0.25).abs() < 1e-12);

    let (clustering, _) = evaluator.measure(&problem, solution.encoding());
    assert_eq!(adjusted_rand_index(&problem, &clustering), Some(1.0));
    assert_eq!(evaluator.evaluations(), 1);
  }

  #[test]
  fn test_single_cluster() {
    let problem = line_problem(3);
    let evaluator = FullEvaluator::new(Representation::Locus);
    let encoding = Representation::Locus.mst_encoding(&problem);
    let (clustering, [variance, connectivity]) =
      evaluator.measure(&problem, &encoding);
    assert_eq!(clustering.total_clusters(), 1);
    assert_eq!(connectivity, 0.0);
    // mean 6, squared deviations 36 + 25 + 16 + 16 + 25 + 36
    assert!((variance - 154.0 / 6.0).abs() < 1e-9);
    assert_eq!(adjusted_rand_index(&problem, &clustering), Some(0.0));
  }

  #[test]
  fn test_ari_without_labels() {
    let mut rng = StdRng::seed_from_u64(0);
    let problem =
      ClusteringProblem::new(fixtures::line_dataset(), 2, &mut rng).unwrap();
    let clustering = Representation::Locus
      .decode(&problem, &Representation::Locus.mst_encoding(&problem));
    assert_eq!(adjusted_rand_index(&problem, &clustering), None);
  }

  #[test]
  fn test_singletons() {
    let problem = line_problem(2);
    let clustering = Clustering::from_encoding(&problem, &[0, 1, 2, 3, 4, 5]);
    assert_eq!(variance(&problem, &clustering), 0.0);
    // rank 0 is the element itself, rank 1 always lies elsewhere
    assert_eq!(connectivity(&problem, &clustering), 6.0 * 0.5);
  }
}

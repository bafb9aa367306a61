//! Read-only view of a preprocessed clustering problem.
//!
//! Everything the optimizer knows about the data flows through [`Problem`]:
//! distances, nearest neighbour lists, the minimum spanning tree and its
//! partitioning into *relevant* (mutable) and *fixed* edges. Edges of the MST
//! are identified with the node they leave from, `i -> mst_edge(i)`.

use itertools::{Itertools, MinMaxResult};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
  dataset::Dataset,
  error::{DatasetError, Result},
};

/// Default neighbourhood size used by mutation and connectivity.
pub const DEFAULT_NEIGHBOURS: usize = 10;

/// The problem oracle consumed by representations, evaluators and the
/// optimizer.
pub trait Problem {
  /// Number of data elements.
  fn ndata(&self) -> usize;
  /// Dimensionality of data elements.
  fn mdim(&self) -> usize;
  /// Coordinates of the `i`-th element.
  fn point(&self, i: usize) -> &[f64];
  /// Symmetric, normalised dissimilarity between two elements.
  fn distance(&self, i: usize, j: usize) -> f64;
  /// Size `L` of the neighbourhood considered by mutation and connectivity.
  fn num_neighbours(&self) -> usize;
  /// Element at position `rank` of the nearest neighbour list of `i`. Rank 0
  /// is `i` itself.
  fn neighbour(&self, i: usize, rank: usize) -> usize;
  /// Position of `node` in the nearest neighbour list of `i`.
  fn neighbour_rank(&self, i: usize, node: usize) -> usize;
  /// Target of the MST edge leaving `i`.
  fn mst_edge(&self, i: usize) -> usize;
  /// Splits MST edges into relevant and fixed ones. `delta` is the
  /// percentage of edges to fix, the least interesting ones first.
  fn determine_relevant_edges(&mut self, delta: f64);
  /// Node of the `idx`-th relevant edge.
  fn relevant_edge(&self, idx: usize) -> usize;
  /// Number of relevant edges.
  fn num_relevant_edges(&self) -> usize;
  /// Position of `node` among relevant edges, if it is one.
  fn relevant_index(&self, node: usize) -> Option<usize>;
  /// Node of the `idx`-th fixed edge.
  fn fixed_edge(&self, idx: usize) -> usize;
  /// Number of fixed edges.
  fn num_fixed_edges(&self) -> usize;
  /// Whether the edge leaving `node` is fixed.
  fn is_fixed(&self, node: usize) -> bool {
    self.relevant_index(node).is_none()
  }
  /// Node of the `idx`-th most interesting MST edge.
  fn priority_edge(&self, idx: usize) -> usize;
  /// Length of the priority list.
  fn num_priority_edges(&self) -> usize;
  /// Whether ground-truth labels are available.
  fn labels_provided(&self) -> bool;
  /// Ground-truth label of the `i`-th element.
  fn label(&self, i: usize) -> usize;
  /// Number of ground-truth clusters.
  fn num_real_clusters(&self) -> usize;
}

/// A dataset together with its one-time preprocessing.
#[derive(Clone, Debug)]
pub struct ClusteringProblem {
  dataset: Dataset,
  num_neighbours: usize,
  // packed lower triangle, without the diagonal
  distances: Vec<f64>,
  neighbours: Vec<usize>,
  ranks: Vec<usize>,
  mst: Vec<usize>,
  priority: Vec<usize>,
  relevant: Vec<usize>,
  fixed: Vec<usize>,
  relevant_index: Vec<Option<usize>>,
}

fn triangle_index(i: usize, j: usize) -> usize {
  let (hi, lo) = if i > j { (i, j) } else { (j, i) };
  hi * (hi - 1) / 2 + lo
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
  a.iter()
    .zip(b)
    .map(|(x, y)| (x - y).powi(2))
    .sum::<f64>()
    .sqrt()
}

impl ClusteringProblem {
  /// Preprocesses `dataset`: distance matrix, neighbour lists of size
  /// `neighbours` (clamped into `[1, ndata - 1]`) and the MST, whose root is
  /// drawn from `rng`. Every MST edge starts out relevant. Fails on NaN or
  /// infinite coordinates.
  #[instrument(
    level = "debug",
    skip_all,
    fields(ndata = dataset.ndata(), mdim = dataset.mdim())
  )]
  pub fn new<R: Rng + ?Sized>(
    dataset: Dataset,
    neighbours: usize,
    rng: &mut R,
  ) -> Result<Self> {
    let ndata = dataset.ndata();
    if let Some((element, column)) = (0..ndata)
      .flat_map(|i| (0..dataset.mdim()).map(move |d| (i, d)))
      .find(|&(i, d)| !dataset.point(i)[d].is_finite())
    {
      return Err(DatasetError::NonFinite { element, column }.into());
    }
    let distances = Self::compute_distances(&dataset);
    let (neighbour_lists, ranks) = Self::compute_neighbours(ndata, &distances);

    let mut problem = Self {
      num_neighbours: neighbours.clamp(1, ndata - 1),
      dataset,
      distances,
      neighbours: neighbour_lists,
      ranks,
      mst: Vec::new(),
      priority: Vec::new(),
      relevant: Vec::with_capacity(ndata),
      fixed: Vec::with_capacity(ndata),
      relevant_index: vec![None; ndata],
    };
    problem.compute_mst(rng);
    problem.determine_relevant_edges(0.0);
    debug!(neighbours = problem.num_neighbours, "problem preprocessed");
    Ok(problem)
  }

  /// The underlying dataset.
  pub fn dataset(&self) -> &Dataset {
    &self.dataset
  }

  fn compute_distances(dataset: &Dataset) -> Vec<f64> {
    let mut distances: Vec<f64> = (1..dataset.ndata())
      .into_par_iter()
      .flat_map_iter(|i| {
        (0..i).map(move |j| euclidean(dataset.point(i), dataset.point(j)))
      })
      .collect();
    if let MinMaxResult::MinMax(min, max) = distances.iter().copied().minmax()
    {
      let range = max - min;
      distances.par_iter_mut().for_each(|d| {
        *d = if range > 0.0 { (*d - min) / range } else { 0.0 };
      });
    } else {
      distances.iter_mut().for_each(|d| *d = 0.0);
    }
    distances
  }

  fn compute_neighbours(
    ndata: usize,
    distances: &[f64],
  ) -> (Vec<usize>, Vec<usize>) {
    let mut neighbours = vec![0; ndata * ndata];
    let mut ranks = vec![0; ndata * ndata];
    neighbours
      .par_chunks_mut(ndata)
      .zip(ranks.par_chunks_mut(ndata))
      .enumerate()
      .for_each(|(i, (row, rank))| {
        row[0] = i;
        let mut others = (0..ndata).filter(|&j| j != i).collect_vec();
        others.sort_by(|&a, &b| {
          distances[triangle_index(i, a)]
            .total_cmp(&distances[triangle_index(i, b)])
        });
        row[1..].copy_from_slice(&others);
        for (r, &node) in row.iter().enumerate() {
          rank[node] = r;
        }
      });
    (neighbours, ranks)
  }

  /// Prim's algorithm, growing the tree from a random root. Each selected
  /// node keeps a cursor to its closest unselected neighbour.
  fn compute_mst<R: Rng + ?Sized>(&mut self, rng: &mut R) {
    let ndata = self.ndata();
    let mut mst = vec![0; ndata];
    let mut priorities: Vec<(usize, f64)> = Vec::with_capacity(ndata);
    let mut selected = vec![false; ndata];
    let mut nodes = Vec::with_capacity(ndata);
    let mut cursors = Vec::with_capacity(ndata);

    let root = rng.gen_range(0..ndata);
    nodes.push(root);
    cursors.push(0);
    selected[root] = true;

    while nodes.len() < ndata {
      let mut best: Option<(usize, usize, f64)> = None;
      for (&node, cursor) in nodes.iter().zip(cursors.iter_mut()) {
        while selected[self.neighbour(node, *cursor)] {
          *cursor += 1;
        }
        let candidate = self.neighbour(node, *cursor);
        let distance = self.distance(node, candidate);
        if best.map_or(true, |(_, _, min)| distance < min) {
          best = Some((node, candidate, distance));
        }
      }
      let Some((n1, n2, distance)) = best else {
        break;
      };

      mst[n2] = n1;
      let interestingness =
        self.neighbour_rank(n1, n2).min(self.neighbour_rank(n2, n1));
      let priority = interestingness as f64 + distance;
      priorities.push((n2, priority));
      if nodes.len() == 1 {
        // the root links back to its first child
        mst[n1] = n2;
        priorities.push((n1, priority));
      }

      nodes.push(n2);
      cursors.push(0);
      selected[n2] = true;
    }

    priorities.sort_by(|a, b| b.1.total_cmp(&a.1));
    self.mst = mst;
    self.priority = priorities.into_iter().map(|(node, _)| node).collect();
    debug!(root, "minimum spanning tree computed");
  }
}

impl Problem for ClusteringProblem {
  fn ndata(&self) -> usize {
    self.dataset.ndata()
  }

  fn mdim(&self) -> usize {
    self.dataset.mdim()
  }

  fn point(&self, i: usize) -> &[f64] {
    self.dataset.point(i)
  }

  fn distance(&self, i: usize, j: usize) -> f64 {
    if i == j {
      0.0
    } else {
      self.distances[triangle_index(i, j)]
    }
  }

  fn num_neighbours(&self) -> usize {
    self.num_neighbours
  }

  fn neighbour(&self, i: usize, rank: usize) -> usize {
    self.neighbours[i * self.ndata() + rank]
  }

  fn neighbour_rank(&self, i: usize, node: usize) -> usize {
    self.ranks[i * self.ndata() + node]
  }

  fn mst_edge(&self, i: usize) -> usize {
    self.mst[i]
  }

  fn determine_relevant_edges(&mut self, delta: f64) {
    let delta = delta.clamp(0.0, 100.0);
    let total = self.priority.len();
    let n = (((100.0 - delta) / 100.0 * total as f64) as usize).clamp(1, total);

    self.relevant.clear();
    self.fixed.clear();
    self.relevant_index.iter_mut().for_each(|idx| *idx = None);
    for (i, &node) in self.priority.iter().enumerate() {
      if i < n {
        self.relevant_index[node] = Some(self.relevant.len());
        self.relevant.push(node);
      } else {
        self.fixed.push(node);
      }
    }
    debug!(
      delta,
      relevant = self.relevant.len(),
      fixed = self.fixed.len(),
      "relevant edges determined"
    );
  }

  fn relevant_edge(&self, idx: usize) -> usize {
    self.relevant[idx]
  }

  fn num_relevant_edges(&self) -> usize {
    self.relevant.len()
  }

  fn relevant_index(&self, node: usize) -> Option<usize> {
    self.relevant_index[node]
  }

  fn fixed_edge(&self, idx: usize) -> usize {
    self.fixed[idx]
  }

  fn num_fixed_edges(&self) -> usize {
    self.fixed.len()
  }

  fn priority_edge(&self, idx: usize) -> usize {
    self.priority[idx]
  }

  fn num_priority_edges(&self) -> usize {
    self.priority.len()
  }

  fn labels_provided(&self) -> bool {
    self.dataset.labels().is_some()
  }

  fn label(&self, i: usize) -> usize {
    self.dataset.labels().map_or(0, |labels| labels[i])
  }

  fn num_real_clusters(&self) -> usize {
    self.dataset.num_real_clusters()
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::fixtures;

  #[test]
  fn test_non_finite_coordinates() {
    let mut rng = StdRng::seed_from_u64(0);
    for value in [f64::NAN, f64::INFINITY] {
      let dataset = Dataset::from_points(vec![
        vec![0.0, 1.0],
        vec![2.0, value],
        vec![4.0, 5.0],
      ])
      .unwrap();
      assert!(matches!(
        ClusteringProblem::new(dataset, 2, &mut rng),
        Err(crate::error::Error::Dataset(DatasetError::NonFinite {
          element: 1,
          column: 1
        }))
      ));
    }
  }

  #[test]
  fn test_distances_and_neighbours() {
    let mut rng = StdRng::seed_from_u64(0);
    let problem =
      ClusteringProblem::new(fixtures::line_dataset(), 3, &mut rng).unwrap();
    assert_eq!(problem.num_neighbours(), 3);
    assert_eq!(problem.distance(0, 1), 0.0);
    assert_eq!(problem.distance(5, 0), 1.0);
    assert_eq!(problem.distance(2, 3), problem.distance(3, 2));
    assert_eq!(problem.distance(4, 4), 0.0);

    for i in 0..problem.ndata() {
      assert_eq!(problem.neighbour(i, 0), i);
      for rank in 0..problem.ndata() {
        assert_eq!(problem.neighbour_rank(i, problem.neighbour(i, rank)), rank);
      }
    }
    // ties are broken by index
    assert_eq!(problem.neighbour(1, 1), 0);
    assert_eq!(problem.neighbour(1, 2), 2);
    assert_eq!(problem.neighbour(2, 3), 3);
  }

  #[test]
  fn test_neighbourhood_clamped() {
    let mut rng = StdRng::seed_from_u64(0);
    let problem =
      ClusteringProblem::new(fixtures::line_dataset(), 50, &mut rng).unwrap();
    assert_eq!(problem.num_neighbours(), 5);
  }

  #[test]
  fn test_mst_is_the_line() {
    for seed in 0..8 {
      let mut rng = StdRng::seed_from_u64(seed);
      let problem =
        ClusteringProblem::new(fixtures::line_dataset(), 3, &mut rng).unwrap();
      let edges: BTreeSet<_> = (0..6)
        .map(|i| {
          let j = problem.mst_edge(i);
          (i.min(j), i.max(j))
        })
        .collect();
      assert_eq!(
        edges,
        BTreeSet::from([(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)])
      );
    }
  }

  #[test]
  fn test_priority_edges() {
    for seed in 0..8 {
      let mut rng = StdRng::seed_from_u64(seed);
      let problem =
        ClusteringProblem::new(fixtures::line_dataset(), 3, &mut rng).unwrap();
      assert_eq!(problem.num_priority_edges(), 6);
      let top = problem.priority_edge(0);
      let parent = problem.mst_edge(top);
      let pair = (top.min(parent), top.max(parent));
      assert_eq!(pair, (2, 3), "the gap is the most interesting edge");
      let nodes: BTreeSet<_> =
        (0..6).map(|idx| problem.priority_edge(idx)).collect();
      assert_eq!(nodes.len(), 6);
    }
  }

  #[test]
  fn test_relevant_edges() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut problem =
      ClusteringProblem::new(fixtures::line_dataset(), 3, &mut rng).unwrap();
    assert_eq!(problem.num_relevant_edges(), 6);
    assert_eq!(problem.num_fixed_edges(), 0);

    problem.determine_relevant_edges(50.0);
    assert_eq!(problem.num_relevant_edges(), 3);
    assert_eq!(problem.num_fixed_edges(), 3);
    for idx in 0..3 {
      let node = problem.relevant_edge(idx);
      assert_eq!(node, problem.priority_edge(idx));
      assert_eq!(problem.relevant_index(node), Some(idx));
      assert!(!problem.is_fixed(node));
      assert!(problem.is_fixed(problem.fixed_edge(idx)));
    }

    problem.determine_relevant_edges(100.0);
    assert_eq!(problem.num_relevant_edges(), 1);
    assert_eq!(problem.num_fixed_edges(), 5);

    problem.determine_relevant_edges(0.0);
    assert_eq!(problem.num_relevant_edges(), 6);
    assert!((0..6).all(|node| !problem.is_fixed(node)));
  }

  #[test]
  fn test_labels() {
    let mut rng = StdRng::seed_from_u64(0);
    let dataset = fixtures::line_dataset()
      .with_labels(vec![0, 0, 0, 1, 1, 1])
      .unwrap();
    let problem = ClusteringProblem::new(dataset, 3, &mut rng).unwrap();
    assert!(problem.labels_provided());
    assert_eq!(problem.label(4), 1);
    assert_eq!(problem.num_real_clusters(), 2);
  }
}

//! Decoding of locus encodings into clusterings.

use crate::problem::Problem;

const UNASSIGNED: usize = usize::MAX;

/// Labels every node of the functional graph `links` (node `i` links to
/// `links[i]`) with the dense id of its weakly connected component and
/// returns the number of components.
///
/// Nodes are walked forward from each unassigned node until an assigned one
/// is met. If the walk joins an earlier component, the walked nodes are
/// relabelled to it, otherwise a new component is committed. `walk` is
/// scratch space.
pub(crate) fn decode_components(
  links: &[usize],
  assignment: &mut [usize],
  walk: &mut Vec<usize>,
) -> usize {
  assignment.fill(UNASSIGNED);
  let mut total = 0;
  for start in 0..links.len() {
    if assignment[start] != UNASSIGNED {
      continue;
    }
    walk.clear();
    let mut node = start;
    while assignment[node] == UNASSIGNED {
      assignment[node] = total;
      walk.push(node);
      node = links[node];
    }
    let reached = assignment[node];
    if reached == total {
      total += 1;
    } else {
      walk.iter().for_each(|&w| assignment[w] = reached);
    }
  }
  total
}

/// A partition of the data into clusters with their centroids.
#[derive(Clone, Debug, PartialEq)]
pub struct Clustering {
  assignment: Vec<usize>,
  total_clusters: usize,
  mdim: usize,
  centroids: Vec<f64>,
  sizes: Vec<usize>,
}

impl Clustering {
  /// Decodes a full-length locus encoding.
  pub fn from_encoding<P: Problem>(problem: &P, encoding: &[usize]) -> Self {
    let mut assignment = vec![UNASSIGNED; problem.ndata()];
    let total_clusters =
      decode_components(encoding, &mut assignment, &mut Vec::new());
    Self::from_assignment(problem, assignment, total_clusters)
  }

  /// Builds a clustering from dense cluster ids in `[0, total_clusters)`.
  pub fn from_assignment<P: Problem>(
    problem: &P,
    assignment: Vec<usize>,
    total_clusters: usize,
  ) -> Self {
    let mdim = problem.mdim();
    let mut centroids = vec![0.0; total_clusters * mdim];
    let mut sizes = vec![0; total_clusters];
    for (i, &c) in assignment.iter().enumerate() {
      sizes[c] += 1;
      centroids[c * mdim..(c + 1) * mdim]
        .iter_mut()
        .zip(problem.point(i))
        .for_each(|(sum, x)| *sum += x);
    }
    for (centroid, &size) in centroids.chunks_mut(mdim.max(1)).zip(&sizes) {
      if size > 0 {
        centroid.iter_mut().for_each(|x| *x /= size as f64);
      }
    }
    Self {
      assignment,
      total_clusters,
      mdim,
      centroids,
      sizes,
    }
  }

  /// Cluster id of every element, in data order.
  pub fn assignment(&self) -> &[usize] {
    &self.assignment
  }

  /// Cluster id of the `i`-th element.
  pub fn cluster_of(&self, i: usize) -> usize {
    self.assignment[i]
  }

  /// Number of clusters.
  pub fn total_clusters(&self) -> usize {
    self.total_clusters
  }

  /// Centroid of cluster `c`.
  pub fn centroid(&self, c: usize) -> &[f64] {
    &self.centroids[c * self.mdim..(c + 1) * self.mdim]
  }

  /// Number of members of cluster `c`.
  pub fn size(&self, c: usize) -> usize {
    self.sizes[c]
  }
}

#[cfg(test)]
mod tests {
  use itertools::Itertools;
  use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

  use super::*;
  use crate::fixtures;

  fn same_partition(a: &[usize], b: &[usize]) -> bool {
    (0..a.len())
      .tuple_combinations()
      .all(|(i, j)| (a[i] == a[j]) == (b[i] == b[j]))
  }

  // naive reference: repeatedly unify labels across links until stable
  fn reference_partition(links: &[usize]) -> Vec<usize> {
    let mut label = (0..links.len()).collect_vec();
    loop {
      let mut changed = false;
      for (i, &j) in links.iter().enumerate() {
        let min = label[i].min(label[j]);
        if label[i] != min || label[j] != min {
          label[i] = min;
          label[j] = min;
          changed = true;
        }
      }
      if !changed {
        return label;
      }
    }
  }

  #[test]
  fn test_decode_relabels_joined_walks() {
    // 0 -> 2, 1 -> 0, 2 -> 2, 3 -> 4, 4 -> 1, 5 -> 5
    let links = [2, 0, 2, 4, 1, 5];
    let mut assignment = vec![0; links.len()];
    let total = decode_components(&links, &mut assignment, &mut Vec::new());
    assert_eq!(total, 2);
    assert_eq!(assignment, vec![0, 0, 0, 0, 0, 1]);
  }

  #[test]
  fn test_decode_severed_mst() {
    let problem = fixtures::blobs_problem(7);
    let mut rng = StdRng::seed_from_u64(11);
    let mst = (0..problem.ndata()).map(|i| problem.mst_edge(i)).collect_vec();
    // the root and its first child share one edge
    let mut candidates = (0..problem.ndata())
      .filter(|&i| mst[mst[i]] != i)
      .collect_vec();

    for k in [0, 1, 2, 5, 17] {
      candidates.shuffle(&mut rng);
      let mut encoding = mst.clone();
      candidates.iter().take(k).for_each(|&i| encoding[i] = i);

      let clustering = Clustering::from_encoding(&problem, &encoding);
      assert_eq!(clustering.total_clusters(), k + 1);
      assert!(clustering.assignment().iter().all(|&c| c < k + 1));
      assert!(same_partition(
        clustering.assignment(),
        &reference_partition(&encoding)
      ));

      // renumbering the elements must not change the partition
      let n = problem.ndata();
      let mut permutation = (0..n).collect_vec();
      permutation.shuffle(&mut rng);
      let mut renumbered = vec![0; n];
      for (i, &j) in encoding.iter().enumerate() {
        renumbered[permutation[i]] = permutation[j];
      }
      let mut assignment = vec![0; n];
      let total =
        decode_components(&renumbered, &mut assignment, &mut Vec::new());
      assert_eq!(total, k + 1);
      let restored = permutation.iter().map(|&p| assignment[p]).collect_vec();
      assert!(same_partition(clustering.assignment(), &restored));
      assert_eq!(
        (0..k + 1).map(|c| clustering.size(c)).sum::<usize>(),
        problem.ndata()
      );
    }
  }

  #[test]
  fn test_centroids() {
    let mut rng = StdRng::seed_from_u64(0);
    let problem = crate::problem::ClusteringProblem::new(
      fixtures::line_dataset(),
      3,
      &mut rng,
    )
    .unwrap();
    let clustering =
      Clustering::from_assignment(&problem, vec![0, 0, 0, 1, 1, 1], 2);
    assert_eq!(clustering.centroid(0), &[1.0, 0.0]);
    assert_eq!(clustering.centroid(1), &[11.0, 0.0]);
    assert_eq!(clustering.size(1), 3);
    assert_eq!(clustering.cluster_of(4), 1);
  }
}

//! Datasets shared by unit tests.

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{dataset::Dataset, problem::ClusteringProblem};

/// Six points on a line, two groups of three separated by a wide gap:
/// `A(0,0) B(1,0) C(2,0)` and `D(10,0) E(11,0) F(12,0)`.
pub fn line_dataset() -> Dataset {
  Dataset::from_points(vec![
    vec![0.0, 0.0],
    vec![1.0, 0.0],
    vec![2.0, 0.0],
    vec![10.0, 0.0],
    vec![11.0, 0.0],
    vec![12.0, 0.0],
  ])
  .unwrap()
}

/// Labelled isotropic gaussian blobs in the plane, `per_blob` points each.
pub fn gaussian_blobs(
  centres: &[[f64; 2]],
  per_blob: usize,
  std_dev: f64,
  seed: u64,
) -> Dataset {
  let mut rng = StdRng::seed_from_u64(seed);
  let noise = Normal::new(0.0, std_dev).unwrap();
  let mut points = Vec::new();
  let mut labels = Vec::new();
  for (label, centre) in centres.iter().enumerate() {
    for _ in 0..per_blob {
      points.push(
        centre
          .iter()
          .map(|c| c + noise.sample(&mut rng))
          .collect::<Vec<_>>(),
      );
      labels.push(label);
    }
  }
  Dataset::from_points(points)
    .unwrap()
    .with_labels(labels)
    .unwrap()
}

/// Three well separated blobs of 20 points, preprocessed with `L = 5`.
pub fn blobs_problem(seed: u64) -> ClusteringProblem {
  let mut dataset =
    gaussian_blobs(&[[0.0, 0.0], [6.0, 0.0], [3.0, 5.0]], 20, 0.8, seed);
  dataset.normalise();
  let mut rng = StdRng::seed_from_u64(seed);
  ClusteringProblem::new(dataset, 5, &mut rng).unwrap()
}

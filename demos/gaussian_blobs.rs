use delta_mock::{Config, Dataset, Representation, DEFAULT_NEIGHBOURS};
use rand::prelude::*;
use rand_distr::Normal;
use tracing::Level;

// five labelled blobs in the plane
const CENTRES: [[f64; 2]; 5] =
  [[0.0, 0.0], [8.0, 0.0], [4.0, 7.0], [12.0, 7.0], [-4.0, 7.0]];
const PER_BLOB: usize = 60;

fn blobs(rng: &mut StdRng) -> delta_mock::Result<Dataset> {
  let noise = Normal::new(0.0, 1.2).expect("valid standard deviation");
  let mut points = Vec::new();
  let mut labels = Vec::new();
  for (label, centre) in CENTRES.iter().enumerate() {
    for _ in 0..PER_BLOB {
      points.push(centre.iter().map(|c| c + noise.sample(rng)).collect());
      labels.push(label);
    }
  }
  Dataset::from_points(points)?.with_labels(labels)
}

fn main() -> delta_mock::Result<()> {
  tracing_subscriber::fmt().with_max_level(Level::INFO).init();

  let mut dataset = blobs(&mut StdRng::seed_from_u64(2))?;
  dataset.normalise();

  for (representation, delta) in [
    (Representation::Locus, 0.0),
    (Representation::Short, 80.0),
    (Representation::Split, 95.0),
  ] {
    let config = Config::builder()
      .population_size(60)
      .max_generations(60)
      .representation(representation)
      .delta(delta)
      .seed(42)
      .build();
    let report =
      delta_mock::optimize(dataset.clone(), DEFAULT_NEIGHBOURS, &config)?;

    println!(
      "{representation:?} (delta {delta}): {} solutions after {} evaluations",
      report.entries.len(),
      report.evaluations
    );
    println!("variance\tconnectivity\tclusters\tari");
    report.write_measures(std::io::stdout())?;
    if let Some(best) = report.best_by_ari() {
      println!(
        "best: {} clusters, ARI {:.4}\n",
        best.clusters,
        best.ari.unwrap_or_default()
      );
    }
  }
  Ok(())
}

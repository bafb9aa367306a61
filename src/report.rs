//! Rank-1 solutions of a run, in a form ready to be written out.

use std::io::Write;

use crate::error::Result;

/// Measures and cluster assignment of a single nondominated solution.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportEntry {
  /// Overall intra-cluster variance.
  pub variance: f64,
  /// Connectivity penalty.
  pub connectivity: f64,
  /// Number of clusters.
  pub clusters: usize,
  /// Adjusted Rand Index against ground truth, if labels are known.
  pub ari: Option<f64>,
  /// Cluster id of every element, in data order.
  pub assignment: Vec<usize>,
}

impl ReportEntry {
  /// Writes one cluster id per line, in data order.
  pub fn write_assignment<W: Write>(&self, mut writer: W) -> Result<()> {
    for cluster in &self.assignment {
      writeln!(writer, "{cluster}")?;
    }
    Ok(())
  }
}

/// Nondominated solutions of a population at some point of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
  /// Number of completed generations.
  pub generation: usize,
  /// Number of evaluations performed.
  pub evaluations: u64,
  /// One entry per rank-1 solution, in population order.
  pub entries: Vec<ReportEntry>,
}

impl Report {
  /// Writes one line per entry: variance, connectivity and cluster count,
  /// followed by the ARI when known, separated by tabs.
  pub fn write_measures<W: Write>(&self, mut writer: W) -> Result<()> {
    for entry in &self.entries {
      write!(
        writer,
        "{}\t{}\t{}",
        entry.variance, entry.connectivity, entry.clusters
      )?;
      if let Some(ari) = entry.ari {
        write!(writer, "\t{ari}")?;
      }
      writeln!(writer)?;
    }
    Ok(())
  }

  /// The entry closest to the ground truth, if labels are known.
  pub fn best_by_ari(&self) -> Option<&ReportEntry> {
    self
      .entries
      .iter()
      .filter_map(|entry| entry.ari.map(|ari| (ari, entry)))
      .max_by(|(a, _), (b, _)| a.total_cmp(b))
      .map(|(_, entry)| entry)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(variance: f64, clusters: usize, ari: Option<f64>) -> ReportEntry {
    ReportEntry {
      variance,
      connectivity: 0.5,
      clusters,
      ari,
      assignment: vec![0, 0, 1],
    }
  }

  #[test]
  fn test_write_measures() {
    let report = Report {
      generation: 3,
      evaluations: 120,
      entries: vec![entry(1.5, 1, Some(0.25)), entry(0.25, 2, None)],
    };
    let mut out = Vec::new();
    report.write_measures(&mut out).unwrap();
    assert_eq!(
      String::from_utf8(out).unwrap(),
      "1.5\t0.5\t1\t0.25\n0.25\t0.5\t2\n"
    );
  }

  #[test]
  fn test_write_assignment() {
    let mut out = Vec::new();
    entry(1.0, 2, None).write_assignment(&mut out).unwrap();
    assert_eq!(out, b"0\n0\n1\n");
  }

  #[test]
  fn test_best_by_ari() {
    let report = Report {
      entries: vec![
        entry(1.0, 1, Some(0.1)),
        entry(0.5, 3, Some(0.9)),
        entry(0.2, 5, Some(0.6)),
      ],
      ..Default::default()
    };
    assert_eq!(report.best_by_ari().map(|e| e.clusters), Some(3));
    assert_eq!(Report::default().best_by_ari(), None);
  }
}

//! Input data: points to be clustered and optional ground-truth labels.

use std::io::Read;

use crate::error::{DatasetError, Result};

/// A set of `ndata` points of dimensionality `mdim`, optionally labelled with
/// the real cluster each point belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
  points: Vec<f64>,
  ndata: usize,
  mdim: usize,
  labels: Option<Vec<usize>>,
  num_real_clusters: usize,
}

impl Dataset {
  /// Creates a dataset from a list of points of equal dimensionality.
  pub fn from_points(points: Vec<Vec<f64>>) -> Result<Self> {
    let mdim = points.first().map_or(0, Vec::len);
    let ndata = points.len();
    let mut flat = Vec::with_capacity(ndata * mdim);
    for (element, point) in points.into_iter().enumerate() {
      if point.len() != mdim {
        return Err(
          DatasetError::Dimensions {
            element,
            expected: mdim,
            found: point.len(),
          }
          .into(),
        );
      }
      flat.extend(point);
    }
    if ndata < 2 {
      return Err(DatasetError::TooFewElements(ndata).into());
    }
    Ok(Self {
      points: flat,
      ndata,
      mdim,
      labels: None,
      num_real_clusters: 0,
    })
  }

  /// Attaches ground-truth labels. Each label must be smaller than the
  /// number of real clusters, which is derived from the largest label.
  pub fn with_labels(mut self, labels: Vec<usize>) -> Result<Self> {
    if labels.len() != self.ndata {
      return Err(
        DatasetError::LabelCount {
          expected: self.ndata,
          found: labels.len(),
        }
        .into(),
      );
    }
    self.num_real_clusters = labels.iter().max().map_or(0, |m| m + 1);
    self.labels = Some(labels);
    Ok(self)
  }

  /// Parses a dataset from its text format. The header holds
  /// `ndata mdim labels_provided num_real_clusters`, followed by `mdim`
  /// whitespace separated values per element, each row ending with an integer
  /// label if labels are provided.
  pub fn parse<R: Read>(mut reader: R) -> Result<Self> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = text.split_whitespace();

    let mut header = [0usize; 4];
    for (i, field) in header.iter_mut().enumerate() {
      let token = tokens
        .next()
        .ok_or_else(|| DatasetError::Header(format!("missing field {i}")))?;
      *field = token
        .parse()
        .map_err(|_| DatasetError::Header(format!("field {i}: {token:?}")))?;
    }
    let [ndata, mdim, labels_provided, num_real_clusters] = header;
    if ndata < 2 {
      return Err(DatasetError::TooFewElements(ndata).into());
    }
    if mdim == 0 {
      return Err(DatasetError::Header("zero dimensions".into()).into());
    }
    let len = ndata.checked_mul(mdim).ok_or_else(|| {
      DatasetError::Header(format!("{ndata} elements of {mdim} dimensions"))
    })?;

    // reserve no more than the body can fill
    let available = tokens.clone().count();
    let mut points = Vec::with_capacity(len.min(available));
    let mut labels = (labels_provided != 0)
      .then(|| Vec::with_capacity(ndata.min(available)));
    for element in 0..ndata {
      for column in 0..mdim {
        let token = tokens.next();
        let value = token.and_then(|t| t.parse::<f64>().ok()).ok_or_else(
          || DatasetError::Value {
            element,
            column,
            token: token.map(str::to_owned),
          },
        )?;
        points.push(value);
      }
      if let Some(labels) = labels.as_mut() {
        let token = tokens.next();
        let label = token.and_then(|t| t.parse::<usize>().ok()).ok_or_else(
          || DatasetError::Value {
            element,
            column: mdim,
            token: token.map(str::to_owned),
          },
        )?;
        if label >= num_real_clusters {
          return Err(
            DatasetError::Label {
              element,
              label,
              num_real_clusters,
            }
            .into(),
          );
        }
        labels.push(label);
      }
    }

    Ok(Self {
      points,
      ndata,
      mdim,
      num_real_clusters: if labels.is_some() { num_real_clusters } else { 0 },
      labels,
    })
  }

  /// Applies z-score normalisation to each dimension. Dimensions without
  /// spread are only centred.
  pub fn normalise(&mut self) {
    let ndata = self.ndata as f64;
    for d in 0..self.mdim {
      let column = || self.points.iter().skip(d).step_by(self.mdim);
      let mean = column().sum::<f64>() / ndata;
      let stdev =
        (column().map(|v| (v - mean).powi(2)).sum::<f64>() / ndata).sqrt();
      for value in self.points.iter_mut().skip(d).step_by(self.mdim) {
        *value -= mean;
        if stdev > 0.0 {
          *value /= stdev;
        }
      }
    }
  }

  /// Number of elements.
  pub fn ndata(&self) -> usize {
    self.ndata
  }

  /// Dimensionality of each element.
  pub fn mdim(&self) -> usize {
    self.mdim
  }

  /// Coordinates of the `i`-th element.
  pub fn point(&self, i: usize) -> &[f64] {
    &self.points[i * self.mdim..(i + 1) * self.mdim]
  }

  /// Ground-truth labels, if any.
  pub fn labels(&self) -> Option<&[usize]> {
    self.labels.as_deref()
  }

  /// Number of real clusters, `0` when no labels are attached.
  pub fn num_real_clusters(&self) -> usize {
    self.num_real_clusters
  }
}

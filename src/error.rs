//! Error types shared by the whole crate.

/// A convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error this crate can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The optimizer was misconfigured. Raised before any evolutionary work.
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),
  /// A dataset could not be read or does not describe a clustering problem.
  #[error("dataset error: {0}")]
  Dataset(#[from] DatasetError),
  /// An internal invariant of the optimizer was broken. This signals a bug,
  /// not a recoverable runtime condition.
  #[error("invariant violation: {0}")]
  Invariant(#[from] InvariantViolation),
  /// Reading input or writing a report failed.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Returns `true` if this error signals a broken internal invariant.
  pub fn is_invariant_violation(&self) -> bool {
    matches!(self, Error::Invariant(_))
  }
}

/// Configuration-time errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
  /// Representation name is none of `locus`, `short` or `split`.
  #[error("unrecognised representation: {0}")]
  UnknownRepresentation(String),
  /// Algorithm name is not `nsga2`.
  #[error("unrecognised algorithm: {0}")]
  UnknownAlgorithm(String),
  /// Population size must be a positive multiple of 4.
  #[error("population size must be a positive multiple of 4, got {0}")]
  PopulationSize(usize),
  /// Seed pool cannot fill the population.
  #[error(
    "seed pool of {seed_pool_size} solutions is smaller than population size {population_size}"
  )]
  SeedPool {
    /// Configured seed pool size.
    seed_pool_size: usize,
    /// Configured population size.
    population_size: usize,
  },
  /// A probability lies outside of `[0, 1]`.
  #[error("{name} must lie in [0, 1], got {value}")]
  Probability {
    /// Name of the offending parameter.
    name: &'static str,
    /// Its value.
    value: f64,
  },
  /// Not a single generation could be run.
  #[error("max generations must be at least 1")]
  Generations,
}

/// Dataset errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
  /// The header line is missing or malformed.
  #[error("malformed header: {0}")]
  Header(String),
  /// A value could not be read.
  #[error("unexpected token at element {element}, column {column}: {token:?}")]
  Value {
    /// Element (row) index.
    element: usize,
    /// Column index.
    column: usize,
    /// Offending token, or `None` at end of input.
    token: Option<String>,
  },
  /// A coordinate is NaN or infinite.
  #[error("element {element} has a non-finite value in column {column}")]
  NonFinite {
    /// Element index.
    element: usize,
    /// Column index.
    column: usize,
  },
  /// Too few elements to form at least two clusters.
  #[error("at least 2 elements are required, got {0}")]
  TooFewElements(usize),
  /// A point does not have the dataset's dimensionality.
  #[error("element {element} has {found} dimensions, expected {expected}")]
  Dimensions {
    /// Element index.
    element: usize,
    /// Expected dimensionality.
    expected: usize,
    /// Found dimensionality.
    found: usize,
  },
  /// The number of labels differs from the number of elements.
  #[error("{found} labels given for {expected} elements")]
  LabelCount {
    /// Number of elements.
    expected: usize,
    /// Number of labels.
    found: usize,
  },
  /// A label is not in `[0, num_real_clusters)`.
  #[error("label {label} of element {element} exceeds {num_real_clusters} real clusters")]
  Label {
    /// Element index.
    element: usize,
    /// The offending label.
    label: usize,
    /// Declared number of real clusters.
    num_real_clusters: usize,
  },
}

/// Broken internal invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
  /// A population was asked to hold more solutions than its capacity.
  #[error("population capacity of {capacity} exceeded")]
  Capacity {
    /// Fixed capacity of the population.
    capacity: usize,
  },
  /// A population has an unexpected size after survival selection.
  #[error("{population} population holds {found} solutions, expected {expected}")]
  PopulationSize {
    /// Which population.
    population: &'static str,
    /// Expected size.
    expected: usize,
    /// Actual size.
    found: usize,
  },
  /// Survivors and rejected solutions do not add up to the merged source.
  #[error("{survivors} survivors and {rejected} rejected out of {source_size} solutions")]
  Survival {
    /// Number of survivors.
    survivors: usize,
    /// Number of rejected solutions.
    rejected: usize,
    /// Size of the merged source.
    source_size: usize,
  },
}

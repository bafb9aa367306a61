//! Encodings of candidate clusterings.
//!
//! All encodings describe a graph in which element `i` links to another
//! element; clusters are the connected components of that graph.
//! - [`Representation::Locus`] stores one link per element, restricted to its
//!   `L` nearest neighbours.
//! - [`Representation::Short`] stores links only for relevant MST edges,
//!   every other element keeps its MST link.
//! - [`Representation::Split`] stores one bit per relevant MST edge: `1`
//!   keeps the MST link, `0` turns the element into a self-loop.

use std::str::FromStr;

use rand::Rng;

use crate::{clustering::Clustering, error::ConfigError, problem::Problem};

/// Bit value of a kept MST edge in the split encoding.
pub const KEEP: usize = 1;
/// Bit value of a severed MST edge in the split encoding.
pub const SEVER: usize = 0;

/// Encoding scheme of candidate solutions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Representation {
  /// Full-length locus-based adjacency encoding.
  #[default]
  Locus,
  /// Reduced locus encoding over relevant MST edges.
  Short,
  /// Reduced binary encoding over relevant MST edges.
  Split,
}

impl FromStr for Representation {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "locus" | "full" => Ok(Representation::Locus),
      "short" => Ok(Representation::Short),
      "split" => Ok(Representation::Split),
      _ => Err(ConfigError::UnknownRepresentation(s.to_owned())),
    }
  }
}

impl Representation {
  /// Whether the encoding only covers relevant MST edges.
  pub fn is_reduced(self) -> bool {
    !matches!(self, Representation::Locus)
  }

  /// Number of positions of an encoding.
  pub fn encoding_length<P: Problem>(self, problem: &P) -> usize {
    match self {
      Representation::Locus => problem.ndata(),
      Representation::Short | Representation::Split => {
        problem.num_relevant_edges()
      }
    }
  }

  /// Draws a legal allele for position `pos` different from `avoid`.
  ///
  /// Locus and short alleles are one of the `L` nearest neighbours of the
  /// element behind `pos`, or the element itself.
  pub fn random_allele<P: Problem, R: Rng + ?Sized>(
    self,
    problem: &P,
    rng: &mut R,
    pos: usize,
    avoid: Option<usize>,
  ) -> usize {
    let node = match self {
      Representation::Locus => pos,
      Representation::Short => problem.relevant_edge(pos),
      Representation::Split => {
        return match avoid {
          None => rng.gen_range(SEVER..=KEEP),
          Some(KEEP) => SEVER,
          Some(_) => KEEP,
        };
      }
    };
    loop {
      let allele =
        problem.neighbour(node, rng.gen_range(0..=problem.num_neighbours()));
      if Some(allele) != avoid {
        return allele;
      }
    }
  }

  /// Neighbour rank of the link currently encoded at `pos`, or `None` if the
  /// position encodes no link.
  pub fn link_rank<P: Problem>(
    self,
    problem: &P,
    pos: usize,
    allele: usize,
  ) -> Option<usize> {
    match self {
      Representation::Locus => Some(problem.neighbour_rank(pos, allele)),
      Representation::Short => {
        Some(problem.neighbour_rank(problem.relevant_edge(pos), allele))
      }
      Representation::Split => (allele == KEEP).then(|| {
        let edge = problem.relevant_edge(pos);
        problem.neighbour_rank(edge, problem.mst_edge(edge))
      }),
    }
  }

  /// The encoding of the unmodified MST, a single cluster.
  pub fn mst_encoding<P: Problem>(self, problem: &P) -> Vec<usize> {
    match self {
      Representation::Locus => {
        (0..problem.ndata()).map(|i| problem.mst_edge(i)).collect()
      }
      Representation::Short => (0..problem.num_relevant_edges())
        .map(|pos| problem.mst_edge(problem.relevant_edge(pos)))
        .collect(),
      Representation::Split => vec![KEEP; problem.num_relevant_edges()],
    }
  }

  /// The MST with its `severed` highest priority edges redirected. Locus and
  /// short encodings replace them with random links, split encodings cut
  /// them.
  pub fn priority_encoding<P: Problem, R: Rng + ?Sized>(
    self,
    problem: &P,
    rng: &mut R,
    severed: usize,
  ) -> Vec<usize> {
    let mut encoding = self.mst_encoding(problem);
    match self {
      Representation::Locus => {
        for idx in 0..severed.min(problem.num_priority_edges()) {
          let edge = problem.priority_edge(idx);
          encoding[edge] =
            self.random_allele(problem, rng, edge, Some(encoding[edge]));
        }
      }
      Representation::Short => {
        for pos in 0..encoding.len() {
          let edge = problem.relevant_edge(pos);
          if problem.relevant_index(edge).is_some_and(|idx| idx < severed) {
            encoding[pos] =
              self.random_allele(problem, rng, pos, Some(encoding[pos]));
          }
        }
      }
      Representation::Split => {
        for (pos, bit) in encoding.iter_mut().enumerate() {
          let edge = problem.relevant_edge(pos);
          if problem.relevant_index(edge).is_some_and(|idx| idx < severed) {
            *bit = SEVER;
          }
        }
      }
    }
    encoding
  }

  /// Writes the links encoded by `encoding` into `full`. Reduced encodings
  /// only overwrite relevant positions, the rest of `full` is expected to
  /// hold MST links already.
  pub fn update_full_encoding<P: Problem>(
    self,
    problem: &P,
    encoding: &[usize],
    full: &mut [usize],
  ) {
    match self {
      Representation::Locus => full.copy_from_slice(encoding),
      Representation::Short => {
        for (pos, &allele) in encoding.iter().enumerate() {
          full[problem.relevant_edge(pos)] = allele;
        }
      }
      Representation::Split => {
        for (pos, &bit) in encoding.iter().enumerate() {
          let edge = problem.relevant_edge(pos);
          full[edge] = if bit == KEEP {
            problem.mst_edge(edge)
          } else {
            edge
          };
        }
      }
    }
  }

  /// The equivalent full-length locus encoding.
  pub fn expand<P: Problem>(
    self,
    problem: &P,
    encoding: &[usize],
  ) -> Vec<usize> {
    let mut full: Vec<_> =
      (0..problem.ndata()).map(|i| problem.mst_edge(i)).collect();
    self.update_full_encoding(problem, encoding, &mut full);
    full
  }

  /// Decodes an encoding into a clustering.
  pub fn decode<P: Problem>(
    self,
    problem: &P,
    encoding: &[usize],
  ) -> Clustering {
    Clustering::from_encoding(problem, &self.expand(problem, encoding))
  }

  /// Projects a full-length locus encoding onto this representation. Split
  /// positions keep their edge iff the locus still holds the MST link.
  pub fn from_locus<P: Problem>(
    self,
    problem: &P,
    locus: &[usize],
  ) -> Vec<usize> {
    let relevant = (0..problem.num_relevant_edges())
      .map(|pos| problem.relevant_edge(pos));
    match self {
      Representation::Locus => locus.to_vec(),
      Representation::Short => relevant.map(|edge| locus[edge]).collect(),
      Representation::Split => relevant
        .map(|edge| {
          if locus[edge] == problem.mst_edge(edge) {
            KEEP
          } else {
            SEVER
          }
        })
        .collect(),
    }
  }
}

//! Nondominated sorting and crowding distance.

use crate::score::{Dominance, ParetoDominance, Scores, OBJECTIVE_NUM};

/// Reusable buffers of nondominated sorting. Members are referred to by
/// their position in the sorted slice.
#[derive(Clone, Debug, Default)]
pub(crate) struct Ranking {
  // members dominated by each member
  dominated: Vec<Vec<usize>>,
  // number of members dominating each member
  counts: Vec<usize>,
  fronts: Vec<Vec<usize>>,
  num_fronts: usize,
  crowding: Vec<f64>,
  order: Vec<usize>,
}

impl Ranking {
  /// Reserves room for sorting `capacity` members.
  pub(crate) fn with_capacity(capacity: usize) -> Self {
    Self {
      dominated: (0..capacity).map(|_| Vec::with_capacity(capacity)).collect(),
      counts: Vec::with_capacity(capacity),
      fronts: (0..capacity).map(|_| Vec::with_capacity(capacity)).collect(),
      num_fronts: 0,
      crowding: Vec::with_capacity(capacity),
      order: Vec::with_capacity(capacity),
    }
  }

  /// Splits `scores` into fronts. Front `0` holds the members no one
  /// dominates, every later front the members only dominated by earlier
  /// ones.
  pub(crate) fn sort(&mut self, scores: &[Scores]) {
    let m = scores.len();
    if self.dominated.len() < m {
      self.dominated.resize_with(m, Vec::new);
    }
    if self.fronts.len() < m {
      self.fronts.resize_with(m, Vec::new);
    }
    self.counts.clear();
    self.counts.resize(m, 0);
    self.crowding.clear();
    self.crowding.resize(m, 0.0);
    self.fronts.iter_mut().for_each(Vec::clear);
    self.num_fronts = 0;

    for p in 0..m {
      self.dominated[p].clear();
      for q in (0..m).filter(|&q| q != p) {
        match scores[p].dominance(&scores[q]) {
          Dominance::Dominates => self.dominated[p].push(q),
          Dominance::Dominated => self.counts[p] += 1,
          Dominance::Indifferent | Dominance::Incomparable => {}
        }
      }
      if self.counts[p] == 0 {
        self.fronts[0].push(p);
      }
    }
    if m == 0 {
      return;
    }

    self.num_fronts = 1;
    while self.num_fronts < m {
      let (done, rest) = self.fronts.split_at_mut(self.num_fronts);
      let (current, next) = (&done[self.num_fronts - 1], &mut rest[0]);
      for &p in current {
        for &q in &self.dominated[p] {
          self.counts[q] -= 1;
          if self.counts[q] == 0 {
            next.push(q);
          }
        }
      }
      if next.is_empty() {
        break;
      }
      self.num_fronts += 1;
    }
  }

  /// Number of fronts found by the last [`sort`](Self::sort).
  pub(crate) fn num_fronts(&self) -> usize {
    self.num_fronts
  }

  /// Members of front `f`, in the order they were found.
  pub(crate) fn front(&self, f: usize) -> &[usize] {
    &self.fronts[f]
  }

  /// Crowding distances of the last crowded fronts, by member.
  pub(crate) fn crowding(&self) -> &[f64] {
    &self.crowding
  }

  /// Computes the crowding distance of every member of front `f`.
  ///
  /// Both extremes of every objective are infinitely far, interior members
  /// accumulate the normalised gap between their neighbours. An objective
  /// constant across the front contributes nothing.
  pub(crate) fn crowd(&mut self, scores: &[Scores], f: usize) {
    let front = &self.fronts[f];
    front.iter().for_each(|&p| self.crowding[p] = 0.0);
    if front.len() <= 2 {
      front.iter().for_each(|&p| self.crowding[p] = f64::INFINITY);
      return;
    }
    for objective in 0..OBJECTIVE_NUM {
      self.order.clear();
      self.order.extend_from_slice(front);
      self.order.sort_by(|&a, &b| {
        scores[a][objective].total_cmp(&scores[b][objective])
      });

      let first = self.order[0];
      let last = self.order[self.order.len() - 1];
      let range = scores[last][objective] - scores[first][objective];
      if range == 0.0 {
        continue;
      }
      self.crowding[first] = f64::INFINITY;
      self.crowding[last] = f64::INFINITY;
      for k in 1..self.order.len() - 1 {
        let p = self.order[k];
        if self.crowding[p] != f64::INFINITY {
          let prev = scores[self.order[k - 1]][objective];
          let next = scores[self.order[k + 1]][objective];
          self.crowding[p] += (next - prev) / range;
        }
      }
    }
  }

  /// Moves front `f` into crowding order, most isolated members first.
  /// Ties keep their order.
  pub(crate) fn sort_front_by_crowding(&mut self, f: usize) {
    let crowding = &self.crowding;
    self.fronts[f].sort_by(|&a, &b| crowding[b].total_cmp(&crowding[a]));
  }
}

/// Pareto ranks of `scores`, starting at 1 for nondominated members.
pub fn nondominated_ranks(scores: &[Scores]) -> Vec<usize> {
  let mut ranking = Ranking::with_capacity(scores.len());
  ranking.sort(scores);
  let mut ranks = vec![0; scores.len()];
  for f in 0..ranking.num_fronts() {
    ranking.front(f).iter().for_each(|&p| ranks[p] = f + 1);
  }
  ranks
}

/// Crowding distances of `scores` taken as a single front.
pub fn crowding_distances(scores: &[Scores]) -> Vec<f64> {
  if scores.is_empty() {
    return Vec::new();
  }
  let mut ranking = Ranking::with_capacity(scores.len());
  ranking.crowding.resize(scores.len(), 0.0);
  ranking.fronts[0].extend(0..scores.len());
  ranking.crowd(scores, 0);
  ranking.crowding
}

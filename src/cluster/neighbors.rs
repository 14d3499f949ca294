//! Epsilon-neighborhood queries backed by a symmetric pairwise cache.
//!
//! A DBSCAN run asks for the neighborhood of every point at least once, so a
//! brute-force scan would compute each pairwise distance twice (once from each
//! side). [`NeighborCache`] remembers the outcome of every threshold test per
//! *unordered* pair, so each pair is evaluated at most once per run.
//!
//! The cache is tri-state per pair: unknown, [`Adjacency::Within`] or
//! [`Adjacency::Beyond`]. States are packed two bits per pair into a
//! lower-triangular matrix of `n (n - 1) / 2` slots; the diagonal is not stored
//! because a point is always its own neighbor.

use crate::distance::Metric;

/// Outcome of a threshold test between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjacency {
    /// The points are strictly closer than epsilon.
    Within,
    /// The points are epsilon or further apart.
    Beyond,
}

const UNKNOWN: u64 = 0b00;
const WITHIN: u64 = 0b01;
const BEYOND: u64 = 0b10;
const SLOT_MASK: u64 = 0b11;
const SLOTS_PER_WORD: usize = 32;

/// Symmetric tri-state cache of pairwise threshold tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborCache {
    n: usize,
    words: Vec<u64>,
}

impl NeighborCache {
    /// Create an empty cache (every pair unknown) for `n` points.
    pub fn new(n: usize) -> Self {
        let pairs = n * n.saturating_sub(1) / 2;
        Self {
            n,
            words: vec![UNKNOWN; pairs.div_ceil(SLOTS_PER_WORD)],
        }
    }

    /// Number of points covered by the cache.
    pub fn n_points(&self) -> usize {
        self.n
    }

    /// Cached test result for the pair `(i, j)`, or `None` if not yet computed.
    ///
    /// `get(i, j) == get(j, i)` always holds, and `get(i, i)` is always
    /// `Some(Adjacency::Within)`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not less than [`n_points`](Self::n_points).
    pub fn get(&self, i: usize, j: usize) -> Option<Adjacency> {
        assert!(i < self.n && j < self.n, "pair ({i}, {j}) out of bounds");
        if i == j {
            return Some(Adjacency::Within);
        }
        let (word, shift) = Self::locate(i, j);
        match (self.words[word] >> shift) & SLOT_MASK {
            WITHIN => Some(Adjacency::Within),
            BEYOND => Some(Adjacency::Beyond),
            _ => None,
        }
    }

    /// Record the test result for the pair `(i, j)`. Diagonal writes are ignored.
    pub(crate) fn set(&mut self, i: usize, j: usize, adjacency: Adjacency) {
        debug_assert!(i < self.n && j < self.n);
        if i == j {
            return;
        }
        let bits = match adjacency {
            Adjacency::Within => WITHIN,
            Adjacency::Beyond => BEYOND,
        };
        let (word, shift) = Self::locate(i, j);
        let w = &mut self.words[word];
        *w = (*w & !(SLOT_MASK << shift)) | (bits << shift);
    }

    /// Number of off-diagonal pairs whose result is known.
    pub fn known_pairs(&self) -> usize {
        self.words
            .iter()
            .map(|w| {
                // A slot is known when either of its two bits is set.
                let occupied = (w | (w >> 1)) & 0x5555_5555_5555_5555;
                occupied.count_ones() as usize
            })
            .sum()
    }

    #[inline]
    fn locate(i: usize, j: usize) -> (usize, u32) {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let slot = hi * (hi - 1) / 2 + lo;
        (slot / SLOTS_PER_WORD, ((slot % SLOTS_PER_WORD) * 2) as u32)
    }
}

/// Brute-force epsilon-neighborhood search over a fixed point table.
pub(crate) struct NeighborQuery<'d, 'm, P, M> {
    data: &'d [P],
    metric: &'m M,
    epsilon: f32,
    cache: NeighborCache,
    evaluations: usize,
}

impl<'d, 'm, P, M: Metric<P>> NeighborQuery<'d, 'm, P, M> {
    pub(crate) fn new(data: &'d [P], metric: &'m M, epsilon: f32) -> Self {
        Self {
            data,
            metric,
            epsilon,
            cache: NeighborCache::new(data.len()),
            evaluations: 0,
        }
    }

    /// Indices `j` with `distance(data[target], data[j]) < epsilon`, in
    /// ascending order. Always contains `target` itself.
    pub(crate) fn neighbors(&mut self, target: usize) -> Vec<usize> {
        let data = self.data;
        let point = &data[target];
        let mut out = Vec::new();

        for (j, other) in data.iter().enumerate() {
            match self.cache.get(target, j) {
                Some(Adjacency::Beyond) => {}
                Some(Adjacency::Within) => out.push(j),
                None => {
                    self.evaluations += 1;
                    // NaN compares false and therefore lands on `Beyond`.
                    if self.metric.distance(point, other) < self.epsilon {
                        self.cache.set(target, j, Adjacency::Within);
                        out.push(j);
                    } else {
                        self.cache.set(target, j, Adjacency::Beyond);
                    }
                }
            }
        }
        out
    }

    pub(crate) fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub(crate) fn into_cache(self) -> NeighborCache {
        self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{metric_fn, Euclidean};
    use std::cell::Cell;

    #[test]
    fn test_cache_starts_unknown_except_diagonal() {
        let cache = NeighborCache::new(4);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { Some(Adjacency::Within) } else { None };
                assert_eq!(cache.get(i, j), expected);
            }
        }
        assert_eq!(cache.known_pairs(), 0);
    }

    #[test]
    fn test_cache_is_symmetric() {
        let mut cache = NeighborCache::new(40);
        cache.set(3, 37, Adjacency::Within);
        cache.set(36, 2, Adjacency::Beyond);
        assert_eq!(cache.get(37, 3), Some(Adjacency::Within));
        assert_eq!(cache.get(3, 37), Some(Adjacency::Within));
        assert_eq!(cache.get(2, 36), Some(Adjacency::Beyond));
        assert_eq!(cache.get(2, 37), None);
        assert_eq!(cache.known_pairs(), 2);
    }

    #[test]
    fn test_cache_overwrite_and_slot_isolation() {
        // Neighbouring slots share a word; writes must not bleed across.
        let mut cache = NeighborCache::new(10);
        cache.set(0, 1, Adjacency::Within);
        cache.set(0, 2, Adjacency::Beyond);
        cache.set(1, 2, Adjacency::Within);
        cache.set(0, 1, Adjacency::Beyond);
        assert_eq!(cache.get(0, 1), Some(Adjacency::Beyond));
        assert_eq!(cache.get(0, 2), Some(Adjacency::Beyond));
        assert_eq!(cache.get(1, 2), Some(Adjacency::Within));
        cache.set(4, 4, Adjacency::Beyond);
        assert_eq!(cache.get(4, 4), Some(Adjacency::Within));
    }

    #[test]
    fn test_cache_trivial_sizes() {
        assert_eq!(NeighborCache::new(0).known_pairs(), 0);
        let one = NeighborCache::new(1);
        assert_eq!(one.get(0, 0), Some(Adjacency::Within));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_cache_out_of_bounds() {
        NeighborCache::new(3).get(0, 3);
    }

    #[test]
    fn test_neighbors_strict_threshold_and_self() {
        let data = vec![vec![0.0f32], vec![1.0], vec![0.5], vec![3.0]];
        let mut query = NeighborQuery::new(&data, &Euclidean, 1.0);

        // Distance exactly epsilon is excluded.
        assert_eq!(query.neighbors(0), vec![0, 2]);
        assert_eq!(query.neighbors(3), vec![3]);
        assert_eq!(query.neighbors(2), vec![0, 1, 2]);
    }

    #[test]
    fn test_neighbors_compute_each_pair_once() {
        let calls = Cell::new(0usize);
        let metric = metric_fn(|a: &Vec<f32>, b: &Vec<f32>| {
            calls.set(calls.get() + 1);
            Euclidean.distance(a, b)
        });
        let data: Vec<Vec<f32>> = (0..6).map(|i| vec![i as f32]).collect();
        let mut query = NeighborQuery::new(&data, &metric, 1.5);

        for i in 0..data.len() {
            query.neighbors(i);
        }
        // Second pass is served entirely from the cache.
        for i in 0..data.len() {
            query.neighbors(i);
        }

        assert_eq!(calls.get(), 6 * 5 / 2);
        assert_eq!(query.evaluations(), 6 * 5 / 2);
        assert_eq!(query.into_cache().known_pairs(), 6 * 5 / 2);
    }

    #[test]
    fn test_neighbors_nan_distance_is_never_a_neighbor() {
        let metric = metric_fn(|_: &Vec<f32>, _: &Vec<f32>| f32::NAN);
        let data = vec![vec![0.0f32], vec![0.0]];
        let mut query = NeighborQuery::new(&data, &metric, 1.0);
        assert_eq!(query.neighbors(0), vec![0]);
    }
}

//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! DBSCAN is a density-based clustering algorithm that groups points based on
//! neighborhood density. Unlike k-means, it:
//!
//! - Discovers clusters of arbitrary shape
//! - Automatically determines the number of clusters
//! - Identifies noise points (outliers)
//!
//! ## Core Concepts
//!
//! - **Epsilon (ε)**: Two points are neighbors when their distance is strictly
//!   less than ε.
//! - **MinPts**: Minimum neighborhood size (the point itself included) for a
//!   point to be "core".
//! - **Core point**: Has at least MinPts neighbors within ε.
//! - **Border point**: Within ε of a core point but not core itself.
//! - **Noise point**: Neither core nor border.
//!
//! ## Algorithm Steps
//!
//! 1. For each unvisited point P, in input order:
//!    - Mark P visited and find its neighbors within ε
//!    - If |neighbors| < MinPts, mark as noise (may change later)
//!    - Else P is core: allocate the next cluster id (1, 2, ...) and expand
//!
//! 2. Expansion, driven by a FIFO work queue:
//!    - Unassigned or noise points are labeled with the cluster id
//!    - Each unvisited point is visited and its neighborhood queried
//!    - If that neighborhood has at least MinPts points, its members join the queue
//!
//! A point labeled noise early in the scan is promoted to a border point when a
//! later expansion reaches it. A border point within ε of two clusters stays in
//! the first cluster that claimed it.
//!
//! ## Complexity
//!
//! - **Time**: O(n²) distance evaluations at most, each unordered pair at most
//!   once (see [`NeighborCache`]).
//! - **Space**: O(n²) bits for the cache, O(n) for the records.
//!
//! ## References
//!
//! Ester et al. (1996). "A Density-Based Algorithm for Discovering Clusters
//! in Large Spatial Databases with Noise." KDD-96.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use super::interrupt::{Armed, Interrupt};
use super::neighbors::{Adjacency, NeighborCache, NeighborQuery};
use super::traits::Clustering;
use super::util::validate_points;
use crate::distance::{Euclidean, Metric, Point};
use crate::error::{Error, Result};

/// Label returned by [`Clustering::fit_predict`] for noise points.
pub const NOISE: usize = usize::MAX;

/// Cluster assignment of a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Label {
    /// Not yet reached by the scan. Never present in a completed fit.
    Unassigned,
    /// Not density-reachable from any core point.
    Noise,
    /// Member of the cluster with this id. Ids start at 1.
    Cluster(usize),
}

impl Label {
    /// Whether this label marks noise.
    pub fn is_noise(self) -> bool {
        self == Label::Noise
    }

    /// The cluster id, if any.
    pub fn cluster(self) -> Option<usize> {
        match self {
            Label::Cluster(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Unassigned => f.write_str("unassigned"),
            Label::Noise => f.write_str("noise"),
            Label::Cluster(id) => write!(f, "cluster {id}"),
        }
    }
}

/// Per-point state of a DBSCAN run.
#[derive(Debug)]
pub struct PointRecord<'a, P> {
    raw: &'a P,
    visited: bool,
    core: bool,
    label: Label,
}

impl<P> Clone for PointRecord<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PointRecord<'_, P> {}

impl<'a, P> PointRecord<'a, P> {
    fn new(raw: &'a P) -> Self {
        Self {
            raw,
            visited: false,
            core: false,
            label: Label::Unassigned,
        }
    }

    /// The caller's point.
    pub fn raw(&self) -> &'a P {
        self.raw
    }

    /// Whether the scan has processed this point.
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Whether the point's neighborhood met the density threshold.
    pub fn is_core(&self) -> bool {
        self.core
    }

    /// Cluster assignment.
    pub fn label(&self) -> Label {
        self.label
    }
}

/// DBSCAN parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbscanParams {
    /// Neighborhood radius. Neighbors are strictly closer than this.
    pub epsilon: f32,
    /// Minimum neighborhood size, the point itself included.
    pub min_pts: usize,
}

impl Default for DbscanParams {
    fn default() -> Self {
        Self {
            epsilon: 0.5,
            min_pts: 5,
        }
    }
}

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone)]
pub struct Dbscan<M = Euclidean> {
    params: DbscanParams,
    metric: M,
    interrupt: Interrupt,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer using Euclidean distance.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Points strictly closer than this are neighbors.
    /// * `min_pts` - Minimum neighborhood size (including the point) for a core point.
    ///
    /// # Typical Values
    ///
    /// - `epsilon`: Often determined by k-distance plot (k = min_pts - 1).
    /// - `min_pts`: 2 * dimension is a common heuristic.
    pub fn new(epsilon: f32, min_pts: usize) -> Self {
        Self::from_params(DbscanParams { epsilon, min_pts })
    }

    /// Create a clusterer from a parameter set.
    pub fn from_params(params: DbscanParams) -> Self {
        Self {
            params,
            metric: Euclidean,
            interrupt: Interrupt::default(),
        }
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::from_params(DbscanParams::default())
    }
}

impl<M> Dbscan<M> {
    /// Set epsilon (neighborhood radius).
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.params.epsilon = epsilon;
        self
    }

    /// Set minimum points for core classification.
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.params.min_pts = min_pts;
        self
    }

    /// Replace the distance function.
    pub fn with_metric<N>(self, metric: N) -> Dbscan<N> {
        Dbscan {
            params: self.params,
            metric,
            interrupt: self.interrupt,
        }
    }

    /// Abort a fit with [`Error::DeadlineExceeded`] once it has run this long.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.interrupt.timeout = Some(timeout);
        self
    }

    /// Abort a fit with [`Error::Cancelled`] once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt.cancel = Some(flag);
        self
    }

    /// Current parameters.
    pub fn params(&self) -> DbscanParams {
        self.params
    }

    /// The distance function.
    pub fn metric(&self) -> &M {
        &self.metric
    }

    fn validate_params(&self) -> Result<()> {
        if !(self.params.epsilon.is_finite() && self.params.epsilon > 0.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive and finite",
            });
        }
        if self.params.min_pts == 0 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Run DBSCAN over `data` and return the completed record table.
    ///
    /// # Errors
    ///
    /// Fails on empty input, invalid parameters, inconsistent dimensions,
    /// non-finite coordinates, cancellation, or an expired timeout.
    pub fn fit<'a, P>(&self, data: &'a [P]) -> Result<DbscanFit<'a, P>>
    where
        P: Point,
        M: Metric<P>,
    {
        self.validate_params()?;
        validate_points(data)?;

        let n = data.len();
        let min_pts = self.params.min_pts;
        debug!(
            n_points = n,
            epsilon = self.params.epsilon,
            min_pts,
            "starting DBSCAN scan"
        );

        let armed = self.interrupt.start();
        let mut query = NeighborQuery::new(data, &self.metric, self.params.epsilon);
        let mut records: Vec<PointRecord<'a, P>> = data.iter().map(PointRecord::new).collect();
        // Last cluster id each point was queued for; 0 means never.
        let mut enqueued = vec![0usize; n];
        let mut n_clusters = 0usize;

        for point_idx in 0..n {
            armed.check()?;
            if records[point_idx].visited {
                continue;
            }
            records[point_idx].visited = true;

            let neighbors = query.neighbors(point_idx);
            if neighbors.len() < min_pts {
                // Not dense: noise for now, may become a border point later.
                records[point_idx].label = Label::Noise;
                continue;
            }

            n_clusters += 1;
            records[point_idx].core = true;
            let size = self.expand_cluster(
                &mut query,
                &mut records,
                &mut enqueued,
                point_idx,
                neighbors,
                n_clusters,
                &armed,
            )?;
            trace!(cluster = n_clusters, seed = point_idx, size, "cluster expanded");
        }

        let distance_evaluations = query.evaluations();
        let fit = DbscanFit {
            records,
            cache: query.into_cache(),
            n_clusters,
            distance_evaluations,
        };
        debug!(
            n_clusters,
            n_noise = fit.n_noise(),
            distance_evaluations,
            "DBSCAN scan complete"
        );
        Ok(fit)
    }

    /// Grow cluster `cluster` from the core point `seed`. Returns the number of
    /// points newly labeled with the cluster, the seed included.
    #[allow(clippy::too_many_arguments)]
    fn expand_cluster<P>(
        &self,
        query: &mut NeighborQuery<'_, '_, P, M>,
        records: &mut [PointRecord<'_, P>],
        enqueued: &mut [usize],
        seed: usize,
        neighbors: Vec<usize>,
        cluster: usize,
        armed: &Armed<'_>,
    ) -> Result<usize>
    where
        M: Metric<P>,
    {
        records[seed].label = Label::Cluster(cluster);
        enqueued[seed] = cluster;
        let mut size = 1;

        let mut frontier: VecDeque<usize> = VecDeque::with_capacity(neighbors.len());
        enqueue(&mut frontier, enqueued, neighbors, cluster);

        while let Some(idx) = frontier.pop_front() {
            armed.check()?;

            let record = &mut records[idx];
            if matches!(record.label, Label::Unassigned | Label::Noise) {
                record.label = Label::Cluster(cluster);
                size += 1;
            }
            if record.visited {
                continue;
            }
            record.visited = true;

            let reach = query.neighbors(idx);
            if reach.len() >= self.params.min_pts {
                records[idx].core = true;
                enqueue(&mut frontier, enqueued, reach, cluster);
            }
        }
        Ok(size)
    }
}

/// Push every index not yet queued for `cluster`.
fn enqueue(
    frontier: &mut VecDeque<usize>,
    enqueued: &mut [usize],
    indices: Vec<usize>,
    cluster: usize,
) {
    for idx in indices {
        if enqueued[idx] != cluster {
            enqueued[idx] = cluster;
            frontier.push_back(idx);
        }
    }
}

/// Result of [`Dbscan::fit`]: one record per input point, in input order.
#[derive(Debug, Clone)]
pub struct DbscanFit<'a, P> {
    records: Vec<PointRecord<'a, P>>,
    cache: NeighborCache,
    n_clusters: usize,
    distance_evaluations: usize,
}

impl<'a, P> DbscanFit<'a, P> {
    /// Records in input order.
    pub fn records(&self) -> &[PointRecord<'a, P>] {
        &self.records
    }

    /// Take ownership of the records.
    pub fn into_records(self) -> Vec<PointRecord<'a, P>> {
        self.records
    }

    /// Labels in input order.
    pub fn labels(&self) -> Vec<Label> {
        self.records.iter().map(|r| r.label).collect()
    }

    /// Number of clusters found. Cluster ids are `1..=n_clusters()`.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Number of noise points.
    pub fn n_noise(&self) -> usize {
        self.records.iter().filter(|r| r.label.is_noise()).count()
    }

    /// Indices of noise points, ascending.
    pub fn noise(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.label.is_noise())
            .map(|(i, _)| i)
            .collect()
    }

    /// Member indices per cluster; element `k` holds cluster `k + 1`.
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.n_clusters];
        for (i, r) in self.records.iter().enumerate() {
            if let Label::Cluster(id) = r.label {
                out[id - 1].push(i);
            }
        }
        out
    }

    /// Cached threshold test between points `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    pub fn adjacency(&self, i: usize, j: usize) -> Option<Adjacency> {
        self.cache.get(i, j)
    }

    /// The pairwise cache built during the run.
    pub fn neighbor_cache(&self) -> &NeighborCache {
        &self.cache
    }

    /// Number of times the metric was evaluated.
    pub fn distance_evaluations(&self) -> usize {
        self.distance_evaluations
    }
}

impl<P: Point, M: Metric<P>> Clustering<P> for Dbscan<M> {
    /// Cluster ids start at 1; noise points are labeled [`NOISE`].
    fn fit_predict(&self, data: &[P]) -> Result<Vec<usize>> {
        Ok(self
            .fit(data)?
            .records
            .iter()
            .map(|r| r.label.cluster().unwrap_or(NOISE))
            .collect())
    }

    /// DBSCAN discovers clusters dynamically, so this returns 0.
    ///
    /// To get the actual number of clusters, use [`DbscanFit::n_clusters`].
    fn n_clusters(&self) -> usize {
        0
    }
}

/// Extended DBSCAN interface with noise detection.
pub trait DbscanExt<P> {
    /// Fit and predict, returning labels where noise is marked as `None`.
    fn fit_predict_with_noise(&self, data: &[P]) -> Result<Vec<Option<usize>>>;
}

impl<P: Point, M: Metric<P>> DbscanExt<P> for Dbscan<M> {
    fn fit_predict_with_noise(&self, data: &[P]) -> Result<Vec<Option<usize>>> {
        Ok(self
            .fit(data)?
            .records
            .iter()
            .map(|r| r.label.cluster())
            .collect())
    }
}

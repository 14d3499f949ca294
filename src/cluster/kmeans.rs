//! K-means with k-means++ seeding.
//!
//! Lloyd iterations are exposed step by step through [`KmeansState`], an
//! explicit caller-owned object: [`Kmeans::initialize`] seeds the means,
//! [`KmeansState::step`] runs one iteration, and [`KmeansState::is_converged`]
//! reports whether further steps would change anything. [`Kmeans::fit`] drives
//! the loop to completion for callers that do not need to pace it.
//!
//! # Seeding (Arthur & Vassilvitskii, 2007)
//!
//! The first mean is a uniformly random point. Each further mean is a point drawn
//! with probability proportional to its squared distance from the nearest mean
//! chosen so far.

use rand::prelude::*;
use tracing::{debug, trace};

use super::traits::Clustering;
use super::util::validate_points;
use crate::distance::squared_euclidean;
use crate::error::{Error, Result};

/// K-means clustering configuration.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iter: usize,
    tol: f32,
    seed: Option<u64>,
}

impl Kmeans {
    /// Create a k-means clusterer for `k` clusters.
    ///
    /// Defaults: `max_iter = 100`, `tol = 1e-4`, unseeded.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-4,
            seed: None,
        }
    }

    /// Set the iteration cap used by [`fit`](Self::fit).
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance on the largest mean movement.
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Seed the RNG used for k-means++ seeding.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Seed the means and assign every point to its nearest one.
    ///
    /// # Errors
    ///
    /// Fails on invalid parameters, empty or inconsistent input, or `k` larger
    /// than the number of points.
    pub fn initialize<'a>(&self, data: &'a [Vec<f32>]) -> Result<KmeansState<'a>> {
        self.validate(data)?;

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        let means = plus_plus_seeds(data, self.k, &mut *rng);
        let assignments = data.iter().map(|p| nearest(p, &means).0).collect();

        Ok(KmeansState {
            data,
            means,
            assignments,
            iterations: 0,
            converged: false,
            tol: self.tol,
        })
    }

    /// Run Lloyd iterations until convergence or `max_iter`.
    ///
    /// # Errors
    ///
    /// Same as [`initialize`](Self::initialize).
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        debug!(n_points = data.len(), k = self.k, max_iter = self.max_iter, "starting k-means");
        let mut state = self.initialize(data)?;
        while !state.is_converged() && state.iterations() < self.max_iter {
            state.step();
        }
        let fit = state.into_fit();
        debug!(
            iterations = fit.iterations,
            converged = fit.converged,
            inertia = fit.inertia,
            "k-means complete"
        );
        Ok(fit)
    }

    fn validate(&self, data: &[Vec<f32>]) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be non-negative and finite",
            });
        }
        validate_points(data)?;
        if self.k > data.len() {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: data.len(),
            });
        }
        Ok(())
    }
}

impl Clustering<Vec<f32>> for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

/// In-progress k-means run over borrowed data.
#[derive(Debug, Clone)]
pub struct KmeansState<'a> {
    data: &'a [Vec<f32>],
    means: Vec<Vec<f32>>,
    assignments: Vec<usize>,
    iterations: usize,
    converged: bool,
    tol: f32,
}

impl KmeansState<'_> {
    /// Run one Lloyd iteration: recompute each mean from its members, then
    /// reassign every point to its nearest mean.
    ///
    /// Returns `true` once the run has converged. Stepping a converged state is
    /// a no-op.
    pub fn step(&mut self) -> bool {
        if self.converged {
            return true;
        }

        let d = self.means[0].len();
        let mut sums = vec![vec![0.0f32; d]; self.means.len()];
        let mut counts = vec![0usize; self.means.len()];
        for (point, &c) in self.data.iter().zip(&self.assignments) {
            counts[c] += 1;
            for (s, x) in sums[c].iter_mut().zip(point) {
                *s += x;
            }
        }

        let mut max_shift = 0.0f32;
        for ((mean, sum), &count) in self.means.iter_mut().zip(sums).zip(&counts) {
            // An empty cluster keeps its previous mean.
            if count == 0 {
                continue;
            }
            let updated: Vec<f32> = sum.into_iter().map(|s| s / count as f32).collect();
            max_shift = max_shift.max(squared_euclidean(mean.as_slice(), updated.as_slice()).sqrt());
            *mean = updated;
        }

        let mut changed = 0usize;
        for (point, assignment) in self.data.iter().zip(self.assignments.iter_mut()) {
            let (best, _) = nearest(point, &self.means);
            if best != *assignment {
                *assignment = best;
                changed += 1;
            }
        }

        self.iterations += 1;
        self.converged = changed == 0 || max_shift <= self.tol;
        trace!(iteration = self.iterations, changed, max_shift, "k-means step");
        self.converged
    }

    /// Whether the last step moved no assignment, or no mean by more than the tolerance.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Current means, one per cluster.
    pub fn means(&self) -> &[Vec<f32>] {
        &self.means
    }

    /// Current cluster index (`0..k`) of every point.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Number of completed steps.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Sum of squared distances from each point to its assigned mean.
    pub fn inertia(&self) -> f32 {
        self.data
            .iter()
            .zip(&self.assignments)
            .map(|(p, &c)| squared_euclidean(p, &self.means[c]))
            .sum()
    }

    /// Finish the run.
    pub fn into_fit(self) -> KmeansFit {
        let inertia = self.inertia();
        KmeansFit {
            centroids: self.means,
            labels: self.assignments,
            iterations: self.iterations,
            inertia,
            converged: self.converged,
        }
    }
}

/// Result of a k-means run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KmeansFit {
    /// Final means.
    pub centroids: Vec<Vec<f32>>,
    /// Cluster index (`0..k`) of every point.
    pub labels: Vec<usize>,
    /// Steps performed.
    pub iterations: usize,
    /// Sum of squared distances to the assigned centroid.
    pub inertia: f32,
    /// Whether the run converged before the iteration cap.
    pub converged: bool,
}

/// Index of and squared distance to the closest mean. Ties go to the lower index.
fn nearest(point: &[f32], means: &[Vec<f32>]) -> (usize, f32) {
    let mut best = (0, f32::INFINITY);
    for (i, mean) in means.iter().enumerate() {
        let d = squared_euclidean(point, mean.as_slice());
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn plus_plus_seeds(data: &[Vec<f32>], k: usize, rng: &mut dyn RngCore) -> Vec<Vec<f32>> {
    let n = data.len();
    let mut means: Vec<Vec<f32>> = Vec::with_capacity(k);
    means.push(data[rng.random_range(0..n)].clone());

    let mut d2: Vec<f32> = data
        .iter()
        .map(|p| squared_euclidean(p.as_slice(), means[0].as_slice()))
        .collect();

    while means.len() < k {
        let total: f32 = d2.iter().sum();
        let idx = if total > 0.0 {
            let target = rng.random::<f32>() * total;
            let mut acc = 0.0f32;
            // Fall back to the last positive weight if rounding leaves `target` unreached.
            let mut pick = d2.iter().rposition(|&w| w > 0.0).unwrap_or(0);
            for (i, &w) in d2.iter().enumerate() {
                acc += w;
                if w > 0.0 && acc >= target {
                    pick = i;
                    break;
                }
            }
            pick
        } else {
            // Every point coincides with a chosen mean.
            rng.random_range(0..n)
        };

        let chosen = data[idx].clone();
        for (w, p) in d2.iter_mut().zip(data) {
            *w = w.min(squared_euclidean(p.as_slice(), chosen.as_slice()));
        }
        means.push(chosen);
    }
    means
}

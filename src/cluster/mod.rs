//! Clustering algorithms for grouping similar items.
//!
//! ## Algorithms
//!
//! ### DBSCAN
//!
//! Density-based clustering that can discover non-convex clusters and identify
//! outliers (noise points). DBSCAN does not require specifying the number of
//! clusters in advance.
//!
//! A run produces a [`DbscanFit`]: one [`PointRecord`] per input point (visited
//! flag, core flag, [`Label`]) plus the [`NeighborCache`] of pairwise threshold
//! tests built along the way. Every unordered pair of points is compared at most
//! once.
//!
//! ### K-means
//!
//! The classic algorithm: assign each point to the nearest centroid, then
//! update centroids to the mean of their points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**:
//! - Clusters are roughly spherical
//! - Clusters have similar sizes
//! - You know k in advance
//!
//! Runs can be driven step by step through [`KmeansState`].
//!
//! ## Usage
//!
//! ```rust
//! use dbclust::cluster::{Clustering, Dbscan, Kmeans, Label};
//!
//! let data: Vec<Vec<f32>> = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//!     vec![50.0, 50.0],
//! ];
//!
//! // Density-based clustering with DBSCAN
//! let fit = Dbscan::new(0.5, 2).fit(&data).unwrap();
//! assert_eq!(fit.n_clusters(), 2);
//! assert_eq!(fit.records()[0].label(), Label::Cluster(1));
//! assert_eq!(fit.records()[4].label(), Label::Noise);
//!
//! // Hard clustering with K-means
//! let labels = Kmeans::new(3).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);  // First two together
//! assert_ne!(labels[0], labels[4]);  // Separate from the outlier
//! ```

mod dbscan;
mod interrupt;
mod kmeans;
mod neighbors;
mod traits;
mod util;

pub use dbscan::{Dbscan, DbscanExt, DbscanFit, DbscanParams, Label, PointRecord, NOISE};
pub use kmeans::{Kmeans, KmeansFit, KmeansState};
pub use neighbors::{Adjacency, NeighborCache};
pub use traits::Clustering;

//! Density-based clustering.
//!
//! `dbclust` groups points that are reachable from one another through chains of
//! close neighbors and labels the rest as noise (DBSCAN). Neighbor tests are
//! cached per unordered pair, so each pairwise distance is computed at most once
//! per run.
//!
//! The primary public API is under [`cluster`], which provides:
//! - DBSCAN (density clustering with noise labeling and per-point records)
//! - k-means (k-means++ seeding, steppable Lloyd iterations)
//!
//! Distances are pluggable through [`distance::Metric`]; points may be dense
//! vectors or maps from dimension name to value.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod distance;
pub mod error;

pub use cluster::{
    Adjacency, Clustering, Dbscan, DbscanExt, DbscanFit, DbscanParams, Kmeans, KmeansFit,
    KmeansState, Label, NeighborCache, PointRecord, NOISE,
};
pub use distance::{metric_fn, Euclidean, Manhattan, Metric, Point};
pub use error::{Error, Result};

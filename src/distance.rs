//! Distance functions and the point representations they understand.
//!
//! Clustering in this crate is written against two small traits:
//!
//! - [`Point`]: access to the numeric coordinates of a point, paired with the
//!   coordinates of another point of the same schema. Dense points pair by
//!   position; named-dimension points (`BTreeMap<String, f32>`,
//!   `HashMap<String, f32>`) pair by dimension name.
//! - [`Metric`]: a dissimilarity score between two points. [`Euclidean`] is the
//!   default; [`Manhattan`] and arbitrary closures (via [`metric_fn`]) can be
//!   swapped in without touching the clustering code.
//!
//! Metrics do not validate their inputs. Pairing two named-dimension points with
//! different dimension sets silently skips the dimensions the second point lacks.
//! The clustering entry points validate schemas before any distance is computed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A point with numeric coordinates.
pub trait Point {
    /// Number of dimensions.
    fn dim(&self) -> usize;

    /// Call `f(a, b)` for every dimension of `self` that `other` also has.
    fn zip_coords<F: FnMut(f32, f32)>(&self, other: &Self, f: F);

    /// Whether `self` and `other` have the same set of dimensions.
    fn same_dimensions(&self, other: &Self) -> bool {
        self.dim() == other.dim()
    }

    /// Whether every coordinate is finite.
    fn is_finite(&self) -> bool;
}

impl Point for [f32] {
    fn dim(&self) -> usize {
        self.len()
    }

    fn zip_coords<F: FnMut(f32, f32)>(&self, other: &Self, mut f: F) {
        for (a, b) in self.iter().zip(other.iter()) {
            f(*a, *b);
        }
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }
}

impl Point for Vec<f32> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn zip_coords<F: FnMut(f32, f32)>(&self, other: &Self, f: F) {
        self.as_slice().zip_coords(other.as_slice(), f);
    }

    fn is_finite(&self) -> bool {
        self.as_slice().is_finite()
    }
}

impl<const N: usize> Point for [f32; N] {
    fn dim(&self) -> usize {
        N
    }

    fn zip_coords<F: FnMut(f32, f32)>(&self, other: &Self, f: F) {
        self.as_slice().zip_coords(other.as_slice(), f);
    }

    fn is_finite(&self) -> bool {
        self.as_slice().is_finite()
    }
}

impl Point for BTreeMap<String, f32> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn zip_coords<F: FnMut(f32, f32)>(&self, other: &Self, mut f: F) {
        for (name, a) in self {
            if let Some(b) = other.get(name) {
                f(*a, *b);
            }
        }
    }

    fn same_dimensions(&self, other: &Self) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains_key(k))
    }

    fn is_finite(&self) -> bool {
        self.values().all(|x| x.is_finite())
    }
}

impl<S: std::hash::BuildHasher> Point for HashMap<String, f32, S> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn zip_coords<F: FnMut(f32, f32)>(&self, other: &Self, mut f: F) {
        for (name, a) in self {
            if let Some(b) = other.get(name) {
                f(*a, *b);
            }
        }
    }

    fn same_dimensions(&self, other: &Self) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains_key(k))
    }

    fn is_finite(&self) -> bool {
        self.values().all(|x| x.is_finite())
    }
}

/// A dissimilarity score between two points.
///
/// Implementations must be symmetric (`d(a, b) == d(b, a)`): the neighbor cache
/// stores one result per unordered pair.
pub trait Metric<P: ?Sized> {
    /// Distance between `a` and `b`.
    fn distance(&self, a: &P, b: &P) -> f32;
}

/// Squared Euclidean distance.
#[inline]
pub fn squared_euclidean<P: Point + ?Sized>(a: &P, b: &P) -> f32 {
    let mut sum = 0.0f32;
    a.zip_coords(b, |x, y| {
        let d = x - y;
        sum += d * d;
    });
    sum
}

/// Euclidean (L2) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl<P: Point + ?Sized> Metric<P> for Euclidean {
    #[inline]
    fn distance(&self, a: &P, b: &P) -> f32 {
        squared_euclidean(a, b).sqrt()
    }
}

/// Manhattan (L1) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

impl<P: Point + ?Sized> Metric<P> for Manhattan {
    fn distance(&self, a: &P, b: &P) -> f32 {
        let mut sum = 0.0f32;
        a.zip_coords(b, |x, y| sum += (x - y).abs());
        sum
    }
}

/// A [`Metric`] backed by a closure. Build one with [`metric_fn`].
#[derive(Clone, Copy)]
pub struct FnMetric<F>(F);

impl<F> fmt::Debug for FnMetric<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnMetric")
    }
}

impl<P: ?Sized, F: Fn(&P, &P) -> f32> Metric<P> for FnMetric<F> {
    fn distance(&self, a: &P, b: &P) -> f32 {
        (self.0)(a, b)
    }
}

/// Wrap a closure as a [`Metric`].
///
/// ```rust
/// use dbclust::distance::{metric_fn, Metric};
///
/// let chebyshev = metric_fn(|a: &Vec<f32>, b: &Vec<f32>| {
///     a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
/// });
/// assert_eq!(chebyshev.distance(&vec![0.0f32, 0.0], &vec![3.0, 1.0]), 3.0);
/// ```
pub fn metric_fn<P: ?Sized, F: Fn(&P, &P) -> f32>(f: F) -> FnMetric<F> {
    FnMetric(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(pairs: &[(&str, f32)]) -> BTreeMap<String, f32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_euclidean_dense() {
        let d = Euclidean.distance(&vec![0.0f32, 0.0], &vec![3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-6);
        assert_eq!(Euclidean.distance(&[1.0f32, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_euclidean_named_dimensions_pair_by_name() {
        let a = named(&[("x", 0.0), ("y", 0.0)]);
        let b = named(&[("y", 4.0), ("x", 3.0)]);
        assert!((Euclidean.distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_named_dimensions_partial_on_mismatch() {
        // Only "x" is shared; "z" is silently ignored.
        let a = named(&[("x", 0.0), ("y", 1.0)]);
        let b = named(&[("x", 2.0), ("z", 9.0)]);
        assert!((Euclidean.distance(&a, &b) - 2.0).abs() < 1e-6);
        assert!(!a.same_dimensions(&b));
    }

    #[test]
    fn test_hashmap_points() {
        let a: HashMap<String, f32> = [("lat".to_string(), 1.0), ("lon".to_string(), 1.0)].into();
        let b: HashMap<String, f32> = [("lon".to_string(), 2.0), ("lat".to_string(), 1.0)].into();
        assert!(a.same_dimensions(&b));
        assert!((Euclidean.distance(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Manhattan.distance(&[0.0f32, 0.0], &[1.0, -2.0]), 3.0);
    }

    #[test]
    fn test_symmetry() {
        let a: Vec<f32> = vec![0.3, -1.2, 4.0];
        let b: Vec<f32> = vec![2.0, 0.5, -1.0];
        assert_eq!(Euclidean.distance(&a, &b), Euclidean.distance(&b, &a));
        assert_eq!(Manhattan.distance(&a, &b), Manhattan.distance(&b, &a));
    }

    #[test]
    fn test_is_finite() {
        assert!(vec![1.0f32, 2.0].is_finite());
        assert!(!vec![1.0f32, f32::NAN].is_finite());
        assert!(!named(&[("x", f32::INFINITY)]).is_finite());
    }
}

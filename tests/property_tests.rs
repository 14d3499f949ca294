use std::collections::BTreeSet;

use dbclust::cluster::{Adjacency, Clustering, Dbscan, Kmeans, Label};
use proptest::prelude::*;

fn dataset() -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..40)
}

proptest! {
    #[test]
    fn prop_kmeans_all_assigned(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..20),
        k in 1usize..5
    ) {
        // Skip if k > n
        if k <= data.len() {
            let model = Kmeans::new(k).with_seed(42);
            let labels = model.fit_predict(&data).unwrap();

            prop_assert_eq!(labels.len(), data.len());
            for &l in &labels {
                prop_assert!(l < k);
            }
        }
    }

    #[test]
    fn prop_dbscan_labels_are_contiguous(
        data in dataset(),
        eps in 0.1f32..4.0,
        min_pts in 1usize..6
    ) {
        let fit = Dbscan::new(eps, min_pts).fit(&data).unwrap();

        let mut ids = BTreeSet::new();
        for record in fit.records() {
            prop_assert!(record.is_visited());
            match record.label() {
                Label::Cluster(id) => { ids.insert(id); }
                Label::Noise => prop_assert!(!record.is_core()),
                Label::Unassigned => prop_assert!(false, "unassigned label after fit"),
            }
        }
        let expected: BTreeSet<usize> = (1..=fit.n_clusters()).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn prop_dbscan_cache_symmetric_and_each_pair_once(
        data in dataset(),
        eps in 0.1f32..4.0,
        min_pts in 1usize..6
    ) {
        let n = data.len();
        let fit = Dbscan::new(eps, min_pts).fit(&data).unwrap();

        prop_assert!(fit.distance_evaluations() <= n * (n - 1) / 2);
        for i in 0..n {
            prop_assert_eq!(fit.adjacency(i, i), Some(Adjacency::Within));
            for j in 0..i {
                prop_assert_eq!(fit.adjacency(i, j), fit.adjacency(j, i));
            }
        }
    }

    #[test]
    fn prop_dbscan_is_deterministic(
        data in dataset(),
        eps in 0.1f32..4.0,
        min_pts in 1usize..6
    ) {
        let dbscan = Dbscan::new(eps, min_pts);
        prop_assert_eq!(dbscan.fit(&data).unwrap().labels(), dbscan.fit(&data).unwrap().labels());
    }

    #[test]
    fn prop_larger_eps_never_adds_noise(
        data in dataset(),
        eps in 0.1f32..3.0,
        grow in 0.0f32..2.0,
        min_pts in 1usize..6
    ) {
        let tight = Dbscan::new(eps, min_pts).fit(&data).unwrap();
        let loose = Dbscan::new(eps + grow, min_pts).fit(&data).unwrap();
        prop_assert!(loose.n_noise() <= tight.n_noise());
    }

    #[test]
    fn prop_min_pts_one_has_no_noise(data in dataset(), eps in 0.1f32..4.0) {
        let fit = Dbscan::new(eps, 1).fit(&data).unwrap();
        prop_assert_eq!(fit.n_noise(), 0);
        prop_assert!(fit.records().iter().all(|r| r.is_core()));
    }
}

//! Seeded k-means clustering and silhouette scoring.
//!
//! Backs the class-overlap and label-noise calculators. Initialization is
//! k-means++ and every source of randomness flows from the caller's seed, so
//! repeated runs assign identical clusters.

// Statistical computation requires casts
#![allow(clippy::cast_precision_loss)]

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::stats::{euclidean_distance, squared_distance};

/// Seeded k-means with a fixed number of restarts.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    max_iter: usize,
    n_init: usize,
    seed: u64,
}

impl KMeans {
    /// Create a clusterer for `k` clusters.
    #[must_use]
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k: k.max(1),
            max_iter: 300,
            n_init: 10,
            seed,
        }
    }

    /// Override the iteration cap per restart.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Override the number of restarts.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Cluster assignment per row, keeping the restart with lowest inertia.
    ///
    /// Returns `None` when there are fewer rows than clusters.
    #[must_use]
    pub fn fit(&self, rows: &[Vec<f64>]) -> Option<Vec<usize>> {
        if rows.len() < self.k || rows.is_empty() {
            return None;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<(f64, Vec<usize>)> = None;

        for _ in 0..self.n_init {
            let (inertia, labels) = self.run_once(rows, &mut rng);
            let improved = best.as_ref().map_or(true, |(b, _)| inertia < *b);
            if improved {
                best = Some((inertia, labels));
            }
        }

        best.map(|(_, labels)| labels)
    }

    fn run_once(&self, rows: &[Vec<f64>], rng: &mut StdRng) -> (f64, Vec<usize>) {
        let mut centroids = plus_plus_init(rows, self.k, rng);
        let mut labels = vec![0usize; rows.len()];

        for _ in 0..self.max_iter {
            let mut changed = false;
            for (i, row) in rows.iter().enumerate() {
                let nearest = nearest_centroid(row, &centroids);
                if labels[i] != nearest {
                    labels[i] = nearest;
                    changed = true;
                }
            }

            let dim = rows[0].len();
            for (c, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<&Vec<f64>> = rows
                    .iter()
                    .zip(labels.iter())
                    .filter(|(_, &l)| l == c)
                    .map(|(r, _)| r)
                    .collect();
                if members.is_empty() {
                    continue;
                }
                for d in 0..dim {
                    centroid[d] =
                        members.iter().map(|m| m[d]).sum::<f64>() / members.len() as f64;
                }
            }

            if !changed {
                break;
            }
        }

        let inertia = rows
            .iter()
            .zip(labels.iter())
            .map(|(row, &l)| squared_distance(row, &centroids[l]))
            .sum();
        (inertia, labels)
    }
}

fn nearest_centroid(row: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(row, centroid);
        if d < best_dist {
            best_dist = d;
            best = c;
        }
    }
    best
}

/// k-means++ seeding: each next centroid is drawn proportionally to squared
/// distance from the nearest existing one.
fn plus_plus_init(rows: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(rows[rng.gen_range(0..rows.len())].clone());

    while centroids.len() < k {
        let dists: Vec<f64> = rows
            .iter()
            .map(|row| {
                centroids
                    .iter()
                    .map(|c| squared_distance(row, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = dists.iter().sum();
        if total <= 0.0 {
            // All points coincide with existing centroids
            centroids.push(rows[rng.gen_range(0..rows.len())].clone());
            continue;
        }
        let mut target = rng.gen_range(0.0..total);
        let mut chosen = rows.len() - 1;
        for (i, d) in dists.iter().enumerate() {
            if target < *d {
                chosen = i;
                break;
            }
            target -= d;
        }
        centroids.push(rows[chosen].clone());
    }

    centroids
}

/// Mean silhouette coefficient over all rows, in [-1, 1].
///
/// Returns `None` when there are fewer than two distinct labels or any
/// cluster is a singleton-free degenerate case (all rows in one cluster).
#[must_use]
pub fn silhouette_score(rows: &[Vec<f64>], labels: &[usize]) -> Option<f64> {
    if rows.len() != labels.len() || rows.len() < 2 {
        return None;
    }

    let mut clusters: Vec<usize> = labels.to_vec();
    clusters.sort_unstable();
    clusters.dedup();
    if clusters.len() < 2 {
        return None;
    }

    let mut total = 0.0;
    for (i, row) in rows.iter().enumerate() {
        let own = labels[i];
        let own_size = labels.iter().filter(|&&l| l == own).count();
        if own_size <= 1 {
            // Singleton rows contribute zero by convention
            continue;
        }

        let mut intra = 0.0;
        let mut best_inter = f64::INFINITY;
        for &other in &clusters {
            let dists: Vec<f64> = rows
                .iter()
                .zip(labels.iter())
                .enumerate()
                .filter(|(j, (_, &l))| l == other && *j != i)
                .map(|(_, (r, _))| euclidean_distance(row, r))
                .collect();
            if dists.is_empty() {
                continue;
            }
            let mean_dist = dists.iter().sum::<f64>() / dists.len() as f64;
            if other == own {
                intra = mean_dist;
            } else if mean_dist < best_inter {
                best_inter = mean_dist;
            }
        }

        let denom = intra.max(best_inter);
        if denom > 0.0 {
            total += (best_inter - intra) / denom;
        }
    }

    Some(total / rows.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = f64::from(i) * 0.01;
            rows.push(vec![0.0 + jitter, 0.0 - jitter]);
            labels.push(0);
            rows.push(vec![10.0 - jitter, 10.0 + jitter]);
            labels.push(1);
        }
        (rows, labels)
    }

    #[test]
    fn test_kmeans_separates_blobs() {
        let (rows, truth) = two_blobs();
        let labels = KMeans::new(2, 42).fit(&rows).unwrap();

        // Cluster numbering is arbitrary; check co-membership matches truth
        for i in 0..rows.len() {
            for j in 0..rows.len() {
                assert_eq!(labels[i] == labels[j], truth[i] == truth[j]);
            }
        }
    }

    #[test]
    fn test_kmeans_deterministic_for_seed() {
        let (rows, _) = two_blobs();
        let a = KMeans::new(2, 5).fit(&rows);
        let b = KMeans::new(2, 5).fit(&rows);
        assert_eq!(a, b);
    }

    #[test]
    fn test_kmeans_rejects_too_few_rows() {
        assert!(KMeans::new(3, 1).fit(&[vec![1.0], vec![2.0]]).is_none());
        assert!(KMeans::new(1, 1).fit(&[]).is_none());
    }

    #[test]
    fn test_silhouette_high_for_separated_blobs() {
        let (rows, truth) = two_blobs();
        let score = silhouette_score(&rows, &truth).unwrap();
        assert!(score > 0.9, "score was {}", score);
    }

    #[test]
    fn test_silhouette_low_for_shuffled_labels() {
        let (rows, truth) = two_blobs();
        // Alternate the labels so each "cluster" straddles both blobs
        let bad: Vec<usize> = truth.iter().enumerate().map(|(i, _)| i % 2).collect();
        let good = silhouette_score(&rows, &truth).unwrap();
        let poor = silhouette_score(&rows, &bad).unwrap();
        assert!(poor < good);
    }

    #[test]
    fn test_silhouette_single_cluster_is_none() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0]];
        assert!(silhouette_score(&rows, &[0, 0, 0]).is_none());
    }
}

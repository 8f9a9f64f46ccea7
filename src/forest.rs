//! Isolation-forest anomaly detection.
//!
//! Random recursive partitioning over a subsample; points that isolate in
//! fewer splits get anomaly scores closer to 1. Backs the outlier-rate and
//! anomaly-count calculators.

// Statistical computation requires casts and float literals
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Seeded isolation forest.
///
/// # Example
///
/// ```
/// use aferir::forest::IsolationForest;
///
/// let rows = vec![vec![0.0, 0.1], vec![0.1, 0.0], vec![9.0, 9.0]];
/// let forest = IsolationForest::new(42);
/// let scores = forest.scores(&rows);
/// assert_eq!(scores.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct IsolationForest {
    num_trees: usize,
    max_samples: usize,
    seed: u64,
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl IsolationForest {
    /// Create a forest with the default ensemble size (100 trees, 256-point
    /// subsamples).
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            num_trees: 100,
            max_samples: 256,
            seed,
        }
    }

    /// Override the number of trees.
    #[must_use]
    pub fn with_num_trees(mut self, num_trees: usize) -> Self {
        self.num_trees = num_trees.max(1);
        self
    }

    /// Override the subsample size per tree.
    #[must_use]
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples.max(2);
        self
    }

    /// Anomaly score per row, each in (0, 1); higher is more anomalous.
    #[must_use]
    pub fn scores(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        let n = rows.len();
        if n < 2 {
            return vec![0.5; n];
        }

        let sample_size = self.max_samples.min(n);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut trees = Vec::with_capacity(self.num_trees);
        let mut indices: Vec<usize> = (0..n).collect();
        for _ in 0..self.num_trees {
            indices.shuffle(&mut rng);
            let sample: Vec<&Vec<f64>> = indices[..sample_size].iter().map(|&i| &rows[i]).collect();
            trees.push(build_tree(&sample, 0, height_limit, &mut rng));
        }

        let normalizer = average_path_length(sample_size);
        rows.iter()
            .map(|row| {
                let mean_path: f64 = trees.iter().map(|t| path_length(t, row, 0)).sum::<f64>()
                    / trees.len() as f64;
                2.0_f64.powf(-mean_path / normalizer)
            })
            .collect()
    }

    /// Flag rows under the auto threshold: anomaly score above 0.5.
    #[must_use]
    pub fn flag_auto(&self, rows: &[Vec<f64>]) -> Vec<bool> {
        self.scores(rows).into_iter().map(|s| s > 0.5).collect()
    }

    /// Flag the top `contamination` fraction of rows by anomaly score.
    #[must_use]
    pub fn flag_contamination(&self, rows: &[Vec<f64>], contamination: f64) -> Vec<bool> {
        let scores = self.scores(rows);
        let n = scores.len();
        let k = ((n as f64) * contamination.clamp(0.0, 0.5)).floor() as usize;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut flags = vec![false; n];
        for &idx in &order[..k] {
            flags[idx] = true;
        }
        flags
    }
}

/// Expected path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 1.0,
        2 => 1.0,
        _ => {
            let nf = n as f64;
            let harmonic = (nf - 1.0).ln() + 0.577_215_664_901_532_9;
            2.0 * harmonic - 2.0 * (nf - 1.0) / nf
        }
    }
}

fn build_tree(sample: &[&Vec<f64>], depth: usize, limit: usize, rng: &mut StdRng) -> Node {
    if sample.len() <= 1 || depth >= limit {
        return Node::Leaf { size: sample.len() };
    }

    let num_features = sample[0].len();
    // Only features with spread can split the sample further
    let splittable: Vec<usize> = (0..num_features)
        .filter(|&f| {
            let (min, max) = feature_bounds(sample, f);
            max > min
        })
        .collect();

    let Some(&feature) = splittable.as_slice().choose(rng) else {
        return Node::Leaf { size: sample.len() };
    };

    let (min, max) = feature_bounds(sample, feature);
    let threshold = rng.gen_range(min..max);

    let (left, right): (Vec<&Vec<f64>>, Vec<&Vec<f64>>) =
        sample.iter().partition(|row| row[feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(&left, depth + 1, limit, rng)),
        right: Box::new(build_tree(&right, depth + 1, limit, rng)),
    }
}

fn feature_bounds(sample: &[&Vec<f64>], feature: usize) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in sample {
        let v = row[feature];
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min, max)
}

fn path_length(node: &Node, row: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}

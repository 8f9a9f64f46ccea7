//! Binned mutual information between a numeric feature and a label column.
//!
//! Features are discretized into quantile bins before the joint histogram is
//! built. Only the relative ordering of scores matters downstream (the
//! importance-consistency calculator compares ranks), so the estimator stays
//! deliberately simple.

// Statistical computation requires casts
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::collections::HashMap;

/// Maximum number of quantile bins per feature.
const MAX_BINS: usize = 10;

/// Discretize values into at most `MAX_BINS` quantile bins.
///
/// Duplicate quantile edges collapse, so heavily tied data yields fewer
/// bins. Every value gets a bin; the result is empty only for empty input.
#[must_use]
pub fn quantile_bins(values: &[f64]) -> Vec<usize> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let bins = MAX_BINS.min(values.len());
    let mut edges = Vec::with_capacity(bins.saturating_sub(1));
    for b in 1..bins {
        let q = b as f64 / bins as f64;
        let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
        edges.push(sorted[idx]);
    }
    edges.dedup_by(|a, b| a == b);

    values
        .iter()
        .map(|v| edges.iter().filter(|&&e| *v > e).count())
        .collect()
}

/// Mutual information in bits between a binned feature and integer labels.
///
/// Returns 0.0 for empty or mismatched inputs.
#[must_use]
pub fn binned_mutual_information(feature: &[f64], labels: &[usize]) -> f64 {
    if feature.is_empty() || feature.len() != labels.len() {
        return 0.0;
    }

    let bins = quantile_bins(feature);
    let n = bins.len() as f64;

    let mut joint: HashMap<(usize, usize), usize> = HashMap::new();
    let mut by_bin: HashMap<usize, usize> = HashMap::new();
    let mut by_label: HashMap<usize, usize> = HashMap::new();
    for (&b, &l) in bins.iter().zip(labels.iter()) {
        *joint.entry((b, l)).or_insert(0) += 1;
        *by_bin.entry(b).or_insert(0) += 1;
        *by_label.entry(l).or_insert(0) += 1;
    }

    let mut mi = 0.0;
    for (&(b, l), &count) in &joint {
        let p_joint = count as f64 / n;
        let p_bin = by_bin[&b] as f64 / n;
        let p_label = by_label[&l] as f64 / n;
        mi += p_joint * (p_joint / (p_bin * p_label)).log2();
    }

    mi.max(0.0)
}

//! The twenty quality-indicator calculators.
//!
//! Each calculator is a free function over a [`Table`] returning
//! `Option<f64>`: `Some` with the metric value (already shaped per the
//! metric contract), or `None` when the metric is inapplicable to the
//! table. The engine substitutes a seeded fallback for every `None`.
//!
//! Calculators that need a clock take `today` as an argument; the ones that
//! need randomness take a seed and build their own RNG, so a single
//! engine-level seed reproduces every value.

// Statistical computation requires casts
#![allow(clippy::cast_precision_loss)]

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::NaiveDate;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use regex::Regex;

use crate::classify::{parse_date, ColumnKinds};
use crate::cluster::{silhouette_score, KMeans};
use crate::forest::IsolationForest;
use crate::metric::round2;
use crate::mutual_info::{binned_mutual_information, quantile_bins};
use crate::stats;
use crate::table::Table;

/// Column-name fragments expected to hold non-negative values.
const POSITIVE_PATTERNS: [&str; 8] = [
    "age", "price", "cost", "income", "salary", "count", "amount", "quantity",
];

/// Column-name fragments with hard value ranges.
const RANGE_CHECKS: [(&str, f64, f64); 4] = [
    ("age", 0.0, 120.0),
    ("percent", 0.0, 100.0),
    ("probability", 0.0, 1.0),
    ("score", 0.0, 100.0),
];

#[allow(clippy::expect_used)]
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{8,15}$").expect("phone pattern"));

/// Percentage of null cells over all cells, two decimals.
#[must_use]
pub fn missing_values_pct(table: &Table) -> Option<f64> {
    let cells = table.num_rows() * table.num_columns();
    if cells == 0 {
        return None;
    }
    let missing: usize = table
        .column_names()
        .iter()
        .map(|name| table.null_count(name))
        .sum();
    Some(round2(missing as f64 / cells as f64 * 100.0))
}

/// Count of rows identical to an earlier row. Nulls compare equal.
#[must_use]
pub fn duplicate_records_count(table: &Table) -> Option<f64> {
    if table.is_empty() || table.num_columns() == 0 {
        return None;
    }

    let columns: Vec<Vec<Option<String>>> = table
        .column_names()
        .iter()
        .map(|name| table.string_values(name))
        .collect::<Option<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    for row in 0..table.num_rows() {
        let key: Vec<&str> = columns
            .iter()
            .map(|col| col[row].as_deref().unwrap_or("\u{0}"))
            .collect();
        if !seen.insert(key.join("\u{1f}")) {
            duplicates += 1;
        }
    }

    Some(duplicates as f64)
}

/// Fraction of rows flagged as outliers.
///
/// With two or more fully populated numeric columns this runs the isolation
/// forest with the auto threshold; otherwise it falls back to a per-column
/// z-score test (|z| > 3) over all numeric values.
#[must_use]
pub fn outlier_rate(table: &Table, numeric: &[String], seed: u64) -> Option<f64> {
    if numeric.is_empty() || table.is_empty() {
        return None;
    }

    let valid: Vec<&String> = numeric
        .iter()
        .filter(|name| table.null_count(name) == 0)
        .collect();

    if valid.len() >= 2 {
        let rows = numeric_matrix(table, &valid)?;
        let flagged = IsolationForest::new(seed)
            .flag_auto(&rows)
            .iter()
            .filter(|&&f| f)
            .count();
        return Some(round2(flagged as f64 / table.num_rows() as f64));
    }

    let mut outliers = 0usize;
    let mut total = 0usize;
    for name in numeric {
        let values: Vec<f64> = table.numeric_values(name)?.into_iter().flatten().collect();
        total += values.len();
        if let Some(std) = stats::population_std(&values) {
            if std > 0.0 {
                let m = stats::mean(&values)?;
                outliers += values.iter().filter(|v| ((*v - m) / std).abs() > 3.0).count();
            }
        }
    }

    if total == 0 {
        return None;
    }
    Some(round2(outliers as f64 / total as f64))
}

/// Violation rate over pattern-matched positivity and range checks.
///
/// A column whose name matches several patterns is checked once per
/// pattern, so its cells count toward the denominator multiple times.
#[must_use]
pub fn inconsistency_rate(table: &Table) -> Option<f64> {
    let mut violations = 0usize;
    let mut checks = 0usize;

    for pattern in POSITIVE_PATTERNS {
        for name in table.column_names() {
            if name.to_lowercase().contains(pattern) && table.is_numeric_column(&name) {
                if let Some(values) = table.numeric_values(&name) {
                    let present: Vec<f64> = values.into_iter().flatten().collect();
                    checks += present.len();
                    violations += present.iter().filter(|v| **v < 0.0).count();
                }
            }
        }
    }

    for (pattern, min, max) in RANGE_CHECKS {
        for name in table.column_names() {
            if name.to_lowercase().contains(pattern) && table.is_numeric_column(&name) {
                if let Some(values) = table.numeric_values(&name) {
                    let present: Vec<f64> = values.into_iter().flatten().collect();
                    checks += present.len();
                    violations += present.iter().filter(|v| **v < min || **v > max).count();
                }
            }
        }
    }

    if checks == 0 {
        return None;
    }
    Some(round2(violations as f64 / checks as f64))
}

/// Rate of cells defeating their column's expected type.
///
/// Numeric columns count nulls as mismatches (a hole where a number should
/// be); temporal columns count non-null cells that fail date parsing.
/// Columns that are entirely null are skipped; so are plain categorical
/// columns, which have no expected shape.
#[must_use]
pub fn data_type_mismatch_rate(table: &Table, kinds: &ColumnKinds) -> Option<f64> {
    let rows = table.num_rows();
    let mut mismatches = 0usize;
    let mut total = 0usize;

    for name in &kinds.numeric {
        let nulls = table.null_count(name);
        if nulls == rows {
            continue;
        }
        mismatches += nulls;
        total += rows;
    }

    for name in &kinds.temporal {
        if table.null_count(name) == rows {
            continue;
        }
        if let Some(values) = table.string_values(name) {
            mismatches += values
                .iter()
                .flatten()
                .filter(|v| parse_date(v).is_none())
                .count();
        }
        total += rows;
    }

    if total == 0 {
        return None;
    }
    Some(round2(mismatches as f64 / total as f64))
}

/// Proportion of missing cells that are true nulls rather than empty
/// strings.
#[must_use]
pub fn null_vs_nan_distribution(table: &Table) -> Option<f64> {
    let nulls: usize = table
        .column_names()
        .iter()
        .map(|name| table.null_count(name))
        .sum();

    let mut empties = 0usize;
    for name in table.column_names() {
        if table.is_string_column(&name) {
            if let Some(values) = table.string_values(&name) {
                empties += values.iter().flatten().filter(|v| v.is_empty()).count();
            }
        }
    }

    let denom = nulls + empties;
    if denom == 0 {
        return None;
    }
    Some(round2(nulls as f64 / denom as f64))
}

/// Mean distinct-value count over categorical columns, truncated.
#[must_use]
pub fn cardinality_categorical(table: &Table, categorical: &[String]) -> Option<f64> {
    if categorical.is_empty() {
        return None;
    }

    let cardinalities: Vec<f64> = categorical
        .iter()
        .map(|name| distinct_non_null(table, name) as f64)
        .collect();
    stats::mean(&cardinalities).map(f64::trunc)
}

/// Balance of the target column, 1.0 = perfectly balanced.
///
/// One class is trivially balanced; two classes score twice the minority
/// ratio; more classes score normalized Shannon entropy.
#[must_use]
pub fn target_imbalance(table: &Table, target: Option<&str>) -> Option<f64> {
    let target = target?;
    let values = table.string_values(target)?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return None;
    }
    if counts.len() == 1 {
        return Some(1.0);
    }

    let total: usize = counts.values().sum();
    if counts.len() == 2 {
        let minority = counts.values().min().copied().unwrap_or(0);
        return Some(round2(2.0 * minority as f64 / total as f64));
    }

    let class_counts: Vec<usize> = counts.values().copied().collect();
    let entropy = stats::entropy_bits(&class_counts);
    let max_entropy = (counts.len() as f64).log2();
    Some(round2(entropy / max_entropy))
}

/// Mean absolute pairwise Pearson correlation between numeric columns,
/// pairwise-complete rows per pair.
#[must_use]
pub fn feature_correlation_mean(table: &Table, numeric: &[String]) -> Option<f64> {
    if numeric.len() < 2 {
        return None;
    }

    let columns: Vec<Vec<Option<f64>>> = numeric
        .iter()
        .map(|name| table.numeric_values(name))
        .collect::<Option<Vec<_>>>()?;

    let mut correlations = Vec::new();
    for i in 0..columns.len() {
        for j in (i + 1)..columns.len() {
            let mut x = Vec::new();
            let mut y = Vec::new();
            for (a, b) in columns[i].iter().zip(columns[j].iter()) {
                if let (Some(a), Some(b)) = (a, b) {
                    x.push(*a);
                    y.push(*b);
                }
            }
            if let Some(r) = stats::pearson(&x, &y) {
                correlations.push(r.abs());
            }
        }
    }

    stats::mean(&correlations).map(round2)
}

/// Fraction of numeric values outside their column's 3-sigma band.
#[must_use]
pub fn range_violation_rate(table: &Table, numeric: &[String]) -> Option<f64> {
    if numeric.is_empty() {
        return None;
    }

    let mut violations = 0usize;
    let mut total = 0usize;
    for name in numeric {
        let values: Vec<f64> = table.numeric_values(name)?.into_iter().flatten().collect();
        total += values.len();

        let Some(m) = stats::mean(&values) else {
            continue;
        };
        let Some(var) = stats::sample_variance(&values) else {
            continue;
        };
        let std = var.sqrt();
        let lower = m - 3.0 * std;
        let upper = m + 3.0 * std;
        violations += values.iter().filter(|v| **v < lower || **v > upper).count();
    }

    if total == 0 {
        return None;
    }
    Some(round2(violations as f64 / total as f64))
}

/// Mean relative gap between mean and median over numeric columns.
#[must_use]
pub fn mean_median_drift(table: &Table, numeric: &[String]) -> Option<f64> {
    if numeric.is_empty() {
        return None;
    }

    let mut drifts = Vec::new();
    for name in numeric {
        let values: Vec<f64> = table.numeric_values(name)?.into_iter().flatten().collect();
        let (Some(m), Some(med)) = (stats::mean(&values), stats::median(&values)) else {
            continue;
        };
        let drift = if med == 0.0 {
            (m - med).abs() / m.abs().max(1.0)
        } else {
            (m - med).abs() / med.abs()
        };
        drifts.push(drift);
    }

    stats::mean(&drifts).map(round2)
}

/// Silhouette-based class separation over numeric features, rescaled from
/// [-1, 1] to [0, 1].
///
/// Needs a target, at least two numeric feature columns, ten complete rows,
/// and two classes with two or more members each.
#[must_use]
pub fn class_overlap_score(table: &Table, numeric: &[String], target: Option<&str>) -> Option<f64> {
    let target = target?;
    table.column_index(target)?;

    let features = features_excluding(numeric, target);
    if features.len() < 2 {
        return None;
    }

    let (rows, labels) = complete_rows_with_labels(table, &features, target)?;
    if rows.len() < 10 {
        return None;
    }

    let classes = encode_labels(&labels);
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &c in &classes {
        *counts.entry(c).or_insert(0) += 1;
    }
    if counts.len() < 2 || counts.values().any(|&c| c < 2) {
        return None;
    }

    let score = silhouette_score(&rows, &classes)?;
    Some(round2((score + 1.0) / 2.0))
}

/// Mean days since the most recent date, per temporal column.
#[must_use]
pub fn data_freshness(table: &Table, temporal: &[String], today: NaiveDate) -> Option<f64> {
    if temporal.is_empty() {
        return None;
    }

    let mut freshness = Vec::new();
    for name in temporal {
        let Some(values) = table.string_values(name) else {
            continue;
        };
        let most_recent = values.iter().flatten().filter_map(|v| parse_date(v)).max();
        if let Some(latest) = most_recent {
            let days = (today - latest).num_days();
            freshness.push(days.max(0) as f64);
        }
    }

    stats::mean(&freshness).map(round2)
}

/// Rank stability of mutual-information feature importances across a
/// seeded half/half split, rescaled to [0, 1].
#[must_use]
pub fn feature_importance_consistency(
    table: &Table,
    numeric: &[String],
    target: Option<&str>,
    seed: u64,
) -> Option<f64> {
    let target = target?;
    table.column_index(target)?;

    let features = features_excluding(numeric, target);
    if features.len() < 2 {
        return None;
    }

    let (rows, labels) = complete_rows_with_labels(table, &features, target)?;
    if rows.len() < 20 {
        return None;
    }

    let mut order: Vec<usize> = (0..rows.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    let split = order.len() / 2;

    let importances = |indices: &[usize]| -> Vec<f64> {
        let half_rows: Vec<&Vec<f64>> = indices.iter().map(|&i| &rows[i]).collect();
        let half_labels: Vec<&String> = indices.iter().map(|&i| &labels[i]).collect();
        let targets = target_labels(table, target, &half_labels);
        (0..features.len())
            .map(|f| {
                let column: Vec<f64> = half_rows.iter().map(|r| r[f]).collect();
                binned_mutual_information(&column, &targets)
            })
            .collect()
    };

    let first = importances(&order[..split]);
    let second = importances(&order[split..]);

    let r = stats::spearman(
        &stats::average_ranks(&first),
        &stats::average_ranks(&second),
    )?;
    if !r.is_finite() {
        return None;
    }
    Some(round2((r + 1.0) / 2.0))
}

/// Count of rows flagged by the 5%-contamination isolation forest over
/// fully populated numeric columns.
#[must_use]
pub fn anomaly_count(table: &Table, numeric: &[String], seed: u64) -> Option<f64> {
    if numeric.len() < 2 {
        return None;
    }

    let valid: Vec<&String> = numeric
        .iter()
        .filter(|name| table.null_count(name) == 0)
        .collect();
    if valid.len() < 2 || table.is_empty() {
        return None;
    }

    let rows = numeric_matrix(table, &valid)?;
    let flagged = IsolationForest::new(seed)
        .flag_contamination(&rows, 0.05)
        .iter()
        .filter(|&&f| f)
        .count();
    Some(flagged as f64)
}

/// Mean share of categories needed to reach 80% cumulative frequency,
/// per categorical column.
#[must_use]
pub fn encoding_coverage_rate(table: &Table, categorical: &[String]) -> Option<f64> {
    if categorical.is_empty() {
        return None;
    }

    let mut coverages = Vec::new();
    for name in categorical {
        let Some(values) = table.string_values(name) else {
            continue;
        };
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }
        let distinct = counts.len();
        if distinct == 0 {
            continue;
        }

        let total: usize = counts.values().sum();
        let mut frequencies: Vec<(usize, &str)> =
            counts.into_iter().map(|(v, c)| (c, v)).collect();
        // Descending by count, value breaks ties for determinism
        frequencies.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(b.1)));

        let mut cumulative = 0.0;
        let mut covered = 0usize;
        for (count, _) in frequencies {
            cumulative += count as f64 / total as f64;
            if cumulative <= 0.8 {
                covered += 1;
            }
        }
        coverages.push(covered as f64 / distinct as f64);
    }

    stats::mean(&coverages).map(round2)
}

/// Fraction of numeric columns whose variance is negligible relative to
/// their squared mean.
///
/// The relative threshold degenerates at a zero mean, so a zero-mean
/// column is flagged only when its variance is itself effectively zero.
#[must_use]
pub fn variance_threshold_check(table: &Table, numeric: &[String]) -> Option<f64> {
    if numeric.is_empty() {
        return None;
    }

    let mut low_variance = 0usize;
    for name in numeric {
        let values: Vec<f64> = table.numeric_values(name)?.into_iter().flatten().collect();
        let (Some(m), Some(var)) = (stats::mean(&values), stats::sample_variance(&values)) else {
            continue;
        };
        let low = if m.abs() < 1e-12 {
            var < 1e-12
        } else {
            var < 0.01 * m * m
        };
        if low {
            low_variance += 1;
        }
    }

    Some(round2(low_variance as f64 / numeric.len() as f64))
}

/// Overall non-missing density of the table, combining per-row and
/// per-column completeness.
#[must_use]
pub fn data_density_completeness(table: &Table) -> Option<f64> {
    let cells = table.num_rows() * table.num_columns();
    if cells == 0 {
        return None;
    }

    let nulls: usize = table
        .column_names()
        .iter()
        .map(|name| table.null_count(name))
        .sum();
    // Mean row completeness and mean column completeness coincide with the
    // overall non-null fraction, so their average does too
    Some(round2(1.0 - nulls as f64 / cells as f64))
}

/// Cluster-disagreement estimate of mislabeled rows.
///
/// Clusters complete numeric feature rows with k = number of classes and
/// reports the fraction outside its cluster's dominant class.
#[must_use]
pub fn label_noise_rate(
    table: &Table,
    kinds: &ColumnKinds,
    target: Option<&str>,
    seed: u64,
) -> Option<f64> {
    let target = target?;
    table.column_index(target)?;

    // Classification only: a high-cardinality numeric target is regression
    if table.is_numeric_column(target) && distinct_non_null(table, target) > 10 {
        return None;
    }

    let features = features_excluding(&kinds.numeric, target);
    if features.len() < 2 {
        return None;
    }

    // Rows are dropped for a missing label; a missing feature is a hard stop
    let label_values = table.string_values(target)?;
    let columns: Vec<Vec<Option<f64>>> = features
        .iter()
        .map(|name| table.numeric_values(name))
        .collect::<Option<Vec<_>>>()?;

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for (i, label) in label_values.iter().enumerate() {
        let Some(label) = label else {
            continue;
        };
        let mut row = Vec::with_capacity(features.len());
        for column in &columns {
            row.push(column[i]?);
        }
        rows.push(row);
        labels.push(label.clone());
    }

    if rows.len() < 20 {
        return None;
    }

    let classes = encode_labels(&labels);
    let k = classes.iter().collect::<HashSet<_>>().len();
    let clusters = KMeans::new(k, seed).fit(&rows)?;

    let mut contingency: HashMap<(usize, usize), usize> = HashMap::new();
    for (&cluster, &class) in clusters.iter().zip(classes.iter()) {
        *contingency.entry((cluster, class)).or_insert(0) += 1;
    }

    let mut dominant: HashMap<usize, usize> = HashMap::new();
    for (&(cluster, _), &count) in &contingency {
        let entry = dominant.entry(cluster).or_insert(0);
        if count > *entry {
            *entry = count;
        }
    }

    let agreement: usize = dominant.values().sum();
    Some(round2(1.0 - agreement as f64 / rows.len() as f64))
}

/// Violation rate over named domain rules: ages, percentages, rates,
/// future dates, email and phone shapes.
#[must_use]
pub fn domain_constraint_violations(
    table: &Table,
    kinds: &ColumnKinds,
    today: NaiveDate,
) -> Option<f64> {
    let mut violations = 0usize;
    let mut checks = 0usize;

    let numeric_rules: [(&str, f64, f64); 3] = [
        ("age", 0.0, 120.0),
        ("percent", 0.0, 100.0),
        ("rate", 0.0, 1.0),
    ];
    for (pattern, min, max) in numeric_rules {
        for name in table.column_names() {
            if name.to_lowercase().contains(pattern) && table.is_numeric_column(&name) {
                if let Some(values) = table.numeric_values(&name) {
                    let present: Vec<f64> = values.into_iter().flatten().collect();
                    checks += present.len();
                    violations += present.iter().filter(|v| **v < min || **v > max).count();
                }
            }
        }
    }

    for name in &kinds.temporal {
        if !name.to_lowercase().contains("date") {
            continue;
        }
        if let Some(values) = table.string_values(name) {
            let dates: Vec<NaiveDate> =
                values.iter().flatten().filter_map(|v| parse_date(v)).collect();
            checks += dates.len();
            violations += dates.iter().filter(|d| **d > today).count();
        }
    }

    for (pattern, is_violation) in [
        ("email", check_email as fn(&str) -> bool),
        ("phone", check_phone as fn(&str) -> bool),
    ] {
        for name in table.column_names() {
            if name.to_lowercase().contains(pattern) && table.is_string_column(&name) {
                if let Some(values) = table.string_values(&name) {
                    let present: Vec<&String> = values.iter().flatten().collect();
                    checks += present.len();
                    violations += present.iter().filter(|v| is_violation(v)).count();
                }
            }
        }
    }

    if checks == 0 {
        return None;
    }
    Some(round2(violations as f64 / checks as f64))
}

fn check_email(value: &str) -> bool {
    !value.contains('@')
}

fn check_phone(value: &str) -> bool {
    !PHONE_RE.is_match(value)
}

/// Distinct non-null values of a column via its string rendering.
fn distinct_non_null(table: &Table, name: &str) -> usize {
    table.string_values(name).map_or(0, |values| {
        values.into_iter().flatten().collect::<HashSet<_>>().len()
    })
}

fn features_excluding(numeric: &[String], target: &str) -> Vec<String> {
    numeric.iter().filter(|n| *n != target).cloned().collect()
}

/// Matrix of the given numeric columns; `None` if any column has no
/// numeric view or any cell is null.
fn numeric_matrix(table: &Table, cols: &[&String]) -> Option<Vec<Vec<f64>>> {
    let columns: Vec<Vec<Option<f64>>> = cols
        .iter()
        .map(|name| table.numeric_values(name))
        .collect::<Option<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(table.num_rows());
    for i in 0..table.num_rows() {
        let mut row = Vec::with_capacity(cols.len());
        for column in &columns {
            row.push(column[i]?);
        }
        rows.push(row);
    }
    Some(rows)
}

/// Rows complete across the features and the target, paired with the
/// target's string rendering per kept row.
fn complete_rows_with_labels(
    table: &Table,
    features: &[String],
    target: &str,
) -> Option<(Vec<Vec<f64>>, Vec<String>)> {
    let columns: Vec<Vec<Option<f64>>> = features
        .iter()
        .map(|name| table.numeric_values(name))
        .collect::<Option<Vec<_>>>()?;
    let label_values = table.string_values(target)?;

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    'rows: for (i, label) in label_values.iter().enumerate() {
        let Some(label) = label else {
            continue;
        };
        let mut row = Vec::with_capacity(features.len());
        for column in &columns {
            let Some(v) = column[i] else {
                continue 'rows;
            };
            row.push(v);
        }
        rows.push(row);
        labels.push(label.clone());
    }

    Some((rows, labels))
}

/// Encode string labels as dense class indices in first-seen order.
fn encode_labels(labels: &[String]) -> Vec<usize> {
    let mut lookup: HashMap<&str, usize> = HashMap::new();
    labels
        .iter()
        .map(|l| {
            let next = lookup.len();
            *lookup.entry(l.as_str()).or_insert(next)
        })
        .collect()
}

/// Discrete targets per row for importance scoring: classes when the
/// target looks categorical (10 or fewer distinct values or non-numeric),
/// quantile bins of the numeric values otherwise.
fn target_labels(table: &Table, target: &str, labels: &[&String]) -> Vec<usize> {
    let categorical =
        !table.is_numeric_column(target) || distinct_non_null(table, target) < 10;
    if categorical {
        let owned: Vec<String> = labels.iter().map(|l| (*l).clone()).collect();
        encode_labels(&owned)
    } else {
        let numeric: Vec<f64> = labels
            .iter()
            .map(|l| l.parse::<f64>().unwrap_or(f64::NAN))
            .collect();
        quantile_bins(&numeric)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Float64Array, Int64Array, RecordBatch, StringArray},
        datatypes::{DataType, Field, Schema},
    };

    use crate::classify::classify;

    use super::*;

    fn table_of(fields: Vec<Field>, columns: Vec<Arc<dyn arrow::array::Array>>) -> Table {
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema, columns).expect("batch");
        Table::from_batch(batch).expect("table")
    }

    fn float_col(values: Vec<Option<f64>>) -> Arc<dyn arrow::array::Array> {
        Arc::new(Float64Array::from(values))
    }

    #[test]
    fn test_missing_values_pct() {
        let table = table_of(
            vec![
                Field::new("a", DataType::Float64, true),
                Field::new("b", DataType::Float64, true),
            ],
            vec![
                float_col(vec![Some(1.0), None, Some(3.0), Some(4.0)]),
                float_col(vec![Some(1.0), Some(2.0), None, None]),
            ],
        );
        // 3 nulls over 8 cells
        assert_eq!(missing_values_pct(&table), Some(37.5));
    }

    #[test]
    fn test_missing_values_pct_empty_table() {
        assert!(missing_values_pct(&Table::empty()).is_none());
    }

    #[test]
    fn test_duplicate_records_count() {
        let table = table_of(
            vec![
                Field::new("x", DataType::Int64, true),
                Field::new("y", DataType::Utf8, true),
            ],
            vec![
                Arc::new(Int64Array::from(vec![Some(1), Some(1), Some(2), None, None])),
                Arc::new(StringArray::from(vec![
                    Some("a"),
                    Some("a"),
                    Some("a"),
                    None,
                    None,
                ])),
            ],
        );
        // Row 1 repeats row 0; row 4 repeats row 3 (nulls compare equal)
        assert_eq!(duplicate_records_count(&table), Some(2.0));
    }

    #[test]
    fn test_outlier_rate_zscore_path() {
        // One numeric column forces the z-score fallback; a constant column
        // has zero std so nothing is flagged
        let table = table_of(
            vec![Field::new("v", DataType::Float64, true)],
            vec![float_col(vec![Some(5.0); 30])],
        );
        assert_eq!(outlier_rate(&table, &["v".into()], 42), Some(0.0));
    }

    #[test]
    fn test_outlier_rate_none_without_numeric() {
        let table = table_of(
            vec![Field::new("c", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(vec!["a", "b"]))],
        );
        assert!(outlier_rate(&table, &[], 42).is_none());
    }

    #[test]
    fn test_inconsistency_rate_counts_pattern_hits() {
        let table = table_of(
            vec![Field::new("age", DataType::Float64, true)],
            vec![float_col(vec![Some(30.0), Some(-5.0), Some(200.0), Some(45.0)])],
        );
        // "age" hits both the positivity check and the 0-120 range check:
        // 8 checks, -5 violates both, 200 violates the range -> 3/8
        assert_eq!(inconsistency_rate(&table), Some(0.38));
    }

    #[test]
    fn test_inconsistency_rate_none_without_patterns() {
        let table = table_of(
            vec![Field::new("metric", DataType::Float64, true)],
            vec![float_col(vec![Some(-1.0)])],
        );
        assert!(inconsistency_rate(&table).is_none());
    }

    #[test]
    fn test_data_type_mismatch_counts_numeric_nulls() {
        let table = table_of(
            vec![Field::new("v", DataType::Float64, true)],
            vec![float_col(vec![Some(1.0), None, Some(3.0), Some(4.0)])],
        );
        let kinds = classify(&table);
        assert_eq!(data_type_mismatch_rate(&table, &kinds), Some(0.25));
    }

    #[test]
    fn test_data_type_mismatch_skips_all_null_columns() {
        let table = table_of(
            vec![Field::new("v", DataType::Float64, true)],
            vec![float_col(vec![None, None])],
        );
        let kinds = classify(&table);
        assert!(data_type_mismatch_rate(&table, &kinds).is_none());
    }

    #[test]
    fn test_null_vs_nan_distribution() {
        let table = table_of(
            vec![
                Field::new("n", DataType::Float64, true),
                Field::new("s", DataType::Utf8, true),
            ],
            vec![
                float_col(vec![Some(1.0), None, None]),
                Arc::new(StringArray::from(vec![Some(""), Some("x"), Some("")])),
            ],
        );
        // 2 nulls, 2 empty strings
        assert_eq!(null_vs_nan_distribution(&table), Some(0.5));
    }

    #[test]
    fn test_null_vs_nan_none_when_clean() {
        let table = table_of(
            vec![Field::new("n", DataType::Float64, true)],
            vec![float_col(vec![Some(1.0), Some(2.0)])],
        );
        assert!(null_vs_nan_distribution(&table).is_none());
    }

    #[test]
    fn test_cardinality_truncates_mean() {
        let table = table_of(
            vec![
                Field::new("a", DataType::Utf8, true),
                Field::new("b", DataType::Utf8, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["x", "y", "z", "x"])),
                Arc::new(StringArray::from(vec!["p", "q", "p", "q"])),
            ],
        );
        // (3 + 2) / 2 = 2.5, truncated to 2
        assert_eq!(
            cardinality_categorical(&table, &["a".into(), "b".into()]),
            Some(2.0)
        );
    }

    #[test]
    fn test_target_imbalance_binary() {
        let values: Vec<&str> = std::iter::repeat("yes")
            .take(70)
            .chain(std::iter::repeat("no").take(30))
            .collect();
        let table = table_of(
            vec![Field::new("label", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(values))],
        );
        assert_eq!(target_imbalance(&table, Some("label")), Some(0.6));
    }

    #[test]
    fn test_target_imbalance_single_class() {
        let table = table_of(
            vec![Field::new("label", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(vec!["only"; 5]))],
        );
        assert_eq!(target_imbalance(&table, Some("label")), Some(1.0));
    }

    #[test]
    fn test_target_imbalance_multiclass_entropy() {
        let values: Vec<&str> = ["a", "b", "c", "d"]
            .iter()
            .flat_map(|v| std::iter::repeat(*v).take(25))
            .collect();
        let table = table_of(
            vec![Field::new("label", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(values))],
        );
        // Uniform four-way split has maximal entropy
        assert_eq!(target_imbalance(&table, Some("label")), Some(1.0));
    }

    #[test]
    fn test_target_imbalance_without_target() {
        let table = table_of(
            vec![Field::new("x", DataType::Float64, true)],
            vec![float_col(vec![Some(1.0)])],
        );
        assert!(target_imbalance(&table, None).is_none());
        assert!(target_imbalance(&table, Some("absent")).is_none());
    }

    #[test]
    fn test_feature_correlation_perfect() {
        let x: Vec<Option<f64>> = (0..20).map(|i| Some(f64::from(i))).collect();
        let y: Vec<Option<f64>> = (0..20).map(|i| Some(f64::from(i) * -2.0)).collect();
        let table = table_of(
            vec![
                Field::new("x", DataType::Float64, true),
                Field::new("y", DataType::Float64, true),
            ],
            vec![float_col(x), float_col(y)],
        );
        assert_eq!(
            feature_correlation_mean(&table, &["x".into(), "y".into()]),
            Some(1.0)
        );
    }

    #[test]
    fn test_range_violation_detects_extreme_value() {
        let mut values: Vec<Option<f64>> = (0..99).map(|i| Some(f64::from(i % 10))).collect();
        values.push(Some(1000.0));
        let table = table_of(
            vec![Field::new("v", DataType::Float64, true)],
            vec![float_col(values)],
        );
        assert_eq!(range_violation_rate(&table, &["v".into()]), Some(0.01));
    }

    #[test]
    fn test_mean_median_drift_symmetric_is_zero() {
        let table = table_of(
            vec![Field::new("v", DataType::Float64, true)],
            vec![float_col(vec![Some(1.0), Some(2.0), Some(3.0)])],
        );
        assert_eq!(mean_median_drift(&table, &["v".into()]), Some(0.0));
    }

    fn labeled_blobs(rows_per_class: usize) -> Table {
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut label = Vec::new();
        for i in 0..rows_per_class {
            let jitter = i as f64 * 0.01;
            x.push(Some(jitter));
            y.push(Some(-jitter));
            label.push(Some("low"));
            x.push(Some(10.0 + jitter));
            y.push(Some(10.0 - jitter));
            label.push(Some("high"));
        }
        table_of(
            vec![
                Field::new("x", DataType::Float64, true),
                Field::new("y", DataType::Float64, true),
                Field::new("label", DataType::Utf8, true),
            ],
            vec![
                float_col(x),
                float_col(y),
                Arc::new(StringArray::from(label)),
            ],
        )
    }

    #[test]
    fn test_class_overlap_separated_classes() {
        let table = labeled_blobs(15);
        let numeric = vec!["x".to_string(), "y".to_string()];
        let score = class_overlap_score(&table, &numeric, Some("label")).unwrap();
        assert!(score > 0.9, "score was {}", score);
    }

    #[test]
    fn test_class_overlap_needs_enough_rows() {
        let table = labeled_blobs(3);
        let numeric = vec!["x".to_string(), "y".to_string()];
        assert!(class_overlap_score(&table, &numeric, Some("label")).is_none());
    }

    #[test]
    fn test_data_freshness_days_since_latest() {
        let table = table_of(
            vec![Field::new("event_date", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(vec![
                "2024-01-01",
                "2024-03-01",
                "2023-12-25",
            ]))],
        );
        let today = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(
            data_freshness(&table, &["event_date".into()], today),
            Some(10.0)
        );
    }

    #[test]
    fn test_data_freshness_future_dates_clamp_to_zero() {
        let table = table_of(
            vec![Field::new("d", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(vec!["2030-01-01"]))],
        );
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(data_freshness(&table, &["d".into()], today), Some(0.0));
    }

    #[test]
    fn test_feature_importance_consistency_stable_signal() {
        // x determines the label, z is noise; both halves should rank them
        // the same way
        let n = 200;
        let mut x = Vec::new();
        let mut z = Vec::new();
        let mut label = Vec::new();
        for i in 0..n {
            x.push(Some(f64::from(i)));
            z.push(Some(f64::from(i * 37 % 11)));
            label.push(Some(if i < n / 2 { "a" } else { "b" }));
        }
        let table = table_of(
            vec![
                Field::new("x", DataType::Float64, true),
                Field::new("z", DataType::Float64, true),
                Field::new("label", DataType::Utf8, true),
            ],
            vec![
                float_col(x),
                float_col(z),
                Arc::new(StringArray::from(label)),
            ],
        );
        let numeric = vec!["x".to_string(), "z".to_string()];
        let score = feature_importance_consistency(&table, &numeric, Some("label"), 42).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_anomaly_count_flags_five_percent() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..100 {
            let t = f64::from(i) * 0.1;
            x.push(Some(t.sin()));
            y.push(Some(t.cos()));
        }
        let table = table_of(
            vec![
                Field::new("x", DataType::Float64, true),
                Field::new("y", DataType::Float64, true),
            ],
            vec![float_col(x), float_col(y)],
        );
        let numeric = vec!["x".to_string(), "y".to_string()];
        assert_eq!(anomaly_count(&table, &numeric, 42), Some(5.0));
    }

    #[test]
    fn test_anomaly_count_needs_two_clean_columns() {
        let table = table_of(
            vec![
                Field::new("x", DataType::Float64, true),
                Field::new("y", DataType::Float64, true),
            ],
            vec![
                float_col(vec![Some(1.0), Some(2.0)]),
                float_col(vec![Some(1.0), None]),
            ],
        );
        let numeric = vec!["x".to_string(), "y".to_string()];
        assert!(anomaly_count(&table, &numeric, 42).is_none());
    }

    #[test]
    fn test_encoding_coverage_skewed_column() {
        // "a" covers 80% alone; only it sits within the cumulative cutoff
        let values: Vec<&str> = std::iter::repeat("a")
            .take(8)
            .chain(["b", "c"])
            .collect();
        let table = table_of(
            vec![Field::new("cat", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(values))],
        );
        assert_eq!(encoding_coverage_rate(&table, &["cat".into()]), Some(0.33));
    }

    #[test]
    fn test_variance_threshold_flags_constant_column() {
        let table = table_of(
            vec![
                Field::new("constant", DataType::Float64, true),
                Field::new("spread", DataType::Float64, true),
            ],
            vec![
                float_col(vec![Some(5.0); 50]),
                float_col((0..50).map(|i| Some(f64::from(i))).collect()),
            ],
        );
        let numeric = vec!["constant".to_string(), "spread".to_string()];
        assert_eq!(variance_threshold_check(&table, &numeric), Some(0.5));
    }

    #[test]
    fn test_data_density_completeness() {
        let table = table_of(
            vec![
                Field::new("a", DataType::Float64, true),
                Field::new("b", DataType::Float64, true),
            ],
            vec![
                float_col(vec![Some(1.0), None, Some(3.0), Some(4.0)]),
                float_col(vec![Some(1.0), Some(2.0), Some(3.0), None]),
            ],
        );
        // 6 of 8 cells populated
        assert_eq!(data_density_completeness(&table), Some(0.75));
    }

    #[test]
    fn test_label_noise_clean_labels() {
        let table = labeled_blobs(15);
        let kinds = classify(&table);
        let rate = label_noise_rate(&table, &kinds, Some("label"), 42).unwrap();
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_label_noise_rejects_regression_target() {
        let n = 30;
        let cols: Vec<Option<f64>> = (0..n).map(|i| Some(f64::from(i) * 1.5)).collect();
        let table = table_of(
            vec![
                Field::new("x", DataType::Float64, true),
                Field::new("y", DataType::Float64, true),
                Field::new("t", DataType::Float64, true),
            ],
            vec![float_col(cols.clone()), float_col(cols.clone()), float_col(cols)],
        );
        let kinds = classify(&table);
        assert!(label_noise_rate(&table, &kinds, Some("t"), 42).is_none());
    }

    #[test]
    fn test_domain_constraints_email_and_age() {
        let table = table_of(
            vec![
                Field::new("age", DataType::Float64, true),
                Field::new("email", DataType::Utf8, true),
            ],
            vec![
                float_col(vec![Some(30.0), Some(150.0)]),
                Arc::new(StringArray::from(vec!["a@b.com", "not-an-email"])),
            ],
        );
        let kinds = classify(&table);
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // 4 checks, 2 violations
        assert_eq!(
            domain_constraint_violations(&table, &kinds, today),
            Some(0.5)
        );
    }

    #[test]
    fn test_domain_constraints_future_dates() {
        let table = table_of(
            vec![Field::new("ship_date", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(vec![
                "2023-06-01",
                "2030-01-01",
            ]))],
        );
        let kinds = classify(&table);
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            domain_constraint_violations(&table, &kinds, today),
            Some(0.5)
        );
    }

    #[test]
    fn test_domain_constraints_none_without_matches() {
        let table = table_of(
            vec![Field::new("widget", DataType::Float64, true)],
            vec![float_col(vec![Some(1.0)])],
        );
        let kinds = classify(&table);
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(domain_constraint_violations(&table, &kinds, today).is_none());
    }
}

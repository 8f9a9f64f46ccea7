//! Weighted aggregation of the indicators into a single 0-100 score.

use std::collections::BTreeMap;

use crate::metric::Metric;

/// Normalize one indicator value to [0, 1] where 1 is best.
///
/// Each indicator has its own direction and saturation point: rates
/// saturate at a domain-specific ceiling, freshness at a year, counts at
/// one hundred. The null-vs-empty split is worst at 0.5 (an even mix) and
/// best at either extreme.
#[must_use]
pub fn normalize(metric: Metric, value: f64) -> f64 {
    match metric {
        Metric::MissingValuesPct => 1.0 - (value / 100.0).min(1.0),
        Metric::DuplicateRecordsCount | Metric::AnomalyCount => 1.0 - (value / 100.0).min(1.0),
        Metric::OutlierRate
        | Metric::InconsistencyRate
        | Metric::RangeViolationRate
        | Metric::DomainConstraintViolations => 1.0 - (value / 0.2).min(1.0),
        Metric::DataTypeMismatchRate => 1.0 - (value / 0.1).min(1.0),
        Metric::NullVsNanDistribution => 1.0 - 2.0 * (0.5 - value).abs(),
        Metric::CardinalityCategorical => (value / 50.0).min(1.0),
        Metric::FeatureCorrelationMean
        | Metric::VarianceThresholdCheck
        | Metric::LabelNoiseRate => 1.0 - value,
        Metric::MeanMedianDrift => 1.0 - (value / 0.5).min(1.0),
        Metric::DataFreshness => 1.0 - (value / 365.0).min(1.0),
        Metric::TargetImbalance
        | Metric::ClassOverlapScore
        | Metric::FeatureImportanceConsistency
        | Metric::EncodingCoverageRate
        | Metric::DataDensityCompleteness
        | Metric::DataQualityScore => value,
    }
}

/// Weighted aggregate score over the 20 indicators, rounded to an integer
/// in [0, 100].
///
/// Returns `None` when any indicator is absent or non-finite; the engine
/// then substitutes a fallback score rather than aggregating a partial
/// set.
#[must_use]
pub fn aggregate(indicators: &BTreeMap<Metric, f64>) -> Option<f64> {
    let mut weighted = 0.0;
    for metric in Metric::INDICATORS {
        let value = indicators.get(&metric)?;
        if !value.is_finite() {
            return None;
        }
        weighted += normalize(metric, *value) * metric.weight();
    }
    Some((weighted * 100.0).round())
}

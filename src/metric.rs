//! Metric identifiers and their static configuration.
//!
//! Every indicator the engine produces is a [`Metric`] variant; the
//! canonical name, fallback range, aggregation weight, and output shape all
//! hang off the enum so there is a single dispatch point and no string-keyed
//! lookups.

use std::fmt;

/// The fixed battery of quality indicators, plus the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    /// Percentage of missing cells across the whole table.
    MissingValuesPct,
    /// Count of exact-duplicate rows.
    DuplicateRecordsCount,
    /// Fraction of rows flagged anomalous by density-based detection.
    OutlierRate,
    /// Violations of positivity/range expectations on pattern-matched columns.
    InconsistencyRate,
    /// Fraction of cells whose rendered value defeats their storage type.
    DataTypeMismatchRate,
    /// Proportion of missing cells that are true nulls vs empty strings.
    NullVsNanDistribution,
    /// Mean distinct-value count across categorical columns.
    CardinalityCategorical,
    /// Balance of the designated target column (1.0 = perfectly balanced).
    TargetImbalance,
    /// Mean absolute pairwise Pearson correlation between numeric columns.
    FeatureCorrelationMean,
    /// Fraction of numeric values outside the 3-sigma band.
    RangeViolationRate,
    /// Mean relative gap between column mean and median.
    MeanMedianDrift,
    /// Silhouette-based class separation, rescaled to [0,1].
    ClassOverlapScore,
    /// Mean days since the most recent date per temporal column.
    DataFreshness,
    /// Rank stability of mutual-information feature importances.
    FeatureImportanceConsistency,
    /// Count of rows flagged by the 5%-contamination detector.
    AnomalyCount,
    /// Share of categories needed to cover 80% cumulative frequency.
    EncodingCoverageRate,
    /// Fraction of numeric columns that are near-constant.
    VarianceThresholdCheck,
    /// Combined row-wise and column-wise non-missing density.
    DataDensityCompleteness,
    /// Cluster-disagreement estimate of mislabeled rows.
    LabelNoiseRate,
    /// Violations of named domain rules (age, percent, email, ...).
    DomainConstraintViolations,
    /// Weighted aggregate of all indicators, 0-100.
    DataQualityScore,
}

/// Output shape of a metric value, used by the fallback generator and the
/// engine's rounding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Integer count, truncated.
    Count,
    /// Integer score, rounded to nearest.
    Score,
    /// Rate or proportion, rounded to 2 decimals.
    TwoDecimal,
}

impl Metric {
    /// The 20 indicators in computation order, excluding the aggregate score.
    pub const INDICATORS: [Metric; 20] = [
        Metric::MissingValuesPct,
        Metric::DuplicateRecordsCount,
        Metric::OutlierRate,
        Metric::InconsistencyRate,
        Metric::DataTypeMismatchRate,
        Metric::NullVsNanDistribution,
        Metric::CardinalityCategorical,
        Metric::TargetImbalance,
        Metric::FeatureCorrelationMean,
        Metric::RangeViolationRate,
        Metric::MeanMedianDrift,
        Metric::ClassOverlapScore,
        Metric::DataFreshness,
        Metric::FeatureImportanceConsistency,
        Metric::AnomalyCount,
        Metric::EncodingCoverageRate,
        Metric::VarianceThresholdCheck,
        Metric::DataDensityCompleteness,
        Metric::LabelNoiseRate,
        Metric::DomainConstraintViolations,
    ];

    /// All metrics including the aggregate score, in record order.
    pub const ALL: [Metric; 21] = [
        Metric::MissingValuesPct,
        Metric::DuplicateRecordsCount,
        Metric::OutlierRate,
        Metric::InconsistencyRate,
        Metric::DataTypeMismatchRate,
        Metric::NullVsNanDistribution,
        Metric::CardinalityCategorical,
        Metric::TargetImbalance,
        Metric::FeatureCorrelationMean,
        Metric::RangeViolationRate,
        Metric::MeanMedianDrift,
        Metric::ClassOverlapScore,
        Metric::DataFreshness,
        Metric::FeatureImportanceConsistency,
        Metric::AnomalyCount,
        Metric::EncodingCoverageRate,
        Metric::VarianceThresholdCheck,
        Metric::DataDensityCompleteness,
        Metric::LabelNoiseRate,
        Metric::DomainConstraintViolations,
        Metric::DataQualityScore,
    ];

    /// Canonical column/field name of the metric.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MissingValuesPct => "Missing_Values_Pct",
            Self::DuplicateRecordsCount => "Duplicate_Records_Count",
            Self::OutlierRate => "Outlier_Rate",
            Self::InconsistencyRate => "Inconsistency_Rate",
            Self::DataTypeMismatchRate => "Data_Type_Mismatch_Rate",
            Self::NullVsNanDistribution => "Null_vs_NaN_Distribution",
            Self::CardinalityCategorical => "Cardinality_Categorical",
            Self::TargetImbalance => "Target_Imbalance",
            Self::FeatureCorrelationMean => "Feature_Correlation_Mean",
            Self::RangeViolationRate => "Range_Violation_Rate",
            Self::MeanMedianDrift => "Mean_Median_Drift",
            Self::ClassOverlapScore => "Class_Overlap_Score",
            Self::DataFreshness => "Data_Freshness",
            Self::FeatureImportanceConsistency => "Feature_Importance_Consistency",
            Self::AnomalyCount => "Anomaly_Count",
            Self::EncodingCoverageRate => "Encoding_Coverage_Rate",
            Self::VarianceThresholdCheck => "Variance_Threshold_Check",
            Self::DataDensityCompleteness => "Data_Density_Completeness",
            Self::LabelNoiseRate => "Label_Noise_Rate",
            Self::DomainConstraintViolations => "Domain_Constraint_Violations",
            Self::DataQualityScore => "Data_Quality_Score",
        }
    }

    /// Bounds used when synthesizing a fallback value for this metric.
    #[must_use]
    pub fn fallback_range(&self) -> (f64, f64) {
        match self {
            Self::MissingValuesPct => (0.0, 30.0),
            Self::DuplicateRecordsCount => (0.0, 100.0),
            Self::OutlierRate => (0.0, 0.15),
            Self::InconsistencyRate => (0.0, 0.1),
            Self::DataTypeMismatchRate => (0.0, 0.05),
            Self::NullVsNanDistribution => (0.0, 1.0),
            Self::CardinalityCategorical => (1.0, 100.0),
            Self::TargetImbalance => (0.0, 1.0),
            Self::FeatureCorrelationMean => (0.0, 1.0),
            Self::RangeViolationRate => (0.0, 0.1),
            Self::MeanMedianDrift => (0.0, 0.2),
            Self::ClassOverlapScore => (0.0, 1.0),
            Self::DataFreshness => (0.0, 365.0),
            Self::FeatureImportanceConsistency => (0.0, 1.0),
            Self::AnomalyCount => (0.0, 100.0),
            Self::EncodingCoverageRate => (0.7, 1.0),
            Self::VarianceThresholdCheck => (0.0, 0.1),
            Self::DataDensityCompleteness => (0.5, 1.0),
            Self::LabelNoiseRate => (0.0, 0.1),
            Self::DomainConstraintViolations => (0.0, 0.1),
            Self::DataQualityScore => (0.0, 100.0),
        }
    }

    /// Contribution of this metric to the aggregate score.
    ///
    /// The 20 indicator weights sum to 1.0; the aggregate score itself
    /// carries no weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        match self {
            Self::MissingValuesPct => 0.10,
            Self::DuplicateRecordsCount => 0.05,
            Self::OutlierRate => 0.05,
            Self::InconsistencyRate => 0.05,
            Self::DataTypeMismatchRate => 0.05,
            Self::NullVsNanDistribution => 0.03,
            Self::CardinalityCategorical => 0.03,
            Self::TargetImbalance => 0.05,
            Self::FeatureCorrelationMean => 0.05,
            Self::RangeViolationRate => 0.05,
            Self::MeanMedianDrift => 0.05,
            Self::ClassOverlapScore => 0.05,
            Self::DataFreshness => 0.03,
            Self::FeatureImportanceConsistency => 0.05,
            Self::AnomalyCount => 0.05,
            Self::EncodingCoverageRate => 0.05,
            Self::VarianceThresholdCheck => 0.05,
            Self::DataDensityCompleteness => 0.05,
            Self::LabelNoiseRate => 0.05,
            Self::DomainConstraintViolations => 0.06,
            Self::DataQualityScore => 0.0,
        }
    }

    /// Output shape of this metric's values.
    #[must_use]
    pub fn shape(&self) -> ValueShape {
        match self {
            Self::DuplicateRecordsCount | Self::AnomalyCount | Self::CardinalityCategorical => {
                ValueShape::Count
            }
            Self::DataQualityScore => ValueShape::Score,
            _ => ValueShape::TwoDecimal,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Round a value to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

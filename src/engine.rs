//! The quality engine: one call in, twenty-one metrics out.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::{
    array::{ArrayRef, Float64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema},
};
use chrono::NaiveDate;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::calculators;
use crate::classify::classify;
use crate::error::{Error, Result};
use crate::fallback::FallbackGenerator;
use crate::metric::Metric;
use crate::score;
use crate::table::Table;

/// Computes the full metric battery for a table.
///
/// The engine is cheap to construct and reusable; every [`compute`] call is
/// independent and deterministic for a given seed and table.
///
/// [`compute`]: QualityEngine::compute
///
/// # Example
///
/// ```no_run
/// use aferir::{QualityEngine, Table};
///
/// let table = Table::from_csv("data/customers.csv").unwrap();
/// let engine = QualityEngine::new().with_seed(7);
/// let record = engine.compute(&table, Some("churned"));
/// println!("{}", record.dataset_id());
/// ```
#[derive(Debug, Clone)]
pub struct QualityEngine {
    seed: u64,
    dataset_id: String,
}

impl Default for QualityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityEngine {
    /// Default seed used when none is configured.
    pub const DEFAULT_SEED: u64 = 42;

    /// Create an engine with the default seed and a seed-derived dataset id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            dataset_id: derive_dataset_id(Self::DEFAULT_SEED),
        }
    }

    /// Replace the seed, re-deriving the dataset id unless one was set
    /// explicitly afterwards.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.dataset_id = derive_dataset_id(seed);
        self
    }

    /// Use an explicit dataset identifier.
    #[must_use]
    pub fn with_dataset_id(mut self, id: impl Into<String>) -> Self {
        self.dataset_id = id.into();
        self
    }

    /// The configured seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Compute all 21 metrics for a table, using today's date for the
    /// freshness and future-date checks.
    #[must_use]
    pub fn compute(&self, table: &Table, target: Option<&str>) -> MetricRecord {
        self.compute_at(table, target, chrono::Local::now().date_naive())
    }

    /// Compute all 21 metrics with an explicit reference date.
    ///
    /// Every indicator is present in the result: calculators that report
    /// inapplicability are replaced by seeded fallback draws, consumed in
    /// fixed metric order so repeated calls agree.
    #[must_use]
    pub fn compute_at(&self, table: &Table, target: Option<&str>, today: NaiveDate) -> MetricRecord {
        let kinds = classify(table);
        let mut fallback = FallbackGenerator::new(self.seed);
        let mut values = BTreeMap::new();

        for metric in Metric::INDICATORS {
            let computed = match metric {
                Metric::MissingValuesPct => calculators::missing_values_pct(table),
                Metric::DuplicateRecordsCount => calculators::duplicate_records_count(table),
                Metric::OutlierRate => {
                    calculators::outlier_rate(table, &kinds.numeric, self.seed)
                }
                Metric::InconsistencyRate => calculators::inconsistency_rate(table),
                Metric::DataTypeMismatchRate => {
                    calculators::data_type_mismatch_rate(table, &kinds)
                }
                Metric::NullVsNanDistribution => calculators::null_vs_nan_distribution(table),
                Metric::CardinalityCategorical => {
                    calculators::cardinality_categorical(table, &kinds.categorical)
                }
                Metric::TargetImbalance => calculators::target_imbalance(table, target),
                Metric::FeatureCorrelationMean => {
                    calculators::feature_correlation_mean(table, &kinds.numeric)
                }
                Metric::RangeViolationRate => {
                    calculators::range_violation_rate(table, &kinds.numeric)
                }
                Metric::MeanMedianDrift => {
                    calculators::mean_median_drift(table, &kinds.numeric)
                }
                Metric::ClassOverlapScore => {
                    calculators::class_overlap_score(table, &kinds.numeric, target)
                }
                Metric::DataFreshness => {
                    calculators::data_freshness(table, &kinds.temporal, today)
                }
                Metric::FeatureImportanceConsistency => {
                    calculators::feature_importance_consistency(
                        table,
                        &kinds.numeric,
                        target,
                        self.seed,
                    )
                }
                Metric::AnomalyCount => {
                    calculators::anomaly_count(table, &kinds.numeric, self.seed)
                }
                Metric::EncodingCoverageRate => {
                    calculators::encoding_coverage_rate(table, &kinds.categorical)
                }
                Metric::VarianceThresholdCheck => {
                    calculators::variance_threshold_check(table, &kinds.numeric)
                }
                Metric::DataDensityCompleteness => {
                    calculators::data_density_completeness(table)
                }
                Metric::LabelNoiseRate => {
                    calculators::label_noise_rate(table, &kinds, target, self.seed)
                }
                Metric::DomainConstraintViolations => {
                    calculators::domain_constraint_violations(table, &kinds, today)
                }
                Metric::DataQualityScore => None,
            };
            let value = computed.unwrap_or_else(|| fallback.draw(metric));
            values.insert(metric, value);
        }

        let quality = score::aggregate(&values)
            .unwrap_or_else(|| fallback.draw(Metric::DataQualityScore));
        values.insert(Metric::DataQualityScore, quality);

        MetricRecord {
            dataset_id: self.dataset_id.clone(),
            values,
        }
    }
}

/// Seed-derived identifier in the `DS_###` shape.
fn derive_dataset_id(seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    format!("DS_{:03}", rng.gen_range(1..=999))
}

/// One complete metric computation: a dataset id plus all 21 values.
///
/// Iteration, serialization, and the Arrow rendering all emit metrics in
/// the canonical order, ending with the aggregate score.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    dataset_id: String,
    values: BTreeMap<Metric, f64>,
}

impl MetricRecord {
    /// The dataset identifier this record was computed under.
    #[must_use]
    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// The value of one metric.
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    /// All metric values in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    /// Render the record as a one-row Arrow batch: a `Dataset_ID` string
    /// column followed by one float column per metric.
    ///
    /// # Errors
    ///
    /// Returns an error if Arrow rejects the constructed batch.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![Field::new("Dataset_ID", DataType::Utf8, false)];
        let mut columns: Vec<ArrayRef> =
            vec![Arc::new(StringArray::from(vec![self.dataset_id.clone()]))];

        for (metric, value) in self.iter() {
            fields.push(Field::new(metric.name(), DataType::Float64, false));
            columns.push(Arc::new(Float64Array::from(vec![value])));
        }

        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Error::Arrow)
    }

    /// Render the record as a one-row [`Table`], ready for CSV export.
    ///
    /// # Errors
    ///
    /// Returns an error if the Arrow rendering fails.
    pub fn to_table(&self) -> Result<Table> {
        Table::from_batch(self.to_record_batch()?)
    }
}

impl Serialize for MetricRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MetricRecord", 1 + self.values.len())?;
        state.serialize_field("Dataset_ID", &self.dataset_id)?;
        for (metric, value) in &self.values {
            state.serialize_field(metric.name(), value)?;
        }
        state.end()
    }
}

/// Shape summary of a table as the classifier sees it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TableSummary {
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub columns: usize,
    /// Numeric column names.
    pub numeric: Vec<String>,
    /// Categorical column names.
    pub categorical: Vec<String>,
    /// Temporal column names.
    pub temporal: Vec<String>,
}

impl TableSummary {
    /// Summarize a table.
    #[must_use]
    pub fn of(table: &Table) -> Self {
        let kinds = classify(table);
        Self {
            rows: table.num_rows(),
            columns: table.num_columns(),
            numeric: kinds.numeric,
            categorical: kinds.categorical,
            temporal: kinds.temporal,
        }
    }
}

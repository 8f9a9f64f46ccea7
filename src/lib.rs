//! aferir - Data Quality Metrics in Pure Rust
//!
//! Computes a fixed battery of 20 data-quality indicators plus a weighted
//! aggregate score for tabular datasets, on top of Arrow `RecordBatch`
//! storage.
//!
//! # Design Principles
//!
//! 1. **Total** - every run yields all 21 metrics; inapplicable
//!    indicators are filled with seeded, range-plausible fallbacks
//! 2. **Deterministic** - one seed drives the detectors, the clustering,
//!    and every fallback draw
//! 3. **Pure Rust** - no Python, no FFI
//! 4. **Ecosystem aligned** - Arrow 53 throughout
//!
//! # Quick Start
//!
//! ```no_run
//! use aferir::{Metric, QualityEngine, Table};
//!
//! // Load a CSV file
//! let table = Table::from_csv("data/customers.csv").unwrap();
//!
//! // Compute the metric battery
//! let engine = QualityEngine::new().with_seed(42);
//! let record = engine.compute(&table, Some("churned"));
//!
//! println!(
//!     "{}: quality score {}",
//!     record.dataset_id(),
//!     record.get(Metric::DataQualityScore).unwrap()
//! );
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::redundant_clone,
        clippy::too_many_lines,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::module_name_repetitions)]

pub mod calculators;
pub mod classify;
pub mod cluster;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod forest;
pub mod metric;
pub mod mutual_info;
pub mod score;
pub mod stats;
pub mod table;

// Re-exports for convenience
// Re-export arrow types commonly needed
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use classify::{classify, ColumnKinds};
pub use engine::{MetricRecord, QualityEngine, TableSummary};
pub use error::{Error, Result};
pub use fallback::FallbackGenerator;
pub use metric::{Metric, ValueShape};
pub use table::{CsvOptions, Table};

//! aferir CLI - Data Quality Metrics for Tabular Datasets
//!
//! Command-line interface for computing the aferir metric battery over CSV
//! files, one at a time or in batches.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::uninlined_format_args)]

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use aferir::{
    Error, Metric, MetricRecord, QualityEngine, Table, TableSummary,
};
use arrow::{
    array::{ArrayRef, Float64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema},
};
use clap::{Parser, Subcommand};

/// aferir - Data Quality Metrics in Pure Rust
#[derive(Parser)]
#[command(name = "aferir")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full metric battery for one CSV file
    Analyze {
        /// Input CSV path
        input: PathBuf,
        /// Target column for classification-related metrics
        #[arg(short, long)]
        target: Option<String>,
        /// Seed for detectors, clustering, and fallback draws
        #[arg(short, long, default_value_t = QualityEngine::DEFAULT_SEED)]
        seed: u64,
        /// Dataset identifier (defaults to a seed-derived DS_### id)
        #[arg(short, long)]
        dataset_id: Option<String>,
        /// Write the metric record to this CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the record as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Compute metrics for every CSV in a directory
    Batch {
        /// Directory of input CSV files
        input_dir: PathBuf,
        /// Directory for the combined results
        output_dir: PathBuf,
        /// Target column applied to every dataset
        #[arg(short, long)]
        target: Option<String>,
        /// Seed for detectors, clustering, and fallback draws
        #[arg(short, long, default_value_t = QualityEngine::DEFAULT_SEED)]
        seed: u64,
    },
    /// Display row/column counts and classified column kinds
    Info {
        /// Input CSV path
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            target,
            seed,
            dataset_id,
            output,
            json,
        } => cmd_analyze(
            &input,
            target.as_deref(),
            seed,
            dataset_id,
            output.as_deref(),
            json,
        ),
        Commands::Batch {
            input_dir,
            output_dir,
            target,
            seed,
        } => cmd_batch(&input_dir, &output_dir, target.as_deref(), seed),
        Commands::Info { input } => cmd_info(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_analyze(
    input: &Path,
    target: Option<&str>,
    seed: u64,
    dataset_id: Option<String>,
    output: Option<&Path>,
    json: bool,
) -> aferir::Result<()> {
    let table = Table::from_csv(input)?;
    if let Some(name) = target {
        if table.column_index(name).is_none() {
            return Err(Error::column_not_found(name));
        }
    }

    let mut engine = QualityEngine::new().with_seed(seed);
    if let Some(id) = dataset_id {
        engine = engine.with_dataset_id(id);
    }
    let record = engine.compute(&table, target);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record, &table);
    }

    if let Some(path) = output {
        record.to_table()?.to_csv(path)?;
        println!("Saved metrics to {}", path.display());
    }

    Ok(())
}

fn print_record(record: &MetricRecord, table: &Table) {
    let summary = TableSummary::of(table);
    println!("Dataset: {}", record.dataset_id());
    println!(
        "{} rows x {} columns ({} numeric, {} categorical, {} temporal)",
        summary.rows,
        summary.columns,
        summary.numeric.len(),
        summary.categorical.len(),
        summary.temporal.len()
    );
    println!();
    for (metric, value) in record.iter() {
        if metric == Metric::DataQualityScore {
            println!();
        }
        println!("  {:32} {}", metric.name(), value);
    }
}

fn cmd_batch(
    input_dir: &Path,
    output_dir: &Path,
    target: Option<&str>,
    seed: u64,
) -> aferir::Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| Error::io(e, output_dir))?;

    let mut inputs: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .map_err(|e| Error::io(e, input_dir))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    inputs.sort();

    let mut batches = Vec::new();
    let mut failures = Vec::new();
    for path in &inputs {
        match analyze_one(path, target, seed) {
            Ok(batch) => batches.push(batch),
            Err(e) => {
                eprintln!("Skipping {}: {}", path.display(), e);
                failures.push(failure_record(path, &e));
            }
        }
    }

    if !batches.is_empty() {
        let out = output_dir.join("quality_metrics.csv");
        Table::new(batches)?.to_csv(&out)?;
        println!(
            "Wrote {} of {} datasets to {}",
            inputs.len() - failures.len(),
            inputs.len(),
            out.display()
        );
    }

    if !failures.is_empty() {
        let out = output_dir.join("failed_datasets.csv");
        failure_table(failures)?.to_csv(&out)?;
        println!("Wrote failure records to {}", out.display());
    }

    Ok(())
}

fn analyze_one(path: &Path, target: Option<&str>, seed: u64) -> aferir::Result<RecordBatch> {
    let table = Table::from_csv(path)?;
    let engine = QualityEngine::new()
        .with_seed(seed)
        .with_dataset_id(dataset_id_for(path));
    engine.compute(&table, target).to_record_batch()
}

/// Datasets in a batch are identified by their file stem.
fn dataset_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Minimal record kept for a dataset whose analysis failed: identity,
/// when, how big, and what went wrong.
fn failure_record(path: &Path, error: &Error) -> (String, String, f64, String) {
    let size_mb = std::fs::metadata(path)
        .map(|m| m.len() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0);
    (
        dataset_id_for(path),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        (size_mb * 100.0).round() / 100.0,
        format!("failed: {}", error),
    )
}

fn failure_table(failures: Vec<(String, String, f64, String)>) -> aferir::Result<Table> {
    let ids: Vec<String> = failures.iter().map(|f| f.0.clone()).collect();
    let timestamps: Vec<String> = failures.iter().map(|f| f.1.clone()).collect();
    let sizes: Vec<f64> = failures.iter().map(|f| f.2).collect();
    let statuses: Vec<String> = failures.iter().map(|f| f.3.clone()).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("Dataset_ID", DataType::Utf8, false),
        Field::new("Timestamp", DataType::Utf8, false),
        Field::new("File_Size_MB", DataType::Float64, false),
        Field::new("Analysis_Status", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(StringArray::from(timestamps)),
        Arc::new(Float64Array::from(sizes)),
        Arc::new(StringArray::from(statuses)),
    ];

    let batch = RecordBatch::try_new(schema, columns).map_err(Error::Arrow)?;
    Table::from_batch(batch)
}

fn cmd_info(input: &Path) -> aferir::Result<()> {
    let table = Table::from_csv(input)?;
    let summary = TableSummary::of(&table);

    println!("File: {}", input.display());
    println!("Rows: {}", summary.rows);
    println!("Columns: {}", summary.columns);
    println!("Numeric: {}", summary.numeric.join(", "));
    println!("Categorical: {}", summary.categorical.join(", "));
    println!("Temporal: {}", summary.temporal.join(", "));

    Ok(())
}

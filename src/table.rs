//! Columnar table container for aferir.
//!
//! Provides [`Table`], the immutable Arrow-backed table the metrics engine
//! reads. Callers materialize a table (typically from CSV) and hand it to
//! [`crate::QualityEngine::compute`]; the engine never mutates it.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{Array, RecordBatch},
    compute::cast,
    datatypes::{DataType, Schema, SchemaRef},
    util::display::array_value_to_string,
};

use crate::error::{Error, Result};

/// An in-memory table backed by Arrow RecordBatches.
///
/// Rows are ordered but order carries no meaning for metric computation
/// except where the engine samples or splits.
///
/// # Example
///
/// ```no_run
/// use aferir::Table;
///
/// let table = Table::from_csv("data/customers.csv").unwrap();
/// println!("{} rows x {} columns", table.num_rows(), table.num_columns());
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    batches: Vec<RecordBatch>,
    schema: SchemaRef,
    row_count: usize,
}

/// Options for CSV parsing.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Field delimiter override.
    pub delimiter: Option<u8>,
    /// Batch size for reading.
    pub batch_size: usize,
    /// Maximum records to scan when inferring the schema.
    pub infer_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: None,
            batch_size: 8192,
            infer_records: 1000,
        }
    }
}

impl Table {
    /// Creates a table from a vector of RecordBatches.
    ///
    /// Batches may hold zero rows; the vector itself must be non-empty and
    /// schema-consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector is empty or schemas disagree.
    pub fn new(batches: Vec<RecordBatch>) -> Result<Self> {
        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        let schema = batches[0].schema();
        for (i, batch) in batches.iter().enumerate().skip(1) {
            if batch.schema() != schema {
                return Err(Error::schema_mismatch(format!(
                    "Batch {} has different schema than batch 0",
                    i
                )));
            }
        }

        let row_count = batches.iter().map(|b| b.num_rows()).sum();

        Ok(Self {
            batches,
            schema,
            row_count,
        })
    }

    /// Creates a table from a single RecordBatch.
    ///
    /// # Errors
    ///
    /// Never fails for a well-formed batch; kept fallible for parity with
    /// [`Table::new`].
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        Self::new(vec![batch])
    }

    /// Creates a table with zero rows and zero columns.
    #[must_use]
    pub fn empty() -> Self {
        let schema: SchemaRef = Arc::new(Schema::empty());
        Self {
            batches: vec![RecordBatch::new_empty(Arc::clone(&schema))],
            schema,
            row_count: 0,
        }
    }

    /// Loads a table from a CSV file, inferring the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Loads a table from a CSV file with explicit options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_csv_with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        use std::io::{BufReader, Seek, SeekFrom};

        use arrow_csv::{reader::Format, ReaderBuilder};

        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let mut buf_reader = BufReader::new(file);

        let mut format = Format::default().with_header(options.has_header);
        if let Some(delim) = options.delimiter {
            format = format.with_delimiter(delim);
        }
        let (inferred, _) = format
            .infer_schema(&mut buf_reader, Some(options.infer_records))
            .map_err(Error::Arrow)?;
        buf_reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(e, path))?;

        let mut builder = ReaderBuilder::new(Arc::new(inferred))
            .with_batch_size(options.batch_size)
            .with_header(options.has_header);
        if let Some(delim) = options.delimiter {
            builder = builder.with_delimiter(delim);
        }

        let reader = builder.build(buf_reader).map_err(Error::Arrow)?;
        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        Self::new(batches)
    }

    /// Loads a table from a CSV string, inferring the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid CSV.
    pub fn from_csv_str(data: &str) -> Result<Self> {
        use std::io::Cursor;

        use arrow_csv::{reader::Format, ReaderBuilder};

        let mut cursor_for_infer = Cursor::new(data.as_bytes());
        let format = Format::default().with_header(true);
        let (inferred, _) = format
            .infer_schema(&mut cursor_for_infer, Some(1000))
            .map_err(Error::Arrow)?;

        let cursor = Cursor::new(data.as_bytes());
        let builder = ReaderBuilder::new(Arc::new(inferred))
            .with_batch_size(8192)
            .with_header(true);
        let reader = builder.build(cursor).map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }

        Self::new(batches)
    }

    /// Saves the table to a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        use arrow_csv::WriterBuilder;

        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;
        let mut writer = WriterBuilder::new().with_header(true).build(file);

        for batch in &self.batches {
            writer.write(batch).map_err(Error::Arrow)?;
        }

        Ok(())
    }

    /// Returns the total number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Returns the schema of the table.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Returns the underlying record batches.
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Returns column names in schema order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Returns the index of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.fields().iter().position(|f| f.name() == name)
    }

    /// Returns the storage type of a column, if it exists.
    #[must_use]
    pub fn column_type(&self, name: &str) -> Option<DataType> {
        self.column_index(name)
            .map(|i| self.schema.field(i).data_type().clone())
    }

    /// Returns true if the column's storage type is numeric.
    #[must_use]
    pub fn is_numeric_column(&self, name: &str) -> bool {
        self.column_type(name).is_some_and(|dt| dt.is_numeric())
    }

    /// Returns true if the column's storage type is a string type.
    #[must_use]
    pub fn is_string_column(&self, name: &str) -> bool {
        matches!(
            self.column_type(name),
            Some(DataType::Utf8 | DataType::LargeUtf8)
        )
    }

    /// Returns true if the column's storage type is a date or timestamp.
    #[must_use]
    pub fn is_temporal_column(&self, name: &str) -> bool {
        matches!(
            self.column_type(name),
            Some(DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _))
        )
    }

    /// Returns the number of null cells in a column.
    #[must_use]
    pub fn null_count(&self, name: &str) -> usize {
        let Some(idx) = self.column_index(name) else {
            return 0;
        };
        self.batches
            .iter()
            .map(|b| b.column(idx).null_count())
            .sum()
    }

    /// Extracts a column as stringified cells, `None` for nulls.
    ///
    /// Returns `None` if the column does not exist. Values are rendered
    /// through Arrow's display path, so dates stringify in ISO form.
    #[must_use]
    pub fn string_values(&self, name: &str) -> Option<Vec<Option<String>>> {
        let idx = self.column_index(name)?;
        let mut out = Vec::with_capacity(self.row_count);

        for batch in &self.batches {
            let array = batch.column(idx);
            for i in 0..array.len() {
                if array.is_null(i) {
                    out.push(None);
                } else {
                    out.push(array_value_to_string(array, i).ok());
                }
            }
        }

        Some(out)
    }

    /// Extracts a numeric column as `f64` cells, `None` for nulls.
    ///
    /// Returns `None` if the column does not exist or its storage type is
    /// not numeric.
    #[must_use]
    pub fn numeric_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        if !self.schema.field(idx).data_type().is_numeric() {
            return None;
        }

        let mut out = Vec::with_capacity(self.row_count);
        for batch in &self.batches {
            let array = cast(batch.column(idx), &DataType::Float64).ok()?;
            let floats = array
                .as_any()
                .downcast_ref::<arrow::array::Float64Array>()?;
            for i in 0..floats.len() {
                if floats.is_null(i) {
                    out.push(None);
                } else {
                    out.push(Some(floats.value(i)));
                }
            }
        }

        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use arrow::{
        array::{Float64Array, Int32Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };

    use super::*;

    fn sample_table() -> Table {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, true),
            Field::new("value", DataType::Int32, true),
            Field::new("score", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
                Arc::new(Int32Array::from(vec![Some(1), Some(2), None])),
                Arc::new(Float64Array::from(vec![Some(0.5), Some(1.5), Some(2.5)])),
            ],
        )
        .expect("batch");
        Table::from_batch(batch).expect("table")
    }

    #[test]
    fn test_new_rejects_empty_vec() {
        assert!(matches!(Table::new(vec![]), Err(Error::EmptyTable)));
    }

    #[test]
    fn test_dimensions() {
        let table = sample_table();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty();
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_column_names_and_index() {
        let table = sample_table();
        assert_eq!(table.column_names(), vec!["name", "value", "score"]);
        assert_eq!(table.column_index("value"), Some(1));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn test_type_predicates() {
        let table = sample_table();
        assert!(table.is_string_column("name"));
        assert!(table.is_numeric_column("value"));
        assert!(table.is_numeric_column("score"));
        assert!(!table.is_numeric_column("name"));
        assert!(!table.is_temporal_column("value"));
    }

    #[test]
    fn test_null_count() {
        let table = sample_table();
        assert_eq!(table.null_count("name"), 1);
        assert_eq!(table.null_count("value"), 1);
        assert_eq!(table.null_count("score"), 0);
    }

    #[test]
    fn test_string_values() {
        let table = sample_table();
        let values = table.string_values("name").expect("column");
        assert_eq!(values[0].as_deref(), Some("a"));
        assert!(values[1].is_none());

        let ints = table.string_values("value").expect("column");
        assert_eq!(ints[0].as_deref(), Some("1"));
    }

    #[test]
    fn test_numeric_values() {
        let table = sample_table();
        let values = table.numeric_values("value").expect("column");
        assert_eq!(values, vec![Some(1.0), Some(2.0), None]);

        // String columns have no numeric view
        assert!(table.numeric_values("name").is_none());
    }

    #[test]
    fn test_csv_roundtrip_str() {
        let csv = "a,b\n1,x\n2,y\n3,z\n";
        let table = Table::from_csv_str(csv).expect("parse");
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 2);
        assert!(table.is_numeric_column("a"));
        assert!(table.is_string_column("b"));
    }

    #[test]
    fn test_csv_file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("t.csv");
        let table = sample_table();
        table.to_csv(&path).expect("write");

        let loaded = Table::from_csv(&path).expect("read");
        assert_eq!(loaded.num_rows(), 3);
        assert_eq!(loaded.num_columns(), 3);
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let schema_a = Arc::new(Schema::new(vec![Field::new("x", DataType::Int32, true)]));
        let schema_b = Arc::new(Schema::new(vec![Field::new("y", DataType::Int32, true)]));
        let a = RecordBatch::try_new(
            Arc::clone(&schema_a),
            vec![Arc::new(Int32Array::from(vec![1]))],
        )
        .expect("batch");
        let b = RecordBatch::try_new(
            Arc::clone(&schema_b),
            vec![Arc::new(Int32Array::from(vec![2]))],
        )
        .expect("batch");
        assert!(Table::new(vec![a, b]).is_err());
    }
}

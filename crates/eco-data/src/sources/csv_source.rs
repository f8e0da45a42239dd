use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use csv::ReaderBuilder;
use tracing::info;

use crate::DataError;
use eco_core::DatasetSource;

/// CSV data source: the whole file becomes one typed batch per load.
///
/// The bundled measurement tables are small enough that chunking or
/// caching would only add moving parts.
pub struct CsvSource {
    path: PathBuf,
    name: String,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    /// Read and type a CSV file synchronously
    pub fn read_file(path: &Path) -> Result<RecordBatch, DataError> {
        let file = File::open(path)?;
        read_typed_csv(BufReader::new(file))
    }
}

#[async_trait]
impl DatasetSource for CsvSource {
    async fn fetch(&self) -> anyhow::Result<RecordBatch> {
        let path = self.path.clone();
        let name = self.name.clone();
        let batch = tokio::task::spawn_blocking(move || CsvSource::read_file(&path)).await??;
        info!(
            source = %name,
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "loaded csv dataset"
        );
        Ok(batch)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Parse delimited text into a typed batch.
///
/// Headers and cells are trimmed. Column types are detected from the data
/// (Int64, then Float64, then Utf8); empty cells stay null. Numeric fields
/// a view expects but that were detected as text are coerced per cell by
/// [`crate::columns::numeric_column`], with NaN for malformed values.
pub fn read_typed_csv<R: Read>(reader: R) -> Result<RecordBatch, DataError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    let fields = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| Field::new(name, detect_column_type(&rows, idx), true))
        .collect::<Vec<_>>();
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(headers.len());
    for (col_idx, field) in schema.fields().iter().enumerate() {
        let array: ArrayRef = match field.data_type() {
            DataType::Int64 => {
                let mut builder = Int64Builder::new();
                for row in &rows {
                    match row.get(col_idx).map(|s| s.parse::<i64>()) {
                        Some(Ok(v)) => builder.append_value(v),
                        _ => builder.append_null(),
                    }
                }
                Arc::new(builder.finish())
            }
            DataType::Float64 => {
                let mut builder = Float64Builder::new();
                for row in &rows {
                    match row.get(col_idx).map(|s| s.parse::<f64>()) {
                        Some(Ok(v)) => builder.append_value(v),
                        _ => builder.append_null(),
                    }
                }
                Arc::new(builder.finish())
            }
            _ => {
                let mut builder = StringBuilder::new();
                for row in &rows {
                    match row.get(col_idx) {
                        Some(v) if !v.is_empty() => builder.append_value(v),
                        _ => builder.append_null(),
                    }
                }
                Arc::new(builder.finish())
            }
        };
        arrays.push(array);
    }

    Ok(RecordBatch::try_new(schema, arrays)?)
}

/// Detect a column type from the data: Int64 if every non-empty cell
/// parses as an integer, Float64 if every non-empty cell parses as a
/// number, Utf8 otherwise.
fn detect_column_type(rows: &[Vec<String>], col_idx: usize) -> DataType {
    let mut is_int = true;
    let mut is_float = true;

    for row in rows {
        if let Some(value) = row.get(col_idx) {
            if value.is_empty() {
                continue;
            }
            if is_int && value.parse::<i64>().is_err() {
                is_int = false;
            }
            if is_float && value.parse::<f64>().is_err() {
                is_float = false;
            }
        }
    }

    if is_int {
        DataType::Int64
    } else if is_float {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

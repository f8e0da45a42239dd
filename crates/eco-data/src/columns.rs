//! Typed access to loaded table columns
//!
//! Accessors keep row alignment: a cell that is null or fails to parse
//! becomes NaN (numeric) or an empty string, never a dropped row, so
//! category and measure columns stay zipped.

use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;

use crate::DataError;

/// Extract a column as f64 values, coercing per cell.
///
/// Accepts Float64, Int64 or Utf8 columns; text cells are parsed with NaN
/// for malformed input, which is how the measurement tables treat bad data.
pub fn numeric_column(batch: &RecordBatch, name: &str) -> Result<Vec<f64>, DataError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;

    if let Some(floats) = column.as_any().downcast_ref::<Float64Array>() {
        Ok((0..floats.len())
            .map(|i| {
                if floats.is_null(i) {
                    f64::NAN
                } else {
                    floats.value(i)
                }
            })
            .collect())
    } else if let Some(ints) = column.as_any().downcast_ref::<Int64Array>() {
        Ok((0..ints.len())
            .map(|i| {
                if ints.is_null(i) {
                    f64::NAN
                } else {
                    ints.value(i) as f64
                }
            })
            .collect())
    } else if let Some(strings) = column.as_any().downcast_ref::<StringArray>() {
        Ok((0..strings.len())
            .map(|i| {
                if strings.is_null(i) {
                    f64::NAN
                } else {
                    strings.value(i).trim().parse::<f64>().unwrap_or(f64::NAN)
                }
            })
            .collect())
    } else {
        Err(DataError::ColumnType(name.to_string()))
    }
}

/// Extract a column as strings; null cells become empty strings.
pub fn string_column(batch: &RecordBatch, name: &str) -> Result<Vec<String>, DataError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;

    let strings = column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DataError::ColumnType(name.to_string()))?;

    Ok((0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                String::new()
            } else {
                strings.value(i).to_string()
            }
        })
        .collect())
}

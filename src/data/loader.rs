use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{BladeDataset, BladeRecord};

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = ["Brand", "Name", "Type", "Ep", "Ec", "Vp", "Vl"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a blade dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming at least the required columns
/// * `.json`    – `[{ "Brand": ..., "Name": ..., "Ep": 1.1, ... }, ...]`
/// * `.parquet` – flat columns, text for Brand/Name/Type, numbers otherwise
pub fn load_file(path: &Path) -> Result<BladeDataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let origin = path.display().to_string();
    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(|e| DataError::unavailable(&origin, e))?;
            load_csv_reader(file)?
        }
        "json" => {
            let text =
                std::fs::read_to_string(path).map_err(|e| DataError::unavailable(&origin, e))?;
            load_json_str(&text)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} blades from {origin} ({} rows dropped)",
        dataset.len(),
        dataset.dropped_rows
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row handling shared by every format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawBlade {
    #[serde(rename = "Brand")]
    brand: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    blade_type: String,
    #[serde(rename = "Ep")]
    ep: f64,
    #[serde(rename = "Ec")]
    ec: f64,
    #[serde(rename = "Vp")]
    vp: f64,
    #[serde(rename = "Vl")]
    vl: f64,
}

impl RawBlade {
    fn into_record(self) -> BladeRecord {
        BladeRecord::new(
            self.brand,
            self.name,
            self.blade_type,
            self.ep,
            self.ec,
            self.vp,
            self.vl,
        )
    }
}

/// Accumulates records, dropping rows whose ratios are undefined.
#[derive(Default)]
struct RowCollector {
    records: Vec<BladeRecord>,
    dropped: usize,
}

impl RowCollector {
    fn push(&mut self, row: usize, record: BladeRecord) {
        if record.has_finite_ratios() {
            self.records.push(record);
        } else {
            log::warn!(
                "Row {row} ({} {}): Ep={} Vp={} gives an undefined ratio, skipping",
                record.brand,
                record.name,
                record.ep,
                record.vp
            );
            self.dropped += 1;
        }
    }

    fn finish(self) -> BladeDataset {
        let mut dataset = BladeDataset::from_records(self.records);
        dataset.dropped_rows = self.dropped;
        dataset
    }
}

fn check_columns(present: &[&str]) -> Result<(), DataError> {
    for required in REQUIRED_COLUMNS {
        if !present.contains(&required) {
            return Err(DataError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV from any reader. Used for local files and the remote sheet
/// export alike. Column order is free and extra columns are ignored.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<BladeDataset, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DataError::malformed(0, format!("reading CSV headers: {e}")))?
        .clone();
    check_columns(&headers.iter().collect::<Vec<_>>())?;

    let mut rows = RowCollector::default();
    for (row_no, result) in reader.deserialize::<RawBlade>().enumerate() {
        let raw = result.map_err(|e| DataError::malformed(row_no, e))?;
        rows.push(row_no, raw.into_record());
    }
    Ok(rows.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Brand": "Stiga", "Name": "Clipper", "Type": "7-Ply",
///     "Ep": 1.12, "Ec": 1.05, "Vp": 1.01, "Vl": 0.97 },
///   ...
/// ]
/// ```
pub fn load_json_str(text: &str) -> Result<BladeDataset, DataError> {
    let root: JsonValue =
        serde_json::from_str(text).map_err(|e| DataError::malformed(0, format!("parsing JSON: {e}")))?;
    let records = root
        .as_array()
        .ok_or_else(|| DataError::malformed(0, "expected top-level JSON array"))?;

    if let Some(first) = records.first().and_then(JsonValue::as_object) {
        check_columns(&first.keys().map(String::as_str).collect::<Vec<_>>())?;
    }

    let mut rows = RowCollector::default();
    for (i, rec) in records.iter().enumerate() {
        let raw: RawBlade =
            serde_json::from_value(rec.clone()).map_err(|e| DataError::malformed(i, e))?;
        rows.push(i, raw.into_record());
    }
    Ok(rows.finish())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per required field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<BladeDataset, DataError> {
    let origin = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| DataError::unavailable(&origin, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::unavailable(&origin, format!("reading parquet metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| DataError::unavailable(&origin, format!("building parquet reader: {e}")))?;

    let mut rows = RowCollector::default();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DataError::unavailable(&origin, format!("reading record batch: {e}")))?;
        let schema = batch.schema();

        let mut cols = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for name in REQUIRED_COLUMNS {
            let idx = schema
                .index_of(name)
                .map_err(|_| DataError::MissingColumn(name.to_string()))?;
            cols.push(batch.column(idx));
        }

        for row in 0..batch.num_rows() {
            let row_no = offset + row;
            let record = BladeRecord::new(
                extract_text(cols[0], row).map_err(|e| DataError::malformed(row_no, e))?,
                extract_text(cols[1], row).map_err(|e| DataError::malformed(row_no, e))?,
                extract_text(cols[2], row).map_err(|e| DataError::malformed(row_no, e))?,
                extract_f64(cols[3], row).map_err(|e| DataError::malformed(row_no, e))?,
                extract_f64(cols[4], row).map_err(|e| DataError::malformed(row_no, e))?,
                extract_f64(cols[5], row).map_err(|e| DataError::malformed(row_no, e))?,
                extract_f64(cols[6], row).map_err(|e| DataError::malformed(row_no, e))?,
            );
            rows.push(row_no, record);
        }
        offset += batch.num_rows();
    }

    Ok(rows.finish())
}

// -- Arrow helpers --

fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<String, String> {
    if col.is_null(row) {
        return Err("null text value".to_string());
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string())
            .ok_or_else(|| "expected StringArray".to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        // Model names like "7" come through as numbers.
        _ => extract_f64(col, row).map(|v| v.to_string()),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64, String> {
    if col.is_null(row) {
        return Err("null numeric value".to_string());
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        other => return Err(format!("unsupported column type {other:?}")),
    };
    value.ok_or_else(|| format!("column type {:?} did not downcast", col.data_type()))
}

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{ClimateTable, Record};

/// Source column names, as written by the upstream dataset.
pub const COUNTRY_COLUMN: &str = "Country";
pub const INCOME_GROUP_COLUMN: &str = "Income group";
pub const YEAR_COLUMN: &str = "Year";
pub const MEAN_TEMP_COLUMN: &str = "MeanTemp";
pub const CO2_COLUMN: &str = "CO2_kt";

/// Income group used when the source cell is empty.
pub const UNKNOWN_INCOME_GROUP: &str = "Unknown";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a climate table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the five dataset columns
/// * `.json`    – `[{ "Country": "India", "Year": 1960, ... }, ...]`
/// * `.parquet` – one column per field (recommended for large files)
pub fn load_file(path: &Path) -> Result<ClimateTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} records ({} countries, {} income groups) from {}",
        table.len(),
        table.countries.len(),
        table.income_groups.len(),
        path.display()
    );
    if table.is_empty() {
        log::warn!("{} contains no usable rows", path.display());
    } else if table.duplicates_dropped > 0 {
        log::debug!("{} duplicate rows ignored", table.duplicates_dropped);
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Row assembly shared by all formats
// ---------------------------------------------------------------------------

/// Raw cells of one source row, before validation.
struct RawRow<'a> {
    country: Option<&'a str>,
    income_group: Option<&'a str>,
    year: Option<i32>,
    mean_temp: Option<f64>,
    co2_kt: Option<f64>,
}

/// Collects validated records and counts the rows that had to be skipped.
#[derive(Default)]
struct RowCollector {
    records: Vec<Record>,
    skipped: usize,
}

impl RowCollector {
    fn push(&mut self, row_no: usize, raw: RawRow<'_>) {
        let country = raw.country.map(str::trim).filter(|c| !c.is_empty());
        let (Some(country), Some(year)) = (country, raw.year) else {
            log::debug!("Row {row_no}: missing country or year, skipped");
            self.skipped += 1;
            return;
        };
        let income_group = raw
            .income_group
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(UNKNOWN_INCOME_GROUP);

        self.records.push(Record::new(
            country,
            income_group,
            year,
            raw.mean_temp,
            raw.co2_kt,
        ));
    }

    fn finish(self) -> ClimateTable {
        if self.skipped > 0 {
            log::warn!("Skipped {} rows without a usable country or year", self.skipped);
        }
        ClimateTable::from_records(self.records)
    }
}

/// Parse a year cell: `1960`, `1960.0` or a date such as `1960-01-01`.
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    if let Ok(f) = s.parse::<f64>() {
        return year_from_f64(f);
    }
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    let rest = &s[digits.len()..];
    if digits.len() == 4 && (rest.starts_with('-') || rest.starts_with('/')) {
        return digits.parse().ok();
    }
    None
}

fn year_from_f64(f: f64) -> Option<i32> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64).then_some(f as i32)
}

/// Parse a metric cell.  Empty, `NA`, `NaN` and unparseable cells are missing.
pub fn parse_metric(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("null") {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names; extra columns are ignored.
fn load_csv(path: &Path) -> Result<ClimateTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let country_idx = column(COUNTRY_COLUMN)?;
    let income_idx = column(INCOME_GROUP_COLUMN)?;
    let year_idx = column(YEAR_COLUMN)?;
    let temp_idx = column(MEAN_TEMP_COLUMN)?;
    let co2_idx = column(CO2_COLUMN)?;

    let mut rows = RowCollector::default();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            row_no,
            RawRow {
                country: record.get(country_idx),
                income_group: record.get(income_idx),
                year: record.get(year_idx).and_then(parse_year),
                mean_temp: record.get(temp_idx).and_then(parse_metric),
                co2_kt: record.get(co2_idx).and_then(parse_metric),
            },
        );
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
///   { "Country": "India", "Income group": "Lower middle income",
///     "Year": 1960, "MeanTemp": 24.1, "CO2_kt": 120581.0 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<ClimateTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut rows = RowCollector::default();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        rows.push(
            i,
            RawRow {
                country: obj.get(COUNTRY_COLUMN).and_then(JsonValue::as_str),
                income_group: obj.get(INCOME_GROUP_COLUMN).and_then(JsonValue::as_str),
                year: obj.get(YEAR_COLUMN).and_then(json_to_year),
                mean_temp: obj.get(MEAN_TEMP_COLUMN).and_then(json_to_metric),
                co2_kt: obj.get(CO2_COLUMN).and_then(json_to_metric),
            },
        );
    }

    Ok(rows.finish())
}

fn json_to_year(val: &JsonValue) -> Option<i32> {
    match val {
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).ok(),
            None => n.as_f64().and_then(year_from_f64),
        },
        JsonValue::String(s) => parse_year(s),
        _ => None,
    }
}

fn json_to_metric(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        JsonValue::String(s) => parse_metric(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing climate records.
///
/// Expected schema: `Country` and `Income group` as strings, `Year` as an
/// integer, float or date-like string, `MeanTemp` and `CO2_kt` as nullable
/// floats.  Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<ClimateTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = RowCollector::default();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let column = |name: &str| -> Result<Arc<dyn Array>> {
            let idx = schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
            Ok(batch.column(idx).clone())
        };
        let country_col = column(COUNTRY_COLUMN)?;
        let income_col = column(INCOME_GROUP_COLUMN)?;
        let year_col = column(YEAR_COLUMN)?;
        let temp_col = column(MEAN_TEMP_COLUMN)?;
        let co2_col = column(CO2_COLUMN)?;

        for row in 0..batch.num_rows() {
            let country = extract_text(&country_col, row)
                .with_context(|| format!("Row {row}: failed to read '{COUNTRY_COLUMN}'"))?;
            let income_group = extract_text(&income_col, row)
                .with_context(|| format!("Row {row}: failed to read '{INCOME_GROUP_COLUMN}'"))?;

            rows.push(
                row_offset + row,
                RawRow {
                    country: country.as_deref(),
                    income_group: income_group.as_deref(),
                    year: extract_year(&year_col, row)?,
                    mean_temp: extract_f64(&temp_col, row)?,
                    co2_kt: extract_f64(&co2_col, row)?,
                },
            );
        }
        row_offset += batch.num_rows();
    }

    Ok(rows.finish())
}

// -- Parquet / Arrow helpers --

/// Render any non-null cell as text.
fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    Ok(Some(array_value_to_string(col, row)?))
}

fn extract_year(col: &Arc<dyn Array>, row: usize) -> Result<Option<i32>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let year = match col.data_type() {
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row)),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .and_then(|a| i32::try_from(a.value(row)).ok()),
        _ => extract_text(col, row)?.as_deref().and_then(parse_year),
    };
    Ok(year)
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
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
        _ => extract_text(col, row)?.as_deref().and_then(parse_metric),
    };
    Ok(value.filter(|v| v.is_finite()))
}

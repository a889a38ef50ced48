use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::code::normalize_isic;
use super::model::{Classification, Dataset, TariffObservation};
use super::normalize::{normalize_rows, RawRow};
use crate::config::{AppConfig, SourceFormat};

// ---------------------------------------------------------------------------
// Raw tables
// ---------------------------------------------------------------------------

/// A source file read into column-keyed text rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    fn require_column(&self, column: &str, path: &Path) -> Result<()> {
        if !self.headers.iter().any(|h| h == column) {
            bail!("{} is missing the '{column}' column", path.display());
        }
        Ok(())
    }
}

/// Read a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one observation per line
/// * `.parquet` – any scalar columns; values are rendered to text
pub fn read_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(path),
        "parquet" | "pq" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Short rows are accepted; their missing columns are simply absent from the
/// row map. Blank lines are skipped by the reader.
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{} row {row_no}", path.display()))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nulls and non-scalar columns are left
/// out of the row map.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let raw: RawRow = schema
                .fields()
                .iter()
                .zip(batch.columns())
                .filter_map(|(field, col)| Some((field.name().clone(), cell_text(col, row)?)))
                .collect();
            rows.push(raw);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Render one Arrow cell as the text a CSV export would contain.
fn cell_text(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Boolean => col.as_boolean().value(row).to_string(),
        DataType::Date32 => iso_date(col.as_primitive::<Date32Type>().value_as_date(row)?),
        DataType::Date64 => iso_date(col.as_primitive::<Date64Type>().value_as_date(row)?),
        DataType::Timestamp(unit, _) => iso_date(timestamp_date(col, unit, row)?),
        _ => return None,
    };
    Some(text)
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Calendar date of a timestamp cell (pandas writes `datetime64` this way).
/// Zoned timestamps are read in UTC.
fn timestamp_date(col: &ArrayRef, unit: &TimeUnit, row: usize) -> Option<NaiveDate> {
    let datetime = match unit {
        TimeUnit::Second => col.as_primitive::<TimestampSecondType>().value_as_datetime(row),
        TimeUnit::Millisecond => col
            .as_primitive::<TimestampMillisecondType>()
            .value_as_datetime(row),
        TimeUnit::Microsecond => col
            .as_primitive::<TimestampMicrosecondType>()
            .value_as_datetime(row),
        TimeUnit::Nanosecond => col
            .as_primitive::<TimestampNanosecondType>()
            .value_as_datetime(row),
    }?;
    Some(datetime.date())
}

// ---------------------------------------------------------------------------
// Reference lists
// ---------------------------------------------------------------------------

/// Sorted unique non-empty values of `column`, each passed through `canon`.
pub fn load_reference_list<F>(path: &Path, column: &str, canon: F) -> Result<Vec<String>>
where
    F: Fn(&str) -> String,
{
    let table = read_table(path)?;
    table.require_column(column, path)?;

    let values: BTreeSet<String> = table
        .rows
        .iter()
        .filter_map(|row| row.get(column))
        .map(|raw| canon(raw.trim()))
        .filter(|v| !v.is_empty())
        .collect();

    log::info!("{}: {} distinct {column} values", path.display(), values.len());
    Ok(values.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Tariff tables
// ---------------------------------------------------------------------------

pub fn load_tariff_table(
    path: &Path,
    format: &SourceFormat,
    classification: Classification,
) -> Result<Vec<TariffObservation>> {
    let table = read_table(path)?;
    table.require_column(&format.date_column, path)?;

    let observations = normalize_rows(&table.rows, format, classification);
    if observations.is_empty() && !table.rows.is_empty() {
        bail!(
            "{}: none of the {} rows has a readable '{}' value",
            path.display(),
            table.rows.len(),
            format.date_column
        );
    }
    log::info!(
        "{}: {} observations ({} rows read, {} dropped)",
        path.display(),
        observations.len(),
        table.rows.len(),
        table.rows.len() - observations.len()
    );
    Ok(observations)
}

fn warn_unknown(
    observations: &[TariffObservation],
    known: &[String],
    what: &str,
    field: fn(&TariffObservation) -> &str,
) {
    let unknown: BTreeSet<&str> = observations
        .iter()
        .map(field)
        .filter(|v| !v.is_empty() && known.binary_search_by(|k| k.as_str().cmp(v)).is_err())
        .collect();
    if !unknown.is_empty() {
        log::warn!(
            "{} {what} values are missing from the reference list, e.g. {:?}",
            unknown.len(),
            unknown.iter().take(5).collect::<Vec<_>>()
        );
    }
}

/// Load everything the dashboard needs, in dependency order: reference lists
/// first, then the ISIC table, then the HS6 table. Any failure aborts the
/// whole load.
pub fn load_dataset(config: &AppConfig) -> Result<Dataset> {
    let exporters = load_reference_list(
        &config.resolve(&config.exporters_file),
        "exporter",
        str::to_string,
    )
    .context("loading exporter list")?;
    let isic_codes = load_reference_list(
        &config.resolve(&config.isic_codes_file),
        "isic4_2",
        normalize_isic,
    )
    .context("loading ISIC code list")?;
    let hs6_codes = load_reference_list(
        &config.resolve(&config.hs6_codes_file),
        "hs6code",
        str::to_string,
    )
    .context("loading HS6 code list")?;

    let isic = load_tariff_table(
        &config.resolve(&config.isic_tariff.file),
        &config.isic_tariff,
        Classification::Isic,
    )
    .context("loading ISIC tariff table")?;
    let hs6 = load_tariff_table(
        &config.resolve(&config.hs6_tariff.file),
        &config.hs6_tariff,
        Classification::Hs6,
    )
    .context("loading HS6 tariff table")?;

    warn_unknown(&isic, &isic_codes, "ISIC code", |o| o.classification_code.as_str());
    warn_unknown(&hs6, &hs6_codes, "HS6 code", |o| o.classification_code.as_str());
    for table in [&isic, &hs6] {
        warn_unknown(table, &exporters, "exporter", |o| o.exporter.as_str());
    }

    Ok(Dataset::new(exporters, isic_codes, hs6_codes, isic, hs6))
}

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use super::code::normalize_isic;
use super::model::{Classification, TariffObservation};
use crate::config::SourceFormat;

/// One parsed source row: column name → raw cell text.
pub type RawRow = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 7] = [
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: [&str; 6] = [
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a date cell; time of day, if present, is dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    // Trailing UTC marker from ISO exports.
    let value = value.strip_suffix('Z').unwrap_or(value);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a numeric cell, substituting 0 for anything unparseable or non-finite.
///
/// Like a spreadsheet export reader, the longest leading number is taken and
/// trailing text is ignored: `"5%"` is 5 and `"1,234"` is 1.
pub fn parse_number(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(leading_number)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn leading_number(s: &str) -> Option<f64> {
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }
    let ends: Vec<usize> = s.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
    ends.into_iter()
        .rev()
        .skip(1)
        .find_map(|end| s[..end].parse::<f64>().ok())
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

/// Convert one raw row into an observation, or `None` when its date is invalid.
///
/// Only the date is a hard requirement. Missing or malformed numbers become 0
/// and missing text fields become empty strings.
pub fn normalize_row(
    row: &RawRow,
    format: &SourceFormat,
    classification: Classification,
) -> Option<TariffObservation> {
    let cell = |column: &str| row.get(column).map(String::as_str);

    let effective_date = parse_date(cell(&format.date_column)?)?;

    let raw_code = cell(&format.code_column).unwrap_or("");
    let classification_code = match classification {
        Classification::Isic => normalize_isic(raw_code),
        Classification::Hs6 => raw_code.trim().to_string(),
    };

    Some(TariffObservation {
        importer: cell(&format.importer_column).unwrap_or("").trim().to_string(),
        exporter: cell(&format.exporter_column).unwrap_or("").trim().to_string(),
        classification_code,
        effective_date,
        tariff_rate_percent: parse_number(cell(&format.tariff_column)),
        trade_value_usd: parse_number(cell(&format.trade_value_column)) * format.trade_value_scale,
        affected_trade_value_usd: parse_number(cell(&format.affected_value_column)),
        affected_trade_share: parse_number(cell(&format.trade_share_column)),
        affected_line_share: parse_number(cell(&format.line_share_column)),
    })
}

/// Normalize a whole table, dropping rows with invalid dates.
pub fn normalize_rows(
    rows: &[RawRow],
    format: &SourceFormat,
    classification: Classification,
) -> Vec<TariffObservation> {
    let observations: Vec<TariffObservation> = rows
        .iter()
        .filter_map(|row| normalize_row(row, format, classification))
        .collect();

    let dropped = rows.len() - observations.len();
    if dropped > 0 {
        log::debug!(
            "{}: dropped {dropped} of {} rows without a valid date",
            format.file,
            rows.len()
        );
    }
    observations
}

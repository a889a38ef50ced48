use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

/// Importer value meaning "no importer restriction".
pub const WORLD: &str = "World";

/// Format a date the way the dashboard displays it (`M/D/YYYY`).
pub fn date_label(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

// ---------------------------------------------------------------------------
// Classification – which product nomenclature a table uses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// ISIC rev. 4, truncated to 2 digits.
    Isic,
    /// Harmonized System, 6 digits.
    Hs6,
}

impl Classification {
    pub const ALL: [Classification; 2] = [Classification::Isic, Classification::Hs6];

    /// Short label used in the filter-context panel ("ISIC 05", "HS6 All").
    pub fn short_label(self) -> &'static str {
        match self {
            Classification::Isic => "ISIC",
            Classification::Hs6 => "HS6",
        }
    }

    /// Chart title prefix for this classification.
    pub fn tariff_line_title(self) -> &'static str {
        match self {
            Classification::Isic => "ISIC4 2 Digit Tariff Line",
            Classification::Hs6 => "HS6 Tariff Line",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Isic => write!(f, "ISIC (2-digit)"),
            Classification::Hs6 => write!(f, "HS6"),
        }
    }
}

// ---------------------------------------------------------------------------
// TariffObservation – one normalized row of a tariff table
// ---------------------------------------------------------------------------

/// A single tariff observation. Only rows with a valid effective date are
/// ever turned into one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffObservation {
    pub importer: String,
    pub exporter: String,
    /// 2-digit ISIC code or verbatim HS6 code; empty means uncoded.
    pub classification_code: String,
    pub effective_date: NaiveDate,
    pub tariff_rate_percent: f64,
    /// Always in USD, already scaled from the source unit.
    pub trade_value_usd: f64,
    pub affected_trade_value_usd: f64,
    /// Fraction or percent depending on the source, see [`crate::config::ShareUnit`].
    pub affected_trade_share: f64,
    pub affected_line_share: f64,
}

// ---------------------------------------------------------------------------
// Dataset – everything loaded at startup
// ---------------------------------------------------------------------------

/// Reference lists and both observation collections. Built once by the
/// loader and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Sorted unique exporter names from the reference list.
    pub exporters: Vec<String>,
    /// Sorted unique normalized ISIC codes from the reference list.
    pub isic_codes: Vec<String>,
    /// Sorted unique HS6 codes from the reference list.
    pub hs6_codes: Vec<String>,
    isic: Vec<TariffObservation>,
    hs6: Vec<TariffObservation>,
}

impl Dataset {
    pub fn new(
        exporters: Vec<String>,
        isic_codes: Vec<String>,
        hs6_codes: Vec<String>,
        isic: Vec<TariffObservation>,
        hs6: Vec<TariffObservation>,
    ) -> Self {
        Dataset {
            exporters,
            isic_codes,
            hs6_codes,
            isic,
            hs6,
        }
    }

    /// The observation collection for a classification.
    pub fn observations(&self, classification: Classification) -> &[TariffObservation] {
        match classification {
            Classification::Isic => &self.isic,
            Classification::Hs6 => &self.hs6,
        }
    }

    /// Total number of observations across both tables.
    pub fn len(&self) -> usize {
        self.isic.len() + self.hs6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.isic.is_empty() && self.hs6.is_empty()
    }

    /// Sorted unique non-empty importers across both tables.
    pub fn importers(&self) -> Vec<String> {
        self.isic
            .iter()
            .chain(self.hs6.iter())
            .map(|o| o.importer.as_str())
            .filter(|i| !i.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Earliest and latest effective date of a classification's table.
    pub fn date_bounds(&self, classification: Classification) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.observations(classification).iter().map(|o| o.effective_date);
        let min = dates.clone().min()?;
        let max = dates.max()?;
        Some((min, max))
    }

    /// Codes offered for an importer (all importers when `importer` is World).
    pub fn codes_for(&self, classification: Classification, importer: &str) -> Vec<String> {
        self.distinct_for(classification, importer, |o| &o.classification_code)
    }

    /// Exporters offered for an importer (all importers when `importer` is World).
    pub fn exporters_for(&self, classification: Classification, importer: &str) -> Vec<String> {
        self.distinct_for(classification, importer, |o| &o.exporter)
    }

    fn distinct_for<F>(&self, classification: Classification, importer: &str, field: F) -> Vec<String>
    where
        F: Fn(&TariffObservation) -> &String,
    {
        self.observations(classification)
            .iter()
            .filter(|o| importer == WORLD || o.importer == importer)
            .map(|o| field(o).as_str())
            .filter(|v| !v.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Compact constructor for test observations.
    pub(crate) fn obs(
        importer: &str,
        exporter: &str,
        code: &str,
        date: (i32, u32, u32),
        tariff: f64,
    ) -> TariffObservation {
        TariffObservation {
            importer: importer.to_string(),
            exporter: exporter.to_string(),
            classification_code: code.to_string(),
            effective_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            tariff_rate_percent: tariff,
            trade_value_usd: 0.0,
            affected_trade_value_usd: 0.0,
            affected_trade_share: 0.0,
            affected_line_share: 0.0,
        }
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![],
            vec![],
            vec![],
            vec![
                obs("US", "China", "01", (2020, 1, 1), 5.0),
                obs("India", "Japan", "02", (2020, 1, 1), 5.0),
            ],
            vec![
                obs("US", "China", "010121", (2020, 1, 1), 5.0),
                obs("US", "", "", (2020, 1, 1), 5.0),
                obs("Brazil", "Chile", "020110", (2020, 1, 1), 5.0),
            ],
        )
    }

    #[test]
    fn date_label_is_us_style_without_padding() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
        assert_eq!(date_label(d), "1/5/2020");
        let d = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        assert_eq!(date_label(d), "12/31/2021");
    }

    #[test]
    fn importers_span_both_tables() {
        assert_eq!(sample().importers(), vec!["Brazil", "India", "US"]);
    }

    #[test]
    fn codes_and_exporters_respect_importer() {
        let ds = sample();
        assert_eq!(ds.codes_for(Classification::Hs6, "US"), vec!["010121"]);
        assert_eq!(
            ds.codes_for(Classification::Hs6, WORLD),
            vec!["010121", "020110"]
        );
        assert_eq!(ds.exporters_for(Classification::Isic, "India"), vec!["Japan"]);
        assert!(ds.exporters_for(Classification::Isic, "Brazil").is_empty());
    }

    #[test]
    fn date_bounds_per_table() {
        let mut ds = sample();
        assert_eq!(ds.date_bounds(Classification::Isic).map(|b| b.0), NaiveDate::from_ymd_opt(2020, 1, 1));
        ds.hs6.push(obs("US", "Peru", "030110", (2021, 6, 30), 1.0));
        assert_eq!(
            ds.date_bounds(Classification::Hs6),
            Some((
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2021, 6, 30).unwrap()
            ))
        );
        assert_eq!(Dataset::default().date_bounds(Classification::Hs6), None);
    }

    #[test]
    fn len_counts_both_tables() {
        let ds = sample();
        assert_eq!(ds.len(), 5);
        assert!(!ds.is_empty());
        assert!(Dataset::default().is_empty());
    }
}

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{Classification, TariffObservation, WORLD};

// ---------------------------------------------------------------------------
// Errors surfaced to the user when a filter request cannot run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Please select only one classification (ISIC {isic} and HS6 {hs6} are both set).")]
    ConflictingCodes { isic: String, hs6: String },

    #[error("Please select classification.")]
    MissingClassification,

    #[error("Please select importer.")]
    MissingImporter,

    #[error("Date range is inverted: {from} is after {to}.")]
    InvertedDateRange { from: NaiveDate, to: NaiveDate },
}

// ---------------------------------------------------------------------------
// FilterRequest – raw selections as the UI holds them
// ---------------------------------------------------------------------------

/// Filter selections before validation. Both code fields exist because the
/// ISIC and HS6 pickers are separate widgets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterRequest {
    pub importer: String,
    pub classification: Option<Classification>,
    pub isic_code: String,
    pub hs6_code: String,
    /// Selected exporters in the order they were ticked.
    pub exporters: Vec<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterRequest {
    /// The dashboard's opening view: every importer, HS6, all exporters.
    pub fn world() -> Self {
        FilterRequest {
            importer: WORLD.to_string(),
            classification: Some(Classification::Hs6),
            ..Default::default()
        }
    }

    /// Validate the selections into a single-classification [`FilterCriteria`].
    pub fn resolve(&self) -> Result<FilterCriteria, FilterError> {
        let isic = self.isic_code.trim();
        let hs6 = self.hs6_code.trim();
        if !isic.is_empty() && !hs6.is_empty() {
            return Err(FilterError::ConflictingCodes {
                isic: isic.to_string(),
                hs6: hs6.to_string(),
            });
        }
        let classification = self
            .classification
            .ok_or(FilterError::MissingClassification)?;
        if self.importer.trim().is_empty() {
            return Err(FilterError::MissingImporter);
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(FilterError::InvertedDateRange { from, to });
            }
        }

        let code = match classification {
            Classification::Isic => isic,
            Classification::Hs6 => hs6,
        };

        let mut exporters: Vec<String> = Vec::with_capacity(self.exporters.len());
        for exporter in &self.exporters {
            if !exporters.contains(exporter) {
                exporters.push(exporter.clone());
            }
        }

        Ok(FilterCriteria {
            importer: self.importer.trim().to_string(),
            classification,
            code: code.to_string(),
            exporters,
            date_from: self.date_from,
            date_to: self.date_to,
        })
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – validated predicate inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// `"World"` disables the importer predicate.
    pub importer: String,
    pub classification: Classification,
    /// Empty disables the code predicate.
    pub code: String,
    /// Empty means world mode (all exporters).
    pub exporters: Vec<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_world_mode(&self) -> bool {
        self.exporters.is_empty()
    }

    /// Whether one observation passes every predicate.
    pub fn matches(&self, obs: &TariffObservation) -> bool {
        (self.importer == WORLD || obs.importer == self.importer)
            && (self.code.is_empty() || obs.classification_code == self.code)
            && (self.exporters.is_empty() || self.exporters.contains(&obs.exporter))
            && self.date_from.map_or(true, |from| obs.effective_date >= from)
            && self.date_to.map_or(true, |to| obs.effective_date <= to)
    }
}

/// Return the observations passing `criteria`, in their original order.
pub fn filter<'a>(
    observations: &'a [TariffObservation],
    criteria: &FilterCriteria,
) -> Vec<&'a TariffObservation> {
    observations.iter().filter(|o| criteria.matches(o)).collect()
}

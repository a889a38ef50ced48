use chrono::NaiveDate;

use super::filter::{filter, FilterCriteria, FilterError, FilterRequest};
use super::model::{date_label, Classification, Dataset, TariffObservation};
use super::series::{aggregate_for_chart, ChartSeriesSet};
use super::summary::{aggregate_for_summary, SummaryOptions, SummaryRow};
use crate::config::ShareUnit;

// ---------------------------------------------------------------------------
// FilterContext – plain-text description of the active filter
// ---------------------------------------------------------------------------

/// What the dashboard shows next to the chart: which filter produced the view
/// and how many rows carry an executive-order related trade value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterContext {
    pub importer: String,
    pub exporters: String,
    pub classification: String,
    pub date_range: String,
    /// Filtered observations with a positive affected trade value.
    pub eo_related_actions: usize,
    pub is_empty: bool,
}

impl FilterContext {
    pub fn new(criteria: &FilterCriteria, filtered: &[&TariffObservation]) -> Self {
        let exporters = match criteria.exporters.as_slice() {
            [] => "World".to_string(),
            [single] => single.clone(),
            many => format!("{} exporters", many.len()),
        };

        let code = if criteria.code.is_empty() {
            "All"
        } else {
            criteria.code.as_str()
        };

        FilterContext {
            importer: criteria.importer.clone(),
            exporters,
            classification: format!("{} {code}", criteria.classification.short_label()),
            date_range: date_range_text(criteria.date_from, criteria.date_to),
            eo_related_actions: filtered
                .iter()
                .filter(|o| o.affected_trade_value_usd > 0.0)
                .count(),
            is_empty: filtered.is_empty(),
        }
    }
}

fn date_range_text(from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
    if from.is_none() && to.is_none() {
        return "All Dates".to_string();
    }
    let side = |d: Option<NaiveDate>| d.map(date_label).unwrap_or_else(|| "…".to_string());
    format!("{} → {}", side(from), side(to))
}

/// Chart heading for a classification and optional code.
pub fn chart_title(classification: Classification, code: &str) -> String {
    let base = classification.tariff_line_title();
    if code.is_empty() {
        base.to_string()
    } else {
        format!("{base} {code}")
    }
}

// ---------------------------------------------------------------------------
// DashboardView – everything rendered after one Apply
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub criteria: FilterCriteria,
    pub title: String,
    pub series: ChartSeriesSet,
    pub summary: Vec<SummaryRow>,
    pub context: FilterContext,
    pub observation_count: usize,
}

impl DashboardView {
    /// Whether the summary table carries the share columns.
    pub fn has_share_columns(&self) -> bool {
        self.criteria.classification == Classification::Hs6
    }
}

/// Resolve a request and run filter and both aggregators over `dataset`.
///
/// A request that cannot be resolved returns the error untouched; no partial
/// view is produced.
pub fn build_view(
    dataset: &Dataset,
    request: &FilterRequest,
    share_unit: ShareUnit,
) -> Result<DashboardView, FilterError> {
    let criteria = request.resolve()?;
    let filtered = filter(dataset.observations(criteria.classification), &criteria);

    let options = SummaryOptions {
        include_shares: criteria.classification == Classification::Hs6,
        share_unit,
    };

    log::debug!(
        "filter {:?}: {} of {} observations",
        criteria,
        filtered.len(),
        dataset.observations(criteria.classification).len()
    );

    Ok(DashboardView {
        title: chart_title(criteria.classification, &criteria.code),
        series: aggregate_for_chart(&filtered, &criteria.exporters),
        summary: aggregate_for_summary(&filtered, &options),
        context: FilterContext::new(&criteria, &filtered),
        observation_count: filtered.len(),
        criteria,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::obs;
    use crate::data::model::WORLD;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        let mut affected = obs("US", "China", "010121", (2020, 1, 1), 10.0);
        affected.affected_trade_value_usd = 500.0;
        Dataset::new(
            vec!["China".into(), "Japan".into()],
            vec!["01".into()],
            vec!["010121".into()],
            vec![obs("US", "China", "01", (2020, 1, 1), 5.0)],
            vec![
                affected,
                obs("US", "Japan", "010121", (2020, 1, 2), 20.0),
                obs("India", "China", "020110", (2020, 1, 1), 30.0),
            ],
        )
    }

    #[test]
    fn world_view_covers_hs6_table() {
        let view = build_view(&dataset(), &FilterRequest::world(), ShareUnit::Auto).unwrap();
        assert_eq!(view.title, "HS6 Tariff Line");
        assert_eq!(view.observation_count, 3);
        assert_eq!(view.series.series.len(), 1);
        assert_eq!(view.series.series[0].y, vec![Some(20.0), Some(20.0)]);
        assert_eq!(view.summary.len(), 2);
        assert!(view.has_share_columns());
        assert!(view.summary[0].affected_trade_share_percent.is_some());
        assert_eq!(view.context.eo_related_actions, 1);
        assert_eq!(view.context.exporters, "World");
        assert_eq!(view.context.classification, "HS6 All");
        assert_eq!(view.context.date_range, "All Dates");
    }

    #[test]
    fn isic_view_has_no_share_columns() {
        let request = FilterRequest {
            importer: "US".into(),
            classification: Some(Classification::Isic),
            isic_code: "01".into(),
            ..Default::default()
        };
        let view = build_view(&dataset(), &request, ShareUnit::Auto).unwrap();
        assert_eq!(view.title, "ISIC4 2 Digit Tariff Line 01");
        assert!(!view.has_share_columns());
        assert_eq!(view.summary[0].affected_line_share_percent, None);
        assert_eq!(view.context.classification, "ISIC 01");
    }

    #[test]
    fn conflicting_codes_produce_no_view() {
        let request = FilterRequest {
            isic_code: "01".into(),
            hs6_code: "010121".into(),
            ..FilterRequest::world()
        };
        assert!(matches!(
            build_view(&dataset(), &request, ShareUnit::Auto),
            Err(FilterError::ConflictingCodes { .. })
        ));
    }

    #[test]
    fn context_describes_exporters_and_dates() {
        let request = FilterRequest {
            exporters: vec!["China".into(), "Japan".into()],
            date_from: Some(ymd(2020, 1, 1)),
            ..FilterRequest::world()
        };
        let view = build_view(&dataset(), &request, ShareUnit::Auto).unwrap();
        assert_eq!(view.context.exporters, "2 exporters");
        assert_eq!(view.context.date_range, "1/1/2020 → …");
        assert_eq!(view.series.series.len(), 2);

        let request = FilterRequest {
            exporters: vec!["Japan".into()],
            date_to: Some(ymd(2019, 12, 31)),
            ..FilterRequest::world()
        };
        let view = build_view(&dataset(), &request, ShareUnit::Auto).unwrap();
        assert_eq!(view.context.exporters, "Japan");
        assert_eq!(view.context.date_range, "… → 12/31/2019");
        assert!(view.context.is_empty);
        assert!(view.series.is_empty());
        assert!(view.summary.is_empty());
    }

    #[test]
    fn same_request_twice_gives_same_view() {
        let ds = dataset();
        let request = FilterRequest {
            importer: WORLD.into(),
            exporters: vec!["Japan".into(), "China".into()],
            ..FilterRequest::world()
        };
        let a = build_view(&ds, &request, ShareUnit::Auto).unwrap();
        let b = build_view(&ds, &request, ShareUnit::Auto).unwrap();
        assert_eq!(a, b);
    }
}

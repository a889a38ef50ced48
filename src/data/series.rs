use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{date_label, TariffObservation};

/// Name of the single series produced in world mode.
pub const WORLD_SERIES: &str = "World";

// ---------------------------------------------------------------------------
// Chart-ready series
// ---------------------------------------------------------------------------

/// One line on the chart. `x` and `y` have the same length; `None` in `y`
/// means "no observation that day" and is drawn as a gap, never as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<Option<f64>>,
}

/// Calendar label for one position on the shared date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabel {
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSeriesSet {
    pub series: Vec<ChartSeries>,
    pub ticks: Vec<TickLabel>,
}

impl ChartSeriesSet {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Tariff rates bucketed per calendar date, restricted by `keep`.
fn daily_tariffs<F>(filtered: &[&TariffObservation], keep: F) -> BTreeMap<NaiveDate, Vec<f64>>
where
    F: Fn(&TariffObservation) -> bool,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for obs in filtered.iter().copied().filter(|&o| keep(o)) {
        buckets
            .entry(obs.effective_date)
            .or_default()
            .push(obs.tariff_rate_percent);
    }
    buckets
}

/// Build the chart series for a filtered observation set.
///
/// With no exporters selected a single "World" series holds the unweighted
/// mean tariff per date across every exporter. Otherwise each selected
/// exporter gets its own series, in selection order, on a date axis shared by
/// all series.
pub fn aggregate_for_chart(filtered: &[&TariffObservation], exporters: &[String]) -> ChartSeriesSet {
    if filtered.is_empty() {
        return ChartSeriesSet::default();
    }

    let all_dates: Vec<NaiveDate> = filtered
        .iter()
        .map(|o| o.effective_date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let series = if exporters.is_empty() {
        let buckets = daily_tariffs(filtered, |_| true);
        vec![ChartSeries {
            name: WORLD_SERIES.to_string(),
            x: buckets.keys().copied().collect(),
            y: buckets.values().map(|v| Some(mean(v))).collect(),
        }]
    } else {
        exporters
            .iter()
            .map(|exporter| {
                let buckets = daily_tariffs(filtered, |o| &o.exporter == exporter);
                ChartSeries {
                    name: exporter.clone(),
                    x: all_dates.clone(),
                    y: all_dates
                        .iter()
                        .map(|d| buckets.get(d).map(|v| mean(v)))
                        .collect(),
                }
            })
            .collect()
    };

    let ticks = all_dates
        .iter()
        .map(|&date| TickLabel {
            date,
            label: date_label(date),
        })
        .collect();

    ChartSeriesSet { series, ticks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::obs;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_input_gives_empty_set() {
        let set = aggregate_for_chart(&[], &[]);
        assert!(set.is_empty());
        assert!(set.ticks.is_empty());
        let set = aggregate_for_chart(&[], &["China".to_string()]);
        assert!(set.is_empty());
    }

    #[test]
    fn world_mode_averages_across_all_exporters() {
        let data = vec![
            obs("US", "China", "01", (2020, 2, 1), 10.0),
            obs("US", "Japan", "01", (2020, 1, 1), 4.0),
            obs("US", "China", "01", (2020, 1, 1), 2.0),
            obs("US", "Korea", "01", (2020, 1, 1), 6.0),
        ];
        let refs: Vec<_> = data.iter().collect();
        let set = aggregate_for_chart(&refs, &[]);

        assert_eq!(set.series.len(), 1);
        let world = &set.series[0];
        assert_eq!(world.name, "World");
        assert_eq!(world.x, vec![ymd(2020, 1, 1), ymd(2020, 2, 1)]);
        assert_eq!(world.y, vec![Some(4.0), Some(10.0)]);
        assert_eq!(set.ticks[0].label, "1/1/2020");
        assert_eq!(set.ticks[1].label, "2/1/2020");
    }

    #[test]
    fn exporter_mode_marks_missing_days() {
        let data = vec![
            obs("US", "A", "01", (2020, 1, 1), 5.0),
            obs("US", "A", "01", (2020, 1, 1), 7.0),
            obs("US", "B", "01", (2020, 1, 2), 0.0),
        ];
        let refs: Vec<_> = data.iter().collect();
        let set = aggregate_for_chart(&refs, &["B".to_string(), "A".to_string()]);

        let names: Vec<_> = set.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);

        let axis = vec![ymd(2020, 1, 1), ymd(2020, 1, 2)];
        let b = &set.series[0];
        let a = &set.series[1];
        assert_eq!(a.x, axis);
        assert_eq!(b.x, axis);
        assert_eq!(a.y, vec![Some(6.0), None]);
        assert_eq!(b.y, vec![None, Some(0.0)]);
    }

    #[test]
    fn selected_exporter_without_rows_is_all_missing() {
        let data = vec![obs("US", "A", "01", (2020, 1, 1), 5.0)];
        let refs: Vec<_> = data.iter().collect();
        let set = aggregate_for_chart(&refs, &["A".to_string(), "Z".to_string()]);
        assert_eq!(set.series[1].name, "Z");
        assert_eq!(set.series[1].y, vec![None]);
    }

    #[test]
    fn chart_never_weights_by_trade_value() {
        let mut heavy = obs("US", "A", "01", (2020, 1, 1), 10.0);
        heavy.trade_value_usd = 1_000_000.0;
        let light = obs("US", "A", "01", (2020, 1, 1), 20.0);
        let data = [heavy, light];
        let refs: Vec<_> = data.iter().collect();
        let set = aggregate_for_chart(&refs, &[]);
        assert_eq!(set.series[0].y, vec![Some(15.0)]);
    }
}

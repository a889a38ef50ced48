use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{date_label, TariffObservation};
use crate::config::ShareUnit;

// ---------------------------------------------------------------------------
// Options and output rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryOptions {
    /// Emit the two share columns (the HS6 table variant).
    pub include_shares: bool,
    pub share_unit: ShareUnit,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            include_shares: false,
            share_unit: ShareUnit::Auto,
        }
    }
}

/// One (exporter, date) group of the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub exporter: String,
    pub date: NaiveDate,
    pub simple_average_tariff: f64,
    /// Zero when the group's trade values sum to zero.
    pub trade_weighted_average_tariff: f64,
    pub total_affected_trade_value: f64,
    /// Mean share of affected trade, in percent.
    pub affected_trade_share_percent: Option<f64>,
    /// Mean share of affected tariff lines, in percent.
    pub affected_line_share_percent: Option<f64>,
}

impl SummaryRow {
    /// Rendered cells, in the column order of [`summary_headers`].
    pub fn display(&self, tariff_decimals: usize) -> Vec<String> {
        let mut cells = vec![
            self.exporter.clone(),
            date_label(self.date),
            format!("{:.*}", tariff_decimals, self.simple_average_tariff),
            format!("{:.*}", tariff_decimals, self.trade_weighted_average_tariff),
            format!("{:.0}", self.total_affected_trade_value),
        ];
        cells.extend(
            [self.affected_trade_share_percent, self.affected_line_share_percent]
                .into_iter()
                .flatten()
                .map(|pct| format!("{pct:.2}%")),
        );
        cells
    }
}

/// Column headers of the summary table.
pub fn summary_headers(include_shares: bool) -> Vec<&'static str> {
    let mut headers = vec![
        "Exporter",
        "Date",
        "Simple Avg Tariff (%)",
        "Trade-Weighted Avg Tariff (%)",
        "Affected Trade Value (USD)",
    ];
    if include_shares {
        headers.extend(["Affected Trade Share", "Affected Line Share"]);
    }
    headers
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct GroupAccumulator {
    count: usize,
    tariff_sum: f64,
    weighted_sum: f64,
    trade_value_sum: f64,
    affected_sum: f64,
    trade_share_sum: f64,
    line_share_sum: f64,
}

impl GroupAccumulator {
    fn add(&mut self, obs: &TariffObservation, share_unit: ShareUnit) {
        self.count += 1;
        self.tariff_sum += obs.tariff_rate_percent;
        self.weighted_sum += obs.tariff_rate_percent * obs.trade_value_usd;
        self.trade_value_sum += obs.trade_value_usd;
        self.affected_sum += obs.affected_trade_value_usd;
        self.trade_share_sum += share_unit.to_fraction(obs.affected_trade_share);
        self.line_share_sum += share_unit.to_fraction(obs.affected_line_share);
    }

    fn finish(self, exporter: String, date: NaiveDate, include_shares: bool) -> SummaryRow {
        let n = self.count as f64;
        let weighted = if self.trade_value_sum == 0.0 {
            0.0
        } else {
            self.weighted_sum / self.trade_value_sum
        };
        let share = |sum: f64| include_shares.then(|| sum / n * 100.0);
        SummaryRow {
            exporter,
            date,
            simple_average_tariff: self.tariff_sum / n,
            trade_weighted_average_tariff: weighted,
            total_affected_trade_value: self.affected_sum,
            affected_trade_share_percent: share(self.trade_share_sum),
            affected_line_share_percent: share(self.line_share_sum),
        }
    }
}

/// Group by (exporter, date) and compute the summary statistics.
///
/// Rows come out sorted by date, then exporter name.
pub fn aggregate_for_summary(filtered: &[&TariffObservation], options: &SummaryOptions) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(NaiveDate, &str), GroupAccumulator> = BTreeMap::new();
    for obs in filtered {
        groups
            .entry((obs.effective_date, obs.exporter.as_str()))
            .or_default()
            .add(obs, options.share_unit);
    }

    groups
        .into_iter()
        .map(|((date, exporter), acc)| acc.finish(exporter.to_string(), date, options.include_shares))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::obs;

    fn traded(exporter: &str, date: (i32, u32, u32), tariff: f64, value: f64) -> TariffObservation {
        let mut o = obs("US", exporter, "01", date, tariff);
        o.trade_value_usd = value;
        o
    }

    #[test]
    fn simple_and_weighted_average() {
        let data = vec![
            traded("China", (2020, 1, 1), 10.0, 1000.0),
            traded("China", (2020, 1, 1), 20.0, 3000.0),
        ];
        let refs: Vec<_> = data.iter().collect();
        let rows = aggregate_for_summary(&refs, &SummaryOptions::default());

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.exporter, "China");
        assert_eq!(row.simple_average_tariff, 15.0);
        assert_eq!(row.trade_weighted_average_tariff, 17.5);
        assert_eq!(row.total_affected_trade_value, 0.0);
        assert_eq!(row.affected_trade_share_percent, None);
    }

    #[test]
    fn zero_trade_value_gives_zero_weighted_average() {
        let data = vec![
            traded("China", (2020, 1, 1), 10.0, 0.0),
            traded("China", (2020, 1, 1), 30.0, 0.0),
        ];
        let refs: Vec<_> = data.iter().collect();
        let rows = aggregate_for_summary(&refs, &SummaryOptions::default());
        assert_eq!(rows[0].trade_weighted_average_tariff, 0.0);
        assert!(!rows[0].trade_weighted_average_tariff.is_nan());
        assert_eq!(rows[0].simple_average_tariff, 20.0);
    }

    #[test]
    fn sums_affected_trade_value() {
        let mut a = traded("China", (2020, 1, 1), 1.0, 1.0);
        a.affected_trade_value_usd = 250.0;
        let mut b = traded("China", (2020, 1, 1), 1.0, 1.0);
        b.affected_trade_value_usd = 750.5;
        let data = [a, b];
        let refs: Vec<_> = data.iter().collect();
        let rows = aggregate_for_summary(&refs, &SummaryOptions::default());
        assert_eq!(rows[0].total_affected_trade_value, 1000.5);
    }

    #[test]
    fn rows_sorted_by_date_then_exporter() {
        let data = vec![
            traded("Japan", (2020, 2, 1), 1.0, 1.0),
            traded("Japan", (2020, 1, 1), 1.0, 1.0),
            traded("China", (2020, 2, 1), 1.0, 1.0),
            traded("Brazil", (2020, 1, 1), 1.0, 1.0),
        ];
        let refs: Vec<_> = data.iter().collect();
        let rows = aggregate_for_summary(&refs, &SummaryOptions::default());
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (date_label(r.date), r.exporter.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("1/1/2020".to_string(), "Brazil"),
                ("1/1/2020".to_string(), "Japan"),
                ("2/1/2020".to_string(), "China"),
                ("2/1/2020".to_string(), "Japan"),
            ]
        );
    }

    #[test]
    fn shares_mix_fractions_and_percents_under_auto() {
        let mut a = traded("China", (2020, 1, 1), 1.0, 1.0);
        a.affected_trade_share = 0.5;
        a.affected_line_share = 40.0;
        let mut b = traded("China", (2020, 1, 1), 1.0, 1.0);
        b.affected_trade_share = 30.0;
        b.affected_line_share = 0.2;
        let data = [a, b];
        let refs: Vec<_> = data.iter().collect();
        let options = SummaryOptions {
            include_shares: true,
            ..Default::default()
        };
        let row = &aggregate_for_summary(&refs, &options)[0];
        let trade = row.affected_trade_share_percent.unwrap();
        let line = row.affected_line_share_percent.unwrap();
        assert!((trade - 40.0).abs() < 1e-9);
        assert!((line - 30.0).abs() < 1e-9);
    }

    #[test]
    fn percent_share_unit_divides_everything() {
        let mut a = traded("China", (2020, 1, 1), 1.0, 1.0);
        a.affected_trade_share = 0.5;
        let data = [a];
        let refs: Vec<_> = data.iter().collect();
        let options = SummaryOptions {
            include_shares: true,
            share_unit: ShareUnit::Percent,
            ..Default::default()
        };
        let row = &aggregate_for_summary(&refs, &options)[0];
        assert!((row.affected_trade_share_percent.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn display_formats_cells() {
        let row = SummaryRow {
            exporter: "China".into(),
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            simple_average_tariff: 15.0,
            trade_weighted_average_tariff: 17.5,
            total_affected_trade_value: 1234.6,
            affected_trade_share_percent: Some(12.346),
            affected_line_share_percent: Some(100.0),
        };
        assert_eq!(
            row.display(3),
            vec!["China", "1/1/2020", "15.000", "17.500", "1235", "12.35%", "100.00%"]
        );
        assert_eq!(summary_headers(true).len(), row.display(3).len());

        let plain = SummaryRow {
            affected_trade_share_percent: None,
            affected_line_share_percent: None,
            ..row
        };
        assert_eq!(plain.display(2).len(), summary_headers(false).len());
        assert_eq!(plain.display(2)[2], "15.00");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let data = vec![
            traded("Japan", (2020, 2, 1), 3.0, 10.0),
            traded("China", (2020, 1, 1), 5.0, 20.0),
            traded("China", (2020, 1, 1), 7.0, 0.0),
        ];
        let refs: Vec<_> = data.iter().collect();
        let options = SummaryOptions::default();
        assert_eq!(
            aggregate_for_summary(&refs, &options),
            aggregate_for_summary(&refs, &options)
        );
    }
}

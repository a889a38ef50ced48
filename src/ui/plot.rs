use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Ui, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::color::{SeriesColors, WORLD_COLOR};
use crate::data::model::date_label;
use crate::data::series::ChartSeries;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Date axis helpers
// ---------------------------------------------------------------------------

/// Plot x coordinate of a date (days since the common era).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Break a series into drawable step segments ("hv" shape). Missing values
/// split the line so a gap is shown instead of a drop to zero.
pub fn step_segments(series: &ChartSeries) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for (i, (date, value)) in series.x.iter().zip(&series.y).enumerate() {
        let Some(y) = *value else {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            continue;
        };
        let x = date_to_x(*date);
        current.push([x, y]);
        // Hold the value until the next observed date.
        if let (Some(next_date), Some(Some(_))) = (series.x.get(i + 1), series.y.get(i + 1)) {
            current.push([date_to_x(*next_date), y]);
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

// ---------------------------------------------------------------------------
// Tariff chart (central panel)
// ---------------------------------------------------------------------------

/// Render the time-series chart for the current view.
pub fn tariff_chart(ui: &mut Ui, state: &AppState) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(
                RichText::new(format!("Failed to load data:\n{err}"))
                    .color(ui.visuals().error_fg_color),
            );
        });
        return;
    }

    let view = match &state.view {
        Some(v) => v,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Loading data…  (File → Open data folder…)");
            });
            return;
        }
    };

    if view.series.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No Data");
        });
        return;
    }

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&view.title);
    });

    let world_mode = view.criteria.is_world_mode();
    let colors = SeriesColors::new(view.series.series.iter().map(|s| s.name.as_str()));

    // Tick text comes from the prepared labels; other grid positions fall
    // back to formatting the date directly.
    let labels: BTreeMap<i64, String> = view
        .series
        .ticks
        .iter()
        .map(|t| (date_to_x(t.date) as i64, t.label.clone()))
        .collect();

    let mut plot = Plot::new("tariff_chart")
        .x_axis_label("Date")
        .y_axis_label("Tariff (%)")
        .x_axis_formatter(move |mark, _range| {
            labels
                .get(&(mark.value.round() as i64))
                .cloned()
                .or_else(|| x_to_date(mark.value).map(date_label))
                .unwrap_or_default()
        })
        .label_formatter(|name, value| {
            let date = x_to_date(value.x).map(date_label).unwrap_or_default();
            if name.is_empty() {
                format!("{date}\n{:.3}%", value.y)
            } else {
                format!("{name}\n{date}\n{:.3}%", value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if !world_mode {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        for series in &view.series.series {
            let color = if world_mode {
                WORLD_COLOR
            } else {
                colors.color_for(&series.name)
            };

            for segment in step_segments(series) {
                let points: PlotPoints = segment.into_iter().collect();
                plot_ui.line(Line::new(points).name(&series.name).color(color).width(3.0));
            }

            let markers: PlotPoints = series
                .x
                .iter()
                .zip(&series.y)
                .filter_map(|(d, y)| y.map(|y| [date_to_x(*d), y]))
                .collect();
            plot_ui.points(Points::new(markers).name(&series.name).color(color).radius(4.0));
        }
    });
}

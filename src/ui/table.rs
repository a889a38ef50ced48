use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::summary::summary_headers;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Summary table (bottom panel)
// ---------------------------------------------------------------------------

/// Render the paginated summary table of the current view.
pub fn summary_table(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Summary");
    ui.separator();

    let Some(view) = &state.view else {
        return;
    };
    if view.summary.is_empty() {
        ui.label(RichText::new("No data available in table").weak());
        return;
    }

    let page_size = state.config.page_size.max(1);
    let total_pages = state.summary_page_count();
    let page = state.summary_page.min(total_pages.saturating_sub(1));
    let start = page * page_size;
    let end = (start + page_size).min(view.summary.len());
    let total_rows = view.summary.len();

    let headers = summary_headers(view.has_share_columns());
    let decimals = state.config.tariff_decimals;
    let cells: Vec<Vec<String>> = view.summary[start..end]
        .iter()
        .map(|row| row.display(decimals))
        .collect();

    let text_height = egui::TextStyle::Body.resolve(ui.style()).size;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(80.0).clip(true), headers.len())
        .header(24.0, |mut header| {
            for name in &headers {
                header.col(|ui| {
                    ui.label(RichText::new(*name).strong());
                });
            }
        })
        .body(|body| {
            body.rows(text_height + 8.0, cells.len(), |mut row| {
                for cell in &cells[row.index()] {
                    row.col(|ui| {
                        ui.label(RichText::new(cell).monospace());
                    });
                }
            });
        });

    pagination_controls(ui, state, start, end, total_rows, page, total_pages);
}

fn pagination_controls(
    ui: &mut Ui,
    state: &mut AppState,
    start: usize,
    end: usize,
    total_rows: usize,
    page: usize,
    total_pages: usize,
) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "Showing {} to {end} of {total_rows} entries",
            start + 1
        ));
        ui.separator();
        if ui
            .add_enabled(page > 0, egui::Button::new("◀ Previous"))
            .clicked()
        {
            state.summary_page = page - 1;
        }
        ui.label(format!("Page {} of {total_pages}", page + 1));
        if ui
            .add_enabled(page + 1 < total_pages, egui::Button::new("Next ▶"))
            .clicked()
        {
            state.summary_page = page + 1;
        }
    });
}

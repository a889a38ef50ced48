use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TariffDashboardApp {
    pub state: AppState,
}

impl TariffDashboardApp {
    /// Create the app and load the configured data before the first frame.
    pub fn new(mut state: AppState) -> Self {
        state.load();
        Self { state }
    }
}

impl eframe::App for TariffDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: filter context ----
        egui::SidePanel::right("context_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::context_panel(ui, &self.state);
            });

        // ---- Bottom panel: summary table ----
        egui::TopBottomPanel::bottom("summary_panel")
            .default_height(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::summary_table(ui, &mut self.state);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::tariff_chart(ui, &self.state);
        });
    }
}

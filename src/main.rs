mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::TariffDashboardApp;
use config::AppConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let state = AppState::from_config(AppConfig::load());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tariff Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(TariffDashboardApp::new(state)))),
    )
}

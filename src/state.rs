use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::data::filter::FilterRequest;
use crate::data::loader::load_dataset;
use crate::data::model::{Classification, Dataset, WORLD};
use crate::data::view::{build_view, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Dataset>,

    /// Set when the last load failed; no view is shown while present.
    pub load_error: Option<String>,

    /// Current filter selections, edited by the side panel.
    pub request: FilterRequest,

    /// Outputs of the last successful Apply.
    pub view: Option<DashboardView>,

    /// Status / validation message shown in the UI.
    pub status_message: Option<String>,

    /// Zero-based page of the summary table.
    pub summary_page: usize,

    /// Set when the configuration file could not be read. Loading stays
    /// blocked until the user picks a data folder explicitly.
    config_error: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            dataset: None,
            load_error: None,
            request: FilterRequest::world(),
            view: None,
            status_message: None,
            summary_page: 0,
            config_error: None,
        }
    }

    /// State for a configuration load result. A broken configuration falls
    /// back to the defaults but is reported instead of loading from them.
    pub fn from_config(config: anyhow::Result<AppConfig>) -> Self {
        match config {
            Ok(config) => Self::new(config),
            Err(e) => {
                log::error!("Invalid configuration: {e:#}");
                let mut state = Self::new(AppConfig::default());
                state.config_error = Some(format!("Invalid configuration: {e:#}"));
                state
            }
        }
    }

    /// Load all files named by the configuration and render the opening view.
    pub fn load(&mut self) {
        if let Some(err) = &self.config_error {
            self.dataset = None;
            self.view = None;
            self.load_error = Some(err.clone());
            return;
        }
        log::info!("Loading tariff data from {}", self.config.data_dir.display());
        match load_dataset(&self.config) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} observations, {} exporters, {} ISIC / {} HS6 codes",
                    dataset.len(),
                    dataset.exporters.len(),
                    dataset.isic_codes.len(),
                    dataset.hs6_codes.len()
                );
                if dataset.is_empty() {
                    log::warn!("Both tariff tables are empty; every view will show No Data");
                }
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.dataset = None;
                self.view = None;
                self.load_error = Some(format!("{e:#}"));
            }
        }
    }

    /// Point the configuration at another directory and reload.
    pub fn load_from_dir(&mut self, dir: PathBuf) {
        self.config_error = None;
        self.config.data_dir = dir;
        self.load();
    }

    /// Ingest a newly loaded dataset and show the world view.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.load_error = None;
        self.request = FilterRequest::world();
        self.apply_filters();
    }

    /// Run the pipeline for the current selections. On a validation error the
    /// previous view stays on screen and the error becomes the status message.
    pub fn apply_filters(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        match build_view(dataset, &self.request, self.config.share_unit) {
            Ok(view) => {
                self.view = Some(view);
                self.summary_page = 0;
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Filter rejected: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Importer dropdown changed.
    pub fn set_importer(&mut self, importer: String) {
        self.request.importer = importer;
        self.request.isic_code.clear();
        self.request.hs6_code.clear();
        self.request.exporters.clear();

        if self.request.importer == WORLD {
            self.request.classification = Some(Classification::Hs6);
            self.apply_filters();
        }
    }

    /// Classification dropdown changed. Only allowed once a specific importer
    /// is chosen.
    pub fn set_classification(&mut self, classification: Classification) {
        self.request.isic_code.clear();
        self.request.hs6_code.clear();
        self.request.exporters.clear();

        if self.request.importer.is_empty() || self.request.importer == WORLD {
            self.request.classification = None;
            self.status_message = Some(
                "Please select a specific Importer country first to view its codes and exporters."
                    .to_string(),
            );
            return;
        }
        self.request.classification = Some(classification);
        self.status_message = None;
    }

    /// Tick or untick an exporter, keeping selection order.
    pub fn toggle_exporter(&mut self, exporter: &str) {
        let selected = &mut self.request.exporters;
        if let Some(pos) = selected.iter().position(|e| e == exporter) {
            selected.remove(pos);
        } else {
            selected.push(exporter.to_string());
        }
    }

    /// Text shown on the collapsed exporter picker.
    pub fn exporter_display_text(&self) -> String {
        match self.request.exporters.as_slice() {
            [] => "World (All Exporters)".to_string(),
            [single] => single.clone(),
            many => format!("{} exporters selected", many.len()),
        }
    }

    /// Codes offered by the active code picker.
    pub fn code_options(&self) -> Vec<String> {
        match (&self.dataset, self.request.classification) {
            (Some(ds), Some(class)) => ds.codes_for(class, &self.request.importer),
            _ => Vec::new(),
        }
    }

    /// Exporters offered by the exporter picker.
    pub fn exporter_options(&self) -> Vec<String> {
        match (&self.dataset, self.request.classification) {
            (Some(ds), Some(class)) => ds.exporters_for(class, &self.request.importer),
            _ => Vec::new(),
        }
    }

    /// Importers offered by the importer picker, World first.
    pub fn importer_options(&self) -> Vec<String> {
        let mut options = vec![WORLD.to_string()];
        if let Some(ds) = &self.dataset {
            options.extend(ds.importers());
        }
        options
    }

    /// First and last effective date of the active classification's table.
    /// `None` until a classification is chosen or when its table is empty.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (&self.dataset, self.request.classification) {
            (Some(ds), Some(class)) => ds.date_bounds(class),
            _ => None,
        }
    }

    pub fn summary_page_count(&self) -> usize {
        let rows = self.view.as_ref().map_or(0, |v| v.summary.len());
        rows.div_ceil(self.config.page_size.max(1))
    }
}

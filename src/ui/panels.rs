use chrono::NaiveDate;
use eframe::egui::{self, ScrollArea, Ui, RichText};
use egui_extras::DatePickerButton;

use crate::data::model::Classification;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.load_error.is_some() {
        ui.label(RichText::new("Data failed to load.").color(ui.visuals().error_fg_color));
        return;
    }
    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            importer_picker(ui, state);
            ui.add_space(4.0);
            classification_picker(ui, state);
            ui.add_space(4.0);
            code_pickers(ui, state);
            ui.separator();
            exporter_picker(ui, state);
            ui.separator();
            date_range(ui, state);
            ui.separator();

            if ui.button("Apply Filters").clicked() {
                state.apply_filters();
            }

            if let Some(msg) = &state.status_message {
                ui.add_space(4.0);
                ui.label(RichText::new(msg).color(ui.visuals().warn_fg_color));
            }
        });
}

fn importer_picker(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Importer");
    let options = state.importer_options();
    let current = state.request.importer.clone();
    let mut chosen: Option<String> = None;

    egui::ComboBox::from_id_salt("importer")
        .selected_text(if current.is_empty() { "Select…" } else { current.as_str() })
        .show_ui(ui, |ui: &mut Ui| {
            for option in &options {
                if ui.selectable_label(current == *option, option).clicked() {
                    chosen = Some(option.clone());
                }
            }
        });

    if let Some(importer) = chosen.filter(|i| *i != current) {
        state.set_importer(importer);
    }
}

fn classification_picker(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Classification");
    let current = state.request.classification;
    let mut chosen: Option<Classification> = None;

    egui::ComboBox::from_id_salt("classification")
        .selected_text(current.map_or_else(|| "Select…".to_string(), |c| c.to_string()))
        .show_ui(ui, |ui: &mut Ui| {
            for class in Classification::ALL {
                if ui
                    .selectable_label(current == Some(class), class.to_string())
                    .clicked()
                {
                    chosen = Some(class);
                }
            }
        });

    if let Some(class) = chosen.filter(|c| Some(*c) != current) {
        state.set_classification(class);
    }
}

fn code_pickers(ui: &mut Ui, state: &mut AppState) {
    let options = state.code_options();
    let active = state.request.classification;

    for class in Classification::ALL {
        let enabled = active == Some(class);
        let label = match class {
            Classification::Isic => "ISIC 2-digit code",
            Classification::Hs6 => "HS6 code",
        };
        let code = match class {
            Classification::Isic => &mut state.request.isic_code,
            Classification::Hs6 => &mut state.request.hs6_code,
        };

        ui.add_enabled_ui(enabled, |ui: &mut Ui| {
            ui.label(label);
            egui::ComboBox::from_id_salt(label)
                .selected_text(if code.is_empty() { "All" } else { code.as_str() })
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(code, String::new(), "All");
                    if enabled {
                        for option in &options {
                            ui.selectable_value(code, option.clone(), option);
                        }
                    }
                });
        });
    }
}

fn exporter_picker(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Exporters");
    let options = state.exporter_options();
    let header = if state.request.classification.is_none() {
        "Select Classification First".to_string()
    } else if options.is_empty() {
        "No exporters found".to_string()
    } else {
        state.exporter_display_text()
    };

    egui::CollapsingHeader::new(header)
        .id_salt("exporters")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("None").clicked() {
                    state.request.exporters.clear();
                }
            });
            for exporter in &options {
                let mut checked = state.request.exporters.contains(exporter);
                if ui.checkbox(&mut checked, exporter).changed() {
                    state.toggle_exporter(exporter);
                }
            }
        });
}

fn date_range(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Date range");
    let Some((first, last)) = state.date_bounds() else {
        let hint = if state.request.classification.is_none() {
            "Select Classification First"
        } else {
            "No dates available"
        };
        ui.label(RichText::new(hint).weak());
        return;
    };

    date_bound(ui, "From", "date_from", &mut state.request.date_from, first);
    date_bound(ui, "To", "date_to", &mut state.request.date_to, last);
}

/// An optional inclusive bound: unticked means unbounded on that side.
fn date_bound(ui: &mut Ui, label: &str, id: &str, bound: &mut Option<NaiveDate>, initial: NaiveDate) {
    ui.horizontal(|ui: &mut Ui| {
        let mut enabled = bound.is_some();
        if ui.checkbox(&mut enabled, label).changed() {
            *bound = enabled.then_some(bound.unwrap_or(initial));
        }
        if let Some(date) = bound.as_mut() {
            ui.add(DatePickerButton::new(date).id_salt(id));
        }
    });
}

// ---------------------------------------------------------------------------
// Right side panel – filter context
// ---------------------------------------------------------------------------

/// Describe the filter behind the current view.
pub fn context_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Context");
    ui.separator();

    let Some(view) = &state.view else {
        return;
    };
    let ctx = &view.context;
    if ctx.is_empty {
        ui.label("No EO-related data.");
        return;
    }

    egui::Grid::new("context_grid")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (key, value) in [
                ("Importer:", ctx.importer.clone()),
                ("Exporter:", ctx.exporters.clone()),
                ("Classification:", ctx.classification.clone()),
                ("Date Range:", ctx.date_range.clone()),
                ("EO-related actions:", ctx.eo_related_actions.to_string()),
            ] {
                ui.strong(key);
                ui.label(value);
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.load();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let shown = state.view.as_ref().map_or(0, |v| v.observation_count);
            ui.label(format!("{} observations loaded, {shown} matching", ds.len()));
        }

        if let Some(err) = &state.load_error {
            ui.separator();
            ui.label(RichText::new(format!("Error: {err}")).color(ui.visuals().error_fg_color));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open tariff data folder")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(dir) = folder {
        state.load_from_dir(dir);
    }
}

use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::PageLayout;
use crate::data::loader::FileFormat;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – file input and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: file type, upload, dataset toggle and filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data");
    ui.separator();

    // ---- File type selector ----
    ui.label("Choose file type:");
    let current = state
        .format
        .map(FileFormat::label)
        .unwrap_or(FileFormat::CHOICES[0]);
    egui::ComboBox::from_id_salt("file_type")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for choice in FileFormat::CHOICES {
                if ui.selectable_label(current == choice, choice).clicked() {
                    match FileFormat::from_choice(choice) {
                        Ok(format) => state.set_format(format),
                        Err(e) => state.status = Some(Status::Error(format!("Error: {e}"))),
                    }
                }
            }
        });

    // ---- Upload ----
    ui.add_space(4.0);
    if ui.button("Upload a file…").clicked() {
        open_file_dialog(state);
    }
    if let Some(name) = state
        .file
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
    {
        ui.label(RichText::new(name).italics());
    }

    let Some(view) = &state.view else {
        return;
    };

    ui.add_space(4.0);
    let mut show = state.show_dataset;
    if ui.checkbox(&mut show, "Display dataset").changed() {
        state.show_dataset = show;
    }

    ui.add_space(4.0);
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let filters: Vec<(String, Vec<String>, BTreeSet<String>)> = view
        .table
        .columns()
        .iter()
        .filter_map(|col| {
            let options = view.filters.available.get(&col.name)?;
            let selected = view
                .filters
                .selected
                .get(&col.name)
                .cloned()
                .unwrap_or_default();
            Some((col.name.clone(), options.clone(), selected))
        })
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, options, selected) in &filters {
                let header_text = if selected.is_empty() {
                    format!("Select {col}  (all {})", options.len())
                } else {
                    format!("Select {col}  ({}/{})", selected.len(), options.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            state.clear_filter(col);
                        }
                        for label in options {
                            let mut checked = selected.contains(label);
                            if ui.checkbox(&mut checked, label.as_str()).changed() {
                                state.toggle_filter_value(col, label);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the page title, layout toggle, row counts and the status message.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(&state.config.page_title);
        ui.separator();

        let mut wide = state.config.layout == PageLayout::Wide;
        if ui.checkbox(&mut wide, "Wide mode").changed() {
            state.config.layout = PageLayout::from_wide(wide);
        }
        ui.separator();

        if let Some(view) = &state.view {
            ui.label(format!(
                "{} rows loaded, {} visible",
                view.source_rows,
                view.table.num_rows()
            ));
            if view.filters.is_active() {
                ui.label(RichText::new("filtered").italics());
            }
            ui.separator();
        }

        match &state.status {
            Some(Status::Info(msg)) => {
                ui.label(RichText::new(msg).color(Color32::LIGHT_BLUE));
            }
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a file")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Selected {}", path.display());
        state.set_file(path);
    }
}

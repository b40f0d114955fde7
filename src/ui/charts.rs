use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::chart::{ChartError, Histogram, ScatterPlot, ValueCounts};
use crate::data::model::Table;
use crate::state::{AppState, UPLOAD_PROMPT};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the dataset view and the three charts of the last pipeline pass.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = state.view.take() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.file.is_none() {
                ui.heading(UPLOAD_PROMPT);
            } else {
                ui.heading("The file could not be loaded.");
            }
        });
        return;
    };

    let names = view.table.column_names();
    let max_width = state.config.content_width();
    let scatter_color = state.config.scatter_color;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(width) = max_width {
                ui.set_max_width(width);
            }

            if view.table.is_empty() {
                ui.label(RichText::new("No rows match the current filters.").italics());
            }

            if state.show_dataset {
                ui.heading("Dataset");
                dataset_grid(ui, &view.table);
                ui.separator();
            }

            // ---- Distribution ----
            if column_selector(
                ui,
                "Select Column for Distribution Chart",
                &names,
                &mut state.distribution_column,
            ) {
                state.mark_dirty();
            }
            if let (Some(col), Some(result)) = (&state.distribution_column, &view.distribution) {
                ui.heading(format!("{col} Distribution"));
                match result {
                    Ok(hist) => distribution_chart(ui, hist),
                    Err(e) => chart_error(ui, ChartKind::Distribution, e),
                }
            }
            ui.separator();

            // ---- Value counts ----
            if column_selector(
                ui,
                "Select Column for Chart",
                &names,
                &mut state.value_count_column,
            ) {
                state.mark_dirty();
            }
            if let (Some(col), Some(result)) = (&state.value_count_column, &view.value_counts) {
                ui.heading(format!("Value Counts for {col}"));
                match result {
                    Ok(counts) => value_count_chart(ui, counts),
                    Err(e) => chart_error(ui, ChartKind::ValueCounts, e),
                }
            }
            ui.separator();

            // ---- Scatter ----
            ui.heading("Select Columns for Scatter Plot");
            let x_changed =
                column_selector(ui, "Select First Column", &names, &mut state.scatter_x);
            let y_changed =
                column_selector(ui, "Select Second Column", &names, &mut state.scatter_y);
            if x_changed || y_changed {
                state.mark_dirty();
            }
            if let (Some(x), Some(y), Some(result)) =
                (&state.scatter_x, &state.scatter_y, &view.scatter)
            {
                ui.heading(format!("Scatter Plot: {x} vs {y}"));
                match result {
                    Ok(plot) => scatter_plot(ui, plot, scatter_color),
                    Err(e) => chart_error(ui, ChartKind::Scatter, e),
                }
            }
        });

    state.view = Some(view);
}

/// Combo box over the table's columns. Returns true when the choice changed.
fn column_selector(ui: &mut Ui, label: &str, names: &[String], choice: &mut Option<String>) -> bool {
    let mut changed = false;
    ui.label(label);
    egui::ComboBox::from_id_salt(label)
        .selected_text(choice.clone().unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for name in names {
                let is_current = choice.as_deref() == Some(name.as_str());
                if ui.selectable_label(is_current, name).clicked() && !is_current {
                    *choice = Some(name.clone());
                    changed = true;
                }
            }
        });
    changed
}

// ---------------------------------------------------------------------------
// Dataset grid
// ---------------------------------------------------------------------------

fn dataset_grid(ui: &mut Ui, table: &Table) {
    ui.push_id("dataset_grid", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(true)
            .max_scroll_height(320.0)
            .column(GridColumn::auto().at_least(40.0))
            .columns(GridColumn::auto().at_least(60.0), table.num_columns())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("");
                });
                for col in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.name.as_str())
                            .on_hover_text(col.kind.to_string());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.num_rows(), |mut row| {
                    let idx = row.index();
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(idx.to_string()).weak());
                    });
                    for col in table.columns() {
                        row.col(|ui: &mut Ui| {
                            ui.label(col.values[idx].to_string());
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum ChartKind {
    Distribution,
    ValueCounts,
    Scatter,
}

fn chart_error(ui: &mut Ui, kind: ChartKind, err: &ChartError) {
    let msg = match (kind, err) {
        (_, ChartError::UnknownColumn(_)) => format!("Error: {err}"),
        (ChartKind::Distribution, _) => {
            "Error: Choose a column with numerical values for the distribution chart.".to_string()
        }
        (ChartKind::ValueCounts, _) => {
            "Choose a categorical or object column for the value counts chart.".to_string()
        }
        (ChartKind::Scatter, _) => "Choose numerical columns for the scatter plot.".to_string(),
    };
    ui.label(RichText::new(msg).color(Color32::RED));
}

fn distribution_chart(ui: &mut Ui, hist: &Histogram) {
    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .bins()
        .map(|(lo, hi, count)| {
            Bar::new((lo + hi) / 2.0, count as f64)
                .width(width)
                .name(format!("[{lo:.3}, {hi:.3}]"))
        })
        .collect();

    Plot::new("distribution_chart")
        .height(CHART_HEIGHT)
        .x_axis_label(hist.column.as_str())
        .y_axis_label("count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

fn value_count_chart(ui: &mut Ui, counts: &ValueCounts) {
    let labels: Vec<String> = counts.entries.iter().map(|(l, _)| l.clone()).collect();
    let colors = ColorMap::new(labels.iter().map(String::as_str));

    let bars: Vec<Bar> = counts
        .entries
        .iter()
        .enumerate()
        .map(|(i, (label, n))| {
            Bar::new(i as f64, *n as f64)
                .width(0.8)
                .fill(colors.color_for(label))
                .name(label)
        })
        .collect();

    Plot::new("value_count_chart")
        .height(CHART_HEIGHT)
        .x_axis_label(counts.column.as_str())
        .y_axis_label("count")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn scatter_plot(ui: &mut Ui, plot: &ScatterPlot, color: Color32) {
    let (width, height) = plot.size.pixels();
    let points: PlotPoints = plot.points.iter().copied().collect();

    Plot::new("scatter_plot")
        .width(width)
        .height(height)
        .x_axis_label(plot.x_column.as_str())
        .y_axis_label(plot.y_column.as_str())
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(points).color(color).radius(3.0));
        });
}

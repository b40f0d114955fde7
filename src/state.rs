use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::config::DashboardConfig;
use crate::data::chart::{self, ChartError, Histogram, ScatterPlot, ValueCounts};
use crate::data::filter::{filter_table, FilterState};
use crate::data::loader::{FileFormat, LoadCache};
use crate::data::model::Table;

pub const UPLOAD_PROMPT: &str = "Please upload a file.";

// ---------------------------------------------------------------------------
// Result of one pipeline pass
// ---------------------------------------------------------------------------

/// Everything the central panel renders, computed by [`AppState::refresh`].
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Row count of the table before filtering.
    pub source_rows: usize,
    /// The table after all active filters.
    pub table: Table,
    /// Options and effective selections of this pass.
    pub filters: FilterState,
    pub distribution: Option<Result<Histogram, ChartError>>,
    pub value_counts: Option<Result<ValueCounts, ChartError>>,
    pub scatter: Option<Result<ScatterPlot, ChartError>>,
}

/// Severity of the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state of one session, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Declared file type (None until the user picks one).
    pub format: Option<FileFormat>,

    /// File chosen by the user.
    pub file: Option<PathBuf>,

    /// Whether the filtered table is shown.
    pub show_dataset: bool,

    /// Per-column selected labels.
    pub selections: BTreeMap<String, BTreeSet<String>>,

    pub distribution_column: Option<String>,
    pub value_count_column: Option<String>,
    pub scatter_x: Option<String>,
    pub scatter_y: Option<String>,

    /// Output of the last pipeline pass (None when nothing is loaded).
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    cache: LoadCache,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            format: None,
            file: None,
            show_dataset: false,
            selections: BTreeMap::new(),
            distribution_column: None,
            value_count_column: None,
            scatter_x: None,
            scatter_y: None,
            view: None,
            status: Some(Status::Info(UPLOAD_PROMPT.to_string())),
            cache: LoadCache::default(),
            dirty: true,
        }
    }

    /// Flag that an input changed; the next [`AppState::refresh_if_needed`]
    /// reruns the pipeline.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn needs_refresh(&self) -> bool {
        self.dirty
    }

    pub fn refresh_if_needed(&mut self) {
        if self.dirty {
            self.refresh();
        }
    }

    pub fn set_format(&mut self, format: Option<FileFormat>) {
        if self.format != format {
            self.format = format;
            self.mark_dirty();
        }
    }

    /// Select a new file; selections made for the previous file are dropped.
    pub fn set_file(&mut self, path: PathBuf) {
        if self.file.as_ref() != Some(&path) {
            self.selections.clear();
        }
        self.file = Some(path);
        self.mark_dirty();
    }

    /// Toggle a single label in a column's selection.
    pub fn toggle_filter_value(&mut self, column: &str, label: &str) {
        let selected = self.selections.entry(column.to_string()).or_default();
        if !selected.remove(label) {
            selected.insert(label.to_string());
        }
        self.mark_dirty();
    }

    /// Clear a column's selection (show all rows for it).
    pub fn clear_filter(&mut self, column: &str) {
        self.selections.remove(column);
        self.mark_dirty();
    }

    /// Rerun load → filter → charts from the current inputs.
    pub fn refresh(&mut self) {
        self.dirty = false;

        let Some(path) = self.file.clone() else {
            self.view = None;
            self.status = Some(Status::Info(UPLOAD_PROMPT.to_string()));
            return;
        };

        let table = match self.cache.load(&path, self.format) {
            Ok(table) => table,
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.view = None;
                self.status = Some(Status::Error(format!("Error: {e}")));
                return;
            }
        };

        let (filtered, filters) = filter_table(
            &table,
            &FilterState::with_selections(self.selections.clone()),
            self.config.option_scope,
        );

        let names = filtered.column_names();
        for choice in [
            &mut self.distribution_column,
            &mut self.value_count_column,
            &mut self.scatter_x,
            &mut self.scatter_y,
        ] {
            if !choice.as_ref().is_some_and(|c| names.contains(c)) {
                *choice = names.first().cloned();
            }
        }

        let distribution = self
            .distribution_column
            .as_deref()
            .map(|col| chart::distribution(&filtered, col, self.config.histogram_bins));
        let value_counts = self
            .value_count_column
            .as_deref()
            .map(|col| chart::value_counts(&filtered, col));
        let scatter = match (self.scatter_x.as_deref(), self.scatter_y.as_deref()) {
            (Some(x), Some(y)) => Some(chart::scatter(
                &filtered,
                x,
                y,
                Some(self.config.scatter_size),
            )),
            _ => None,
        };

        for err in [
            distribution.as_ref().and_then(|r| r.as_ref().err()),
            value_counts.as_ref().and_then(|r| r.as_ref().err()),
            scatter.as_ref().and_then(|r| r.as_ref().err()),
        ]
        .into_iter()
        .flatten()
        {
            log::warn!("Chart skipped: {err}");
        }

        self.status = None;
        self.view = Some(DashboardView {
            source_rows: table.num_rows(),
            table: filtered,
            filters,
            distribution,
            value_counts,
            scatter,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn loaded(contents: &str) -> (AppState, tempfile::NamedTempFile) {
        let file = csv_file(contents);
        let mut state = AppState::default();
        state.set_format(Some(FileFormat::Csv));
        state.set_file(file.path().to_path_buf());
        state.refresh_if_needed();
        (state, file)
    }

    #[test]
    fn without_file_only_the_prompt_is_shown() {
        let mut state = AppState::default();
        state.refresh();
        assert!(state.view.is_none());
        assert_eq!(state.status, Some(Status::Info(UPLOAD_PROMPT.to_string())));
    }

    #[test]
    fn unset_format_surfaces_a_load_error() {
        let file = csv_file("a\n1\n");
        let mut state = AppState::default();
        state.set_file(file.path().to_path_buf());
        state.refresh();
        assert!(state.view.is_none());
        assert!(matches!(state.status, Some(Status::Error(_))));
    }

    #[test]
    fn city_age_scenario() {
        let (mut state, _file) = loaded("city,age\nNY,30\nLA,45\nNY,30\n");
        assert_eq!(state.view.as_ref().unwrap().table.num_rows(), 3);

        state.toggle_filter_value("city", "NY");
        state.distribution_column = Some("age".into());
        state.value_count_column = Some("city".into());
        state.scatter_x = Some("age".into());
        state.scatter_y = Some("age".into());
        state.refresh_if_needed();

        let view = state.view.as_ref().unwrap();
        assert_eq!(view.source_rows, 3);
        assert_eq!(view.table.num_rows(), 2);
        assert_eq!(view.table.column("city").unwrap().distinct_labels(), vec!["NY"]);
        assert_eq!(view.table.column("age").unwrap().distinct_labels(), vec!["30"]);

        let hist = view.distribution.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(hist.total(), 2);
        assert_eq!(hist.counts.len(), 10);

        let counts = view.value_counts.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(counts.entries, vec![("NY".to_string(), 2)]);

        let scatter = view.scatter.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(scatter.points.len(), 2);
    }

    #[test]
    fn chart_mismatch_stays_local() {
        let (mut state, _file) = loaded("city,age\nNY,30\nLA,45\n");
        state.distribution_column = Some("city".into());
        state.value_count_column = Some("age".into());
        state.mark_dirty();
        state.refresh_if_needed();

        let view = state.view.as_ref().unwrap();
        assert!(matches!(
            view.distribution,
            Some(Err(ChartError::NotNumeric { .. }))
        ));
        assert!(matches!(
            view.value_counts,
            Some(Err(ChartError::NotCategorical { .. }))
        ));
        assert_eq!(view.table.num_rows(), 2);
        assert!(state.status.is_none());
    }

    #[test]
    fn stale_column_choices_reset_to_first_column() {
        let (mut state, _file) = loaded("city,age\nNY,30\n");
        assert_eq!(state.distribution_column.as_deref(), Some("city"));

        state.scatter_y = Some("gone".into());
        state.mark_dirty();
        state.refresh_if_needed();
        assert_eq!(state.scatter_y.as_deref(), Some("city"));
    }

    #[test]
    fn clearing_a_filter_restores_all_rows() {
        let (mut state, _file) = loaded("city,age\nNY,30\nLA,45\nNY,30\n");
        state.toggle_filter_value("city", "LA");
        state.refresh_if_needed();
        assert_eq!(state.view.as_ref().unwrap().table.num_rows(), 1);

        state.clear_filter("city");
        state.refresh_if_needed();
        assert_eq!(state.view.as_ref().unwrap().table.num_rows(), 3);
    }

    #[test]
    fn sessions_are_independent() {
        let (mut a, _fa) = loaded("city\nNY\nLA\n");
        let (b, _fb) = loaded("city\nNY\nLA\n");
        a.toggle_filter_value("city", "NY");
        a.refresh_if_needed();
        assert_eq!(a.view.as_ref().unwrap().table.num_rows(), 1);
        assert_eq!(b.view.as_ref().unwrap().table.num_rows(), 2);
    }
}

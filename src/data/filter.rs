use std::collections::{BTreeMap, BTreeSet};

use super::model::{ColumnKind, Table};

// ---------------------------------------------------------------------------
// Filter state: which labels are offered and selected per column
// ---------------------------------------------------------------------------

/// Per-cycle filter record for the categorical columns of a table.
///
/// * `available` – column → sorted distinct labels offered to the user
/// * `selected`  – column → labels the user picked
///
/// A column that is absent from `selected`, or whose set is empty, is not
/// filtered (selecting nothing means "show all").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub available: BTreeMap<String, Vec<String>>,
    pub selected: BTreeMap<String, BTreeSet<String>>,
}

impl FilterState {
    /// A fresh state carrying only the user's selections.
    pub fn with_selections(selected: BTreeMap<String, BTreeSet<String>>) -> Self {
        FilterState {
            available: BTreeMap::new(),
            selected,
        }
    }

    /// Whether any column currently narrows the table.
    pub fn is_active(&self) -> bool {
        self.selected.values().any(|s| !s.is_empty())
    }
}

/// Which table a column's offered labels are computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionScope {
    /// From the table as narrowed by the filters of earlier columns, so an
    /// earlier selection restricts the options of later columns.
    #[default]
    Progressive,
    /// From the unfiltered input table.
    Source,
}

/// Narrow `table` by the selections in `state`, column by column in native
/// order. Only categorical columns are filtered.
///
/// Returns the filtered table together with the updated state: `available`
/// gains an entry for every categorical column that lacked one, and
/// `selected` keeps only labels that are among the column's options.
pub fn filter_table(table: &Table, state: &FilterState, scope: OptionScope) -> (Table, FilterState) {
    let mut next = FilterState {
        available: state.available.clone(),
        selected: BTreeMap::new(),
    };
    let mut current = table.clone();

    for (col_idx, column) in table.columns().iter().enumerate() {
        if column.kind != ColumnKind::Categorical {
            continue;
        }

        let options = next
            .available
            .entry(column.name.clone())
            .or_insert_with(|| match scope {
                OptionScope::Progressive => current.columns()[col_idx].distinct_labels(),
                OptionScope::Source => column.distinct_labels(),
            });

        let selected: BTreeSet<String> = state
            .selected
            .get(&column.name)
            .map(|picked| {
                picked
                    .iter()
                    .filter(|label| options.contains(label))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if !selected.is_empty() {
            let rows = matching_rows(&current, col_idx, &selected);
            log::debug!(
                "Filter on '{}' keeps {} of {} rows",
                column.name,
                rows.len(),
                current.num_rows()
            );
            current = current.take(&rows);
        }

        next.selected.insert(column.name.clone(), selected);
    }

    (current, next)
}

/// Indices of rows whose label in the given column is one of `selected`.
/// Null cells never match.
fn matching_rows(table: &Table, col_idx: usize, selected: &BTreeSet<String>) -> Vec<usize> {
    table.columns()[col_idx]
        .values
        .iter()
        .enumerate()
        .filter(|(_, value)| {
            value
                .label()
                .is_some_and(|label| selected.contains(label.as_ref()))
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn sample() -> Table {
        Table::new(vec![
            Column::categorical(
                "city",
                [Some("NY"), Some("LA"), Some("NY"), Some("SF"), None],
            ),
            Column::numeric("age", [Some(30.0), Some(45.0), Some(30.0), Some(22.0), Some(50.0)]),
            Column::categorical(
                "team",
                [Some("red"), Some("blue"), Some("blue"), Some("red"), Some("red")],
            ),
        ])
        .unwrap()
    }

    fn pick(pairs: &[(&str, &[&str])]) -> FilterState {
        FilterState::with_selections(
            pairs
                .iter()
                .map(|(col, vals)| {
                    (
                        col.to_string(),
                        vals.iter().map(|v| v.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn no_selection_is_identity() {
        let table = sample();
        let (filtered, state) = filter_table(&table, &FilterState::default(), OptionScope::Progressive);
        assert_eq!(filtered, table);
        assert_eq!(state.available["city"], vec!["LA", "NY", "SF"]);
        assert_eq!(state.available["team"], vec!["blue", "red"]);
        assert!(!state.available.contains_key("age"));

        let (filtered, _) = filter_table(&table, &pick(&[("city", &[])]), OptionScope::Progressive);
        assert_eq!(filtered, table);
    }

    #[test]
    fn filters_compose_by_intersection() {
        let table = sample();
        let (filtered, _) = filter_table(
            &table,
            &pick(&[("city", &["NY", "SF"]), ("team", &["red"])]),
            OptionScope::Progressive,
        );

        assert_eq!(filtered.num_rows(), 2);
        for row in 0..filtered.num_rows() {
            let city = filtered.column("city").unwrap().values[row].to_string();
            let team = filtered.column("team").unwrap().values[row].to_string();
            assert!(city == "NY" || city == "SF");
            assert_eq!(team, "red");
        }
        assert_eq!(
            filtered.column("age").unwrap().values,
            vec![CellValue::Number(30.0), CellValue::Number(22.0)]
        );
    }

    #[test]
    fn earlier_selection_narrows_later_options() {
        let table = sample();
        let state = pick(&[("city", &["LA"])]);

        let (_, progressive) = filter_table(&table, &state, OptionScope::Progressive);
        assert_eq!(progressive.available["team"], vec!["blue"]);

        let (_, source) = filter_table(&table, &state, OptionScope::Source);
        assert_eq!(source.available["team"], vec!["blue", "red"]);
    }

    #[test]
    fn selections_outside_options_are_dropped() {
        let table = sample();
        let (filtered, state) = filter_table(
            &table,
            &pick(&[("city", &["LA"]), ("team", &["red"])]),
            OptionScope::Progressive,
        );
        // "red" is not offered once city = LA, so team does not narrow.
        assert!(state.selected["team"].is_empty());
        assert_eq!(filtered.num_rows(), 1);
    }

    #[test]
    fn existing_options_are_not_recomputed() {
        let table = sample();
        let mut state = pick(&[]);
        state
            .available
            .insert("city".to_string(), vec!["NY".to_string()]);
        let (_, next) = filter_table(&table, &state, OptionScope::Progressive);
        assert_eq!(next.available["city"], vec!["NY"]);
    }

    #[test]
    fn numeric_columns_are_never_filtered() {
        let table = sample();
        let (filtered, state) = filter_table(&table, &pick(&[("age", &["30"])]), OptionScope::Progressive);
        assert_eq!(filtered.num_rows(), table.num_rows());
        assert!(!state.selected.contains_key("age"));
    }

    #[test]
    fn all_null_column_is_a_noop() {
        let table = Table::new(vec![Column::categorical("empty", [None::<&str>, None])]).unwrap();
        let (filtered, state) = filter_table(&table, &pick(&[("empty", &["x"])]), OptionScope::Progressive);
        assert!(state.available["empty"].is_empty());
        assert_eq!(filtered.num_rows(), 2);
        assert!(!state.is_active());
    }

    #[test]
    fn numbers_in_categorical_columns_match_as_text() {
        let table = Table::new(vec![Column::new(
            "zip",
            ColumnKind::Categorical,
            vec![
                CellValue::Number(10001.0),
                CellValue::Text("n/a".into()),
                CellValue::Number(94105.0),
            ],
        )])
        .unwrap();
        let (filtered, _) = filter_table(&table, &pick(&[("zip", &["10001"])]), OptionScope::Progressive);
        assert_eq!(filtered.num_rows(), 1);
    }
}

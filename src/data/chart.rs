use std::collections::HashMap;

use thiserror::Error;

use super::model::{Column, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a chart cannot be drawn for the chosen column(s). Always recovered
/// locally: the chart shows a message instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
    #[error("Column '{column}' is not numeric")]
    NotNumeric { column: String },
    #[error("Column '{column}' is not categorical")]
    NotCategorical { column: String },
    #[error("Column '{column}' has a non-finite value range")]
    NonFiniteRange { column: String },
}

fn lookup<'a>(table: &'a Table, name: &str) -> Result<&'a Column, ChartError> {
    table
        .column(name)
        .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))
}

fn require_numeric<'a>(table: &'a Table, name: &str) -> Result<&'a Column, ChartError> {
    let column = lookup(table, name)?;
    if column.kind != ColumnKind::Numeric {
        return Err(ChartError::NotNumeric {
            column: name.to_string(),
        });
    }
    Ok(column)
}

// ---------------------------------------------------------------------------
// Distribution (histogram)
// ---------------------------------------------------------------------------

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `(lower, upper, count)` for every bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }
}

/// Bucket the non-null values of a numeric column into `bins` equal-width
/// bins spanning `[min, max]`. Every bin is half-open except the last,
/// which also holds `max`. A constant column spans `[v - 0.5, v + 0.5]`;
/// a column without values spans `[0, 1]`. Infinite values, or a range too
/// wide to represent, fail with [`ChartError::NonFiniteRange`].
pub fn distribution(table: &Table, column: &str, bins: usize) -> Result<Histogram, ChartError> {
    let col = require_numeric(table, column)?;
    let bins = bins.max(1);
    let values: Vec<f64> = col
        .values
        .iter()
        .filter_map(|v| v.as_f64())
        .filter(|v| !v.is_nan())
        .collect();

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() {
        (lo, hi) = (0.0, 1.0);
    } else if lo == hi {
        (lo, hi) = (lo - 0.5, hi + 0.5);
    }

    if !(hi - lo).is_finite() {
        return Err(ChartError::NonFiniteRange {
            column: column.to_string(),
        });
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram {
        column: column.to_string(),
        edges,
        counts,
    })
}

// ---------------------------------------------------------------------------
// Value counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCounts {
    pub column: String,
    /// `(label, count)` by descending count; ties keep first appearance.
    pub entries: Vec<(String, usize)>,
}

impl ValueCounts {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

/// Count each distinct non-null label of a categorical column.
pub fn value_counts(table: &Table, column: &str) -> Result<ValueCounts, ChartError> {
    let col = lookup(table, column)?;
    if col.kind != ColumnKind::Categorical {
        return Err(ChartError::NotCategorical {
            column: column.to_string(),
        });
    }

    let mut entries: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for label in col.values.iter().filter_map(|v| v.label()) {
        match index.get(label.as_ref()) {
            Some(&i) => entries[i].1 += 1,
            None => {
                index.insert(label.to_string(), entries.len());
                entries.push((label.into_owned(), 1));
            }
        }
    }
    // Stable sort keeps first-appearance order among equal counts.
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(ValueCounts {
        column: column.to_string(),
        entries,
    })
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotSize {
    pub width: f32,
    pub height: f32,
}

impl PlotSize {
    pub const PIXELS_PER_INCH: f32 = 100.0;

    pub fn new(width: f32, height: f32) -> Self {
        PlotSize { width, height }
    }

    pub fn pixels(&self) -> (f32, f32) {
        (
            self.width * Self::PIXELS_PER_INCH,
            self.height * Self::PIXELS_PER_INCH,
        )
    }
}

impl Default for PlotSize {
    fn default() -> Self {
        PlotSize::new(4.0, 4.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<[f64; 2]>,
    pub size: PlotSize,
}

/// Pair column `x` with column `y` row by row. Both must be numeric; rows
/// with a null on either side are skipped.
pub fn scatter(
    table: &Table,
    x: &str,
    y: &str,
    size: Option<PlotSize>,
) -> Result<ScatterPlot, ChartError> {
    let x_col = require_numeric(table, x)?;
    let y_col = require_numeric(table, y)?;

    let points = x_col
        .values
        .iter()
        .zip(&y_col.values)
        .filter_map(|(a, b)| Some([a.as_f64()?, b.as_f64()?]))
        .collect();

    Ok(ScatterPlot {
        x_column: x.to_string(),
        y_column: y.to_string(),
        points,
        size: size.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(vec![
            Column::numeric("n", (1..=20).map(|i| Some(i as f64))),
            Column::categorical(
                "c",
                (0..20).map(|i| Some(["a", "b", "b", "c"][i % 4])),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn distribution_has_ten_bins_summing_to_non_null_count() {
        let hist = distribution(&table(), "n", 10).unwrap();
        assert_eq!(hist.counts.len(), 10);
        assert_eq!(hist.edges.len(), 11);
        assert_eq!(hist.total(), 20);
        assert_eq!(hist.counts, vec![2; 10]);
        assert_eq!(hist.edges[0], 1.0);
        assert_eq!(hist.edges[10], 20.0);
    }

    #[test]
    fn distribution_ignores_nulls_and_includes_max() {
        let t = Table::new(vec![Column::numeric(
            "v",
            [Some(0.0), None, Some(10.0), Some(10.0), Some(5.0)],
        )])
        .unwrap();
        let hist = distribution(&t, "v", 10).unwrap();
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.counts[9], 2);
        assert_eq!(hist.counts[5], 1);
        assert!((hist.bin_width() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_is_centred() {
        let t = Table::new(vec![Column::numeric("v", [Some(3.0), Some(3.0)])]).unwrap();
        let hist = distribution(&t, "v", 10).unwrap();
        assert_eq!(hist.edges[0], 2.5);
        assert_eq!(hist.edges[10], 3.5);
        assert_eq!(hist.total(), 2);
        assert_eq!(hist.bins().count(), 10);
    }

    #[test]
    fn empty_column_gives_zero_counts() {
        let t = Table::new(vec![Column::numeric("v", [None])]).unwrap();
        let hist = distribution(&t, "v", 10).unwrap();
        assert_eq!(hist.total(), 0);
        assert_eq!((hist.edges[0], hist.edges[10]), (0.0, 1.0));
    }

    #[test]
    fn distribution_on_text_reports_mismatch() {
        let t = Table::new(vec![Column::categorical("s", [Some("a"), Some("b"), Some("c")])])
            .unwrap();
        assert_eq!(
            distribution(&t, "s", 10),
            Err(ChartError::NotNumeric { column: "s".into() })
        );
    }

    #[test]
    fn distribution_on_infinite_values_reports_range_error() {
        let t = Table::new(vec![
            Column::numeric("v", [Some(1.0), Some(2.0), Some(f64::INFINITY)]),
            Column::numeric("w", [Some(f64::MAX), Some(-f64::MAX), None]),
        ])
        .unwrap();
        assert_eq!(
            distribution(&t, "v", 10),
            Err(ChartError::NonFiniteRange { column: "v".into() })
        );
        assert_eq!(
            distribution(&t, "w", 10),
            Err(ChartError::NonFiniteRange { column: "w".into() })
        );
    }

    #[test]
    fn nan_cells_count_as_missing() {
        let t = Table::new(vec![Column::numeric("v", [Some(1.0), Some(f64::NAN), Some(3.0)])])
            .unwrap();
        let col = t.column("v").unwrap();
        let hist = distribution(&t, "v", 10).unwrap();
        assert_eq!(col.non_null_count(), 2);
        assert_eq!(hist.total(), col.non_null_count());
    }

    #[test]
    fn value_counts_order_by_frequency() {
        let counts = value_counts(&table(), "c").unwrap();
        assert_eq!(
            counts.entries,
            vec![("b".to_string(), 10), ("a".to_string(), 5), ("c".to_string(), 5)]
        );
        assert_eq!(counts.total(), 20);
    }

    #[test]
    fn value_counts_rejects_numeric_column() {
        assert_eq!(
            value_counts(&table(), "n"),
            Err(ChartError::NotCategorical { column: "n".into() })
        );
    }

    #[test]
    fn value_counts_skip_nulls() {
        let t = Table::new(vec![Column::categorical("s", [Some("x"), None, Some("x")])]).unwrap();
        let counts = value_counts(&t, "s").unwrap();
        assert_eq!(counts.entries, vec![("x".to_string(), 2)]);
    }

    #[test]
    fn scatter_pairs_rows_and_validates_types() {
        let t = Table::new(vec![
            Column::numeric("x", [Some(1.0), Some(2.0), None]),
            Column::numeric("y", [Some(3.0), Some(4.0), Some(5.0)]),
            Column::categorical("s", [Some("a"), Some("b"), Some("c")]),
        ])
        .unwrap();

        let plot = scatter(&t, "x", "y", None).unwrap();
        assert_eq!(plot.points, vec![[1.0, 3.0], [2.0, 4.0]]);
        assert_eq!(plot.size, PlotSize::new(4.0, 4.0));
        assert_eq!(plot.size.pixels(), (400.0, 400.0));

        assert_eq!(
            scatter(&t, "x", "s", None),
            Err(ChartError::NotNumeric { column: "s".into() })
        );
        assert_eq!(
            scatter(&t, "x", "missing", Some(PlotSize::new(6.0, 3.0))),
            Err(ChartError::UnknownColumn("missing".into()))
        );
    }
}

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. Booleans, dates and mixed content are loaded as
/// `Text`, so only two non-null shapes exist.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// The value rendered as text, as used for filter matching and value
    /// counts. `Null` has no label.
    pub fn label(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CellValue::Number(v) => Some(Cow::Owned(format_number(*v))),
            CellValue::Null => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(&label),
            None => f.write_str("<null>"),
        }
    }
}

/// Integral values print without a fractional part (`30`, not `30.0`).
fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Semantic type tag, assigned once when the table is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Numeric column from optional values. `None` and NaN become `Null`.
    pub fn numeric<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let values = values
            .into_iter()
            .map(|v| match v {
                Some(n) if !n.is_nan() => CellValue::Number(n),
                _ => CellValue::Null,
            })
            .collect();
        Column::new(name, ColumnKind::Numeric, values)
    }

    /// Categorical column from optional labels (`None` → `Null`).
    pub fn categorical<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| v.map_or(CellValue::Null, |s| CellValue::Text(s.into())))
            .collect();
        Column::new(name, ColumnKind::Categorical, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Number of non-null cells.
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }

    /// Sorted distinct labels, nulls excluded.
    pub fn distinct_labels(&self) -> Vec<String> {
        let set: BTreeSet<String> = self
            .values
            .iter()
            .filter_map(|v| v.label().map(Cow::into_owned))
            .collect();
        set.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// Ordered, typed columns with aligned rows. Never mutated after
/// construction; filtering derives a new table with [`Table::take`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen = BTreeSet::new();
        for col in &columns {
            if col.len() != n_rows {
                return Err(TableError::RaggedColumns {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Table { columns, n_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.n_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// New table holding only the given rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                kind: col.kind,
                values: rows.iter().map(|&r| col.values[r].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            n_rows: rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }
}

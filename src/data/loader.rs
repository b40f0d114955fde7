use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use thiserror::Error;

use super::model::{CellValue, Column, ColumnKind, Table, TableError};

/// Cell contents treated as missing when reading CSV.
const NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>",
    "#N/A", "#NA",
];

// ---------------------------------------------------------------------------
// Errors and formats
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Choose a file type before loading a file")]
    FormatUnset,
    #[error("Unsupported file type: {0}")]
    UnknownFormat(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unreadable spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Spreadsheet contains no worksheet")]
    NoWorksheet,
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Declared format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// Choices offered by the file type selector, in display order.
    pub const CHOICES: [&'static str; 3] = ["Choose one...", "csv", "excel"];

    pub fn label(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Spreadsheet => "excel",
        }
    }

    /// Map a selector choice to a format. The placeholder choice is `None`.
    pub fn from_choice(choice: &str) -> Result<Option<FileFormat>, LoadError> {
        if choice == Self::CHOICES[0] {
            return Ok(None);
        }
        choice.parse().map(Some)
    }
}

impl FromStr for FileFormat {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "excel" | "spreadsheet" | "xlsx" | "xls" | "xlsb" | "ods" => {
                Ok(FileFormat::Spreadsheet)
            }
            other => Err(LoadError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a file on disk using the declared format.
pub fn load_file(path: &Path, format: Option<FileFormat>) -> Result<Table, LoadError> {
    let format = format.ok_or(LoadError::FormatUnset)?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_bytes(&bytes, Some(format))?;
    log::info!(
        "Loaded {} as {format}: {} rows, columns {:?}",
        path.display(),
        table.num_rows(),
        table.column_names()
    );
    Ok(table)
}

/// Load a table from in-memory file contents using the declared format.
pub fn load_bytes(bytes: &[u8], format: Option<FileFormat>) -> Result<Table, LoadError> {
    match format.ok_or(LoadError::FormatUnset)? {
        FileFormat::Csv => load_csv(bytes),
        FileFormat::Spreadsheet => load_spreadsheet(bytes),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row followed by records of equal width. A column is numeric when
/// every non-missing cell parses as a float (surrounding whitespace
/// ignored); otherwise its cells are kept verbatim as text. Cells parsing
/// as NaN in any letter case are missing.
fn load_csv<R: Read>(input: R) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for result in reader.records() {
        let record = result?;
        for (col_idx, value) in record.iter().enumerate() {
            let cell = (!NULL_MARKERS.contains(&value.trim())).then(|| value.to_string());
            cells[col_idx].push(cell);
        }
    }

    let columns = normalize_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_csv_column(name, raw))
        .collect();

    Ok(Table::new(columns)?)
}

fn infer_csv_column(name: String, raw: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = raw
        .iter()
        .map(|cell| match cell {
            Some(s) => s.trim().parse::<f64>().ok().map(Some),
            None => Some(None),
        })
        .collect();

    match parsed {
        Some(numbers) => Column::numeric(name, numbers),
        None => Column::categorical(name, raw),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet only; its first row holds the column names.
fn load_spreadsheet(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(header_text).collect(),
        None => Vec::new(),
    };

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(col_idx).map_or(CellValue::Null, cell_value));
        }
    }

    let columns = normalize_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, values)| {
            let kind = if values.iter().all(|v| !matches!(v, CellValue::Text(_))) {
                ColumnKind::Numeric
            } else {
                ColumnKind::Categorical
            };
            Column::new(name, kind, values)
        })
        .collect();

    Ok(Table::new(columns)?)
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => CellValue::Text(excel_datetime_text(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Empty | Data::Error(_) => CellValue::Null,
    }
}

/// Dates and times render as `YYYY-MM-DD HH:MM:SS`, durations in ISO 8601.
/// Serials outside chrono's range fall back to the raw number.
fn excel_datetime_text(dt: &ExcelDateTime) -> String {
    let rendered = if dt.is_duration() {
        dt.as_duration().map(|d| d.to_string())
    } else {
        dt.as_datetime().map(|d| d.to_string())
    };
    rendered.unwrap_or_else(|| CellValue::Number(dt.as_f64()).to_string())
}

fn header_text(data: &Data) -> String {
    match cell_value(data) {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Blank names become `Unnamed: <index>`; repeats get `.1`, `.2`, ... suffixes.
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut suffix = 1;
            while seen.contains(&candidate) {
                candidate = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
    format: FileFormat,
}

/// Parsed tables keyed by file identity and declared format, so reruns of
/// the pipeline skip re-parsing an unchanged file. Only the latest parse
/// of a path is kept. Failures are not cached.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<CacheKey, Table>,
}

impl LoadCache {
    pub fn load(&mut self, path: &Path, format: Option<FileFormat>) -> Result<Table, LoadError> {
        let format = format.ok_or(LoadError::FormatUnset)?;
        let meta = std::fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let key = CacheKey {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
            format,
        };

        if let Some(table) = self.entries.get(&key) {
            log::debug!("Load cache hit for {}", path.display());
            return Ok(table.clone());
        }

        let table = load_file(path, Some(format))?;
        self.entries.retain(|cached, _| cached.path != key.path);
        self.entries.insert(key, table.clone());
        log::debug!("Load cache holds {} tables", self.entries.len());
        Ok(table)
    }
}

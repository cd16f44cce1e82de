//! Reads contact spreadsheets into a header list plus named-column rows.
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xls`, `.ods`) are read through `calamine`, always
//! from the first worksheet. Delimited text (`.csv`, `.txt`) goes through the `csv`
//! crate after sniffing the delimiter from the header line.
//!
//! Cells that are empty, whitespace-only or spreadsheet errors are stored as
//! missing, so callers only have to check `Row::get` for `None`.

mod csv_source;
mod workbook;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported spreadsheet type '{0}' (expected .xlsx, .xls, .ods or .csv)")]
    UnsupportedType(String),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("spreadsheet has no header row")]
    NoHeader,

    #[error("cannot read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("cannot read csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One data row keyed by header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position among the data rows as they appear in the file (the
    /// header is not counted, blank rows are).
    pub number: usize,
    cells: HashMap<String, String>,
}

impl Row {
    pub fn new(number: usize, cells: HashMap<String, String>) -> Self {
        Self { number, cells }
    }

    /// The cell under `column`, or `None` when the cell is blank or the column
    /// does not exist.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Builds a row from `(column, value)` pairs, dropping blank values.
    pub fn from_pairs<I, K, V>(number: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .filter_map(|(k, v)| non_blank(v.into()).map(|v| (k.into(), v)))
            .collect();
        Self { number, cells }
    }
}

/// A parsed spreadsheet.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Assembles a table from a raw header row and raw data rows.
    ///
    /// Rows arrive with their data row number already assigned, so rows the
    /// reader dropped as blank leave a gap instead of shifting later rows.
    /// Blank headers become `Unnamed: <index>` and repeated headers get a `.1`,
    /// `.2`, ... suffix so every column stays addressable.
    fn assemble<H, R>(raw_headers: Vec<String>, raw_rows: H) -> Table
    where
        H: IntoIterator<Item = (usize, R)>,
        R: IntoIterator<Item = Option<String>>,
    {
        let headers = dedupe_headers(raw_headers);
        let rows = raw_rows
            .into_iter()
            .map(|(number, values)| {
                let cells = headers
                    .iter()
                    .zip(values)
                    .filter_map(|(h, v)| v.and_then(non_blank).map(|v| (h.clone(), v)))
                    .collect();
                Row::new(number, cells)
            })
            .collect();
        Table { headers, rows }
    }
}

/// Reads the spreadsheet at `path`, picking the reader from the file extension.
pub fn read_table(path: &Path) -> Result<Table, SheetError> {
    if !path.exists() {
        return Err(SheetError::NotFound(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => workbook::read(path),
        "csv" | "txt" => csv_source::read(path),
        other => Err(SheetError::UnsupportedType(other.to_string())),
    }
}

/// Whether `file_name` carries an extension `read_table` understands.
pub fn is_supported(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    [".xlsx", ".xlsm", ".xlsb", ".xls", ".ods", ".csv", ".txt"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = match non_blank(h) {
                Some(h) => h,
                None => format!("Unnamed: {}", i),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base.clone()
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

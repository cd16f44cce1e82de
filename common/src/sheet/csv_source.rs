use super::{SheetError, Table};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Picks the candidate delimiter that occurs most often in the header line.
pub(crate) fn detect_delimiter(header_line: &str) -> char {
    CANDIDATE_DELIMITERS
        .iter()
        .max_by_key(|&&d| header_line.matches(d).count())
        .filter(|&&d| header_line.contains(d))
        .copied()
        .unwrap_or(',')
}

/// Trims a cell and folds non-breaking spaces into plain ones.
fn normalize_cell(cell: &str) -> Option<String> {
    let s = cell.replace('\u{00A0}', " ");
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn read_header_line(path: &Path) -> Result<String, SheetError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut header_line = String::new();
    reader.read_line(&mut header_line)?;
    let header_line = header_line
        .trim_start_matches('\u{FEFF}')
        .trim_end_matches(&['\n', '\r'][..]);
    if header_line.trim().is_empty() {
        return Err(SheetError::NoHeader);
    }
    Ok(header_line.to_string())
}

pub(super) fn read(path: &Path) -> Result<Table, SheetError> {
    let delimiter = detect_delimiter(&read_header_line(path)?);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{FEFF}').to_string())
        .collect();

    // The csv reader silently skips empty lines; they still count as rows.
    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut expected_line = reader.position().line();
    let mut number = 0;
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(expected_line, |p| p.line());
        number += 1 + line.saturating_sub(expected_line) as usize;
        expected_line = reader.position().line();

        let values: Vec<Option<String>> = record.iter().map(normalize_cell).collect();
        if values.iter().all(Option::is_none) {
            continue;
        }
        rows.push((number, values));
    }

    Ok(Table::assemble(headers, rows))
}

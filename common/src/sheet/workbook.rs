use super::{SheetError, Table};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Largest magnitude at which an `f64` still holds every integer exactly.
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Renders a workbook cell as text, `None` for empty and error cells.
///
/// Integral floats print without a fractional part, which keeps phone numbers
/// typed into numeric cells (`3001234567.0`) usable as dial strings.
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < EXACT_INT_LIMIT => {
            Some(format!("{}", *f as i64))
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

pub(super) fn read(path: &Path) -> Result<Table, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(SheetError::NoHeader)?
        .iter()
        .map(|c| cell_text(c).unwrap_or_default())
        .collect();

    let data: Vec<(usize, Vec<Option<String>>)> = rows
        .enumerate()
        .map(|(i, row)| (i + 1, row.iter().map(cell_text).collect::<Vec<_>>()))
        .filter(|(_, values)| values.iter().any(Option::is_some))
        .collect();

    Ok(Table::assemble(headers, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_drop_the_fraction() {
        assert_eq!(
            cell_text(&Data::Float(3001234567.0)),
            Some("3001234567".to_string())
        );
        assert_eq!(cell_text(&Data::Float(12.5)), Some("12.5".to_string()));
        assert_eq!(cell_text(&Data::Int(500)), Some("500".to_string()));
    }

    #[test]
    fn empty_and_error_cells_are_missing() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::Error(calamine::CellErrorType::NA)), None);
    }

    #[test]
    fn strings_and_bools_pass_through() {
        assert_eq!(
            cell_text(&Data::String("Ali".to_string())),
            Some("Ali".to_string())
        );
        assert_eq!(cell_text(&Data::Bool(true)), Some("true".to_string()));
    }

    #[test]
    fn corrupt_workbook_is_an_error() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        std::fs::write(file.path(), b"not a zip archive").unwrap();
        assert!(matches!(read(file.path()), Err(SheetError::Workbook(_))));
    }
}

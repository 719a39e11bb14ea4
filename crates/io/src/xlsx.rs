// Source workbook extraction (xlsx, xls, xlsb, ods via calamine)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use palika_recon::cell::{CellValue, RawRow};

use crate::error::IoError;

/// Read the first worksheet as rows of cells, indexed from A1.
///
/// calamine ranges start at the first used cell; leading rows and columns
/// are padded with [`CellValue::Empty`] so row/column numbers stay absolute.
pub fn read_first_sheet(path: &Path) -> Result<Vec<RawRow>, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| IoError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IoError::NoSheets {
            path: path.to_path_buf(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|source| IoError::Sheet {
            path: path.to_path_buf(),
            sheet: sheet_name.clone(),
            source,
        })?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<RawRow> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col];
        cells.extend(row.iter().map(convert));
        rows.push(cells);
    }

    tracing::debug!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = rows.len(),
        "sheet read"
    );
    Ok(rows)
}

fn convert(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

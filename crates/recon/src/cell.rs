//! Loosely-typed spreadsheet cells, as handed over by the tabular extractor.

use std::fmt;

/// A single extracted cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

/// One sheet row: cells at fixed column positions, index = column.
pub type RawRow = Vec<CellValue>;

impl CellValue {
    /// Text rendering used for key fields: trimmed, empty → `None`,
    /// whole numbers without a fractional part ("5", not "5.0").
    pub fn as_text(&self) -> Option<String> {
        let s = match self {
            CellValue::Empty => return None,
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// Numeric reading: numbers as-is, strings parsed as floats.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Empty, or a string that is only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Same value with strings trimmed and blank strings turned into `Empty`.
    pub fn trimmed(&self) -> CellValue {
        match self {
            CellValue::Text(s) if s.trim().is_empty() => CellValue::Empty,
            CellValue::Text(s) => CellValue::Text(s.trim().to_string()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Format nicely: integers without decimals
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Cell at `col`, `Empty` past the end of the row.
pub fn cell_at(row: &[CellValue], col: usize) -> &CellValue {
    const EMPTY: &CellValue = &CellValue::Empty;
    row.get(col).unwrap_or(EMPTY)
}

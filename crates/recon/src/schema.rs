//! Election sheet mapping: locate the header row, resolve the fixed 23-column
//! target schema through per-field alias lists, and coerce cells per field kind.

use std::collections::HashMap;

use crate::cell::{cell_at, format_number, CellValue, RawRow};
use crate::error::ReconError;
use crate::model::ElectionRecord;

// ---------------------------------------------------------------------------
// Target schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

impl FieldKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
        }
    }
}

/// A target column and the header spellings accepted for it, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub aliases: &'static [&'static str],
}

const fn int(name: &'static str, aliases: &'static [&'static str]) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Integer, aliases }
}

const fn text(name: &'static str, aliases: &'static [&'static str]) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Text, aliases }
}

pub const SCHEMA_LEN: usize = 23;

pub const ELECTION_SCHEMA: [FieldSpec; SCHEMA_LEN] = [
    int("CandidateID", &["CandidateID", "candidate_id", "id"]),
    text("CandidateName", &["CandidateName", "candidate_name"]),
    text("CandidateNameEng", &["CandidateNameEng", "candidate_name_eng", "candidate_name_english"]),
    text("Gender", &["Gender", "sex"]),
    int("Age", &["Age"]),
    int("PartyID", &["PartyID", "party_id"]),
    int("SymbolID", &["SymbolID", "symbol_id"]),
    text("SymbolName", &["SymbolName", "symbol_name"]),
    text("SymbolNameEng", &["SymbolNameEng", "symbol_name_eng"]),
    text("PoliticalPartyName", &["PoliticalPartyName", "party_name"]),
    text("PoliticalPartyNameEng", &["PoliticalPartyNameEng", "party_name_eng"]),
    int("TotalVoteReceived", &["TotalVoteReceived", "total_vote_received", "votes"]),
    text("Remarks", &["Remarks"]),
    text("RemarksEng", &["RemarksEng", "remarks_eng"]),
    text("post_name", &["post_name", "post"]),
    int("PostId", &["PostId", "post_id"]),
    int("Ward", &["Ward", "ward_no", "ward_number"]),
    text("vdcmun_name", &["vdcmun_name", "vdc_mun_name", "vdc_municipality_name"]),
    int("vdc_mun", &["vdc_mun", "vdcmun", "vdc_mun_id"]),
    text("district_name", &["district_name"]),
    int("district", &["district", "district_id"]),
    text("state_name", &["state_name", "province_name"]),
    int("state", &["state", "province_id"]),
];

/// Position of a field in [`ELECTION_SCHEMA`] (and in every [`ElectionRow`]).
pub fn field_index(name: &str) -> Option<usize> {
    ELECTION_SCHEMA.iter().position(|f| f.name == name)
}

// Indices used when projecting rows to `ElectionRecord`.
const CANDIDATE_NAME: usize = 1;
const GENDER: usize = 3;
const AGE: usize = 4;
const PARTY_NAME: usize = 9;
const TOTAL_VOTES: usize = 11;
const POST_NAME: usize = 14;
const WARD: usize = 16;
const VDCMUN_NAME: usize = 17;
const DISTRICT_NAME: usize = 19;
const STATE_NAME: usize = 21;

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Lowercase, then every run of characters outside `[a-z0-9]` becomes one `_`;
/// leading and trailing `_` are dropped. May return an empty string.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Normalized header name, or `col_<n>` (1-based) when nothing survives.
pub fn header_name(raw: &str, idx: usize) -> String {
    let norm = normalize_header(raw);
    if norm.is_empty() {
        format!("col_{}", idx + 1)
    } else {
        norm
    }
}

/// Index of the first row with any non-blank cell.
pub fn find_header_row(rows: &[RawRow]) -> Option<usize> {
    rows.iter().position(|row| row.iter().any(|c| !c.is_blank()))
}

/// Header width: last non-blank header cell + 1.
fn header_width(header: &[CellValue]) -> usize {
    header.iter().rposition(|c| !c.is_blank()).map_or(0, |i| i + 1)
}

/// Target field → source column, resolved once per sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: [Option<usize>; SCHEMA_LEN],
}

impl ColumnMapping {
    /// First alias (normalized) present among `headers` wins. When a normalized
    /// header occurs more than once, the later column is used.
    pub fn resolve(headers: &[String]) -> Self {
        let mut idx_by_norm: HashMap<String, usize> = HashMap::new();
        for (idx, h) in headers.iter().enumerate() {
            idx_by_norm.insert(normalize_header(h), idx);
        }

        let mut columns = [None; SCHEMA_LEN];
        for (slot, field) in columns.iter_mut().zip(ELECTION_SCHEMA.iter()) {
            *slot = field
                .aliases
                .iter()
                .find_map(|alias| idx_by_norm.get(&normalize_header(alias)).copied());
        }
        Self { columns }
    }

    pub fn source_column(&self, field: usize) -> Option<usize> {
        self.columns.get(field).copied().flatten()
    }

    /// Target fields with no source column.
    pub fn unresolved(&self) -> Vec<&'static str> {
        ELECTION_SCHEMA
            .iter()
            .zip(self.columns.iter())
            .filter(|(_, c)| c.is_none())
            .map(|(f, _)| f.name)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A coerced value in the target schema.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// Coerce a source cell into a field of `kind`.
pub fn coerce(cell: &CellValue, kind: FieldKind) -> FieldValue {
    match (kind, cell) {
        (_, CellValue::Empty) => FieldValue::Null,
        (FieldKind::Integer, CellValue::Number(n)) if n.is_finite() => FieldValue::Integer(n.trunc() as i64),
        (FieldKind::Integer, CellValue::Text(s)) => {
            s.trim().parse::<i64>().map_or(FieldValue::Null, FieldValue::Integer)
        }
        (FieldKind::Integer, _) => FieldValue::Null,
        (FieldKind::Text, CellValue::Text(s)) => FieldValue::Text(s.clone()),
        (FieldKind::Text, CellValue::Number(n)) => FieldValue::Text(format_number(*n)),
        (FieldKind::Text, CellValue::Bool(b)) => FieldValue::Text(b.to_string()),
    }
}

/// One election row in schema order (always `SCHEMA_LEN` values).
#[derive(Debug, Clone, PartialEq)]
pub struct ElectionRow {
    pub values: Vec<FieldValue>,
}

impl ElectionRow {
    pub fn map(cells: &[CellValue], mapping: &ColumnMapping) -> Self {
        let values = ELECTION_SCHEMA
            .iter()
            .enumerate()
            .map(|(field, spec)| match mapping.source_column(field) {
                Some(col) => coerce(cell_at(cells, col), spec.kind),
                None => FieldValue::Null,
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, field: usize) -> &FieldValue {
        const NULL: &FieldValue = &FieldValue::Null;
        self.values.get(field).unwrap_or(NULL)
    }

    pub fn by_name(&self, name: &str) -> &FieldValue {
        match field_index(name) {
            Some(idx) => self.get(idx),
            None => &FieldValue::Null,
        }
    }
}

/// The mapped election sheet.
#[derive(Debug, Clone)]
pub struct ElectionTable {
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    pub rows: Vec<ElectionRow>,
}

impl ElectionTable {
    /// Map a whole sheet. `source_name` only labels the missing-header error.
    pub fn from_rows(rows: &[RawRow], source_name: &str) -> Result<Self, ReconError> {
        let header_idx = find_header_row(rows).ok_or_else(|| ReconError::NoHeaderRow {
            source_name: source_name.to_string(),
        })?;
        let header = &rows[header_idx];
        let width = header_width(header);

        let headers: Vec<String> = (0..width)
            .map(|idx| header_name(&cell_at(header, idx).to_string(), idx))
            .collect();
        let mapping = ColumnMapping::resolve(&headers);

        let mut data = Vec::new();
        for row in &rows[header_idx + 1..] {
            let cells: Vec<CellValue> = (0..width).map(|c| cell_at(row, c).trimmed()).collect();
            if cells.iter().all(|c| *c == CellValue::Empty) {
                continue;
            }
            data.push(ElectionRow::map(&cells, &mapping));
        }

        tracing::debug!(
            header_row = header_idx,
            columns = width,
            rows = data.len(),
            unresolved = ?mapping.unresolved(),
            "election sheet mapped"
        );

        Ok(Self { headers, mapping, rows: data })
    }

    /// Rows with a vote count, projected for reconciliation.
    pub fn records(&self) -> Vec<ElectionRecord> {
        self.rows.iter().filter_map(ElectionRecord::from_row).collect()
    }
}

impl ElectionRecord {
    /// `None` when the row has no `TotalVoteReceived`.
    pub fn from_row(row: &ElectionRow) -> Option<Self> {
        let total_votes = row.get(TOTAL_VOTES).as_integer()?;
        let text = |idx: usize| row.get(idx).as_text().unwrap_or_default().to_string();
        Some(Self {
            candidate_name: text(CANDIDATE_NAME),
            gender: text(GENDER),
            age: row.get(AGE).as_integer(),
            party_name: text(PARTY_NAME),
            total_votes,
            post_name: text(POST_NAME),
            ward: row.get(WARD).as_integer(),
            vdcmun_name: text(VDCMUN_NAME),
            district_name: text(DISTRICT_NAME),
            state_name: text(STATE_NAME),
        })
    }
}

// SQLite stores: census, election and unified_data tables

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags};

use palika_recon::model::{DemographicTotals, ElectionSummary, LocalityKey, Winner};
use palika_recon::schema::{ElectionRow, FieldValue, ELECTION_SCHEMA};
use palika_recon::{CensusRecord, ElectionRecord, MatchConfidence, UnifiedRecord};

use crate::error::IoError;

pub const CENSUS_TABLE: &str = "census";
pub const ELECTION_TABLE: &str = "election";
pub const UNIFIED_TABLE: &str = "unified_data";

// ---------------------------------------------------------------------------
// Table schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub not_null: bool,
}

const fn col(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef { name, sql_type, not_null: false }
}

const fn required(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef { name, sql_type, not_null: true }
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn census() -> Self {
        Self {
            name: CENSUS_TABLE,
            columns: vec![
                required("province", "TEXT"),
                required("district", "TEXT"),
                required("locality", "TEXT"),
                required("sex", "TEXT"),
                required("caste_ethnicity", "TEXT"),
                required("value", "REAL"),
            ],
        }
    }

    /// One nullable column per election schema field, in schema order.
    pub fn election() -> Self {
        Self {
            name: ELECTION_TABLE,
            columns: ELECTION_SCHEMA
                .iter()
                .map(|f| col(f.name, f.kind.sql_type()))
                .collect(),
        }
    }

    pub fn unified() -> Self {
        Self {
            name: UNIFIED_TABLE,
            columns: vec![
                col("province_id", "INTEGER"),
                col("district_id", "INTEGER"),
                col("province_name", "TEXT"),
                col("district_name", "TEXT"),
                col("locality_name", "TEXT"),
                col("census_province", "TEXT"),
                col("census_district", "TEXT"),
                col("census_locality", "TEXT"),
                col("total_population", "REAL"),
                col("male_population", "REAL"),
                col("female_population", "REAL"),
                col("hill_castes", "REAL"),
                col("mountain_hill_janajatis", "REAL"),
                col("tarai_janajatis", "REAL"),
                col("hill_dalits", "REAL"),
                col("others", "REAL"),
                col("total_candidates", "INTEGER"),
                col("total_votes", "INTEGER"),
                col("winning_candidate", "TEXT"),
                col("winning_party", "TEXT"),
                col("winning_votes", "INTEGER"),
                col("match_confidence", "TEXT"),
            ],
        }
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    fn create_sql(&self) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let null = if c.not_null { " NOT NULL" } else { "" };
                format!("\"{}\" {}{null}", c.name, c.sql_type)
            })
            .collect();
        format!("CREATE TABLE IF NOT EXISTS {} ({})", self.name, cols.join(", "))
    }

    fn insert_sql(&self) -> String {
        let names: Vec<String> = self.columns.iter().map(|c| format!("\"{}\"", c.name)).collect();
        let params: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            params.join(", ")
        )
    }
}

// ---------------------------------------------------------------------------
// Replace
// ---------------------------------------------------------------------------

/// Replace the whole contents of `schema`'s table in one transaction:
/// create if missing, delete all rows, insert `rows`, commit.
///
/// Returns the number of rows written. On error nothing is committed.
pub fn replace_rows(
    path: &Path,
    schema: &TableSchema,
    rows: impl IntoIterator<Item = Vec<Value>>,
) -> Result<usize, IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| IoError::File {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let table = schema.name;
    let mut conn = Connection::open(path).map_err(IoError::store(path, table))?;
    let tx = conn.transaction().map_err(IoError::store(path, table))?;

    tx.execute_batch(&schema.create_sql())
        .map_err(IoError::store(path, table))?;
    tx.execute(&format!("DELETE FROM {table}"), [])
        .map_err(IoError::store(path, table))?;

    let mut written = 0;
    {
        let mut stmt = tx
            .prepare(&schema.insert_sql())
            .map_err(IoError::store(path, table))?;
        for row in rows {
            stmt.execute(params_from_iter(row.iter()))
                .map_err(IoError::store(path, table))?;
            written += 1;
        }
    }

    tx.commit().map_err(IoError::store(path, table))?;
    tracing::info!(path = %path.display(), table, rows = written, "table replaced");
    Ok(written)
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn opt_int(n: Option<i64>) -> Value {
    n.map_or(Value::Null, Value::Integer)
}

fn field(v: &FieldValue) -> Value {
    match v {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(n) => Value::Integer(*n),
        FieldValue::Text(s) => text(s),
    }
}

pub fn write_census(path: &Path, records: &[CensusRecord]) -> Result<usize, IoError> {
    let rows = records.iter().map(|r| {
        vec![
            text(&r.province),
            text(&r.district),
            text(&r.locality),
            text(&r.sex),
            text(&r.caste_ethnicity),
            Value::Real(r.value),
        ]
    });
    replace_rows(path, &TableSchema::census(), rows)
}

/// Every mapped row, including those without a vote count.
pub fn write_election(path: &Path, rows: &[ElectionRow]) -> Result<usize, IoError> {
    let rows = rows.iter().map(|r| r.values.iter().map(field).collect());
    replace_rows(path, &TableSchema::election(), rows)
}

pub fn unified_values(r: &UnifiedRecord) -> Vec<Value> {
    let d = &r.demographics;
    let winner = r.election.winner.as_ref();
    vec![
        opt_int(r.province_id),
        opt_int(r.district_id),
        text(&r.province_name),
        text(&r.district_name),
        text(&r.locality_name),
        text(&r.census.province),
        text(&r.census.district),
        text(&r.census.locality),
        Value::Real(d.total_population),
        Value::Real(d.male_population),
        Value::Real(d.female_population),
        Value::Real(d.hill_castes),
        Value::Real(d.mountain_hill_janajatis),
        Value::Real(d.tarai_janajatis),
        Value::Real(d.hill_dalits),
        Value::Real(d.others),
        Value::Integer(r.election.total_candidates),
        Value::Integer(r.election.total_votes),
        winner.map_or(Value::Null, |w| text(&w.candidate_name)),
        winner.map_or(Value::Null, |w| text(&w.party_name)),
        opt_int(winner.map(|w| w.votes)),
        text(r.match_confidence.as_str()),
    ]
}

pub fn write_unified(path: &Path, records: &[UnifiedRecord]) -> Result<usize, IoError> {
    replace_rows(path, &TableSchema::unified(), records.iter().map(unified_values))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

fn open_read_only(path: &Path, table: &'static str) -> Result<Connection, IoError> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(IoError::store(path, table))
}

/// Census rows in insertion order.
pub fn read_census(path: &Path) -> Result<Vec<CensusRecord>, IoError> {
    let conn = open_read_only(path, CENSUS_TABLE)?;
    let mut stmt = conn
        .prepare(
            "SELECT province, district, locality, sex, caste_ethnicity, value
             FROM census ORDER BY rowid",
        )
        .map_err(IoError::store(path, CENSUS_TABLE))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CensusRecord {
                province: row.get(0)?,
                district: row.get(1)?,
                locality: row.get(2)?,
                sex: row.get(3)?,
                caste_ethnicity: row.get(4)?,
                value: row.get(5)?,
            })
        })
        .map_err(IoError::store(path, CENSUS_TABLE))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(IoError::store(path, CENSUS_TABLE))
}

/// Election rows that carry a vote count, in insertion order.
pub fn read_election_records(path: &Path) -> Result<Vec<ElectionRecord>, IoError> {
    let conn = open_read_only(path, ELECTION_TABLE)?;
    let mut stmt = conn
        .prepare(
            "SELECT CandidateName, Gender, Age, PoliticalPartyName, TotalVoteReceived,
                    post_name, Ward, vdcmun_name, district_name, state_name
             FROM election
             WHERE TotalVoteReceived IS NOT NULL
             ORDER BY rowid",
        )
        .map_err(IoError::store(path, ELECTION_TABLE))?;
    let rows = stmt
        .query_map([], |row| {
            let text = |idx: usize| -> rusqlite::Result<String> {
                Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
            };
            Ok(ElectionRecord {
                candidate_name: text(0)?,
                gender: text(1)?,
                age: row.get(2)?,
                party_name: text(3)?,
                total_votes: row.get(4)?,
                post_name: text(5)?,
                ward: row.get(6)?,
                vdcmun_name: text(7)?,
                district_name: text(8)?,
                state_name: text(9)?,
            })
        })
        .map_err(IoError::store(path, ELECTION_TABLE))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(IoError::store(path, ELECTION_TABLE))
}

pub fn read_unified(path: &Path) -> Result<Vec<UnifiedRecord>, IoError> {
    let conn = open_read_only(path, UNIFIED_TABLE)?;
    let sql = format!(
        "SELECT {} FROM {UNIFIED_TABLE} ORDER BY rowid",
        TableSchema::unified().column_names().join(", ")
    );
    let mut stmt = conn.prepare(&sql).map_err(IoError::store(path, UNIFIED_TABLE))?;
    let rows = stmt
        .query_map([], |row| {
            let winner = row.get::<_, Option<String>>(18)?.map(|candidate_name| -> rusqlite::Result<Winner> {
                Ok(Winner {
                    candidate_name,
                    party_name: row.get::<_, Option<String>>(19)?.unwrap_or_default(),
                    votes: row.get::<_, Option<i64>>(20)?.unwrap_or_default(),
                })
            });
            let confidence: String = row.get(21)?;
            Ok(UnifiedRecord {
                province_id: row.get(0)?,
                district_id: row.get(1)?,
                province_name: row.get(2)?,
                district_name: row.get(3)?,
                locality_name: row.get(4)?,
                census: LocalityKey {
                    province: row.get(5)?,
                    district: row.get(6)?,
                    locality: row.get(7)?,
                },
                demographics: DemographicTotals {
                    total_population: row.get(8)?,
                    male_population: row.get(9)?,
                    female_population: row.get(10)?,
                    hill_castes: row.get(11)?,
                    mountain_hill_janajatis: row.get(12)?,
                    tarai_janajatis: row.get(13)?,
                    hill_dalits: row.get(14)?,
                    others: row.get(15)?,
                },
                election: ElectionSummary {
                    total_candidates: row.get(16)?,
                    total_votes: row.get(17)?,
                    winner: winner.transpose()?,
                },
                match_confidence: MatchConfidence::parse(&confidence)
                    .unwrap_or(MatchConfidence::NoMatch),
            })
        })
        .map_err(IoError::store(path, UNIFIED_TABLE))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(IoError::store(path, UNIFIED_TABLE))
}

/// Row count of `table`, or `None` when the store or table does not exist.
pub fn row_count(path: &Path, table: &'static str) -> Result<Option<usize>, IoError> {
    if !path.exists() {
        return Ok(None);
    }
    let conn = open_read_only(path, table)?;
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .map_err(IoError::store(path, table))?;
    if !exists {
        return Ok(None);
    }
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(IoError::store(path, table))?;
    Ok(Some(count as usize))
}

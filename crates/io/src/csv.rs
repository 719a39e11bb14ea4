// CSV export of the unified table

use std::path::Path;

use rusqlite::types::Value;

use palika_recon::UnifiedRecord;

use crate::error::IoError;
use crate::store::{unified_values, TableSchema};

/// Write unified records as CSV, header = `unified_data` column names.
/// NULL columns are written as empty fields.
pub fn write_unified(path: &Path, records: &[UnifiedRecord]) -> Result<(), IoError> {
    let err = |source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new().from_path(path).map_err(err)?;

    writer
        .write_record(TableSchema::unified().column_names())
        .map_err(err)?;
    for record in records {
        let fields: Vec<String> = unified_values(record).iter().map(render).collect();
        writer.write_record(&fields).map_err(err)?;
    }

    writer.flush().map_err(|source| IoError::File {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = records.len(), "unified csv written");
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(n) => n.to_string(),
        Value::Real(n) => palika_recon::cell::format_number(*n),
        Value::Text(s) => s.clone(),
        Value::Blob(_) => String::new(),
    }
}

// Reference map (district/palika bilingual table) loading

use std::path::Path;

use palika_recon::LocationMapping;

use crate::error::IoError;

/// Load the reference table from a JSON array of mapping objects.
pub fn load_mappings(path: &Path) -> Result<Vec<LocationMapping>, IoError> {
    let content = std::fs::read_to_string(path).map_err(|source| IoError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let mappings = parse_mappings(&content).map_err(|source| IoError::Reference {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), mappings = mappings.len(), "reference map loaded");
    Ok(mappings)
}

/// Unknown fields are ignored; missing ones are left empty.
pub fn parse_mappings(json: &str) -> Result<Vec<LocationMapping>, serde_json::Error> {
    serde_json::from_str(json)
}

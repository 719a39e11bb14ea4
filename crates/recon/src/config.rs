use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub census: CensusLayout,
    #[serde(default)]
    pub matching: MatchingConfig,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Source, reference and store locations. Defaults mirror the `res/` layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub census_xlsx: PathBuf,
    pub election_xlsx: PathBuf,
    pub reference_map: PathBuf,
    pub census_db: PathBuf,
    pub election_db: PathBuf,
    pub unified_db: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            census_xlsx: PathBuf::from("res/census.xlsx"),
            election_xlsx: PathBuf::from("res/election.xlsx"),
            reference_map: PathBuf::from("res/map.json"),
            census_db: PathBuf::from("res/census.db"),
            election_db: PathBuf::from("res/election.db"),
            unified_db: PathBuf::from("res/unified.db"),
        }
    }
}

// ---------------------------------------------------------------------------
// Census sheet layout
// ---------------------------------------------------------------------------

/// Fixed positions of the census columns (0-based) and the first data row.
///
/// The rows before `start_row` hold the sheet title and legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CensusLayout {
    pub start_row: usize,
    pub province: usize,
    pub district: usize,
    pub locality: usize,
    pub sex: usize,
    pub caste: usize,
    pub value: usize,
}

impl Default for CensusLayout {
    fn default() -> Self {
        Self {
            start_row: 35,
            province: 1,
            district: 2,
            locality: 3,
            sex: 4,
            caste: 5,
            value: 6,
        }
    }
}

impl CensusLayout {
    fn columns(&self) -> [usize; 6] {
        [self.province, self.district, self.locality, self.sex, self.caste, self.value]
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    /// Minimum normalized edit-distance similarity for a fuzzy name match.
    pub threshold: f64,
    /// Log a progress line every N processed census localities.
    pub progress_every: usize,
}

pub const DEFAULT_THRESHOLD: f64 = 0.7;

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            progress_every: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let threshold = self.matching.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ReconError::ConfigValidation(format!(
                "matching.threshold must be between 0 and 1, got {threshold}"
            )));
        }

        if self.matching.progress_every == 0 {
            return Err(ReconError::ConfigValidation(
                "matching.progress_every must be at least 1".into(),
            ));
        }

        // Each census field needs its own column
        let mut cols = self.census.columns();
        cols.sort_unstable();
        if cols.windows(2).any(|w| w[0] == w[1]) {
            return Err(ReconError::ConfigValidation(format!(
                "census columns must be distinct, got {:?}",
                self.census.columns()
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.census, CensusLayout::default());
        assert_eq!(config.census.start_row, 35);
        assert_eq!(config.matching.threshold, 0.7);
        assert_eq!(config.matching.progress_every, 100);
        assert_eq!(config.paths.census_db, PathBuf::from("res/census.db"));
        assert_eq!(config.paths.reference_map, PathBuf::from("res/map.json"));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ReconConfig::from_toml(
            r#"
[paths]
unified_db = "out/unified.db"

[census]
start_row = 2

[matching]
threshold = 0.8
"#,
        )
        .unwrap();
        assert_eq!(config.paths.unified_db, PathBuf::from("out/unified.db"));
        assert_eq!(config.paths.census_xlsx, PathBuf::from("res/census.xlsx"));
        assert_eq!(config.census.start_row, 2);
        assert_eq!(config.census.value, 6);
        assert_eq!(config.matching.threshold, 0.8);
        assert_eq!(config.matching.progress_every, 100);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = ReconConfig::from_toml("[matching]\nthreshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn rejects_zero_progress_interval() {
        let err = ReconConfig::from_toml("[matching]\nprogress_every = 0\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_overlapping_census_columns() {
        let err = ReconConfig::from_toml("[census]\nsex = 3\n").unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ReconConfig::from_toml("[matching]\nthreshhold = 0.5\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}

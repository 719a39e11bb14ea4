use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad threshold, overlapping census columns, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// No row with a non-blank cell was found in a source that needs a header.
    #[error("no header row found in {source_name}")]
    NoHeaderRow { source_name: String },
}

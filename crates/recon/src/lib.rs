//! `palika-recon`: census/election location reconciliation engine.
//!
//! Pure engine crate: receives pre-extracted sheet rows and records, returns
//! unified per-locality results. No file or database IO.

pub mod aggregate;
pub mod cell;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
pub mod schema;
pub mod wrangle;

pub use cell::{CellValue, RawRow};
pub use config::{CensusLayout, MatchingConfig, ReconConfig};
pub use engine::reconcile;
pub use error::ReconError;
pub use evidence::build_report;
pub use matcher::{LocationMatcher, ProvinceTable};
pub use model::{
    CensusRecord, ElectionRecord, LocationMapping, MatchConfidence, Reconciliation, RunReport,
    UnifiedRecord,
};
pub use schema::ElectionTable;
pub use wrangle::wrangle;

//! Census → election → unified pipeline over the configured paths.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use palika_io::{csv, reference, store, xlsx};
use palika_recon::config::{CensusLayout, MatchingConfig};
use palika_recon::model::ReconSummary;
use palika_recon::{
    build_report, reconcile, wrangle, ElectionTable, LocationMatcher, ProvinceTable, ReconConfig,
};

use crate::exit_codes::EXIT_MISSING_INPUT;
use crate::CliError;

/// Outputs requested next to the unified store.
#[derive(Debug, Clone, Default)]
pub struct Outputs {
    pub csv: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// Locations used by the unify stage.
#[derive(Debug, Clone)]
pub struct UnifyPaths {
    pub reference_map: PathBuf,
    pub census_db: PathBuf,
    pub election_db: PathBuf,
    pub unified_db: PathBuf,
}

impl From<&ReconConfig> for UnifyPaths {
    fn from(config: &ReconConfig) -> Self {
        Self {
            reference_map: config.paths.reference_map.clone(),
            census_db: config.paths.census_db.clone(),
            election_db: config.paths.election_db.clone(),
            unified_db: config.paths.unified_db.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Reuse,
    Build,
}

fn missing(what: &str, path: &Path) -> CliError {
    CliError {
        code: EXIT_MISSING_INPUT,
        message: format!("{what} not found: {}", path.display()),
        hint: None,
    }
}

/// Decide whether an intermediate store is reused or rebuilt. Errors when
/// the store must be built and its source workbook is absent.
fn plan(stage: &str, db: &Path, source: &Path, force: bool) -> Result<Step, CliError> {
    if db.exists() && !force {
        return Ok(Step::Reuse);
    }
    if source.exists() {
        return Ok(Step::Build);
    }
    let message = if db.exists() {
        format!("{stage} workbook not found: {} (needed by --force)", source.display())
    } else {
        format!(
            "neither {stage} store {} nor workbook {} exists",
            db.display(),
            source.display()
        )
    };
    Err(CliError {
        code: EXIT_MISSING_INPUT,
        message,
        hint: Some(format!("place the {stage} workbook at {} or pass --config", source.display())),
    })
}

/// Full run: build missing stores, then reconcile into the unified store.
pub fn run_all(
    config: &ReconConfig,
    force: bool,
    outputs: &Outputs,
) -> Result<ReconSummary, CliError> {
    let paths = &config.paths;

    // Every input is checked before anything is written
    let census_step = plan("census", &paths.census_db, &paths.census_xlsx, force)?;
    let election_step = plan("election", &paths.election_db, &paths.election_xlsx, force)?;
    if !paths.reference_map.exists() {
        return Err(missing("reference map", &paths.reference_map));
    }

    match census_step {
        Step::Build => {
            build_census(&paths.census_xlsx, &paths.census_db, &config.census)?;
        }
        Step::Reuse => warn!(
            db = %paths.census_db.display(),
            rows = ?store::row_count(&paths.census_db, store::CENSUS_TABLE).ok().flatten(),
            "census store exists, skipping conversion"
        ),
    }
    match election_step {
        Step::Build => {
            build_election(&paths.election_xlsx, &paths.election_db)?;
        }
        Step::Reuse => warn!(
            db = %paths.election_db.display(),
            rows = ?store::row_count(&paths.election_db, store::ELECTION_TABLE).ok().flatten(),
            "election store exists, skipping conversion"
        ),
    }

    unify(&UnifyPaths::from(config), &config.matching, outputs)
}

/// Wrangle the census workbook and replace the census table.
pub fn build_census(source: &Path, db: &Path, layout: &CensusLayout) -> Result<usize, CliError> {
    if !source.exists() {
        return Err(missing("census workbook", source));
    }
    info!(source = %source.display(), db = %db.display(), "generating census store");
    let rows = xlsx::read_first_sheet(source)?;
    let records = wrangle(&rows, layout);
    if records.is_empty() {
        warn!(source = %source.display(), "no census records resolved; check census.start_row and columns");
    }
    Ok(store::write_census(db, &records)?)
}

/// Map the election workbook onto the fixed schema and replace the election table.
pub fn build_election(source: &Path, db: &Path) -> Result<usize, CliError> {
    if !source.exists() {
        return Err(missing("election workbook", source));
    }
    info!(source = %source.display(), db = %db.display(), "generating election store");
    let rows = xlsx::read_first_sheet(source)?;
    let table = ElectionTable::from_rows(&rows, &source.display().to_string())?;
    let unresolved = table.mapping.unresolved();
    if !unresolved.is_empty() {
        info!(fields = ?unresolved, "election fields without a source column");
    }
    Ok(store::write_election(db, &table.rows)?)
}

/// Reconcile the stored census and election tables into `unified_data`.
pub fn unify(
    paths: &UnifyPaths,
    matching: &MatchingConfig,
    outputs: &Outputs,
) -> Result<ReconSummary, CliError> {
    for (what, path) in [
        ("census store", &paths.census_db),
        ("election store", &paths.election_db),
        ("reference map", &paths.reference_map),
    ] {
        if !path.exists() {
            return Err(missing(what, path));
        }
    }

    info!(db = %paths.unified_db.display(), "generating unified store");
    let census = store::read_census(&paths.census_db)?;
    let election = store::read_election_records(&paths.election_db)?;
    let mappings = reference::load_mappings(&paths.reference_map)?;

    let matcher =
        LocationMatcher::new(ProvinceTable::nepal(), mappings).with_threshold(matching.threshold);
    let result = reconcile(&census, &election, &matcher, matching);

    store::write_unified(&paths.unified_db, &result.records)?;

    // CSV mirrors the committed table
    if let Some(ref path) = outputs.csv {
        csv::write_unified(path, &store::read_unified(&paths.unified_db)?)?;
    }
    if let Some(ref path) = outputs.report {
        let report = build_report(&result);
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("report serialization error: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| CliError::runtime(format!("cannot write report {}: {e}", path.display())))?;
        info!(path = %path.display(), "run report written");
    }

    Ok(result.summary)
}

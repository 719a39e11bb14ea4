// palika CLI - census/election location reconciliation pipeline

mod exit_codes;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use palika_io::IoError;
use palika_recon::{ReconConfig, ReconError};

use exit_codes::{
    EXIT_ERROR, EXIT_MALFORMED_SOURCE, EXIT_MISSING_INPUT, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE,
};
use pipeline::{Outputs, UnifyPaths};

#[derive(Parser)]
#[command(name = "palika")]
#[command(about = "Reconcile Nepal census localities with local election results")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(flatten)]
    shared: SharedArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SharedArgs {
    /// TOML config (paths, census layout, matching); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Regenerate census/election stores even if they exist
    #[arg(long, global = true)]
    force: bool,

    /// Also write the unified table as CSV
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Write a JSON run report (summary, match rate, unmatched localities)
    #[arg(long, global = true)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: census store, election store, unified store (default)
    #[command(after_help = "\
Examples:
  palika run
  palika run --config palika.toml --force
  palika run --csv res/unified.csv --report res/report.json")]
    Run,

    /// Rebuild the census store from the census workbook
    Census {
        /// Census workbook (defaults to paths.census_xlsx)
        xlsx: Option<PathBuf>,

        /// Output store (defaults to paths.census_db)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Rebuild the election store from the election workbook
    Election {
        /// Election workbook (defaults to paths.election_xlsx)
        xlsx: Option<PathBuf>,

        /// Output store (defaults to paths.election_db)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Reconcile existing census and election stores
    #[command(after_help = "\
Examples:
  palika unify
  palika unify --map res/map.json --out out/unified.db --csv out/unified.csv")]
    Unify {
        /// Reference map JSON (defaults to paths.reference_map)
        #[arg(long)]
        map: Option<PathBuf>,

        #[arg(long)]
        census_db: Option<PathBuf>,

        #[arg(long)]
        election_db: Option<PathBuf>,

        /// Unified store (defaults to paths.unified_db)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("PALIKA_COMMIT"), ")",
        "\nrecon:   palika-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("PALIKA_TARGET"),
    )
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                tracing::error!("{message}");
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let shared = cli.shared;
    let config = load_config(shared.config.as_deref())?;
    let outputs = Outputs {
        csv: shared.csv,
        report: shared.report,
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let summary = pipeline::run_all(&config, shared.force, &outputs)?;
            print_summary(&summary, &config.paths.unified_db);
        }
        Commands::Census { xlsx, db } => {
            let source = xlsx.unwrap_or(config.paths.census_xlsx);
            let db = db.unwrap_or(config.paths.census_db);
            let rows = pipeline::build_census(&source, &db, &config.census)?;
            println!("{rows} census records -> {}", db.display());
        }
        Commands::Election { xlsx, db } => {
            let source = xlsx.unwrap_or(config.paths.election_xlsx);
            let db = db.unwrap_or(config.paths.election_db);
            let rows = pipeline::build_election(&source, &db)?;
            println!("{rows} election rows -> {}", db.display());
        }
        Commands::Unify { map, census_db, election_db, out } => {
            let defaults = UnifyPaths::from(&config);
            let paths = UnifyPaths {
                reference_map: map.unwrap_or(defaults.reference_map),
                census_db: census_db.unwrap_or(defaults.census_db),
                election_db: election_db.unwrap_or(defaults.election_db),
                unified_db: out.unwrap_or(defaults.unified_db),
            };
            let summary = pipeline::unify(&paths, &config.matching, &outputs)?;
            print_summary(&summary, &paths.unified_db);
        }
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::usage(format!("cannot read config {}: {e}", path.display()))
    })?;
    ReconConfig::from_toml(&content).map_err(|e| {
        CliError::usage(format!("{}: {e}", path.display()))
            .with_hint("see the `[paths]`, `[census]` and `[matching]` tables")
    })
}

fn print_summary(summary: &palika_recon::model::ReconSummary, out: &std::path::Path) {
    println!(
        "{} localities processed, {} matched ({:.2}%) -> {}",
        summary.localities_processed,
        summary.localities_matched,
        summary.match_rate(),
        out.display()
    );
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Display of `err` followed by each source, joined with `: `.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let code = match &err {
            IoError::Workbook { .. }
            | IoError::Sheet { .. }
            | IoError::NoSheets { .. }
            | IoError::Reference { .. } => EXIT_MALFORMED_SOURCE,
            IoError::File { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                EXIT_MISSING_INPUT
            }
            IoError::Recon(ReconError::NoHeaderRow { .. }) => EXIT_MALFORMED_SOURCE,
            IoError::Recon(_) => EXIT_USAGE,
            IoError::File { .. } | IoError::Store { .. } | IoError::Csv { .. } => EXIT_RUNTIME,
        };
        Self { code, message: error_chain(&err), hint: None }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        IoError::from(err).into()
    }
}

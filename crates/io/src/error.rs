use std::path::PathBuf;

use palika_recon::ReconError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open workbook {}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} contains no sheets", path.display())]
    NoSheets { path: PathBuf },

    #[error("cannot read sheet '{sheet}' in {}", path.display())]
    Sheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("store {}: table {table}", path.display())]
    Store {
        path: PathBuf,
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid reference map {}", path.display())]
    Reference {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Recon(#[from] ReconError),
}

impl IoError {
    pub(crate) fn store<'a>(
        path: &'a std::path::Path,
        table: &'static str,
    ) -> impl FnOnce(rusqlite::Error) -> Self + 'a {
        move |source| IoError::Store {
            path: path.to_path_buf(),
            table,
            source,
        }
    }
}

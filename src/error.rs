use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a run before any output is written.
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Unable to open workbook {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Unable to read sheet '{sheet}' from {path:?}: {source}")]
    ReadSheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Workbook is missing the required sheet '{0}'")]
    MissingSheet(String),

    #[error("Sheet '{sheet}' has no '{column}' column; run `migrate` first")]
    MissingColumn { sheet: String, column: String },

    #[error("Workbook is already migrated; re-run against the original legacy file")]
    AlreadyMigrated,

    #[error("Output path {0:?} would overwrite the input workbook")]
    SameOutput(PathBuf),

    #[error("Writing workbook failed: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Replacing output file failed: {0}")]
    Persist(#[from] tempfile::PersistError),
}

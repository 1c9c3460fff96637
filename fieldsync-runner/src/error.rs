use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the runner, its steps and event publishing.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog error: {0}")]
    Catalog(#[from] fieldsync_core::CatalogError),

    #[error("sync error: {0}")]
    Sync(#[from] fieldsync_sync::SyncError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RunnerError {
    RunnerError::Io {
        path: path.into(),
        source,
    }
}

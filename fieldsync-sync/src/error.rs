//! Error types for fieldsync-sync.

use std::error::Error as StdError;

use thiserror::Error;

use fieldsync_core::{CatalogError, MetadataError};

/// All errors that can arise from a reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The metadata source could not describe the table.
    #[error("failed to fetch metadata for {database}.{table}: {source}")]
    MetadataFetch {
        database: String,
        table: String,
        #[source]
        source: MetadataError,
    },

    /// A catalog write or read failed.
    #[error("catalog error: {0}")]
    Persistence(#[from] CatalogError),
}

/// Render an error and every `source()` beneath it, one per line.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

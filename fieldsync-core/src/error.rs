//! Error types for fieldsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{FieldId, TableId};

/// Failures raised by a [`CatalogStore`](crate::catalog::CatalogStore).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying I/O failure, annotated with the path being accessed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse catalog at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("field {0} not found in catalog")]
    FieldNotFound(FieldId),

    /// A create would break case-insensitive name uniqueness within a table.
    #[error("table {table_id} already has a field named '{name}'")]
    DuplicateName { table_id: TableId, name: String },
}

/// Failures raised by a [`MetadataSource`](crate::source::MetadataSource).
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata source unreachable: {0}")]
    Unreachable(String),

    #[error("table '{0}' not present in source metadata")]
    TableNotFound(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot JSON parse error, with the offending file.
    #[error("failed to parse schema snapshot at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn catalog_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn metadata_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MetadataError {
    MetadataError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_message_names_table_and_field() {
        let err = CatalogError::DuplicateName {
            table_id: TableId(4),
            name: "Email".into(),
        };
        assert_eq!(err.to_string(), "table 4 already has a field named 'Email'");
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(CatalogError::HomeNotFound.to_string().contains("home directory"));
    }
}

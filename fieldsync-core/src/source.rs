//! Metadata sources: where field descriptors come from.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{metadata_io_err, MetadataError};
use crate::types::{Database, DatabaseId, FieldDescriptor, Table, TableId};

/// Reports the live column layout of a table.
pub trait MetadataSource: Send + Sync {
    /// Top-level field descriptors of `table`. Nested columns are not expanded.
    fn fetch(&self, database: &Database, table: &Table)
        -> Result<Vec<FieldDescriptor>, MetadataError>;
}

// ---------------------------------------------------------------------------
// StaticSource
// ---------------------------------------------------------------------------

/// Fixed descriptors keyed by table id.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tables: HashMap<TableId, Vec<FieldDescriptor>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableId, fields: Vec<FieldDescriptor>) -> Self {
        self.tables.insert(table, fields);
        self
    }

    pub fn set_table(&mut self, table: TableId, fields: Vec<FieldDescriptor>) {
        self.tables.insert(table, fields);
    }
}

impl MetadataSource for StaticSource {
    fn fetch(
        &self,
        _database: &Database,
        table: &Table,
    ) -> Result<Vec<FieldDescriptor>, MetadataError> {
        self.tables
            .get(&table.id)
            .cloned()
            .ok_or_else(|| MetadataError::TableNotFound(table.qualified_name()))
    }
}

// ---------------------------------------------------------------------------
// Schema snapshot
// ---------------------------------------------------------------------------

/// One table inside a [`SchemaSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTable {
    pub id: TableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// A JSON dump of a database's schema, as a driver would describe it.
///
/// ```json
/// {
///   "database": {"id": 1, "name": "shop"},
///   "tables": [{"id": 10, "name": "users", "fields": [
///     {"name": "id", "base_type": "type/Integer", "pk?": true}
///   ]}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub database: Database,
    #[serde(default)]
    pub tables: Vec<SnapshotTable>,
}

impl SchemaSnapshot {
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let contents = std::fs::read_to_string(path).map_err(|e| metadata_io_err(path, e))?;
        serde_json::from_str(&contents).map_err(|e| MetadataError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Tables of the snapshot as catalog targets.
    pub fn tables(&self) -> Vec<Table> {
        self.tables
            .iter()
            .map(|t| Table {
                id: t.id,
                db_id: self.database.id,
                schema: t.schema.clone(),
                name: t.name.clone(),
            })
            .collect()
    }
}

/// [`MetadataSource`] answering from a [`SchemaSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: SchemaSnapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &SchemaSnapshot {
        &self.snapshot
    }
}

impl MetadataSource for SnapshotSource {
    fn fetch(
        &self,
        database: &Database,
        table: &Table,
    ) -> Result<Vec<FieldDescriptor>, MetadataError> {
        if database.id != self.snapshot.database.id {
            return Err(MetadataError::Unreachable(format!(
                "snapshot describes database {}, not {}",
                self.snapshot.database.id, database.id
            )));
        }
        self.snapshot
            .tables
            .iter()
            .find(|t| t.id == table.id)
            .map(|t| t.fields.clone())
            .ok_or_else(|| MetadataError::TableNotFound(table.qualified_name()))
    }
}

/// Convenience for tests and fixtures: a bare database handle.
pub fn database(id: u64, name: &str) -> Database {
    Database {
        id: DatabaseId(id),
        name: name.to_owned(),
        engine: None,
    }
}

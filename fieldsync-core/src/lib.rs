//! fieldsync core library: domain types, collaborator contracts, errors.
//!
//! Public API surface:
//! - [`types`] / [`semantic`]: identifiers, descriptors, persisted fields,
//!   the semantic-type hierarchy
//! - [`catalog`] / [`yaml_catalog`]: [`CatalogStore`] and its implementations
//! - [`source`]: [`MetadataSource`] and snapshot-backed sources
//! - [`humanize`]: display-name derivation
//! - [`context`]: [`ExecContext`]
//! - [`error`]: [`CatalogError`], [`MetadataError`]

pub mod catalog;
pub mod context;
pub mod error;
pub mod humanize;
pub mod paths;
pub mod semantic;
pub mod source;
pub mod types;
pub mod yaml_catalog;

pub use catalog::{CatalogState, CatalogStore, MemoryCatalog};
pub use context::ExecContext;
pub use error::{CatalogError, MetadataError};
pub use humanize::{DefaultHumanizer, NameHumanizer};
pub use semantic::SemanticType;
pub use source::{MetadataSource, SchemaSnapshot, SnapshotSource, StaticSource};
pub use types::{
    BaseType, Database, DatabaseId, FieldDescriptor, FieldId, FieldUpdate, NewField,
    PersistedField, Table, TableId,
};
pub use yaml_catalog::YamlCatalog;

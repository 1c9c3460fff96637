//! Domain types for the field catalog.
//!
//! Identifiers are newtypes; descriptors are transient values reported by a
//! metadata source, persisted fields are what the catalog store keeps.
//! All types are serializable/deserializable via serde.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::semantic::SemanticType;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a database registered in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseId(pub u64);

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for DatabaseId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of a table inside a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u64);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for TableId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for FieldId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Physical column type as reported by the driver, e.g. `type/Integer`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseType(pub String);

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BaseType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BaseType {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// A physical database whose schema is mirrored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub id: DatabaseId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

/// A table of a [`Database`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub db_id: DatabaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl Table {
    /// `schema.name`, or just `name` for schemaless engines.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Shape of one column as reported by a metadata source.
///
/// Identity is the lowercase `name`; two descriptors in the same table with
/// names differing only by case describe the same field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub base_type: BaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_type: Option<SemanticType>,
    #[serde(default, rename = "pk?")]
    pub is_primary_key: bool,
    /// Parent of a nested column. Carried through on create, never recursed into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FieldId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, base_type: impl Into<BaseType>) -> Self {
        Self {
            name: name.into(),
            base_type: base_type.into(),
            special_type: None,
            is_primary_key: false,
            parent_id: None,
            source_column_ref: None,
            display_name: None,
        }
    }

    pub fn with_special_type(mut self, special_type: SemanticType) -> Self {
        self.special_type = Some(special_type);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Lowercased name used for all identity comparisons.
    pub fn identity(&self) -> String {
        self.name.to_lowercase()
    }

    /// Special type to record for a field first seen with this shape:
    /// the declared one, else `type/PK` for primary keys.
    pub fn effective_special_type(&self) -> Option<SemanticType> {
        self.special_type
            .or(self.is_primary_key.then_some(SemanticType::PK))
    }
}

/// A field as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedField {
    pub id: FieldId,
    pub table_id: TableId,
    pub name: String,
    pub display_name: String,
    pub base_type: BaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_type: Option<SemanticType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FieldId>,
    pub active: bool,
}

impl PersistedField {
    /// Project to descriptor shape for diffing.
    ///
    /// `is_primary_key` is derived from the stored special type.
    pub fn to_descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            base_type: self.base_type.clone(),
            special_type: self.special_type,
            is_primary_key: self
                .special_type
                .is_some_and(|t| t.is_a(SemanticType::PK)),
            parent_id: self.parent_id,
            source_column_ref: None,
            display_name: Some(self.display_name.clone()),
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Attributes of a field about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewField {
    pub table_id: TableId,
    pub name: String,
    pub display_name: String,
    pub base_type: BaseType,
    pub special_type: Option<SemanticType>,
    pub parent_id: Option<FieldId>,
}

/// Partial update of a persisted field. `None` leaves the attribute alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub base_type: Option<BaseType>,
    pub special_type: Option<SemanticType>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        self.base_type.is_none() && self.special_type.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

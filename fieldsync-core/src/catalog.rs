//! Catalog store contract and the in-memory implementation.
//!
//! The store owns persisted fields. It serializes its own writes but offers
//! no transaction spanning several calls; a reconciliation pass issues
//! independent create / reactivate / retire / update calls.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::types::{FieldId, FieldUpdate, NewField, PersistedField, Table, TableId};

/// Persistent catalog of fields.
pub trait CatalogStore: Send + Sync {
    /// Active fields of `table`.
    fn active_fields(&self, table: &Table) -> Result<Vec<PersistedField>, CatalogError>;

    /// Every field of `table`, retired ones included.
    fn fields(&self, table: &Table) -> Result<Vec<PersistedField>, CatalogError>;

    /// Id of an inactive field of `table` whose name matches case-insensitively.
    fn find_inactive_by_name(
        &self,
        table: &Table,
        name: &str,
    ) -> Result<Option<FieldId>, CatalogError>;

    /// Flip `active` back on. No other attribute changes.
    fn reactivate(&self, id: FieldId) -> Result<(), CatalogError>;

    fn create(&self, field: NewField) -> Result<FieldId, CatalogError>;

    /// Mark every active field of `table` whose name matches one of `names`
    /// (case-insensitively) inactive. Returns how many were retired.
    fn retire_matching(&self, table: &Table, names: &[String]) -> Result<usize, CatalogError>;

    fn update(&self, id: FieldId, update: FieldUpdate) -> Result<(), CatalogError>;
}

// ---------------------------------------------------------------------------
// Catalog state
// ---------------------------------------------------------------------------

/// Plain catalog contents shared by the in-memory and YAML stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogState {
    pub version: u32,
    pub next_field_id: u64,
    #[serde(default)]
    pub fields: Vec<PersistedField>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            version: 1,
            next_field_id: 1,
            fields: Vec::new(),
        }
    }
}

impl CatalogState {
    pub fn fields_of(&self, table_id: TableId) -> Vec<PersistedField> {
        self.fields
            .iter()
            .filter(|f| f.table_id == table_id)
            .cloned()
            .collect()
    }

    pub fn active_fields_of(&self, table_id: TableId) -> Vec<PersistedField> {
        self.fields
            .iter()
            .filter(|f| f.table_id == table_id && f.active)
            .cloned()
            .collect()
    }

    pub fn find_inactive_by_name(&self, table_id: TableId, name: &str) -> Option<FieldId> {
        self.fields
            .iter()
            .find(|f| f.table_id == table_id && !f.active && f.has_name(name))
            .map(|f| f.id)
    }

    pub fn reactivate(&mut self, id: FieldId) -> Result<(), CatalogError> {
        self.field_mut(id)?.active = true;
        Ok(())
    }

    pub fn create(&mut self, field: NewField) -> Result<FieldId, CatalogError> {
        if self
            .fields
            .iter()
            .any(|f| f.table_id == field.table_id && f.has_name(&field.name))
        {
            return Err(CatalogError::DuplicateName {
                table_id: field.table_id,
                name: field.name,
            });
        }

        let id = FieldId(self.next_field_id);
        self.next_field_id += 1;
        self.fields.push(PersistedField {
            id,
            table_id: field.table_id,
            name: field.name,
            display_name: field.display_name,
            base_type: field.base_type,
            special_type: field.special_type,
            parent_id: field.parent_id,
            active: true,
        });
        Ok(id)
    }

    pub fn retire_matching(&mut self, table_id: TableId, names: &[String]) -> usize {
        let names: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        let mut retired = 0;
        for field in self
            .fields
            .iter_mut()
            .filter(|f| f.table_id == table_id && f.active)
        {
            if names.contains(&field.name.to_lowercase()) {
                field.active = false;
                retired += 1;
            }
        }
        retired
    }

    pub fn update(&mut self, id: FieldId, update: FieldUpdate) -> Result<(), CatalogError> {
        let field = self.field_mut(id)?;
        if let Some(base_type) = update.base_type {
            field.base_type = base_type;
        }
        if let Some(special_type) = update.special_type {
            field.special_type = Some(special_type);
        }
        Ok(())
    }

    fn field_mut(&mut self, id: FieldId) -> Result<&mut PersistedField, CatalogError> {
        self.fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(CatalogError::FieldNotFound(id))
    }
}

// ---------------------------------------------------------------------------
// MemoryCatalog
// ---------------------------------------------------------------------------

/// Mutex-protected in-memory catalog.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<CatalogState>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: CatalogState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> CatalogState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CatalogStore for MemoryCatalog {
    fn active_fields(&self, table: &Table) -> Result<Vec<PersistedField>, CatalogError> {
        Ok(self.lock().active_fields_of(table.id))
    }

    fn fields(&self, table: &Table) -> Result<Vec<PersistedField>, CatalogError> {
        Ok(self.lock().fields_of(table.id))
    }

    fn find_inactive_by_name(
        &self,
        table: &Table,
        name: &str,
    ) -> Result<Option<FieldId>, CatalogError> {
        Ok(self.lock().find_inactive_by_name(table.id, name))
    }

    fn reactivate(&self, id: FieldId) -> Result<(), CatalogError> {
        self.lock().reactivate(id)
    }

    fn create(&self, field: NewField) -> Result<FieldId, CatalogError> {
        self.lock().create(field)
    }

    fn retire_matching(&self, table: &Table, names: &[String]) -> Result<usize, CatalogError> {
        Ok(self.lock().retire_matching(table.id, names))
    }

    fn update(&self, id: FieldId, update: FieldUpdate) -> Result<(), CatalogError> {
        self.lock().update(id, update)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

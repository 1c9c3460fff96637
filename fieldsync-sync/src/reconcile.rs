//! Field reconciliation for a single table.
//!
//! ## `reconcile`: pass order
//!
//! 1. Fetch source descriptors for the table.
//! 2. Load active catalog fields and project them to descriptors.
//! 3. Diff both ways: additions (source − local), removals (local − source).
//! 4. Additions: reactivate a same-named inactive field, else create one.
//! 5. Removals: retire every matching active field in one call.
//! 6. Refresh: sync `base_type`, fill `special_type` when absent.
//!
//! Steps run strictly in this order. Collaborator failures propagate; nothing
//! here retries or rolls back, so a failure mid-pass leaves earlier writes in
//! place. Nested descriptors (`parent_id` set) are created with their parent
//! reference but their children are never fetched.

use std::collections::HashMap;

use serde::Serialize;

use fieldsync_core::{
    context::DB_LOG_TARGET, CatalogStore, Database, ExecContext, FieldDescriptor, FieldUpdate,
    MetadataSource, NameHumanizer, NewField, Table,
};

use crate::diff::{dedup_by_identity, diff};
use crate::SyncError;

macro_rules! db_debug {
    ($ctx:expr, $($arg:tt)+) => {
        if $ctx.db_logging_enabled() {
            tracing::debug!(target: DB_LOG_TARGET, $($arg)+);
        }
    };
}

/// Counts of catalog writes made by one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub created: usize,
    pub reactivated: usize,
    pub retired: usize,
    pub refreshed: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    pub fn merge(&mut self, other: ReconcileReport) {
        self.created += other.created;
        self.reactivated += other.reactivated;
        self.retired += other.retired;
        self.refreshed += other.refreshed;
    }
}

/// Brings the catalog's fields for a table in line with the metadata source.
pub struct FieldReconciler<'a> {
    source: &'a dyn MetadataSource,
    store: &'a dyn CatalogStore,
    humanizer: &'a dyn NameHumanizer,
}

impl<'a> FieldReconciler<'a> {
    pub fn new(
        source: &'a dyn MetadataSource,
        store: &'a dyn CatalogStore,
        humanizer: &'a dyn NameHumanizer,
    ) -> Self {
        Self {
            source,
            store,
            humanizer,
        }
    }

    /// Run one reconciliation pass for `table`.
    pub fn reconcile(
        &self,
        ctx: &ExecContext,
        database: &Database,
        table: &Table,
    ) -> Result<ReconcileReport, SyncError> {
        let mut report = ReconcileReport::default();

        // Steps 1-2.
        let source_fields = self.source.fetch(database, table).map_err(|source| {
            SyncError::MetadataFetch {
                database: database.name.clone(),
                table: table.qualified_name(),
                source,
            }
        })?;
        let local_fields: Vec<FieldDescriptor> = self
            .store
            .active_fields(table)?
            .iter()
            .map(|f| f.to_descriptor())
            .collect();

        // Step 3.
        let additions = dedup_by_identity(diff(&source_fields, &local_fields));
        let removals = diff(&local_fields, &source_fields);

        // Step 4.
        for descriptor in additions {
            match self.store.find_inactive_by_name(table, &descriptor.name)? {
                Some(id) => {
                    db_debug!(ctx, "reactivating field {} ({id}) of {}", descriptor.name, table.qualified_name());
                    self.store.reactivate(id)?;
                    report.reactivated += 1;
                }
                None => {
                    let id = self.store.create(self.new_field(table, descriptor))?;
                    db_debug!(ctx, "created field {} ({id}) of {}", descriptor.name, table.qualified_name());
                    report.created += 1;
                }
            }
        }

        // Step 5.
        if !removals.is_empty() {
            let names: Vec<String> = removals.iter().map(|d| d.name.clone()).collect();
            db_debug!(ctx, "retiring fields of {}: {}", table.qualified_name(), names.join(", "));
            report.retired += self.store.retire_matching(table, &names)?;
        }

        // Step 6.
        report.refreshed = self.refresh(ctx, table, &source_fields)?;

        if !report.is_noop() {
            tracing::debug!(
                "{}: {} created, {} reactivated, {} retired, {} refreshed",
                table.qualified_name(),
                report.created,
                report.reactivated,
                report.retired,
                report.refreshed,
            );
        }
        Ok(report)
    }

    fn new_field(&self, table: &Table, descriptor: &FieldDescriptor) -> NewField {
        NewField {
            table_id: table.id,
            name: descriptor.name.clone(),
            display_name: descriptor
                .display_name
                .clone()
                .unwrap_or_else(|| self.humanizer.to_display_name(&descriptor.name)),
            base_type: descriptor.base_type.clone(),
            special_type: descriptor.effective_special_type(),
            parent_id: descriptor.parent_id,
        }
    }

    /// Push source `base_type` onto every active field and fill missing
    /// special types. An existing special type is never overwritten.
    fn refresh(
        &self,
        ctx: &ExecContext,
        table: &Table,
        source_fields: &[FieldDescriptor],
    ) -> Result<usize, SyncError> {
        let mut by_name: HashMap<String, &FieldDescriptor> = HashMap::new();
        for descriptor in source_fields {
            by_name.entry(descriptor.identity()).or_insert(descriptor);
        }

        let mut refreshed = 0;
        for field in self.store.active_fields(table)? {
            let Some(source) = by_name.get(&field.name.to_lowercase()) else {
                continue;
            };
            let update = FieldUpdate {
                base_type: (field.base_type != source.base_type).then(|| source.base_type.clone()),
                special_type: match field.special_type {
                    Some(_) => None,
                    None => source.effective_special_type(),
                },
            };
            if update.is_empty() {
                continue;
            }
            db_debug!(ctx, "updating field {} ({}) of {}: {update:?}", field.name, field.id, table.qualified_name());
            self.store.update(field.id, update)?;
            refreshed += 1;
        }
        Ok(refreshed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

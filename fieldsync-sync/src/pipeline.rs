//! Field sync across every table of a database.

use serde::Serialize;

use fieldsync_core::{Database, ExecContext, Table};

use crate::error::error_chain;
use crate::progress::ProgressReporter;
use crate::reconcile::{FieldReconciler, ReconcileReport};
use crate::SyncError;

/// What to do when one table fails to reconcile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableFailurePolicy {
    /// Stop at the first failing table and return its error.
    #[default]
    Propagate,
    /// Log the failure, record it in the summary and move on.
    Isolate,
}

/// A table that failed under [`TableFailurePolicy::Isolate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFailure {
    pub table: String,
    pub error: String,
}

/// Outcome of a field sync over a set of tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSyncSummary {
    pub database: String,
    pub tables_synced: usize,
    pub totals: ReconcileReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TableFailure>,
}

/// Reconcile fields for each table in order, logging progress per table.
pub fn sync_tables(
    ctx: &ExecContext,
    reconciler: &FieldReconciler<'_>,
    database: &Database,
    tables: &[Table],
    policy: TableFailurePolicy,
) -> Result<FieldSyncSummary, SyncError> {
    let mut summary = FieldSyncSummary {
        database: database.name.clone(),
        ..FieldSyncSummary::default()
    };
    let Some(progress) = ProgressReporter::for_batch(tables.len()) else {
        tracing::debug!("{}: no tables to sync", database.name);
        return Ok(summary);
    };

    for table in tables {
        match reconciler.reconcile(ctx, database, table) {
            Ok(report) => {
                summary.tables_synced += 1;
                summary.totals.merge(report);
            }
            Err(e) if policy == TableFailurePolicy::Isolate => {
                tracing::error!(
                    "error syncing fields for {}: {}",
                    table.qualified_name(),
                    error_chain(&e)
                );
                summary.failures.push(TableFailure {
                    table: table.qualified_name(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        tracing::info!("{} Synced fields for {}", progress.tick(), table.qualified_name());
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_core::{
        source::database, DatabaseId, DefaultHumanizer, FieldDescriptor, MemoryCatalog,
        StaticSource, TableId,
    };

    fn table(id: u64, name: &str) -> Table {
        Table {
            id: TableId(id),
            db_id: DatabaseId(1),
            schema: None,
            name: name.into(),
        }
    }

    fn source() -> StaticSource {
        StaticSource::new()
            .with_table(TableId(1), vec![FieldDescriptor::new("id", "type/Integer").primary_key()])
            .with_table(
                TableId(3),
                vec![
                    FieldDescriptor::new("sku", "type/Text"),
                    FieldDescriptor::new("price", "type/Decimal"),
                ],
            )
    }

    fn tables() -> Vec<Table> {
        vec![table(1, "users"), table(2, "ghost"), table(3, "products")]
    }

    #[test]
    fn propagate_stops_at_first_failure() {
        let source = source();
        let store = MemoryCatalog::new();
        let reconciler = FieldReconciler::new(&source, &store, &DefaultHumanizer);

        let err = sync_tables(
            &ExecContext::new(),
            &reconciler,
            &database(1, "shop"),
            &tables(),
            TableFailurePolicy::Propagate,
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::MetadataFetch { .. }));
        assert_eq!(store.snapshot().fields.len(), 1, "tables after the failure untouched");
    }

    #[test]
    fn isolate_continues_and_records_failure() {
        let source = source();
        let store = MemoryCatalog::new();
        let reconciler = FieldReconciler::new(&source, &store, &DefaultHumanizer);

        let summary = sync_tables(
            &ExecContext::new(),
            &reconciler,
            &database(1, "shop"),
            &tables(),
            TableFailurePolicy::Isolate,
        )
        .expect("isolated");
        assert_eq!(summary.tables_synced, 2);
        assert_eq!(summary.totals.created, 3);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].table, "ghost");
        assert!(summary.failures[0].error.contains("shop.ghost"), "got: {}", summary.failures[0].error);
    }

    #[test]
    fn no_tables_is_an_empty_summary() {
        let source = source();
        let store = MemoryCatalog::new();
        let reconciler = FieldReconciler::new(&source, &store, &DefaultHumanizer);
        let summary = sync_tables(
            &ExecContext::new(),
            &reconciler,
            &database(1, "shop"),
            &[],
            TableFailurePolicy::default(),
        )
        .expect("empty");
        assert_eq!(summary.tables_synced, 0);
        assert!(summary.totals.is_noop());
    }
}

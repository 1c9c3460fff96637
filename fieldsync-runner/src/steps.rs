//! Multi-step database sync: every step runs, one failing step doesn't stop
//! the rest.

use std::convert::Infallible;

use serde::Serialize;

use fieldsync_core::{
    CatalogStore, Database, ExecContext, MetadataSource, NameHumanizer, Table,
};
use fieldsync_sync::{sync_tables, FieldReconciler, FieldSyncSummary, TableFailurePolicy};

use crate::error::RunnerError;
use crate::guard::OperationKind;
use crate::runner::{RunOutcome, SyncOperationRunner};
use crate::wrappers::{contain, with_logging};

/// What a step reports back when it finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSummary {
    Fields(FieldSyncSummary),
    Done,
}

/// One named phase of a database sync.
pub trait SyncStep {
    fn name(&self) -> &str;

    fn run(&self, ctx: &ExecContext, database: &Database) -> Result<StepSummary, RunnerError>;
}

/// Outcome of one step; `summary` is `None` when the step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub summary: Option<StepSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseSyncReport {
    pub database: String,
    pub steps: Vec<StepOutcome>,
}

impl DatabaseSyncReport {
    pub fn failed_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.summary.is_none())
            .map(|s| s.step.as_str())
            .collect()
    }

    /// Summary of the first field sync step that completed.
    pub fn fields(&self) -> Option<&FieldSyncSummary> {
        self.steps.iter().find_map(|s| match &s.summary {
            Some(StepSummary::Fields(summary)) => Some(summary),
            _ => None,
        })
    }
}

/// Run `steps` in order as one `sync` operation on `database`.
///
/// Each step is logged with its own `STARTING`/`FINISHED` lines and contained,
/// so the operation itself never fails; a skipped outcome means another sync
/// of this database was already in flight.
pub fn sync_database(
    runner: &SyncOperationRunner,
    ctx: &ExecContext,
    database: &Database,
    steps: &[&dyn SyncStep],
) -> RunOutcome<DatabaseSyncReport> {
    let label = match &database.engine {
        Some(engine) => format!("Sync {engine} Database {} '{}'", database.id, database.name),
        None => format!("Sync Database {} '{}'", database.id, database.name),
    };
    let outcome = runner.run(&OperationKind::sync(), database, &label, ctx, |ctx| {
        let steps = steps
            .iter()
            .map(|step| {
                let step_label = format!("step '{}' for {}", step.name(), database.name);
                StepOutcome {
                    step: step.name().to_string(),
                    summary: contain(&step_label, || {
                        with_logging(&step_label, || step.run(ctx, database))
                    }),
                }
            })
            .collect();
        Ok::<_, Infallible>(DatabaseSyncReport {
            database: database.name.clone(),
            steps,
        })
    });
    match outcome {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}

/// Field reconciliation over a fixed list of tables.
pub struct FieldSyncStep<'a> {
    source: &'a dyn MetadataSource,
    store: &'a dyn CatalogStore,
    humanizer: &'a dyn NameHumanizer,
    tables: Vec<Table>,
    policy: TableFailurePolicy,
}

impl<'a> FieldSyncStep<'a> {
    pub fn new(
        source: &'a dyn MetadataSource,
        store: &'a dyn CatalogStore,
        humanizer: &'a dyn NameHumanizer,
        tables: Vec<Table>,
    ) -> Self {
        Self {
            source,
            store,
            humanizer,
            tables,
            policy: TableFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TableFailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl SyncStep for FieldSyncStep<'_> {
    fn name(&self) -> &str {
        "sync-fields"
    }

    fn run(&self, ctx: &ExecContext, database: &Database) -> Result<StepSummary, RunnerError> {
        let reconciler = FieldReconciler::new(self.source, self.store, self.humanizer);
        let summary = sync_tables(ctx, &reconciler, database, &self.tables, self.policy)?;
        Ok(StepSummary::Fields(summary))
    }
}

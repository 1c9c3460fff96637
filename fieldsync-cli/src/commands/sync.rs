//! `fieldsync sync`: reconcile catalog fields against a schema snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use fieldsync_core::{DefaultHumanizer, ExecContext, SchemaSnapshot, SnapshotSource, YamlCatalog};
use fieldsync_runner::{
    sync_database, DatabaseSyncReport, FieldSyncStep, JsonLinesPublisher, RunOutcome,
    SyncOperationRunner,
};
use fieldsync_sync::{FieldSyncSummary, TableFailurePolicy};

/// Arguments for `fieldsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// JSON schema snapshot describing the database and its tables.
    pub snapshot: PathBuf,

    /// Keep syncing remaining tables when one fails.
    #[arg(long)]
    pub keep_going: bool,

    /// Emit the sync report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;

        let snapshot = SchemaSnapshot::load(&self.snapshot)
            .with_context(|| format!("failed to load snapshot {}", self.snapshot.display()))?;
        let database = snapshot.database.clone();
        let tables = snapshot.tables();
        let source = SnapshotSource::new(snapshot);
        let catalog = YamlCatalog::open_at(&home).context("failed to open field catalog")?;

        let policy = if self.keep_going {
            TableFailurePolicy::Isolate
        } else {
            TableFailurePolicy::Propagate
        };
        let step =
            FieldSyncStep::new(&source, &catalog, &DefaultHumanizer, tables).with_policy(policy);
        let runner = SyncOperationRunner::with_publisher(Arc::new(JsonLinesPublisher::at_home(&home)));

        let report = match sync_database(&runner, &ExecContext::new(), &database, &[&step]) {
            RunOutcome::Completed(report) => report,
            RunOutcome::Skipped => {
                println!("- '{}' is already being synced; skipped", database.name);
                return Ok(());
            }
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize sync report")?
            );
        } else {
            print_report(&report);
        }

        let failed = report.failed_steps();
        if !failed.is_empty() {
            bail!("sync of '{}' failed in {}", database.name, failed.join(", "));
        }
        if let Some(summary) = report.fields().filter(|s| !s.failures.is_empty()) {
            bail!(
                "{} table(s) of '{}' failed to sync",
                summary.failures.len(),
                database.name
            );
        }
        Ok(())
    }
}

fn print_report(report: &DatabaseSyncReport) {
    let Some(summary) = report.fields() else {
        println!("{} '{}' field sync failed", "✗".red(), report.database);
        return;
    };
    if summary.totals.is_noop() && summary.failures.is_empty() {
        println!(
            "{} '{}': {} tables, nothing to do",
            "✓".green(),
            summary.database,
            summary.tables_synced
        );
        return;
    }

    println!(
        "{} '{}' synced ({} tables)",
        "✓".green(),
        summary.database,
        summary.tables_synced
    );
    print_totals(summary);
    for failure in &summary.failures {
        println!("  {}  {}: {}", "✗".red(), failure.table, failure.error);
    }
}

fn print_totals(summary: &FieldSyncSummary) {
    let totals = &summary.totals;
    println!("  +  {} created", totals.created);
    println!("  ↺  {} reactivated", totals.reactivated);
    println!("  −  {} retired", totals.retired);
    println!("  ~  {} refreshed", totals.refreshed);
}

//! Guarded, evented, logged execution of sync operations.

use std::sync::Arc;

use fieldsync_core::{Database, ExecContext};

use crate::events::EventPublisher;
use crate::guard::{OperationGuard, OperationKind};
use crate::wrappers::{with_db_logging_suppressed, with_events, with_guard, with_logging};

/// Result of [`SyncOperationRunner::run`] when the work didn't fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome<T> {
    Completed(T),
    /// The same operation was already running for this database.
    Skipped,
}

impl<T> RunOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            RunOutcome::Completed(v) => Some(v),
            RunOutcome::Skipped => None,
        }
    }
}

/// Runs work under the single-flight guard with begin/end events,
/// `STARTING`/`FINISHED` log lines and ancillary database logging silenced.
#[derive(Clone)]
pub struct SyncOperationRunner {
    guard: Arc<OperationGuard>,
    publisher: Arc<dyn EventPublisher>,
}

impl SyncOperationRunner {
    pub fn new(guard: Arc<OperationGuard>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { guard, publisher }
    }

    /// Runner on the process-wide guard.
    pub fn with_publisher(publisher: Arc<dyn EventPublisher>) -> Self {
        Self::new(OperationGuard::global(), publisher)
    }

    pub fn guard(&self) -> &OperationGuard {
        &self.guard
    }

    /// Run `work` as operation `kind` on `database`.
    ///
    /// Returns `Ok(Skipped)` without side effects when the pair is already
    /// running. An error from `work` is returned as is: the end event and
    /// `FINISHED` line are skipped, the guard is still released.
    pub fn run<T, E>(
        &self,
        kind: &OperationKind,
        database: &Database,
        label: &str,
        ctx: &ExecContext,
        work: impl FnOnce(&ExecContext) -> Result<T, E>,
    ) -> Result<RunOutcome<T>, E> {
        let guarded = with_guard(&self.guard, kind, database.id, || {
            with_events(self.publisher.as_ref(), kind, database.id, || {
                with_logging(label, || with_db_logging_suppressed(ctx, work))
            })
        });
        match guarded {
            Some(result) => result.map(RunOutcome::Completed),
            None => Ok(RunOutcome::Skipped),
        }
    }
}

impl std::fmt::Debug for SyncOperationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOperationRunner")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingPublisher;
    use fieldsync_core::source::database;

    fn runner() -> (SyncOperationRunner, Arc<RecordingPublisher>) {
        let recorder = Arc::new(RecordingPublisher::new());
        let runner = SyncOperationRunner::new(Arc::new(OperationGuard::new()), recorder.clone());
        (runner, recorder)
    }

    #[test]
    fn completed_run_emits_paired_events_and_releases() {
        let (runner, recorder) = runner();
        let db = database(1, "shop");
        let out = runner
            .run(&OperationKind::sync(), &db, "Sync shop", &ExecContext::new(), |ctx| {
                Ok::<_, std::io::Error>(ctx.db_logging_enabled())
            })
            .expect("run");
        assert_eq!(out, RunOutcome::Completed(false), "work sees suppressed context");

        let events = recorder.events();
        assert_eq!(
            events.iter().map(|e| e.topic.as_str()).collect::<Vec<_>>(),
            vec!["sync-begin", "sync-end"]
        );
        assert!(!runner.guard().is_running(&OperationKind::sync(), db.id));
    }

    #[test]
    fn already_running_pair_is_skipped_silently() {
        let (runner, recorder) = runner();
        let db = database(1, "shop");
        assert!(runner.guard().try_enter(&OperationKind::sync(), db.id));

        let mut ran = false;
        let out = runner
            .run(&OperationKind::sync(), &db, "Sync shop", &ExecContext::new(), |_| {
                ran = true;
                Ok::<_, std::io::Error>(())
            })
            .expect("run");
        assert!(out.is_skipped());
        assert!(!ran);
        assert!(recorder.events().is_empty());
        assert!(runner.guard().is_running(&OperationKind::sync(), db.id), "holder keeps it");
    }

    #[test]
    fn failed_run_propagates_and_releases() {
        let (runner, recorder) = runner();
        let db = database(1, "shop");
        let err = runner
            .run(&OperationKind::sync(), &db, "Sync shop", &ExecContext::new(), |_| {
                Err::<(), _>(std::io::Error::other("disk full"))
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_begin());
        assert!(!runner.guard().is_running(&OperationKind::sync(), db.id));
    }

    #[test]
    fn other_kind_on_same_database_is_not_blocked() {
        let (runner, _) = runner();
        let db = database(1, "shop");
        let out = runner
            .run(&OperationKind::sync(), &db, "Sync shop", &ExecContext::new(), |ctx| {
                runner.run(&OperationKind::cache(), &db, "Cache shop", ctx, |_| {
                    Ok::<_, std::io::Error>("cached")
                })
            })
            .expect("outer")
            .completed()
            .expect("outer completed")
            .completed();
        assert_eq!(out, Some("cached"));
    }
}

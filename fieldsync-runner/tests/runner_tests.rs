//! Runner behaviour observed from outside: log lines, events on disk and
//! concurrent callers.

use std::io;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use fieldsync_core::{
    source::database, DefaultHumanizer, ExecContext, FieldDescriptor, StaticSource, Table,
    TableId, YamlCatalog,
};
use fieldsync_runner::{
    contain, read_recent, sync_database, FieldSyncStep, JsonLinesPublisher, OperationGuard,
    OperationKind, RecordingPublisher, RunOutcome, SyncOperationRunner,
};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("capture lock")).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("capture lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .with_target(false)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, captured.text())
}

fn fresh_runner() -> (SyncOperationRunner, Arc<RecordingPublisher>) {
    let recorder = Arc::new(RecordingPublisher::new());
    let runner = SyncOperationRunner::new(Arc::new(OperationGuard::new()), recorder.clone());
    (runner, recorder)
}

#[test]
fn successful_run_logs_starting_and_finished() {
    let (runner, _) = fresh_runner();
    let (out, logs) = with_captured_logs(|| {
        runner.run(
            &OperationKind::sync(),
            &database(1, "shop"),
            "Sync Database 1 'shop'",
            &ExecContext::new(),
            |_| Ok::<_, io::Error>(()),
        )
    });
    assert!(matches!(out, Ok(RunOutcome::Completed(()))));
    assert!(logs.contains("STARTING: Sync Database 1 'shop'"), "logs: {logs}");
    assert!(logs.contains("FINISHED: Sync Database 1 'shop' ("), "logs: {logs}");
}

#[test]
fn failed_run_logs_no_finished_line() {
    let (runner, recorder) = fresh_runner();
    let (out, logs) = with_captured_logs(|| {
        runner.run(
            &OperationKind::sync(),
            &database(1, "shop"),
            "Sync shop",
            &ExecContext::new(),
            |_| Err::<(), _>(io::Error::other("connection reset")),
        )
    });
    assert!(out.is_err());
    assert!(logs.contains("STARTING: Sync shop"));
    assert!(!logs.contains("FINISHED"), "logs: {logs}");
    assert_eq!(recorder.events().len(), 1);
    assert!(!runner.guard().is_running(&OperationKind::sync(), database(1, "shop").id));
}

#[test]
fn skipped_run_logs_nothing() {
    let (runner, _) = fresh_runner();
    let db = database(1, "shop");
    let _held = runner.guard().enter(&OperationKind::sync(), db.id).expect("hold");
    let (out, logs) = with_captured_logs(|| {
        runner.run(&OperationKind::sync(), &db, "Sync shop", &ExecContext::new(), |_| {
            Ok::<_, io::Error>(())
        })
    });
    assert!(matches!(out, Ok(RunOutcome::Skipped)));
    assert!(logs.is_empty(), "logs: {logs}");
}

#[test]
fn contain_logs_the_whole_error_chain() {
    let err = fieldsync_sync::SyncError::MetadataFetch {
        database: "shop".into(),
        table: "users".into(),
        source: fieldsync_core::MetadataError::Unreachable("connection refused".into()),
    };
    let (out, logs) = with_captured_logs(|| contain("sync-fields", || Err::<(), _>(err)));
    assert!(out.is_none());
    assert!(logs.contains("Error running sync-fields"), "logs: {logs}");
    assert!(logs.contains("caused by: metadata source unreachable"), "logs: {logs}");
}

#[test]
fn concurrent_runs_on_one_database_execute_once() {
    let (runner, recorder) = fresh_runner();
    let runner = Arc::new(runner);
    let inside = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));

    let holder = {
        let runner = Arc::clone(&runner);
        let inside = Arc::clone(&inside);
        let release = Arc::clone(&release);
        thread::spawn(move || {
            let ctx = ExecContext::new();
            runner.run(&OperationKind::sync(), &database(1, "shop"), "Sync shop", &ctx, |_| {
                inside.wait();
                release.wait();
                Ok::<_, io::Error>("held")
            })
        })
    };

    inside.wait();
    let contender = runner
        .run(&OperationKind::sync(), &database(1, "shop"), "Sync shop", &ExecContext::new(), |_| {
            Ok::<_, io::Error>("contender")
        })
        .expect("contender");
    let other_db = runner
        .run(&OperationKind::sync(), &database(2, "crm"), "Sync crm", &ExecContext::new(), |_| {
            Ok::<_, io::Error>("crm")
        })
        .expect("other db");
    release.wait();

    let held = holder.join().expect("join").expect("holder");
    assert_eq!(held, RunOutcome::Completed("held"));
    assert_eq!(contender, RunOutcome::Skipped);
    assert_eq!(other_db, RunOutcome::Completed("crm"));

    let topics: Vec<String> = recorder.events().into_iter().map(|e| e.topic).collect();
    assert_eq!(topics.iter().filter(|t| *t == "sync-begin").count(), 2);
    assert_eq!(topics.iter().filter(|t| *t == "sync-end").count(), 2);
}

#[test]
fn database_sync_writes_catalog_and_events_log() {
    let home = TempDir::new().expect("home");
    let source = StaticSource::new().with_table(
        TableId(10),
        vec![
            FieldDescriptor::new("id", "type/Integer").primary_key(),
            FieldDescriptor::new("email", "type/Text"),
        ],
    );
    let catalog = YamlCatalog::open_at(home.path()).expect("catalog");
    let publisher = Arc::new(JsonLinesPublisher::at_home(home.path()));
    let runner = SyncOperationRunner::new(Arc::new(OperationGuard::new()), publisher.clone());
    let db = database(1, "shop");
    let step = FieldSyncStep::new(
        &source,
        &catalog,
        &DefaultHumanizer,
        vec![Table {
            id: TableId(10),
            db_id: db.id,
            schema: None,
            name: "users".into(),
        }],
    );

    let report = sync_database(&runner, &ExecContext::new(), &db, &[&step])
        .completed()
        .expect("completed");
    assert!(report.failed_steps().is_empty());
    assert_eq!(report.fields().map(|f| f.totals.created), Some(2));

    let events = read_recent(publisher.path(), 10).expect("events");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].topic, "sync-begin");
    assert_eq!(events[1].topic, "sync-end");
    assert_eq!(events[0].correlation_id, events[1].correlation_id);
    assert_eq!(events[1].database_id, db.id);
}

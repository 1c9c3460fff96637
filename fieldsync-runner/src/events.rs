//! Begin/end events for guarded operations and the sinks that receive them.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fieldsync_core::DatabaseId;

use crate::error::{io_err, RunnerError};
use crate::guard::OperationKind;
use crate::rotation::RotationPolicy;

/// One begin or end record. Both halves of an invocation share a
/// `correlation_id`; only end events carry `duration_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    pub topic: String,
    pub database_id: DatabaseId,
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl SyncEvent {
    pub fn begin(kind: &OperationKind, database_id: DatabaseId, correlation_id: Uuid) -> Self {
        Self {
            topic: format!("{kind}-begin"),
            database_id,
            correlation_id,
            timestamp: Utc::now(),
            duration_ms: None,
        }
    }

    pub fn end(
        kind: &OperationKind,
        database_id: DatabaseId,
        correlation_id: Uuid,
        elapsed: Duration,
    ) -> Self {
        Self {
            topic: format!("{kind}-end"),
            database_id,
            correlation_id,
            timestamp: Utc::now(),
            duration_ms: Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
        }
    }

    pub fn is_begin(&self) -> bool {
        self.topic.ends_with("-begin")
    }
}

/// Receives operation events. Publishing never fails from the caller's view.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &SyncEvent);
}

// ---------------------------------------------------------------------------
// Publishers
// ---------------------------------------------------------------------------

/// Logs each event at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, event: &SyncEvent) {
        tracing::info!(
            topic = %event.topic,
            database_id = %event.database_id,
            correlation_id = %event.correlation_id,
            duration_ms = event.duration_ms,
            "event published"
        );
    }
}

/// Appends events as newline-delimited JSON, rotating the file as it grows.
#[derive(Debug)]
pub struct JsonLinesPublisher {
    path: PathBuf,
    rotation: RotationPolicy,
    write_lock: Mutex<()>,
}

impl JsonLinesPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rotation: RotationPolicy::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Publisher writing to `<home>/.fieldsync/events.jsonl`.
    pub fn at_home(home: &Path) -> Self {
        Self::new(fieldsync_core::paths::events_path(home))
    }

    pub fn with_rotation(mut self, max_bytes: u64, keep: usize) -> Self {
        self.rotation = RotationPolicy { max_bytes, keep };
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event, surfacing any failure.
    pub fn append(&self, event: &SyncEvent) -> Result<(), RunnerError> {
        let _lock = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
        if self
            .rotation
            .apply(&self.path)
            .map_err(|e| io_err(&self.path, e))?
        {
            tracing::info!(path = %self.path.display(), "events log rotated");
        }

        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_err(&self.path, e))?;
        file.write_all(&line).map_err(|e| io_err(&self.path, e))
    }
}

impl EventPublisher for JsonLinesPublisher {
    fn publish(&self, event: &SyncEvent) {
        if let Err(err) = self.append(event) {
            tracing::warn!(topic = %event.topic, error = %err, "failed to record event");
        }
    }
}

/// The last `limit` events of an events log, oldest first. A missing file
/// reads as empty; blank lines are skipped.
pub fn read_recent(path: &Path, limit: usize) -> Result<Vec<SyncEvent>, RunnerError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_err(path, e)),
    };
    let mut events = contents
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| serde_json::from_str::<SyncEvent>(line))
        .collect::<Result<Vec<_>, _>>()?;
    let skip = events.len().saturating_sub(limit);
    events.drain(..skip);
    Ok(events)
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: &SyncEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

//! `fieldsync events`: recent operation events from the events log.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};
use uuid::Uuid;

use fieldsync_core::paths;
use fieldsync_runner::{read_recent, SyncEvent};

/// Arguments for `fieldsync events`.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Number of most recent events to show.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "when")]
    when: String,
    #[tabled(rename = "topic")]
    topic: String,
    #[tabled(rename = "database")]
    database: String,
    #[tabled(rename = "correlation")]
    correlation: String,
    #[tabled(rename = "duration")]
    duration: String,
}

impl EventsArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let path = paths::events_path(&home);
        let events = read_recent(&path, self.limit)
            .with_context(|| format!("failed to read events from {}", path.display()))?;

        if events.is_empty() {
            println!("No events recorded.");
            return Ok(());
        }

        let rows: Vec<EventRow> = events.iter().map(row).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn row(event: &SyncEvent) -> EventRow {
    let topic = if event.is_begin() {
        event.topic.yellow().to_string()
    } else {
        event.topic.green().to_string()
    };
    EventRow {
        when: format!("{} ago", format_age(event.timestamp)),
        topic,
        database: event.database_id.to_string(),
        correlation: correlation_tail(&event.correlation_id),
        duration: event
            .duration_ms
            .map(|ms| format!("{ms} ms"))
            .unwrap_or_else(|| "-".to_string()),
    }
}

/// The random tail of a correlation id. The leading hex digits of a v7 id
/// are its timestamp and repeat across runs started close together.
fn correlation_tail(id: &Uuid) -> String {
    let simple = id.simple().to_string();
    simple[simple.len() - 12..].to_string()
}

fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    use fieldsync_core::DatabaseId;
    use fieldsync_runner::OperationKind;

    #[test]
    fn runs_started_milliseconds_apart_get_distinct_correlation_cells() {
        let kind = OperationKind::sync();
        let first = SyncEvent::begin(&kind, DatabaseId(1), Uuid::now_v7());
        thread::sleep(Duration::from_millis(5));
        let second = SyncEvent::begin(&kind, DatabaseId(2), Uuid::now_v7());

        let a = row(&first).correlation;
        let b = row(&second).correlation;
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
        assert!(first.correlation_id.simple().to_string().ends_with(&a));
    }

    #[test]
    fn begin_rows_have_no_duration() {
        let event = SyncEvent::begin(&OperationKind::sync(), DatabaseId(7), Uuid::now_v7());
        let row = row(&event);
        assert_eq!(row.duration, "-");
        assert_eq!(row.database, "7");
    }
}

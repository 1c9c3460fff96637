//! Orchestration for sync operations: single-flight guard, begin/end
//! events, step logging and failure containment.

mod error;
pub mod events;
pub mod guard;
pub mod rotation;
mod runner;
pub mod steps;
pub mod wrappers;

pub use error::RunnerError;
pub use events::{
    read_recent, EventPublisher, JsonLinesPublisher, RecordingPublisher, SyncEvent,
    TracingPublisher,
};
pub use guard::{OperationGuard, OperationKind, OperationPermit};
pub use runner::{RunOutcome, SyncOperationRunner};
pub use steps::{sync_database, DatabaseSyncReport, FieldSyncStep, StepOutcome, StepSummary, SyncStep};
pub use wrappers::contain;

/// Log line format for [`init_tracing`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber. `RUST_LOG` filters, defaulting to `info`.
/// Calling it again is a no-op.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

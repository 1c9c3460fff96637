//! The concerns a runner stacks around a piece of work, one function each.
//!
//! Composed outermost first: guard, events, logging, suppression, work.
//! [`contain`] sits outside all of them when a caller wants failures logged
//! and swallowed.

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use uuid::Uuid;

use fieldsync_core::{DatabaseId, ExecContext};
use fieldsync_sync::error_chain;

use crate::events::{EventPublisher, SyncEvent};
use crate::guard::{OperationGuard, OperationKind};

/// Run `f` only if `(kind, target)` isn't already running. `None` means skipped.
pub fn with_guard<T>(
    guard: &OperationGuard,
    kind: &OperationKind,
    target: DatabaseId,
    f: impl FnOnce() -> T,
) -> Option<T> {
    let _permit = guard.enter(kind, target)?;
    Some(f())
}

/// Publish a begin event, run `f`, and publish the matching end event if it
/// succeeded. A failure leaves the begin event unpaired.
pub fn with_events<T, E>(
    publisher: &dyn EventPublisher,
    kind: &OperationKind,
    target: DatabaseId,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let correlation_id = Uuid::now_v7();
    publisher.publish(&SyncEvent::begin(kind, target, correlation_id));
    let started = Instant::now();
    let out = f()?;
    publisher.publish(&SyncEvent::end(kind, target, correlation_id, started.elapsed()));
    Ok(out)
}

/// `STARTING: <label>` before, `FINISHED: <label> (<elapsed>)` after success.
pub fn with_logging<T, E>(label: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    tracing::info!("STARTING: {label}");
    let started = Instant::now();
    let out = f()?;
    tracing::info!("FINISHED: {label} ({})", format_elapsed(started.elapsed()));
    Ok(out)
}

/// Hand `f` a copy of `ctx` with ancillary database logging off.
pub fn with_db_logging_suppressed<T>(ctx: &ExecContext, f: impl FnOnce(&ExecContext) -> T) -> T {
    f(&ctx.without_db_logging())
}

/// Run `f`, logging and swallowing its error. `None` means it failed.
pub fn contain<T, E>(label: &str, f: impl FnOnce() -> Result<T, E>) -> Option<T>
where
    E: StdError + 'static,
{
    match f() {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::error!(detail = %error_chain(&err), "Error running {label}: {err}");
            None
        }
    }
}

/// Short human form: `850 ms`, `12.3 s`, `4 min 7 s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1_000 {
        format!("{ms} ms")
    } else if ms < 60_000 {
        format!("{:.1} s", elapsed.as_secs_f64())
    } else {
        let secs = elapsed.as_secs();
        format!("{} min {} s", secs / 60, secs % 60)
    }
}

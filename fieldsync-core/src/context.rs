//! Execution context threaded through sync work.
//!
//! Carries the ambient switches that would otherwise be process-wide state.
//! Values are `Copy`: a scope that changes a switch derives a new context and
//! the caller's value is never mutated, so leaving the scope restores it.

/// Log target for ancillary database chatter (per-write catalog logs).
pub const DB_LOG_TARGET: &str = "fieldsync::db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecContext {
    db_logging: bool,
}

impl Default for ExecContext {
    fn default() -> Self {
        Self { db_logging: true }
    }
}

impl ExecContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this context with ancillary database logging switched off.
    pub fn without_db_logging(self) -> Self {
        Self { db_logging: false }
    }

    pub fn db_logging_enabled(&self) -> bool {
        self.db_logging
    }
}

//! # fieldsync-sync
//!
//! Field reconciliation between a metadata source and the catalog.
//!
//! [`FieldReconciler::reconcile`] brings one table's catalog fields in line
//! with the source; [`sync_tables`] runs it over a database's tables and
//! reports progress as it goes.

pub mod diff;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod reconcile;

pub use diff::diff;
pub use error::{error_chain, SyncError};
pub use pipeline::{sync_tables, FieldSyncSummary, TableFailure, TableFailurePolicy};
pub use progress::ProgressReporter;
pub use reconcile::{FieldReconciler, ReconcileReport};

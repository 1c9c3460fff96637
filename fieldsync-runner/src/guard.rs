//! Single-flight registry: at most one running operation per (kind, database).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use fieldsync_core::DatabaseId;

/// Name of an operation family, e.g. `sync` or `cache`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationKind(pub String);

impl OperationKind {
    pub fn sync() -> Self {
        Self::from("sync")
    }

    pub fn cache() -> Self {
        Self::from("cache")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OperationKind {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OperationKind {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

static GLOBAL: Lazy<Arc<OperationGuard>> = Lazy::new(|| Arc::new(OperationGuard::new()));

/// Tracks which databases are currently running each kind of operation.
///
/// Every read and write goes through one lock, so `try_enter` is a single
/// atomic check-and-insert.
#[derive(Debug, Default)]
pub struct OperationGuard {
    running: Mutex<HashMap<OperationKind, HashSet<DatabaseId>>>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide guard shared by every runner that doesn't bring its own.
    pub fn global() -> Arc<OperationGuard> {
        Arc::clone(&GLOBAL)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<OperationKind, HashSet<DatabaseId>>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `(kind, target)` as running. `false` when it already is.
    pub fn try_enter(&self, kind: &OperationKind, target: DatabaseId) -> bool {
        self.lock().entry(kind.clone()).or_default().insert(target)
    }

    /// Clear `(kind, target)`. Clearing a pair that isn't running is a no-op.
    pub fn leave(&self, kind: &OperationKind, target: DatabaseId) {
        let mut running = self.lock();
        if let Some(targets) = running.get_mut(kind) {
            targets.remove(&target);
            if targets.is_empty() {
                running.remove(kind);
            }
        }
    }

    /// Like [`try_enter`](Self::try_enter), but the returned permit leaves on drop.
    pub fn enter(&self, kind: &OperationKind, target: DatabaseId) -> Option<OperationPermit<'_>> {
        self.try_enter(kind, target).then(|| OperationPermit {
            guard: self,
            kind: kind.clone(),
            target,
        })
    }

    pub fn is_running(&self, kind: &OperationKind, target: DatabaseId) -> bool {
        self.lock()
            .get(kind)
            .is_some_and(|targets| targets.contains(&target))
    }

    /// Databases currently running `kind`, in id order.
    pub fn running(&self, kind: &OperationKind) -> Vec<DatabaseId> {
        let mut targets: Vec<DatabaseId> = self
            .lock()
            .get(kind)
            .map(|t| t.iter().copied().collect())
            .unwrap_or_default();
        targets.sort();
        targets
    }
}

/// Membership in an [`OperationGuard`], released when dropped.
#[derive(Debug)]
pub struct OperationPermit<'a> {
    guard: &'a OperationGuard,
    kind: OperationKind,
    target: DatabaseId,
}

impl OperationPermit<'_> {
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    pub fn target(&self) -> DatabaseId {
        self.target
    }
}

impl Drop for OperationPermit<'_> {
    fn drop(&mut self) {
        self.guard.leave(&self.kind, self.target);
    }
}

//! File-backed catalog.
//!
//! # Storage layout
//!
//! ```text
//! ~/.fieldsync/
//!   catalog.yaml   (whole catalog: mode 0600)
//! ```
//!
//! The document is loaded once at open. Every mutation is applied in memory
//! under the store's lock and saved before the call returns.
//!
//! # API pattern
//!
//! - `open_at(home)`: explicit home; used in tests with `TempDir`
//! - `open()`: derives home from `dirs::home_dir()`, delegates to `open_at`

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::catalog::{CatalogState, CatalogStore};
use crate::error::{catalog_io_err, CatalogError};
use crate::paths;
use crate::types::{FieldId, FieldUpdate, NewField, PersistedField, Table};

/// [`CatalogStore`] persisted as a single YAML document.
#[derive(Debug)]
pub struct YamlCatalog {
    path: PathBuf,
    state: Mutex<CatalogState>,
}

impl YamlCatalog {
    /// Open `<home>/.fieldsync/catalog.yaml`, starting empty if it is absent.
    pub fn open_at(home: &Path) -> Result<Self, CatalogError> {
        let path = paths::catalog_path(home);
        let state = load(&path)?;
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// `open_at` convenience wrapper.
    pub fn open() -> Result<Self, CatalogError> {
        Self::open_at(&paths::home()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `op` to the state and persist the result.
    ///
    /// The in-memory state is only replaced once the save succeeded, so a
    /// failed write leaves the catalog as it was on disk.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut CatalogState) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut guard = self.lock();
        let mut next = guard.clone();
        let out = op(&mut next)?;
        save(&self.path, &next)?;
        *guard = next;
        Ok(out)
    }
}

impl CatalogStore for YamlCatalog {
    fn active_fields(&self, table: &Table) -> Result<Vec<PersistedField>, CatalogError> {
        Ok(self.lock().active_fields_of(table.id))
    }

    fn fields(&self, table: &Table) -> Result<Vec<PersistedField>, CatalogError> {
        Ok(self.lock().fields_of(table.id))
    }

    fn find_inactive_by_name(
        &self,
        table: &Table,
        name: &str,
    ) -> Result<Option<FieldId>, CatalogError> {
        Ok(self.lock().find_inactive_by_name(table.id, name))
    }

    fn reactivate(&self, id: FieldId) -> Result<(), CatalogError> {
        self.mutate(|state| state.reactivate(id))
    }

    fn create(&self, field: NewField) -> Result<FieldId, CatalogError> {
        self.mutate(|state| state.create(field))
    }

    fn retire_matching(&self, table: &Table, names: &[String]) -> Result<usize, CatalogError> {
        self.mutate(|state| Ok(state.retire_matching(table.id, names)))
    }

    fn update(&self, id: FieldId, update: FieldUpdate) -> Result<(), CatalogError> {
        self.mutate(|state| state.update(id, update))
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load a catalog document. A missing file is an empty catalog;
/// malformed YAML is `CatalogError::Parse` with path context.
pub fn load(path: &Path) -> Result<CatalogState, CatalogError> {
    if !path.exists() {
        return Ok(CatalogState::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| catalog_io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| CatalogError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Atomically save a catalog document.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// The `.tmp` is always in the same directory as the target.
pub fn save(path: &Path, state: &CatalogState) -> Result<(), CatalogError> {
    let Some(dir) = path.parent() else {
        return Err(catalog_io_err(
            path,
            std::io::Error::other("invalid catalog path"),
        ));
    };
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| catalog_io_err(dir, e))?;
        set_dir_permissions(dir)?;
    }

    let yaml = serde_yaml::to_string(state)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| catalog_io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(catalog_io_err(path, e));
    }
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), CatalogError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| catalog_io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), CatalogError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CatalogError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| catalog_io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CatalogError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

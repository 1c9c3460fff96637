//! On-disk locations under `<home>/.fieldsync/`.

use std::path::{Path, PathBuf};

use crate::error::CatalogError;

pub const CATALOG_FILE: &str = "catalog.yaml";
pub const EVENTS_FILE: &str = "events.jsonl";

pub fn fieldsync_root(home: &Path) -> PathBuf {
    home.join(".fieldsync")
}

pub fn catalog_path(home: &Path) -> PathBuf {
    fieldsync_root(home).join(CATALOG_FILE)
}

pub fn events_path(home: &Path) -> PathBuf {
    fieldsync_root(home).join(EVENTS_FILE)
}

/// The current user's home directory.
pub fn home() -> Result<PathBuf, CatalogError> {
    dirs::home_dir().ok_or(CatalogError::HomeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_under_dot_fieldsync() {
        let home = Path::new("/home/ada");
        assert_eq!(catalog_path(home), PathBuf::from("/home/ada/.fieldsync/catalog.yaml"));
        assert_eq!(events_path(home), PathBuf::from("/home/ada/.fieldsync/events.jsonl"));
    }
}

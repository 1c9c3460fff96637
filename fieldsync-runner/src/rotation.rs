//! Size-based rotation for the events log.
//!
//! `events.jsonl` → `events.jsonl.1` → … → `events.jsonl.<keep>`; the
//! oldest copy falls off the end.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Size past which the events log is rotated (10 MiB).
pub const MAX_EVENTS_BYTES: u64 = 10 * 1024 * 1024;

/// Rotated copies kept beside the live file.
pub const MAX_ROTATED_FILES: usize = 5;

/// When to rotate a log file and how many old copies to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub keep: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: MAX_EVENTS_BYTES,
            keep: MAX_ROTATED_FILES,
        }
    }
}

impl RotationPolicy {
    /// Whether `path` has reached the size limit. A missing file never has.
    pub fn is_due(&self, path: &Path) -> io::Result<bool> {
        if self.keep == 0 {
            return Ok(false);
        }
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.len() >= self.max_bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Rotate `path` when due. Returns `true` when the live file moved to
    /// slot 1; the next append recreates it.
    pub fn apply(&self, path: &Path) -> io::Result<bool> {
        if !self.is_due(path)? {
            return Ok(false);
        }
        discard(&numbered_path(path, self.keep))?;
        // Walk from the highest slot down so no copy is overwritten.
        let mut slot = self.keep;
        while slot > 1 {
            move_if_present(&numbered_path(path, slot - 1), &numbered_path(path, slot))?;
            slot -= 1;
        }
        fs::rename(path, numbered_path(path, 1))?;
        Ok(true)
    }
}

fn discard(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn move_if_present(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// `events.jsonl` + 2 → `events.jsonl.2`.
pub fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let name = base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(fieldsync_core::paths::EVENTS_FILE);
    base.with_file_name(format!("{name}.{n}"))
}

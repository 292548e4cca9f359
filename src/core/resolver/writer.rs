//! Snapshot persistence.
//!
//! Documents are written to a temporary file in the destination directory
//! and renamed over the target, so a concurrent reader sees either the
//! previous document or the new one, never a partial write.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{ResolverError, Result};

/// Serializes snapshots as JSON documents on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotWriter {
    pretty: bool,
}

impl SnapshotWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Compact single-line output
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Atomically replace `path` with the serialized `data`
    pub fn write<T: Serialize + ?Sized>(&self, path: &Path, data: &T) -> Result<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(data)?
        } else {
            serde_json::to_vec(data)?
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;

        tmp.persist(path)
            .map_err(|e| ResolverError::snapshot(format!("{}: {}", path.display(), e.error)))?;

        Ok(())
    }
}

/// Make sure the snapshot directory exists
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    if !dir.is_dir() {
        return Err(ResolverError::snapshot(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    Ok(())
}

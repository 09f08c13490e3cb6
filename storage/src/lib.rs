//! Ballot Storage Layer - File-Based Snapshots
//!
//! The ballot stays in memory while a call is applied and is written back
//! as a snapshot afterwards:
//! - `<name>.json` human-readable copy for indexers and debugging
//! - `<name>.bin` bincode copy, preferred when loading
//! - `<name>.lock` held exclusively while a call is applied

use ballot_core::Ballot;
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Exclusive hold on a snapshot across processes. Released when dropped.
#[derive(Debug)]
pub struct SnapshotLock {
    _file: File,
}

/// Snapshot directory
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Open storage directory, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }

        Ok(Self { data_dir })
    }

    /// Block until this process holds the snapshot exclusively
    pub fn lock(&self, name: &str) -> Result<SnapshotLock> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path(name))?;
        file.lock_exclusive()?;

        log::debug!("Locked snapshot {}", name);
        Ok(SnapshotLock { _file: file })
    }

    /// Save a snapshot in both formats
    ///
    /// The save is committed once the bincode copy is in place. The JSON copy
    /// is replaced afterwards and never shows state that was not committed.
    pub fn save_snapshot<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let bin = bincode::serialize(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let bin_tmp = self.stage(&bin)?;
        let json_tmp = self.stage(json.as_bytes())?;

        bin_tmp
            .persist(self.bin_path(name))
            .map_err(|e| StorageError::IoError(e.error))?;

        if let Err(e) = json_tmp.persist(self.json_path(name)) {
            log::warn!(
                "⚠️  Snapshot {} saved but its JSON copy is stale: {}",
                name,
                e.error
            );
        }

        log::debug!("Saved snapshot {} in {}", name, self.data_dir.display());
        Ok(())
    }

    /// Load a snapshot (bincode first, JSON as fallback)
    pub fn load_snapshot<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let bin_path = self.bin_path(name);
        if bin_path.exists() {
            let data = fs::read(&bin_path)?;
            return bincode::deserialize(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        let json_path = self.json_path(name);
        if json_path.exists() {
            log::warn!("⚠️  No binary snapshot for {}, loading JSON copy", name);
            let data = fs::read_to_string(&json_path)?;
            return serde_json::from_str(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        Err(StorageError::SnapshotNotFound(name.to_string()))
    }

    pub fn save_ballot(&self, name: &str, ballot: &Ballot) -> Result<()> {
        self.save_snapshot(name, ballot)
    }

    pub fn load_ballot(&self, name: &str) -> Result<Ballot> {
        self.load_snapshot(name)
    }

    /// Check if snapshot exists
    pub fn has_snapshot(&self, name: &str) -> bool {
        self.bin_path(name).exists() || self.json_path(name).exists()
    }

    /// Snapshot names in this directory, sorted
    pub fn list_snapshots(&self) -> Result<Vec<String>> {
        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            let is_snapshot = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("json") | Some("bin")
            );
            if !is_snapshot {
                continue;
            }

            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                if !snapshots.iter().any(|s| s == name) {
                    snapshots.push(name.to_string());
                }
            }
        }

        snapshots.sort();
        Ok(snapshots)
    }

    /// Delete a snapshot
    pub fn delete_snapshot(&self, name: &str) -> Result<()> {
        for path in [self.bin_path(name), self.json_path(name)] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Get storage directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn bin_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.bin", name))
    }

    fn json_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    fn lock_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.lock", name))
    }

    /// Write to a uniquely named temp file in the data dir, ready to persist
    fn stage(&self, contents: &[u8]) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new_in(&self.data_dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }
}

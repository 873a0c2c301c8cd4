//! Persisted rotation seed.
//!
//! A tiny JSON record naming the room that last had bathroom duty:
//!
//! ```json
//! {"last_bathroom_zimmer": "Zimmer 3"}
//! ```
//!
//! The record is read at startup and written back when it is absent. A
//! missing or unreadable file, or one naming a room the household no longer
//! has, falls back to the caller's default.
//!
//! # Concurrency
//! Read-modify-write goes through a sibling `.lock` file created with
//! `create_new`, so two processes updating the record are serialised.
//! Locks older than [`STALE_LOCK_AGE`] are treated as abandoned. Writes go
//! to a temporary file that is synced and renamed over the record.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use crate::error::{Result, RotaError};
use crate::models::{room_index, Room};

/// How long to wait for the lock before giving up.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Lock files older than this are removed.
pub const STALE_LOCK_AGE: Duration = Duration::from_secs(30);

/// File name used when no explicit path is configured.
pub const DEFAULT_STATE_FILE: &str = "task_data.json";

/// The persisted record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRecord {
    /// Room that had the most recent bathroom turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_bathroom_zimmer: Option<String>,
}

impl RotationRecord {
    /// Record naming `room` as the last bathroom room.
    pub fn with_last_bathroom(room: impl Into<String>) -> Self {
        Self {
            last_bathroom_zimmer: Some(room.into()),
        }
    }
}

/// File-backed store for the rotation record.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store at `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record without writing anything.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    /// Returns [`RotaError::State`] if the file exists but cannot be read or parsed.
    pub fn read(&self) -> Result<Option<RotationRecord>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RotaError::State(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RotaError::State(format!("cannot parse {}: {e}", self.path.display())))
    }

    /// Returns the last bathroom room, bootstrapping the record if needed.
    ///
    /// If the file is missing, unreadable, lacks the field, or names a room
    /// that is not in `rooms`, `default` is written into it and returned.
    ///
    /// # Errors
    /// Returns [`RotaError::State`] if the lock cannot be taken or the record
    /// cannot be written.
    pub fn load_or_init(&self, default: &str, rooms: &[Room]) -> Result<String> {
        self.update(|record| match record.last_bathroom_zimmer.as_deref() {
            Some(room) if room_index(rooms, room).is_some() => {}
            Some(room) => {
                tracing::warn!(
                    "{} names unknown room '{room}'; resetting to '{default}'",
                    self.path.display()
                );
                record.last_bathroom_zimmer = Some(default.to_string());
            }
            None => {
                tracing::info!(
                    "initialising {} with last bathroom room '{default}'",
                    self.path.display()
                );
                record.last_bathroom_zimmer = Some(default.to_string());
            }
        })
        .map(|record| record.last_bathroom_zimmer.unwrap_or_else(|| default.to_string()))
    }

    /// Sets the last bathroom room.
    ///
    /// # Errors
    /// Returns [`RotaError::State`] if the lock cannot be taken or the record
    /// cannot be written.
    pub fn set_last_bathroom(&self, room: &str) -> Result<()> {
        self.update(|record| record.last_bathroom_zimmer = Some(room.to_string()))
            .map(|_| ())
    }

    /// Read-modify-write under the lock. The record is only written if
    /// `apply` changed it (or the file was unusable).
    ///
    /// # Errors
    /// Returns [`RotaError::State`] on lock timeout or write failure.
    pub fn update<F>(&self, apply: F) -> Result<RotationRecord>
    where
        F: FnOnce(&mut RotationRecord),
    {
        let _guard = self.acquire_lock(LOCK_TIMEOUT)?;

        let (mut record, usable) = match self.read() {
            Ok(Some(record)) => (record, true),
            Ok(None) => (RotationRecord::default(), false),
            Err(e) => {
                tracing::warn!("{e}; falling back to defaults");
                (RotationRecord::default(), false)
            }
        };

        let before = record.clone();
        apply(&mut record);
        if !usable || record != before {
            self.write_atomic(&record)?;
        }
        Ok(record)
    }

    fn write_atomic(&self, record: &RotationRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                RotaError::State(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| RotaError::State(format!("cannot serialize record: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp_path).map_err(|e| {
            RotaError::State(format!("cannot create {}: {e}", tmp_path.display()))
        })?;
        file.write_all(json.as_bytes())
            .map_err(|e| RotaError::State(format!("cannot write temp file: {e}")))?;
        file.sync_all()
            .map_err(|e| RotaError::State(format!("cannot sync temp file: {e}")))?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            RotaError::State(format!(
                "cannot rename {} to {}: {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn acquire_lock(&self, timeout: Duration) -> Result<LockGuard> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                RotaError::State(format!("cannot create lock directory: {e}"))
            })?;
        }

        let started = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(mut file) => {
                    let _ = write!(file, "{}", std::process::id());
                    return Ok(LockGuard { path: lock_path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    evict_stale_lock(&lock_path);
                    if started.elapsed() > timeout {
                        return Err(RotaError::State(format!(
                            "timed out waiting for lock {}",
                            lock_path.display()
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(2));
                }
                Err(e) => {
                    return Err(RotaError::State(format!(
                        "cannot create lock {}: {e}",
                        lock_path.display()
                    )));
                }
            }
        }
    }
}

fn evict_stale_lock(lock_path: &Path) {
    let Ok(modified) = std::fs::metadata(lock_path).and_then(|m| m.modified()) else {
        return;
    };
    let Ok(age) = SystemTime::now().duration_since(modified) else {
        return;
    };
    if age > STALE_LOCK_AGE {
        tracing::warn!("removing stale lock {}", lock_path.display());
        let _ = std::fs::remove_file(lock_path);
    }
}

#[derive(Debug)]
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

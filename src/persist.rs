//! Key/value persistence boundary.
//!
//! The store serializes full snapshots and hands opaque bytes to a
//! [`PersistenceAdapter`]. Two adapters ship with the crate: an in-memory
//! map for tests and embedding, and a directory-backed adapter that writes
//! each key through a temp file and an atomic rename.

use crate::project::{ScriptId, TimelineId};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key under which the full project list is stored.
pub const PROJECTS_KEY: &str = "projects";

/// Key under which the monotonic id counter is stored.
pub const NEXT_ID_KEY: &str = "nextId";

/// Key for a timeline's event list, derived from the timeline id.
pub fn timeline_events_key(id: TimelineId) -> String {
    format!("timeline-events-{id}")
}

/// Key for a script's event sequence, derived from the script id.
pub fn script_events_key(id: ScriptId) -> String {
    format!("script-events-{id}")
}

/// Durable key/value store abstraction.
///
/// Implementations only need `get` and `set`; the store never deletes keys.
/// An event list whose owner was deleted stays behind as an orphaned key,
/// which the store tolerates on the next load.
pub trait PersistenceAdapter {
    /// Read the bytes stored under a key, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError>;

    /// Write bytes under a key, replacing any previous value.
    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), PersistError>;
}

/// In-memory adapter backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAdapter {
    /// Create an empty adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// File-per-key adapter rooted at a base directory.
///
/// Writes go to a sibling temp file, are synced, and are renamed over the
/// target so a crash mid-write never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    base_dir: PathBuf,
}

impl FileAdapter {
    /// Create an adapter rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// The directory this adapter stores its keys under.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let sanitized = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect::<String>();
        self.base_dir.join(format!("{sanitized}.json"))
    }
}

impl PersistenceAdapter for FileAdapter {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        match fs::read(self.key_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let target = self.key_path(key);
        let tmp = target.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }
}

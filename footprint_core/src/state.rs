//! Per-session state persistence with file locking.
//!
//! Each session owns one [`SessionRecord`]. The file-backed store keeps one
//! JSON document per session and serializes concurrent writers to the same
//! session with an exclusive lock.

use crate::{Error, Result, SessionRecord};
use fs2::FileExt;
use std::collections::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use uuid::Uuid;

const MAX_SESSION_ID_LEN: usize = 64;

/// Validated session key, safe to use as a file name
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Validate a caller-supplied id
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_SESSION_ID_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::InvalidSession(raw.to_string()))
        }
    }

    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for session records
pub trait SessionStore {
    /// Load a record, returning the default record for unknown sessions
    fn load(&self, id: &SessionId) -> Result<SessionRecord>;

    /// Replace a record
    fn save(&self, id: &SessionId, record: &SessionRecord) -> Result<()>;

    /// Load, modify and save a record
    ///
    /// Nothing is written when `f` fails.
    fn update<T, F>(&self, id: &SessionId, f: F) -> Result<T>
    where
        F: FnOnce(&mut SessionRecord) -> Result<T>,
    {
        let mut record = self.load(id)?;
        let out = f(&mut record)?;
        self.save(id, &record)?;
        Ok(out)
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// One JSON file per session under `<root>/<id>.json`
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under `<data_dir>/sessions`
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("sessions"))
    }

    pub fn record_path(&self, id: &SessionId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    fn lock_path(&self, id: &SessionId) -> PathBuf {
        self.root.join(format!("{}.lock", id))
    }

    /// Open (creating if needed) the sidecar lock file for a session
    fn open_lock(&self, id: &SessionId) -> Result<File> {
        std::fs::create_dir_all(&self.root)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(id))?;
        Ok(file)
    }

    /// Read and parse a record file, falling back to defaults on damage
    fn read_record(path: &Path) -> Result<SessionRecord> {
        if !path.exists() {
            tracing::info!("No session file at {:?}, starting fresh", path);
            return Ok(SessionRecord::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open session file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(SessionRecord::default());
            }
        };

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            tracing::warn!(
                "Failed to read session file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(SessionRecord::default());
        }

        match serde_json::from_str::<SessionRecord>(&contents) {
            Ok(record) => {
                tracing::debug!("Loaded session record from {:?}", path);
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse session file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Self::quarantine(path);
                Ok(SessionRecord::default())
            }
        }
    }

    /// Path a damaged record is moved to before it gets replaced
    pub fn corrupt_path(path: &Path) -> PathBuf {
        path.with_extension("json.corrupt")
    }

    /// Move a damaged record aside so the next save cannot destroy it
    fn quarantine(path: &Path) {
        let backup = Self::corrupt_path(path);
        match std::fs::rename(path, &backup) {
            Ok(()) => tracing::warn!("Moved damaged session file to {:?}", backup),
            Err(e) => tracing::warn!(
                "Unable to move damaged session file {:?} aside: {}",
                path,
                e
            ),
        }
    }

    /// Atomically write a record: temp file, fsync, rename
    fn write_record(&self, path: &Path, record: &SessionRecord) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;

        let temp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(record)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved session record to {:?}", path);
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, id: &SessionId) -> Result<SessionRecord> {
        let path = self.record_path(id);
        if !path.exists() {
            return Self::read_record(&path);
        }

        let lock = self.open_lock(id)?;
        if let Err(e) = lock.lock_shared() {
            tracing::warn!("Unable to lock session {}: {}. Reading unlocked.", id, e);
            return Self::read_record(&path);
        }
        let record = Self::read_record(&path);
        lock.unlock()?;
        record
    }

    fn save(&self, id: &SessionId, record: &SessionRecord) -> Result<()> {
        let lock = self.open_lock(id)?;
        lock.lock_exclusive()?;
        let result = self.write_record(&self.record_path(id), record);
        lock.unlock()?;
        result
    }

    fn update<T, F>(&self, id: &SessionId, f: F) -> Result<T>
    where
        F: FnOnce(&mut SessionRecord) -> Result<T>,
    {
        let lock = self.open_lock(id)?;
        lock.lock_exclusive()?;

        let path = self.record_path(id);
        let result = Self::read_record(&path).and_then(|mut record| {
            let out = f(&mut record)?;
            self.write_record(&path, &record)?;
            Ok(out)
        });

        lock.unlock()?;
        result
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store, useful for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: Mutex<HashMap<SessionId, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, SessionRecord>>> {
        self.records
            .lock()
            .map_err(|_| Error::State("session map lock poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: &SessionId) -> Result<SessionRecord> {
        Ok(self.records()?.get(id).cloned().unwrap_or_default())
    }

    fn save(&self, id: &SessionId, record: &SessionRecord) -> Result<()> {
        self.records()?.insert(id.clone(), record.clone());
        Ok(())
    }

    fn update<T, F>(&self, id: &SessionId, f: F) -> Result<T>
    where
        F: FnOnce(&mut SessionRecord) -> Result<T>,
    {
        let mut records = self.records()?;
        let mut record = records.get(id).cloned().unwrap_or_default();
        let out = f(&mut record)?;
        records.insert(id.clone(), record);
        Ok(out)
    }
}

//! Persistence gateway: durable snapshots and bulk JSON export/import.
//!
//! The whole document and the session are stored as one JSON blob under a
//! fixed key. Loading happens once at startup; saving happens after every
//! change and never fails the caller: write errors are logged and, when
//! configured, recorded by the [`ErrorCollector`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Document, Session};
use crate::telemetry::{ErrorCollector, ErrorEntry};

/// Storage key the snapshot lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "pixelArtAppData";

/// Error type for storage backends.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("snapshot for '{key}' is {size} bytes, storage quota is {quota}")]
    QuotaExceeded { key: String, size: usize, quota: usize },
    #[error("stored snapshot '{key}' is malformed: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistError {
    /// Short kind used in the error log.
    pub fn kind(&self) -> &'static str {
        match self {
            PersistError::Read { .. } | PersistError::Write { .. } => "io_error",
            PersistError::QuotaExceeded { .. } => "quota_exceeded",
            PersistError::Corrupt { .. } => "parse_error",
            PersistError::Serialize(_) => "serialize_error",
        }
    }
}

/// Bulk import failure. The message is deliberately generic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Invalid JSON format")]
    InvalidFormat,
}

/// A key-value blob store.
pub trait Storage {
    /// Value stored under `key`, or `None` if nothing was stored yet.
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Read { key: key.to_string(), source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let to_err = |source| PersistError::Write { key: key.to_string(), source };
        fs::create_dir_all(&self.dir).map_err(to_err)?;

        // Write to a sibling file first so a crash never leaves half a snapshot
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(to_err)?;
        fs::rename(&tmp, &path).map_err(to_err)
    }
}

/// In-memory storage with an optional size quota, like browser local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects any value longer than `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self { entries: HashMap::new(), quota: Some(quota) }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(PersistError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    quota,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The persisted blob: document plus session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub app_data: Document,
    #[serde(default)]
    pub app_state: Session,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    app_data: &'a Document,
    app_state: &'a Session,
}

/// Reads and writes snapshots through a [`Storage`] backend.
#[derive(Debug)]
pub struct Gateway<S: Storage> {
    storage: S,
    key: String,
    collector: Option<ErrorCollector>,
}

impl<S: Storage> Gateway<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self { storage, key: key.into(), collector: None }
    }

    /// Record swallowed failures with `collector`.
    pub fn with_collector(mut self, collector: ErrorCollector) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Read the stored snapshot. `Ok(None)` means nothing was stored yet.
    pub fn try_load(&self) -> Result<Option<Snapshot>, PersistError> {
        let Some(text) = self.storage.read(&self.key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistError::Corrupt { key: self.key.clone(), source })
    }

    /// Read the stored snapshot, falling back to the starter document and a
    /// default session when there is none or it cannot be read.
    pub fn load(&self) -> Snapshot {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                tracing::debug!(key = %self.key, sprites = snapshot.app_data.sprites.len(), "loaded snapshot");
                snapshot
            }
            Ok(None) => {
                tracing::debug!(key = %self.key, "no snapshot stored, starting fresh");
                Snapshot { app_data: Document::default(), app_state: Session::default() }
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to load snapshot, starting fresh");
                self.report("load", &e);
                Snapshot { app_data: Document::default(), app_state: Session::default() }
            }
        }
    }

    /// Serialize and store a snapshot.
    pub fn try_save(&mut self, document: &Document, session: &Session) -> Result<(), PersistError> {
        let text = serde_json::to_string(&SnapshotRef { app_data: document, app_state: session })?;
        self.storage.write(&self.key, &text)
    }

    /// Store a snapshot. Failures are logged and otherwise ignored; the
    /// previous snapshot stays in place until the next successful save.
    pub fn save(&mut self, document: &Document, session: &Session) -> bool {
        match self.try_save(document, session) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to save snapshot");
                self.report("save", &e);
                false
            }
        }
    }

    fn report(&self, operation: &str, error: &PersistError) {
        if let Some(collector) = &self.collector {
            collector.record(
                ErrorEntry::new(operation, error.kind(), error.to_string()).with_key(self.key.clone()),
            );
        }
    }
}

/// Pretty-printed JSON of the document: `{ sprites, categories, palettes }`.
pub fn export_document(document: &Document) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Parse a document from exported JSON.
///
/// Anything that does not parse as a document (including grids that are not
/// 16x16) is rejected as a whole.
pub fn import_document(text: &str) -> Result<Document, ImportError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::debug!(error = %e, "rejected import");
        ImportError::InvalidFormat
    })
}

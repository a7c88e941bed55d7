/**
 * Document Store
 *
 * This module owns server-side persistence of the shared document and the
 * authoritative `_version` counter.
 *
 * # Contract
 *
 * - `read` returns the last persisted document, or the initial empty
 *   document (`_version: 0`) when nothing has been written yet.
 * - `write` accepts a full replacement, stamps `_version = stored + 1`
 *   (starting at 1), persists it, and returns the stamped document.
 *
 * # Atomicity
 *
 * Writes are serialized behind a mutex so no two writes can compute the
 * same next version, and persisted via a temp-file-plus-rename so a failed
 * write never corrupts the previously stored value.
 */

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::shared::Document;

/// Errors raised by a document store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem failure
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be serialized for persistence
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The persisted data file exists but is not a valid document
    #[error("data file is corrupt: {message}")]
    Corrupt {
        /// Human-readable error message
        message: String,
    },
}

/// Server-side persistence of the shared document.
///
/// Injected into handlers as `Arc<dyn DocumentStore>` so tests can
/// substitute a double for the file-backed store.
pub trait DocumentStore: Send + Sync {
    /// Return the last persisted document, or the initial empty document
    fn read(&self) -> Result<Document, StoreError>;

    /// Replace the document, stamping and returning the next version
    fn write(&self, candidate: Document) -> Result<Document, StoreError>;
}

/// File-backed document store.
///
/// The document is kept as one JSON file at the configured path, matching
/// the flat single-document persistence model of the wire protocol.
pub struct FileStore {
    path: PathBuf,
    /// Serializes writers; guards the read-stamp-persist sequence
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store persisting to `path`.
    ///
    /// The file is created lazily on first write; a missing file reads as
    /// the initial empty document.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Path of the backing data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_current(&self) -> Result<Document, StoreError> {
        if !self.path.exists() {
            return Ok(Document::default());
        }
        let raw = fs::read(&self.path)?;
        serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Corrupt { message: e.to_string() })
    }

    fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(document)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        // Rename is the commit point; the previous value survives any
        // failure before this line.
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn read(&self) -> Result<Document, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_current()
    }

    fn write(&self, candidate: Document) -> Result<Document, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.read_current()?;
        let stamped = candidate.stamped(current.version + 1);
        self.persist(&stamped)?;
        tracing::debug!("[Store] Persisted document version {}", stamped.version);
        Ok(stamped)
    }
}

/// In-memory document store.
///
/// Same stamping contract as [`FileStore`], no persistence. Used as a test
/// double and by embedders that do not want a data file.
#[derive(Default)]
pub struct MemoryStore {
    current: Mutex<Option<Document>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self) -> Result<Document, StoreError> {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        Ok(current.clone().unwrap_or_default())
    }

    fn write(&self, candidate: Document) -> Result<Document, StoreError> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let version = current.as_ref().map(|d| d.version).unwrap_or(0) + 1;
        let stamped = candidate.stamped(version);
        *current = Some(stamped.clone());
        Ok(stamped)
    }
}

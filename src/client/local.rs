//! # Local Store
//!
//! File-backed key-value persistence for the client's copy of the shared
//! document. Every UI read and write lands here first; the network never
//! sits on this path. The document (including the device-only fields,
//! which are stripped only at the push/pull boundary) lives under a single
//! well-known key in one JSON file per profile.
//!
//! The store also counts UI mutations (the *epoch*). The sync driver runs
//! concurrently with the UI, so a pull that fetched the remote document
//! before a mutation landed must not replace it away; comparing the epoch
//! against the number of mutations the driver has folded into its state
//! machine - under the same lock as the save - closes that window.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::client::error::ClientError;
use crate::client::reconcile::reconcile;
use crate::shared::Document;

/// The well-known key the document is stored under
pub const DATA_KEY: &str = "chore-data";

/// File-backed local document store.
///
/// Cheap to clone; clones share the same backing file and lock.
#[derive(Debug, Clone)]
pub struct LocalStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    /// Guards every load-modify-save cycle; the guarded value is the
    /// mutation epoch (count of UI mutations applied so far)
    lock: Mutex<u64>,
}

impl LocalStore {
    /// Open (or create the directory for) a store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ClientError::storage(format!("create {}: {e}", parent.display())))?;
        }
        Ok(Self { inner: Arc::new(Inner { path, lock: Mutex::new(0) }) })
    }

    /// Default per-user store location
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("choresync")
            .join("local-data.json")
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Number of UI mutations applied so far
    pub fn epoch(&self) -> u64 {
        *self.lock()
    }

    /// Load the current document; a missing file reads as the default
    pub fn load(&self) -> Result<Document, ClientError> {
        let _guard = self.lock();
        self.load_unlocked()
    }

    /// Replace the stored document (sync-internal write, not a UI mutation)
    pub fn save(&self, document: &Document) -> Result<(), ClientError> {
        let _guard = self.lock();
        self.save_unlocked(document)
    }

    /// Apply a UI mutation: load, mutate, persist, and advance the epoch.
    ///
    /// This is the UI's write path: the mutation is durable locally before
    /// the call returns, regardless of connectivity.
    pub fn mutate<F>(&self, mutate: F) -> Result<Document, ClientError>
    where
        F: FnOnce(&mut Document),
    {
        let mut guard = self.lock();
        let mut document = self.load_unlocked()?;
        mutate(&mut document);
        self.save_unlocked(&document)?;
        *guard += 1;
        Ok(document)
    }

    /// Apply a sync-internal update (no epoch change), e.g. adopting the
    /// server's version stamp after a successful push
    pub fn update<F>(&self, mutate: F) -> Result<Document, ClientError>
    where
        F: FnOnce(&mut Document),
    {
        let _guard = self.lock();
        let mut document = self.load_unlocked()?;
        mutate(&mut document);
        self.save_unlocked(&document)?;
        Ok(document)
    }

    /// Merge a pulled document into local state.
    ///
    /// `pending` is the state machine's view (an unacknowledged intent
    /// exists); `folded_mutations` is how many UI mutations the driver has
    /// already fed into the state machine. If more mutations have landed
    /// than the driver has seen, the local body is preserved exactly as if
    /// an intent were pending - the mutation's own push follows once the
    /// driver catches up.
    pub fn reconcile_pull(
        &self,
        remote: Document,
        pending: bool,
        folded_mutations: u64,
    ) -> Result<Document, ClientError> {
        let guard = self.lock();
        let unseen_mutation = *guard > folded_mutations;
        let current = self.load_unlocked()?;
        let merged = reconcile(&current, remote, pending || unseen_mutation);
        self.save_unlocked(&merged)?;
        Ok(merged)
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.inner.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load_unlocked(&self) -> Result<Document, ClientError> {
        if !self.inner.path.exists() {
            return Ok(Document::default());
        }
        let raw = fs::read(&self.inner.path)
            .map_err(|e| ClientError::storage(format!("read {}: {e}", self.inner.path.display())))?;
        let mut table: Map<String, Value> = serde_json::from_slice(&raw)
            .map_err(|e| ClientError::storage(format!("parse local store: {e}")))?;
        match table.remove(DATA_KEY) {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| ClientError::storage(format!("parse stored document: {e}"))),
            None => Ok(Document::default()),
        }
    }

    fn save_unlocked(&self, document: &Document) -> Result<(), ClientError> {
        let mut table = Map::new();
        table.insert(
            DATA_KEY.to_string(),
            serde_json::to_value(document)
                .map_err(|e| ClientError::storage(format!("encode document: {e}")))?,
        );
        let payload = serde_json::to_vec(&Value::Object(table))
            .map_err(|e| ClientError::storage(format!("encode local store: {e}")))?;

        let tmp = self.inner.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&payload)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.inner.path)
        };
        write().map_err(|e| {
            ClientError::storage(format!("write {}: {e}", self.inner.path.display()))
        })
    }
}

//! # Persistence Gateway
//!
//! Everything devpost knows about the backend goes through the [`Gateway`]
//! trait: a document store holding the `questions` and `articles`
//! collections, and a blob store holding uploaded images.
//!
//! The gateway is passed explicitly to every command that needs it; there is
//! no process-wide backend handle.
//!
//! ## Implementations
//!
//! - [`fs::FsGateway`]: Production backend over a data directory.
//! - [`memory::MemGateway`]: In-memory backend for tests and embedding, with
//!   failure injection and helpers that act as another client.
//!
//! ## Storage Layout
//!
//! For `FsGateway`:
//! ```text
//! <data dir>/
//! ├── questions/
//! │   └── {id}.json       # { "id", "created_at", "data": {...} }
//! ├── articles/
//! │   └── {id}.json
//! ├── config.json
//! └── blobs/
//!     └── articles/images/{uuid}
//! ```
//!
//! ## Live Subscriptions
//!
//! [`Gateway::subscribe`] returns a [`Subscription`]: a channel of full
//! collection snapshots. The first snapshot is the collection as it is at
//! subscribe time; another follows every mutation. Releasing the
//! subscription (explicitly or by dropping it) detaches it from the backend
//! exactly once.

use crate::error::Result;
use crate::model::{Collection, Document, Record, RecordId};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

pub mod fs;
pub mod memory;

/// Namespace under which article images are uploaded.
pub const IMAGE_NAMESPACE: &str = "articles/images";

/// Full contents of a collection at one point in time.
pub type Snapshot = Vec<Record>;

/// Handle to an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub path: String,
}

/// Abstract interface over the hosted document database and object storage.
///
/// Each method fails with the matching error kind: `Write` for `create`,
/// `Read` for `read_all`/`subscribe`, `Delete` for both deletes, `Upload`
/// and `Resolve` for blobs.
pub trait Gateway {
    /// Persist a new document and return its backend-assigned id.
    fn create(&self, collection: Collection, document: Document) -> Result<RecordId>;

    /// One-shot fetch of every record in a collection.
    fn read_all(&self, collection: Collection) -> Result<Vec<Record>>;

    /// Standing read pushing a full snapshot on every change.
    fn subscribe(&self, collection: Collection) -> Result<Subscription>;

    /// Remove a record. A missing record is an error.
    fn delete(&self, collection: Collection, id: &RecordId) -> Result<()>;

    /// Store bytes at `path` in the blob store.
    fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<BlobRef>;

    /// Publicly fetchable URL for an uploaded blob.
    fn resolve_url(&self, blob: &BlobRef) -> Result<String>;

    /// Remove a blob. A missing blob is not an error.
    fn delete_blob(&self, path: &str) -> Result<()>;
}

impl<G: Gateway + ?Sized> Gateway for &G {
    fn create(&self, collection: Collection, document: Document) -> Result<RecordId> {
        (**self).create(collection, document)
    }
    fn read_all(&self, collection: Collection) -> Result<Vec<Record>> {
        (**self).read_all(collection)
    }
    fn subscribe(&self, collection: Collection) -> Result<Subscription> {
        (**self).subscribe(collection)
    }
    fn delete(&self, collection: Collection, id: &RecordId) -> Result<()> {
        (**self).delete(collection, id)
    }
    fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<BlobRef> {
        (**self).upload_blob(path, bytes)
    }
    fn resolve_url(&self, blob: &BlobRef) -> Result<String> {
        (**self).resolve_url(blob)
    }
    fn delete_blob(&self, path: &str) -> Result<()> {
        (**self).delete_blob(path)
    }
}

/// A live subscription to one collection.
///
/// Snapshots queue up in the channel until read. The release hook detaches
/// the subscription from its backend and runs at most once, either from
/// [`Subscription::unsubscribe`] or on drop.
pub struct Subscription {
    collection: Collection,
    rx: Receiver<Snapshot>,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(
        collection: Collection,
        rx: Receiver<Snapshot>,
        release: impl FnOnce() + 'static,
    ) -> Self {
        Self {
            collection,
            rx,
            release: Some(Box::new(release)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Drain every pending snapshot and return the newest one, if any.
    pub fn latest(&self) -> Option<Snapshot> {
        if !self.is_active() {
            return None;
        }
        let mut newest = None;
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => newest = Some(snapshot),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        newest
    }

    /// Block until a snapshot arrives or `timeout` passes, then drain.
    pub fn wait(&self, timeout: Duration) -> Option<Snapshot> {
        if !self.is_active() {
            return None;
        }
        let first = self.rx.recv_timeout(timeout).ok()?;
        Some(self.latest().unwrap_or(first))
    }

    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(collection = %self.collection, "releasing subscription");
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("collection", &self.collection)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Rejects blob paths that could escape the blob store.
pub(crate) fn validate_blob_path(path: &str) -> std::result::Result<(), String> {
    if path.is_empty() {
        return Err("blob path is empty".to_string());
    }
    if path.starts_with('/') || path.split('/').any(|seg| seg == ".." || seg.is_empty()) {
        return Err(format!("invalid blob path: {}", path));
    }
    Ok(())
}

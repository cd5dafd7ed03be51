use super::{validate_blob_path, BlobRef, Gateway, Snapshot, Subscription};
use crate::error::{DevpostError, Result};
use crate::model::{Collection, Document, Record, RecordId};
use chrono::{DateTime, TimeDelta, Utc};
use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

const BLOB_DIR: &str = "blobs";
const RECORD_EXT: &str = "json";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One stored record, `<root>/<collection>/<id>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    id: RecordId,
    created_at: DateTime<Utc>,
    data: Document,
}

impl From<Entry> for Record {
    fn from(entry: Entry) -> Self {
        Record::new(entry.id, entry.data)
    }
}

/// Gateway over a data directory: one JSON file per record plus a blob tree.
///
/// A create writes a new file and a delete removes one, so concurrent
/// writers never rewrite each other's records.
pub struct FsGateway {
    root: PathBuf,
    base_url: Option<String>,
}

impl FsGateway {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            base_url: None,
        }
    }

    /// Serve resolved blob URLs from `base_url` instead of `file://` paths.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        self
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.as_str())
    }

    /// `None` for ids that cannot name a record file.
    fn record_file(&self, collection: Collection, id: &RecordId) -> Option<PathBuf> {
        let id = id.as_str();
        if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
            return None;
        }
        Some(
            self.collection_dir(collection)
                .join(format!("{}.{}", id, RECORD_EXT)),
        )
    }

    fn blob_file(&self, path: &str) -> PathBuf {
        self.root.join(BLOB_DIR).join(path)
    }

    fn ensure_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    fn save(&self, collection: Collection, entry: &Entry) -> Result<()> {
        let dir = self.collection_dir(collection);
        Self::ensure_dir(&dir)?;
        let content = serde_json::to_string_pretty(entry)?;

        // Atomic write
        let tmp_file = dir.join(format!(".{}.tmp", entry.id));
        fs::write(&tmp_file, content)?;
        fs::rename(&tmp_file, dir.join(format!("{}.{}", entry.id, RECORD_EXT)))?;
        Ok(())
    }
}

/// Creation stamp that never repeats or goes backwards within the process,
/// so records created in a row keep their order.
fn next_stamp() -> DateTime<Utc> {
    static LAST: Mutex<Option<DateTime<Utc>>> = Mutex::new(None);
    let mut last = LAST.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut now = Utc::now();
    if let Some(prev) = *last {
        if now <= prev {
            now = prev + TimeDelta::nanoseconds(1);
        }
    }
    *last = Some(now);
    now
}

fn is_record_file(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| !n.starts_with('.'));
    visible && path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT)
}

/// Every record in a collection directory, oldest first.
fn snapshot(dir: &Path) -> Result<Snapshot> {
    let listing = match fs::read_dir(dir) {
        Ok(listing) => listing,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    for item in listing {
        let path = item?.path();
        if !is_record_file(&path) {
            continue;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            // Removed by another writer since the listing.
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        entries.push(serde_json::from_str::<Entry>(&content)?);
    }
    entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(entries.into_iter().map(Record::from).collect())
}

impl Gateway for FsGateway {
    fn create(&self, collection: Collection, document: Document) -> Result<RecordId> {
        let entry = Entry {
            id: RecordId::new(Uuid::new_v4().simple().to_string()),
            created_at: next_stamp(),
            data: document,
        };
        self.save(collection, &entry)
            .map_err(|e| DevpostError::Write(e.to_string()))?;
        tracing::debug!(%collection, id = %entry.id, "create");
        Ok(entry.id)
    }

    fn read_all(&self, collection: Collection) -> Result<Vec<Record>> {
        snapshot(&self.collection_dir(collection)).map_err(|e| DevpostError::Read(e.to_string()))
    }

    fn subscribe(&self, collection: Collection) -> Result<Subscription> {
        let dir = self.collection_dir(collection);
        Self::ensure_dir(&dir).map_err(|e| DevpostError::Read(e.to_string()))?;

        let (tx, rx) = channel();
        let feed = SnapshotFeed::new(dir.clone(), tx);

        let mut watcher = PollWatcher::new(
            feed.clone(),
            notify::Config::default()
                .with_poll_interval(POLL_INTERVAL)
                .with_compare_contents(true),
        )
        .map_err(|e| DevpostError::Read(e.to_string()))?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| DevpostError::Read(e.to_string()))?;

        // The watcher's baseline is taken inside `watch`; reading after it
        // means a write in between shows up either here or as an event.
        feed.push_if_changed()
            .map_err(|e| DevpostError::Read(e.to_string()))?;
        tracing::debug!(%collection, dir = %dir.display(), "watching collection");

        Ok(Subscription::new(collection, rx, move || drop(watcher)))
    }

    fn delete(&self, collection: Collection, id: &RecordId) -> Result<()> {
        let missing = || DevpostError::Delete(format!("No document {} in {}", id, collection));
        let file = self.record_file(collection, id).ok_or_else(missing)?;
        match fs::remove_file(&file) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(missing()),
            Err(e) => return Err(DevpostError::Delete(e.to_string())),
        }
        tracing::debug!(%collection, %id, "delete");
        Ok(())
    }

    fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<BlobRef> {
        validate_blob_path(path).map_err(DevpostError::Upload)?;
        let file = self.blob_file(path);
        let write = || -> Result<()> {
            if let Some(parent) = file.parent() {
                Self::ensure_dir(parent)?;
            }
            fs::write(&file, bytes)?;
            Ok(())
        };
        write().map_err(|e| DevpostError::Upload(e.to_string()))?;
        tracing::debug!(path, bytes = bytes.len(), "uploaded blob");
        Ok(BlobRef {
            path: path.to_string(),
        })
    }

    fn resolve_url(&self, blob: &BlobRef) -> Result<String> {
        let file = self.blob_file(&blob.path);
        if !file.is_file() {
            return Err(DevpostError::Resolve(format!("No blob at {}", blob.path)));
        }
        match &self.base_url {
            Some(base) => Ok(format!("{}/{}", base, blob.path)),
            None => {
                let abs = file
                    .canonicalize()
                    .map_err(|e| DevpostError::Resolve(e.to_string()))?;
                Ok(format!("file://{}", abs.display()))
            }
        }
    }

    fn delete_blob(&self, path: &str) -> Result<()> {
        validate_blob_path(path).map_err(DevpostError::Delete)?;
        match fs::remove_file(self.blob_file(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DevpostError::Delete(e.to_string())),
        }
    }
}

struct FeedState {
    tx: Sender<Snapshot>,
    last: Option<Snapshot>,
}

/// Re-reads a collection directory and pushes a snapshot whenever its
/// contents differ from the last one pushed. Shared between the watcher
/// thread and `subscribe`, which pushes the first snapshot through it.
#[derive(Clone)]
struct SnapshotFeed {
    dir: PathBuf,
    state: Arc<Mutex<FeedState>>,
}

impl SnapshotFeed {
    fn new(dir: PathBuf, tx: Sender<Snapshot>) -> Self {
        Self {
            dir,
            state: Arc::new(Mutex::new(FeedState { tx, last: None })),
        }
    }

    /// Returns whether a snapshot was sent.
    fn push_if_changed(&self) -> Result<bool> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = snapshot(&self.dir)?;
        if state.last.as_ref() == Some(&current) {
            return Ok(false);
        }
        state.last = Some(current.clone());
        let _ = state.tx.send(current);
        Ok(true)
    }
}

impl notify::EventHandler for SnapshotFeed {
    fn handle_event(&mut self, event: notify::Result<Event>) {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "watch error");
                return;
            }
        };
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return;
        }
        if !event.paths.iter().any(|p| is_record_file(p)) {
            return;
        }
        if let Err(e) = self.push_if_changed() {
            tracing::warn!(error = %e, "could not reload collection");
        }
    }
}

use super::{validate_blob_path, BlobRef, Gateway, Snapshot, Subscription};
use crate::error::{DevpostError, Result};
use crate::model::{Collection, Document, Record, RecordId};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::mpsc::{channel, Sender};
use uuid::Uuid;

/// Gateway operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Read,
    Subscribe,
    Delete,
    Upload,
    Resolve,
    DeleteBlob,
}

struct Listener {
    id: u64,
    collection: Collection,
    tx: Sender<Snapshot>,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    active: Vec<Listener>,
}

/// In-memory gateway.
///
/// Uses `RefCell` for interior mutability since devpost is single-threaded.
/// Every mutation, whether made through the trait or through the
/// `external_*` helpers, pushes a fresh snapshot to the collection's
/// subscribers.
#[derive(Default)]
pub struct MemGateway {
    collections: RefCell<HashMap<Collection, Vec<Record>>>,
    blobs: RefCell<HashMap<String, Vec<u8>>>,
    listeners: Rc<RefCell<Listeners>>,
    failing: RefCell<HashSet<Op>>,
    blob_deletes: RefCell<Vec<String>>,
}

impl MemGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `op` fail until switched off again.
    pub fn set_failing(&self, op: Op, failing: bool) {
        let mut ops = self.failing.borrow_mut();
        if failing {
            ops.insert(op);
        } else {
            ops.remove(&op);
        }
    }

    pub fn records(&self, collection: Collection) -> Vec<Record> {
        self.collections
            .borrow()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(path).cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.borrow().len()
    }

    /// Paths passed to `delete_blob`, in call order.
    pub fn blob_deletes(&self) -> Vec<String> {
        self.blob_deletes.borrow().clone()
    }

    pub fn subscriber_count(&self, collection: Collection) -> usize {
        self.listeners
            .borrow()
            .active
            .iter()
            .filter(|l| l.collection == collection)
            .count()
    }

    /// Insert a record as another client would, bypassing failure injection.
    pub fn external_insert(&self, collection: Collection, id: &str, document: Document) -> RecordId {
        let id = RecordId::new(id);
        self.collections
            .borrow_mut()
            .entry(collection)
            .or_default()
            .push(Record::new(id.clone(), document));
        self.broadcast(collection);
        id
    }

    /// Delete a record as another client would. Returns whether it existed.
    pub fn external_delete(&self, collection: Collection, id: &RecordId) -> bool {
        let removed = self.remove(collection, id);
        if removed {
            self.broadcast(collection);
        }
        removed
    }

    fn check(&self, op: Op) -> std::result::Result<(), String> {
        if self.failing.borrow().contains(&op) {
            Err(format!("Simulated {:?} error", op))
        } else {
            Ok(())
        }
    }

    fn remove(&self, collection: Collection, id: &RecordId) -> bool {
        let mut collections = self.collections.borrow_mut();
        let records = collections.entry(collection).or_default();
        let before = records.len();
        records.retain(|r| &r.id != id);
        records.len() != before
    }

    fn broadcast(&self, collection: Collection) {
        let snapshot = self.records(collection);
        // Receivers that went away without releasing are pruned here.
        self.listeners
            .borrow_mut()
            .active
            .retain(|l| l.collection != collection || l.tx.send(snapshot.clone()).is_ok());
    }
}

impl Gateway for MemGateway {
    fn create(&self, collection: Collection, document: Document) -> Result<RecordId> {
        self.check(Op::Create).map_err(DevpostError::Write)?;
        let id = RecordId::new(Uuid::new_v4().simple().to_string());
        tracing::debug!(%collection, %id, "create");
        self.collections
            .borrow_mut()
            .entry(collection)
            .or_default()
            .push(Record::new(id.clone(), document));
        self.broadcast(collection);
        Ok(id)
    }

    fn read_all(&self, collection: Collection) -> Result<Vec<Record>> {
        self.check(Op::Read).map_err(DevpostError::Read)?;
        Ok(self.records(collection))
    }

    fn subscribe(&self, collection: Collection) -> Result<Subscription> {
        self.check(Op::Subscribe).map_err(DevpostError::Read)?;
        let (tx, rx) = channel();
        // Subscribers see the collection as it is right now first.
        let _ = tx.send(self.records(collection));

        let listener_id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.active.push(Listener { id, collection, tx });
            id
        };
        tracing::debug!(%collection, listener_id, "subscribe");

        let registry = Rc::downgrade(&self.listeners);
        Ok(Subscription::new(collection, rx, move || {
            if let Some(listeners) = registry.upgrade() {
                listeners
                    .borrow_mut()
                    .active
                    .retain(|l| l.id != listener_id);
            }
        }))
    }

    fn delete(&self, collection: Collection, id: &RecordId) -> Result<()> {
        self.check(Op::Delete).map_err(DevpostError::Delete)?;
        if !self.remove(collection, id) {
            return Err(DevpostError::Delete(format!(
                "No document {} in {}",
                id, collection
            )));
        }
        tracing::debug!(%collection, %id, "delete");
        self.broadcast(collection);
        Ok(())
    }

    fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<BlobRef> {
        self.check(Op::Upload).map_err(DevpostError::Upload)?;
        validate_blob_path(path).map_err(DevpostError::Upload)?;
        self.blobs
            .borrow_mut()
            .insert(path.to_string(), bytes.to_vec());
        Ok(BlobRef {
            path: path.to_string(),
        })
    }

    fn resolve_url(&self, blob: &BlobRef) -> Result<String> {
        self.check(Op::Resolve).map_err(DevpostError::Resolve)?;
        if !self.blobs.borrow().contains_key(&blob.path) {
            return Err(DevpostError::Resolve(format!("No blob at {}", blob.path)));
        }
        Ok(format!("memory://{}", blob.path))
    }

    fn delete_blob(&self, path: &str) -> Result<()> {
        self.blob_deletes.borrow_mut().push(path.to_string());
        self.check(Op::DeleteBlob).map_err(DevpostError::Delete)?;
        self.blobs.borrow_mut().remove(path);
        Ok(())
    }
}

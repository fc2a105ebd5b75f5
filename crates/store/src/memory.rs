//! In-process [`RemoteStore`] with live fan-out.
//!
//! Every collection owns a [`broadcast`] channel; each accepted write
//! publishes a full [`Snapshot`] of the collection while the store lock is
//! still held, so subscribers see snapshots in write order. Documents keep
//! their insertion order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::remote::{RemoteStore, StoreError};
use crate::snapshot::{Document, Snapshot, Subscription};

/// Buffer capacity of each collection's snapshot channel.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

struct Collection {
    documents: Vec<Document>,
    sender: broadcast::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            documents: Vec::new(),
            sender,
        }
    }

    fn snapshot(&self, name: &str) -> Snapshot {
        Snapshot {
            collection: name.to_string(),
            documents: self.documents.clone(),
        }
    }

    fn publish(&self, name: &str) {
        // A send error only means there are no subscribers.
        let _ = self.sender.send(self.snapshot(name));
    }
}

/// Thread-safe in-memory document store.
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the store going offline (`false`) or coming back (`true`).
    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of open subscriptions on `collection`.
    pub fn listener_count(&self, collection: &str) -> usize {
        self.lock()
            .get(collection)
            .map_or(0, |c| c.sender.receiver_count())
    }

    /// Current body of one document.
    pub fn document(&self, collection: &str, id: &str) -> Option<Value> {
        self.lock()
            .get(collection)?
            .documents
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.body.clone())
    }

    /// Number of documents in `collection`.
    pub fn document_count(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, |c| c.documents.len())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Collection>> {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".into()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        self.ensure_available()?;
        let mut collections = self.lock();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);

        tracing::debug!(collection, "Subscription opened");
        Ok(Subscription::new(
            entry.snapshot(collection),
            entry.sender.subscribe(),
        ))
    }

    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut collections = self.lock();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);

        match entry.documents.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.body = body,
            None => entry.documents.push(Document {
                id: id.to_string(),
                body,
            }),
        }
        entry.publish(collection);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut collections = self.lock();
        let not_found = || StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        let entry = collections.get_mut(collection).ok_or_else(not_found)?;
        let document = entry
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(not_found)?;

        match &mut document.body {
            Value::Object(map) => map.extend(fields),
            other => *other = Value::Object(fields),
        }
        entry.publish(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut collections = self.lock();
        if let Some(entry) = collections.get_mut(collection) {
            let before = entry.documents.len();
            entry.documents.retain(|d| d.id != id);
            if entry.documents.len() != before {
                entry.publish(collection);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

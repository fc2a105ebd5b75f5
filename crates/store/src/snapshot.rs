//! Snapshot delivery types.

use serde_json::Value;
use tokio::sync::broadcast;

/// One document in a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// The complete contents of a collection at one point in time.
///
/// Each snapshot fully replaces the previous one; there is no partial
/// delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

impl Snapshot {
    pub fn empty(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            documents: Vec::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.documents.iter().find(|d| d.id == id).map(|d| &d.body)
    }
}

/// A live subscription to one collection.
///
/// Yields the current contents first, then every subsequent snapshot in
/// the order the store emitted them. Dropping the subscription closes it.
pub struct Subscription {
    initial: Option<Snapshot>,
    updates: broadcast::Receiver<Snapshot>,
}

impl Subscription {
    pub fn new(initial: Snapshot, updates: broadcast::Receiver<Snapshot>) -> Self {
        Self {
            initial: Some(initial),
            updates,
        }
    }

    /// Wait for the next snapshot. Returns `None` once the store side is
    /// gone.
    ///
    /// A lagged receiver drains whatever is still buffered and yields only
    /// the newest snapshot. Every snapshot is a full replacement, so the
    /// skipped ones carry nothing the newest lacks.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        loop {
            match self.updates.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscription lagged, skipping to newest snapshot");
                    if let Some(newest) = self.drain_buffered() {
                        return Some(newest);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn drain_buffered(&mut self) -> Option<Snapshot> {
        let mut newest = None;
        loop {
            match self.updates.try_recv() {
                Ok(snapshot) => newest = Some(snapshot),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return newest,
            }
        }
    }
}

//! The store primitives the cache depends on.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::snapshot::Subscription;

/// Errors reported by a [`RemoteStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the operation.
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// A partial update targeted a document that does not exist.
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
}

/// A remote real-time document store.
///
/// Writes complete once the store has accepted them; any subscriber
/// (including the writer's own) sees the change only through a later
/// snapshot.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Open a live subscription to `collection`.
    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<(), StoreError>;

    /// Merge `fields` into an existing document.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

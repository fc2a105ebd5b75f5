//! Synchronized entity cache.
//!
//! Mirrors the signed-in user's per-category collections and taste notes.
//! Reads are synchronous and served from the latest delivered snapshot;
//! writes go to the [`RemoteStore`] and only become visible here once the
//! store echoes them back through a subscription.
//!
//! Each live subscription runs in its own task. A task owns its
//! [`Subscription`] and applies snapshots under a short write lock, tagged
//! with the bind epoch it was started for. [`EntityCache::bind`] cancels
//! and awaits every task before clearing state, so no subscription
//! outlives the identity it was opened for.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use marquee_core::category::Category;
use marquee_core::entity::{CatalogItem, DescriptivePatch, EntityRecord, Rating, UserStateUpdate};
use marquee_core::error::CoreError;
use marquee_core::types::{EntityId, UserId};
use marquee_store::paths::{self, NOTES_FIELD, TASTE_DOC_ID};
use marquee_store::{RemoteStore, Snapshot, StoreError, Subscription};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// What changed when the invalidation hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// One category's collection was replaced.
    Category(Category),
    /// The taste-notes document changed.
    TasteNotes,
    /// Everything was cleared (bind / sign-out).
    All,
}

/// Callback invoked after every applied snapshot.
///
/// Runs on the subscription task, outside any cache lock, so it may read
/// the cache freely. It must not block.
pub type InvalidationHook = Arc<dyn Fn(CacheScope) + Send + Sync>;

/// Result of [`EntityCache::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The document was written; it appears once the echo arrives.
    Added,
    /// The id was already in the cached collection. Nothing was written.
    Duplicate,
    /// No identity is bound. Nothing was written.
    SignedOut,
}

/// Errors from cache mutations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The store rejected or could not receive the write.
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(StoreError),

    /// A partial update targeted an entity the store does not hold.
    #[error("{category} {id} is not in the library")]
    Missing { category: Category, id: EntityId },

    /// A rating outside 1-5 was supplied.
    #[error(transparent)]
    InvalidRating(#[from] CoreError),
}

impl CacheError {
    fn from_store(err: StoreError, category: Category, id: EntityId) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::Missing { category, id },
            other => Self::RemoteUnavailable(other),
        }
    }
}

impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        Self::RemoteUnavailable(err)
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CacheState {
    /// Incremented on every bind. Snapshots tagged with an older epoch are
    /// dropped.
    epoch: u64,
    user: Option<UserId>,
    collections: HashMap<Category, Vec<EntityRecord>>,
    /// Ids of stored documents that failed to decode. They still count as
    /// present so `add` never overwrites them.
    undecodable: HashMap<Category, HashSet<EntityId>>,
    taste_notes: String,
}

impl CacheState {
    fn clear(&mut self) {
        self.collections.clear();
        self.undecodable.clear();
        self.taste_notes.clear();
    }
}

struct SubscriptionTask {
    collection: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Clone, Copy)]
enum Feed {
    Entities(Category),
    TasteNotes,
}

impl Feed {
    fn scope(self) -> CacheScope {
        match self {
            Feed::Entities(category) => CacheScope::Category(category),
            Feed::TasteNotes => CacheScope::TasteNotes,
        }
    }
}

/// Shared between the cache handle and its subscription tasks.
struct Shared {
    state: RwLock<CacheState>,
    hook: RwLock<Option<InvalidationHook>>,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self, scope: CacheScope) {
        let hook = self.hook.read().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some(hook) = hook {
            hook(scope);
        }
    }

    /// Replace the feed's state with `snapshot`. Returns `false` when the
    /// snapshot belongs to a superseded bind.
    fn apply(&self, epoch: u64, feed: Feed, snapshot: &Snapshot) -> bool {
        match feed {
            Feed::Entities(category) => {
                let (records, undecodable) = decode_entities(category, snapshot);
                let mut state = self.write();
                if state.epoch != epoch {
                    return false;
                }
                state.collections.insert(category, records);
                state.undecodable.insert(category, undecodable);
            }
            Feed::TasteNotes => {
                let notes = snapshot
                    .get(TASTE_DOC_ID)
                    .and_then(|doc| doc.get(NOTES_FIELD))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let mut state = self.write();
                if state.epoch != epoch {
                    return false;
                }
                state.taste_notes = notes;
            }
        }
        true
    }
}

fn decode_entities(
    category: Category,
    snapshot: &Snapshot,
) -> (Vec<EntityRecord>, HashSet<EntityId>) {
    let mut records = Vec::with_capacity(snapshot.documents.len());
    let mut undecodable = HashSet::new();

    for doc in &snapshot.documents {
        match EntityRecord::from_document(&doc.id, category, doc.body.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    collection = %snapshot.collection,
                    doc_id = %doc.id,
                    error = %e,
                    "Skipping undecodable entity document",
                );
                if let Ok(id) = doc.id.parse::<EntityId>() {
                    undecodable.insert(id);
                }
            }
        }
    }
    (records, undecodable)
}

// ---------------------------------------------------------------------------
// EntityCache
// ---------------------------------------------------------------------------

/// Local mirror of the bound user's library.
pub struct EntityCache {
    store: Arc<dyn RemoteStore>,
    shared: Arc<Shared>,
    /// Live subscription tasks. The async lock also serializes binds.
    tasks: Mutex<Vec<SubscriptionTask>>,
}

impl EntityCache {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            shared: Arc::new(Shared {
                state: RwLock::new(CacheState::default()),
                hook: RwLock::new(None),
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Register the invalidation hook, replacing any previous one.
    pub fn on_invalidate(&self, hook: impl Fn(CacheScope) + Send + Sync + 'static) {
        *self.shared.hook.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(hook));
    }

    // -- Binding ------------------------------------------------------------

    /// Switch the cache to `user`, or to the signed-out state for `None`.
    ///
    /// Existing subscriptions are cancelled and awaited first, then all
    /// local state is cleared. For `Some(user)` one subscription per
    /// category and one for the taste notes are opened, and each one's
    /// current contents are applied before `bind` returns. If any of them
    /// fails to open, the ones already opened are torn down and the cache
    /// is left signed out.
    pub async fn bind(&self, user: Option<UserId>) -> Result<(), CacheError> {
        let mut tasks = self.tasks.lock().await;
        stop_all(&mut tasks).await;

        let epoch = {
            let mut state = self.shared.write();
            state.epoch += 1;
            state.user = user.clone();
            state.clear();
            state.epoch
        };
        self.shared.notify(CacheScope::All);

        let Some(user) = user else {
            tracing::info!("Library unbound");
            return Ok(());
        };

        let mut feeds: Vec<(String, Feed)> = Category::ALL
            .iter()
            .map(|&c| (paths::entity_collection(&user, c), Feed::Entities(c)))
            .collect();
        feeds.push((paths::profile_collection(&user), Feed::TasteNotes));

        for (collection, feed) in feeds {
            match self.store.subscribe(&collection).await {
                Ok(mut subscription) => {
                    if let Some(initial) = subscription.next().await {
                        self.shared.apply(epoch, feed, &initial);
                        self.shared.notify(feed.scope());
                    }
                    tasks.push(self.spawn_listener(collection, epoch, feed, subscription));
                }
                Err(e) => {
                    tracing::error!(
                        user_id = %user,
                        collection = %collection,
                        error = %e,
                        "Failed to open subscription",
                    );
                    stop_all(&mut tasks).await;
                    {
                        let mut state = self.shared.write();
                        state.epoch += 1;
                        state.user = None;
                    }
                    self.shared.notify(CacheScope::All);
                    return Err(e.into());
                }
            }
        }

        tracing::info!(user_id = %user, subscriptions = tasks.len(), "Library bound");
        Ok(())
    }

    fn spawn_listener(
        &self,
        collection: String,
        epoch: u64,
        feed: Feed,
        mut subscription: Subscription,
    ) -> SubscriptionTask {
        let cancel = CancellationToken::new();
        let shared = Arc::clone(&self.shared);
        let token = cancel.clone();
        let name = collection.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    next = subscription.next() => {
                        let Some(snapshot) = next else {
                            tracing::warn!(collection = %name, "Subscription closed by store");
                            break;
                        };
                        if !shared.apply(epoch, feed, &snapshot) {
                            break;
                        }
                        shared.notify(feed.scope());
                    }
                }
            }
            tracing::debug!(collection = %name, "Subscription task exited");
        });

        SubscriptionTask {
            collection,
            cancel,
            handle,
        }
    }

    /// Cancel every subscription and leave the cache signed out.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        stop_all(&mut tasks).await;
        let mut state = self.shared.write();
        state.epoch += 1;
        state.user = None;
        state.clear();
    }

    // -- Reads --------------------------------------------------------------

    /// Currently bound identity.
    pub fn user(&self) -> Option<UserId> {
        self.shared.read().user.clone()
    }

    pub fn is_bound(&self) -> bool {
        self.shared.read().user.is_some()
    }

    /// All records of `category` from the latest snapshot, in store order.
    pub fn all(&self, category: Category) -> Vec<EntityRecord> {
        self.shared
            .read()
            .collections
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    /// Records of every category.
    pub fn all_records(&self) -> Vec<EntityRecord> {
        let state = self.shared.read();
        Category::ALL
            .iter()
            .filter_map(|c| state.collections.get(c))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn find(&self, category: Category, id: EntityId) -> Option<EntityRecord> {
        self.shared
            .read()
            .collections
            .get(&category)?
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Whether the store holds `id`, including documents too malformed to
    /// show in [`all`](Self::all).
    pub fn contains(&self, category: Category, id: EntityId) -> bool {
        let state = self.shared.read();
        state
            .collections
            .get(&category)
            .is_some_and(|records| records.iter().any(|r| r.id == id))
            || state
                .undecodable
                .get(&category)
                .is_some_and(|ids| ids.contains(&id))
    }

    pub fn taste_notes(&self) -> String {
        self.shared.read().taste_notes.clone()
    }

    // -- Mutations ----------------------------------------------------------

    /// Add a catalog item as a new, unwatched entity.
    ///
    /// The duplicate check runs against the cached collection at call time.
    /// Two adds racing before either echo arrives both reach the store,
    /// where the second replaces the first under the same key.
    pub async fn add(
        &self,
        category: Category,
        item: &CatalogItem,
    ) -> Result<AddOutcome, CacheError> {
        let Some(user) = self.user() else {
            return Ok(AddOutcome::SignedOut);
        };
        if self.contains(category, item.id) {
            tracing::debug!(%category, id = item.id, "Add skipped, already in library");
            return Ok(AddOutcome::Duplicate);
        }

        let mut record = EntityRecord::from_catalog(item, Utc::now());
        record.category = category;
        self.store
            .set(
                &paths::entity_collection(&user, category),
                &record.document_id(),
                record.to_document(),
            )
            .await?;

        tracing::info!(user_id = %user, %category, id = item.id, title = %item.title, "Entity added");
        Ok(AddOutcome::Added)
    }

    /// Delete an entity. `Ok(false)` when signed out.
    pub async fn remove(&self, category: Category, id: EntityId) -> Result<bool, CacheError> {
        let Some(user) = self.user() else {
            return Ok(false);
        };
        self.store
            .delete(&paths::entity_collection(&user, category), &id.to_string())
            .await?;
        tracing::info!(user_id = %user, %category, id, "Entity removed");
        Ok(true)
    }

    /// Mark watched now with an optional 1-5 rating and notes.
    pub async fn mark_watched(
        &self,
        category: Category,
        id: EntityId,
        rating: Option<u8>,
        notes: &str,
    ) -> Result<bool, CacheError> {
        let update = UserStateUpdate::MarkWatched {
            rating: validate_rating(rating)?,
            notes: notes.to_string(),
            at: Utc::now(),
        };
        self.apply_user_update(category, id, update).await
    }

    /// Reset the watched state, rating and notes.
    pub async fn unmark_watched(&self, category: Category, id: EntityId) -> Result<bool, CacheError> {
        self.apply_user_update(category, id, UserStateUpdate::Unmark)
            .await
    }

    /// Change rating and notes without touching the watched flag.
    pub async fn update_rating(
        &self,
        category: Category,
        id: EntityId,
        rating: Option<u8>,
        notes: &str,
    ) -> Result<bool, CacheError> {
        let update = UserStateUpdate::Rate {
            rating: validate_rating(rating)?,
            notes: notes.to_string(),
        };
        self.apply_user_update(category, id, update).await
    }

    /// Write descriptive fields only. `Ok(false)` when signed out or when
    /// the patch is empty.
    pub async fn patch(
        &self,
        category: Category,
        id: EntityId,
        patch: &DescriptivePatch,
    ) -> Result<bool, CacheError> {
        let Some(user) = self.user() else {
            return Ok(false);
        };
        if patch.is_empty() {
            return Ok(false);
        }
        self.store
            .update(
                &paths::entity_collection(&user, category),
                &id.to_string(),
                patch.to_fields(),
            )
            .await
            .map_err(|e| CacheError::from_store(e, category, id))?;
        tracing::debug!(user_id = %user, %category, id, "Descriptive fields patched");
        Ok(true)
    }

    /// Replace the free-text taste notes.
    pub async fn save_taste_notes(&self, notes: &str) -> Result<bool, CacheError> {
        let Some(user) = self.user() else {
            return Ok(false);
        };
        let body = serde_json::json!({ NOTES_FIELD: notes });
        self.store
            .set(&paths::profile_collection(&user), TASTE_DOC_ID, body)
            .await?;
        tracing::info!(user_id = %user, length = notes.len(), "Taste notes saved");
        Ok(true)
    }

    async fn apply_user_update(
        &self,
        category: Category,
        id: EntityId,
        update: UserStateUpdate,
    ) -> Result<bool, CacheError> {
        let Some(user) = self.user() else {
            return Ok(false);
        };
        self.store
            .update(
                &paths::entity_collection(&user, category),
                &id.to_string(),
                update.to_fields(),
            )
            .await
            .map_err(|e| CacheError::from_store(e, category, id))?;
        tracing::info!(user_id = %user, %category, id, ?update, "User state updated");
        Ok(true)
    }
}

fn validate_rating(rating: Option<u8>) -> Result<Option<Rating>, CacheError> {
    Ok(rating.map(Rating::new).transpose()?)
}

/// Cancel every task and wait for it to drop its subscription.
async fn stop_all(tasks: &mut Vec<SubscriptionTask>) {
    for task in tasks.iter() {
        task.cancel.cancel();
    }
    for task in tasks.drain(..) {
        if let Err(e) = task.handle.await {
            tracing::warn!(collection = %task.collection, error = %e, "Subscription task failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use marquee_store::MemoryStore;

    use super::*;

    fn cache() -> EntityCache {
        EntityCache::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn unbound_cache_reads_empty() {
        let cache = cache();
        assert!(!cache.is_bound());
        assert!(cache.all(Category::Movie).is_empty());
        assert!(cache.find(Category::Tv, 1).is_none());
        assert_eq!(cache.taste_notes(), "");
    }

    #[tokio::test]
    async fn unbound_mutations_are_no_ops() {
        let cache = cache();
        assert_eq!(cache.remove(Category::Movie, 1).await.unwrap(), false);
        assert_eq!(
            cache.mark_watched(Category::Movie, 1, Some(4), "").await.unwrap(),
            false
        );
        assert_eq!(cache.unmark_watched(Category::Movie, 1).await.unwrap(), false);
        assert_eq!(cache.save_taste_notes("x").await.unwrap(), false);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected_before_write() {
        let cache = cache();
        assert_matches!(
            cache.update_rating(Category::Movie, 1, Some(6), "").await,
            Err(CacheError::InvalidRating(CoreError::InvalidRating(6)))
        );
        assert_matches!(
            cache.mark_watched(Category::Movie, 1, Some(0), "").await,
            Err(CacheError::InvalidRating(_))
        );
    }

    #[test]
    fn store_not_found_maps_to_missing() {
        let err = CacheError::from_store(
            StoreError::NotFound {
                collection: "users/u/movie".into(),
                id: "7".into(),
            },
            Category::Movie,
            7,
        );
        assert_matches!(err, CacheError::Missing { category: Category::Movie, id: 7 });
    }
}

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use common::{eventually, item, store_and_cache, user};
use marquee_core::category::Category;
use marquee_core::types::UserId;
use marquee_library::{AddOutcome, CacheError, CacheScope};
use marquee_store::paths::{entity_collection, profile_collection};
use marquee_store::RemoteStore;
use serde_json::json;

#[tokio::test]
async fn add_becomes_visible_through_echo() {
    let (store, cache) = store_and_cache();
    cache.bind(Some(user())).await.unwrap();

    let outcome = cache.add(Category::Movie, &item(Category::Movie, 949, "Heat")).await;
    assert_matches!(outcome, Ok(AddOutcome::Added));

    eventually(|| cache.contains(Category::Movie, 949)).await;
    let record = cache.find(Category::Movie, 949).unwrap();
    assert_eq!(record.title, "Heat");
    assert!(!record.watched);
    assert_eq!(record.rating, None);
    assert_eq!(record.notes, "");
    assert!(cache.all(Category::Tv).is_empty());

    let doc = store
        .document(&entity_collection(&user(), Category::Movie), "949")
        .unwrap();
    assert_eq!(doc["watched"], false);
    assert!(doc["watchedAt"].is_null());
    assert!(doc["addedAt"].is_string());
}

#[tokio::test]
async fn duplicate_add_leaves_collection_unchanged() {
    let (store, cache) = store_and_cache();
    cache.bind(Some(user())).await.unwrap();
    cache.add(Category::Movie, &item(Category::Movie, 949, "Heat")).await.unwrap();
    eventually(|| cache.contains(Category::Movie, 949)).await;

    let before = cache.all(Category::Movie);
    let outcome = cache
        .add(Category::Movie, &item(Category::Movie, 949, "Heat (again)"))
        .await
        .unwrap();

    assert_eq!(outcome, AddOutcome::Duplicate);
    assert_eq!(cache.all(Category::Movie), before);
    assert_eq!(store.document_count(&entity_collection(&user(), Category::Movie)), 1);
}

#[tokio::test]
async fn bind_returns_with_stored_library_visible() {
    let (store, cache) = store_and_cache();
    let collection = entity_collection(&user(), Category::Movie);
    store
        .set(
            &collection,
            "949",
            json!({
                "id": 949,
                "title": "Heat",
                "watched": true,
                "rating": 5,
                "notes": "fav",
                "addedAt": "2024-01-01T00:00:00Z"
            }),
        )
        .await
        .unwrap();
    store
        .set(&profile_collection(&user()), "taste", json!({ "notes": "slow burns" }))
        .await
        .unwrap();

    cache.bind(Some(user())).await.unwrap();

    assert!(cache.contains(Category::Movie, 949));
    assert_eq!(cache.taste_notes(), "slow burns");
    let outcome = cache
        .add(Category::Movie, &item(Category::Movie, 949, "Heat"))
        .await
        .unwrap();
    assert_eq!(outcome, AddOutcome::Duplicate);

    let doc = store.document(&collection, "949").unwrap();
    assert_eq!(doc["watched"], true);
    assert_eq!(doc["rating"], 5);
    assert_eq!(doc["notes"], "fav");
}

#[tokio::test]
async fn legacy_documents_block_duplicate_adds() {
    let (store, cache) = store_and_cache();
    let collection = entity_collection(&user(), Category::Movie);
    // No addedAt and an out-of-range rating: decodes leniently.
    store
        .set(
            &collection,
            "949",
            json!({"id": 949, "title": "Heat", "watched": true, "rating": 9, "notes": "fav"}),
        )
        .await
        .unwrap();
    // Not decodable at all.
    store
        .set(&collection, "500", json!({"id": 500, "title": 42, "notes": "keep me"}))
        .await
        .unwrap();

    cache.bind(Some(user())).await.unwrap();

    let heat = cache.find(Category::Movie, 949).unwrap();
    assert!(heat.watched);
    assert_eq!(heat.rating, None);
    assert!(cache.find(Category::Movie, 500).is_none());
    assert!(cache.contains(Category::Movie, 500));

    for (id, title) in [(949, "Heat"), (500, "Reservoir Dogs")] {
        let outcome = cache
            .add(Category::Movie, &item(Category::Movie, id, title))
            .await
            .unwrap();
        assert_eq!(outcome, AddOutcome::Duplicate);
    }

    let heat = store.document(&collection, "949").unwrap();
    assert_eq!(heat["watched"], true);
    assert_eq!(heat["notes"], "fav");
    assert_eq!(store.document(&collection, "500").unwrap()["notes"], "keep me");
}

#[tokio::test]
async fn signed_out_add_writes_nothing() {
    let (store, cache) = store_and_cache();
    let outcome = cache
        .add(Category::Tv, &item(Category::Tv, 1, "Severance"))
        .await
        .unwrap();
    assert_eq!(outcome, AddOutcome::SignedOut);
    assert_eq!(store.document_count(&entity_collection(&user(), Category::Tv)), 0);
}

#[tokio::test]
async fn bind_none_empties_every_category() {
    let (_store, cache) = store_and_cache();
    cache.bind(Some(user())).await.unwrap();
    cache.add(Category::Movie, &item(Category::Movie, 1, "A")).await.unwrap();
    cache.add(Category::Tv, &item(Category::Tv, 2, "B")).await.unwrap();
    cache.save_taste_notes("slow burns").await.unwrap();
    eventually(|| {
        cache.contains(Category::Movie, 1)
            && cache.contains(Category::Tv, 2)
            && cache.taste_notes() == "slow burns"
    })
    .await;

    cache.bind(None).await.unwrap();

    assert!(!cache.is_bound());
    for category in Category::ALL {
        assert!(cache.all(category).is_empty());
    }
    assert_eq!(cache.taste_notes(), "");
}

#[tokio::test]
async fn rebinding_does_not_leak_subscriptions() {
    let (store, cache) = store_and_cache();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    for _ in 0..3 {
        cache.bind(Some(alice.clone())).await.unwrap();
    }
    for category in Category::ALL {
        assert_eq!(store.listener_count(&entity_collection(&alice, category)), 1);
    }
    assert_eq!(store.listener_count(&profile_collection(&alice)), 1);

    cache.bind(Some(bob.clone())).await.unwrap();
    for category in Category::ALL {
        assert_eq!(store.listener_count(&entity_collection(&alice, category)), 0);
        assert_eq!(store.listener_count(&entity_collection(&bob, category)), 1);
    }

    cache.bind(None).await.unwrap();
    cache.bind(None).await.unwrap();
    for category in Category::ALL {
        assert_eq!(store.listener_count(&entity_collection(&bob, category)), 0);
    }
    assert_eq!(store.listener_count(&profile_collection(&bob)), 0);
}

#[tokio::test]
async fn previous_user_writes_do_not_reach_new_binding() {
    let (store, cache) = store_and_cache();
    let alice = UserId::new("alice");
    cache.bind(Some(alice.clone())).await.unwrap();
    cache.bind(Some(UserId::new("bob"))).await.unwrap();

    let record = json!({"id": 5, "title": "Ronin", "addedAt": "2024-01-01T00:00:00Z"});
    store
        .set(&entity_collection(&alice, Category::Movie), "5", record)
        .await
        .unwrap();

    // Give any stray listener a chance to run.
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(cache.all(Category::Movie).is_empty());
}

#[tokio::test]
async fn mutations_touch_only_user_fields() {
    let (store, cache) = store_and_cache();
    cache.bind(Some(user())).await.unwrap();
    cache.add(Category::Movie, &item(Category::Movie, 7, "Thief")).await.unwrap();
    eventually(|| cache.contains(Category::Movie, 7)).await;

    assert!(cache.mark_watched(Category::Movie, 7, Some(5), "loved it").await.unwrap());
    eventually(|| cache.find(Category::Movie, 7).is_some_and(|r| r.watched)).await;
    let record = cache.find(Category::Movie, 7).unwrap();
    assert_eq!(record.rating.map(|r| r.stars()), Some(5));
    assert_eq!(record.notes, "loved it");
    assert!(record.watched_at.is_some());
    assert_eq!(record.title, "Thief");

    assert!(cache.update_rating(Category::Movie, 7, Some(3), "rewatched").await.unwrap());
    eventually(|| cache.find(Category::Movie, 7).is_some_and(|r| r.notes == "rewatched")).await;
    assert!(cache.find(Category::Movie, 7).unwrap().watched);

    assert!(cache.unmark_watched(Category::Movie, 7).await.unwrap());
    eventually(|| cache.find(Category::Movie, 7).is_some_and(|r| !r.watched)).await;
    let record = cache.find(Category::Movie, 7).unwrap();
    assert_eq!(record.rating, None);
    assert_eq!(record.watched_at, None);
    assert_eq!(record.notes, "");

    let doc = store
        .document(&entity_collection(&user(), Category::Movie), "7")
        .unwrap();
    assert_eq!(doc["director"], "Michael Mann");
}

#[tokio::test]
async fn remove_deletes_after_echo() {
    let (_store, cache) = store_and_cache();
    cache.bind(Some(user())).await.unwrap();
    cache.add(Category::Tv, &item(Category::Tv, 3, "Patriot")).await.unwrap();
    eventually(|| cache.contains(Category::Tv, 3)).await;

    assert!(cache.remove(Category::Tv, 3).await.unwrap());
    eventually(|| !cache.contains(Category::Tv, 3)).await;
}

#[tokio::test]
async fn update_of_unknown_entity_is_missing() {
    let (_store, cache) = store_and_cache();
    cache.bind(Some(user())).await.unwrap();
    assert_matches!(
        cache.mark_watched(Category::Movie, 404, None, "").await,
        Err(CacheError::Missing { category: Category::Movie, id: 404 })
    );
}

#[tokio::test]
async fn offline_store_surfaces_remote_unavailable() {
    let (store, cache) = store_and_cache();
    cache.bind(Some(user())).await.unwrap();
    store.set_available(false);

    assert_matches!(
        cache.add(Category::Movie, &item(Category::Movie, 1, "A")).await,
        Err(CacheError::RemoteUnavailable(_))
    );
    assert_matches!(
        cache.remove(Category::Movie, 1).await,
        Err(CacheError::RemoteUnavailable(_))
    );
}

#[tokio::test]
async fn failed_bind_leaves_cache_signed_out() {
    let (store, cache) = store_and_cache();
    store.set_available(false);

    assert_matches!(
        cache.bind(Some(user())).await,
        Err(CacheError::RemoteUnavailable(_))
    );
    assert!(!cache.is_bound());
    store.set_available(true);
    for category in Category::ALL {
        assert_eq!(store.listener_count(&entity_collection(&user(), category)), 0);
    }
}

#[tokio::test]
async fn invalidation_hook_reports_changed_scope() {
    let (_store, cache) = store_and_cache();
    let scopes = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let scopes = scopes.clone();
        let calls = calls.clone();
        cache.on_invalidate(move |scope| {
            scopes.lock().unwrap().push(scope);
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }

    cache.bind(Some(user())).await.unwrap();
    // Clear + one initial snapshot per subscription.
    eventually(|| calls.load(Ordering::SeqCst) >= 4).await;

    cache.add(Category::Tv, &item(Category::Tv, 9, "Dark")).await.unwrap();
    let tv = CacheScope::Category(Category::Tv);
    eventually(|| scopes.lock().unwrap().iter().filter(|s| **s == tv).count() == 2).await;

    let scopes = scopes.lock().unwrap();
    assert_eq!(scopes[0], CacheScope::All);
    assert!(scopes.contains(&CacheScope::Category(Category::Movie)));
    assert!(scopes.contains(&CacheScope::TasteNotes));
    assert_eq!(scopes.last(), Some(&tv));
}

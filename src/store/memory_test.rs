use super::*;
use std::time::Duration;
use tokio::time::timeout;

const RECV_WINDOW: Duration = Duration::from_millis(500);

async fn recv_snapshot(rx: &mut StateUpdates) -> PresenterState {
    timeout(RECV_WINDOW, rx.recv())
        .await
        .expect("timed out waiting for snapshot")
        .expect("snapshot channel closed")
}

#[tokio::test]
async fn read_before_seed_is_not_found() {
    let store = MemoryStore::new();

    assert!(matches!(store.read().await, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn seeded_state_is_readable() {
    let store = MemoryStore::new().with_state(&PresenterState::new("apollo", 4));

    let state = store.read().await.expect("read");
    assert_eq!(state, PresenterState::new("apollo", 4));
}

#[tokio::test]
async fn list_decks_preserves_seed_order() {
    let store =
        MemoryStore::new().with_decks([DeckId::new("orion"), DeckId::new("apollo")]);

    let decks = store.list_decks().await.expect("list");
    let ids: Vec<&str> = decks.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["orion", "apollo"]);
}

#[tokio::test]
async fn update_merges_single_field() {
    let store = MemoryStore::new().with_state(&PresenterState::new("apollo", 4));

    store.update(StatePatch::page(9)).await.expect("update");

    let state = store.read().await.expect("read");
    assert_eq!(state, PresenterState::new("apollo", 9));
}

#[tokio::test]
async fn subscribe_delivers_current_snapshot_first() {
    let store = MemoryStore::new().with_state(&PresenterState::new("apollo", 2));

    let mut rx = store.subscribe().await;
    assert_eq!(recv_snapshot(&mut rx).await, PresenterState::new("apollo", 2));
}

#[tokio::test]
async fn subscribe_to_empty_store_delivers_nothing_until_seeded() {
    let store = MemoryStore::new();
    let mut rx = store.subscribe().await;

    // Partial document: still no snapshot.
    store.update(StatePatch::page(3)).await.expect("update");
    let quiet = timeout(Duration::from_millis(80), rx.recv()).await;
    assert!(quiet.is_err(), "expected no snapshot for a partial document");

    store.update(StatePatch::deck("apollo")).await.expect("update");
    assert_eq!(recv_snapshot(&mut rx).await, PresenterState::new("apollo", 3));
}

#[tokio::test]
async fn every_subscriber_hears_every_write_including_the_writer() {
    let store = MemoryStore::new().with_state(&PresenterState::new("apollo", 1));

    let mut first = store.subscribe().await;
    let mut second = store.subscribe().await;
    recv_snapshot(&mut first).await;
    recv_snapshot(&mut second).await;

    store.update(StatePatch::page(5)).await.expect("update");

    assert_eq!(recv_snapshot(&mut first).await.page, 5);
    assert_eq!(recv_snapshot(&mut second).await.page, 5);
}

#[tokio::test]
async fn unchanged_write_still_fans_out() {
    let store = MemoryStore::new().with_state(&PresenterState::new("apollo", 5));
    let mut rx = store.subscribe().await;
    recv_snapshot(&mut rx).await;

    store.update(StatePatch::page(5)).await.expect("update");

    assert_eq!(recv_snapshot(&mut rx).await.page, 5);
}

#[tokio::test]
async fn read_only_store_rejects_writes() {
    let store = MemoryStore::new().with_state(&PresenterState::new("apollo", 1));
    store.set_writable(false).await;

    let result = store.update(StatePatch::page(2)).await;
    assert!(matches!(result, Err(StoreError::PermissionDenied(_))));

    // Rejected write leaves the document untouched.
    assert_eq!(store.read().await.expect("read").page, 1);
    assert_eq!(store.write_count().await, 1);
}

#[tokio::test]
async fn dropped_subscriber_is_pruned_on_next_write() {
    let store = MemoryStore::new().with_state(&PresenterState::new("apollo", 1));

    let rx = store.subscribe().await;
    drop(rx);

    // Must not error or wedge on the dead channel.
    store.update(StatePatch::page(2)).await.expect("update");

    let mut live = store.subscribe().await;
    assert_eq!(recv_snapshot(&mut live).await.page, 2);
}

use std::sync::atomic::Ordering;

use super::*;
use crate::{
    local_store::MemoryStore,
    test_support::{product, RecordingStore, UnreadableStore},
};

async fn stored_value(store: &MemoryStore) -> Option<String> {
    store.get_item(SELECTED_PRODUCTS_KEY).await.expect("read")
}

#[tokio::test]
async fn starts_empty_without_stored_value() {
    let selection = SelectionStore::restore(Arc::new(MemoryStore::new()))
        .await
        .expect("restore");
    assert!(selection.is_empty());
}

#[tokio::test]
async fn toggle_twice_restores_set_and_storage() {
    let store = Arc::new(MemoryStore::new());
    let mut selection = SelectionStore::restore(store.clone()).await.expect("restore");
    selection
        .toggle(&product("Serum", "skincare"))
        .await
        .expect("seed");
    let before_set = selection.products().to_vec();
    let before_stored = stored_value(&store).await;

    let cleanser = product("Cleanser", "cleanser");
    assert_eq!(
        selection.toggle(&cleanser).await.expect("add"),
        ToggleOutcome::Added
    );
    assert!(selection.contains("Cleanser"));
    assert_eq!(
        selection.toggle(&cleanser).await.expect("remove"),
        ToggleOutcome::Removed
    );

    assert_eq!(selection.products(), before_set.as_slice());
    assert_eq!(stored_value(&store).await, before_stored);
}

#[tokio::test]
async fn toggle_matches_by_name() {
    let store = Arc::new(MemoryStore::new());
    let mut selection = SelectionStore::restore(store).await.expect("restore");
    selection
        .toggle(&product("Cleanser", "cleanser"))
        .await
        .expect("add");

    let mut same_name = product("Cleanser", "cleanser");
    same_name.brand = "Other".into();
    assert_eq!(
        selection.toggle(&same_name).await.expect("toggle"),
        ToggleOutcome::Removed
    );
    assert!(selection.is_empty());
}

#[tokio::test]
async fn every_mutation_is_written_through() {
    let store = Arc::new(MemoryStore::new());
    let mut selection = SelectionStore::restore(store.clone()).await.expect("restore");
    selection.toggle(&product("A", "c")).await.expect("a");
    selection.toggle(&product("B", "c")).await.expect("b");

    let stored: Vec<Product> =
        serde_json::from_str(&stored_value(&store).await.expect("stored")).expect("json");
    assert_eq!(stored, selection.products());

    let reopened = SelectionStore::restore(store).await.expect("reopen");
    let names: Vec<&str> = reopened.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
async fn remove_at_uses_display_order() {
    let store = Arc::new(MemoryStore::new());
    let mut selection = SelectionStore::restore(store).await.expect("restore");
    for name in ["A", "B", "C"] {
        selection.toggle(&product(name, "c")).await.expect("add");
    }

    let removed = selection.remove_at(1).await.expect("remove");
    assert_eq!(removed.map(|p| p.name).as_deref(), Some("B"));
    let names: Vec<&str> = selection.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
}

#[tokio::test]
async fn remove_at_out_of_range_writes_nothing() {
    let store = RecordingStore::holding(r#"[{"name":"A","brand":"b","category":"c","image":"i"}]"#);
    let mut selection = SelectionStore::restore(store.clone()).await.expect("restore");

    assert_eq!(selection.remove_at(5).await.expect("no-op"), None);
    assert_eq!(selection.products().len(), 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn clear_all_declined_leaves_everything() {
    let store = Arc::new(MemoryStore::new());
    let mut selection = SelectionStore::restore(store.clone()).await.expect("restore");
    selection.toggle(&product("A", "c")).await.expect("add");
    let stored_before = stored_value(&store).await;

    let asked = std::cell::Cell::new(None);
    let cleared = selection
        .clear_all(&|message: &str| {
            asked.set(Some(message.to_string()));
            false
        })
        .await
        .expect("clear");

    assert!(!cleared);
    assert_eq!(selection.products().len(), 1);
    assert_eq!(stored_value(&store).await, stored_before);
    assert_eq!(asked.take().as_deref(), Some(CLEAR_ALL_CONFIRMATION));
}

#[tokio::test]
async fn clear_all_confirmed_empties_set_and_storage() {
    let store = Arc::new(MemoryStore::new());
    let mut selection = SelectionStore::restore(store.clone()).await.expect("restore");
    selection.toggle(&product("A", "c")).await.expect("add");
    selection.toggle(&product("B", "c")).await.expect("add");

    assert!(selection.clear_all(&|_: &str| true).await.expect("clear"));
    assert!(selection.is_empty());
    assert_eq!(stored_value(&store).await.as_deref(), Some("[]"));
}

#[tokio::test]
async fn malformed_stored_value_restores_empty() {
    let store = Arc::new(MemoryStore::with_item(SELECTED_PRODUCTS_KEY, "{not json"));
    let selection = SelectionStore::restore(store).await.expect("restore");
    assert!(selection.is_empty());
}

#[tokio::test]
async fn restore_drops_repeated_names() {
    let raw = r#"[
        {"name":"A","brand":"first","category":"c","image":"i"},
        {"name":"A","brand":"second","category":"c","image":"i"},
        {"name":"B","brand":"b","category":"c","image":"i"}
    ]"#;
    let store = Arc::new(MemoryStore::with_item(SELECTED_PRODUCTS_KEY, raw));
    let selection = SelectionStore::restore(store).await.expect("restore");

    assert_eq!(selection.products().len(), 2);
    assert_eq!(selection.products()[0].brand, "first");
}

#[tokio::test]
async fn unreadable_store_fails_restore() {
    let err = SelectionStore::restore(Arc::new(UnreadableStore))
        .await
        .err()
        .expect("restore should fail");
    assert!(matches!(err, ClientError::Storage(_)));
}

#[tokio::test]
async fn failed_write_keeps_previous_selection() {
    let store = RecordingStore::failing_writes();
    let mut selection = SelectionStore::restore(store).await.expect("restore");

    let err = selection
        .toggle(&product("A", "c"))
        .await
        .expect_err("write fails");
    assert!(matches!(err, ClientError::Storage(_)));
    assert!(selection.is_empty());
}

#[tokio::test]
async fn sqlite_storage_backs_the_selection() {
    let storage = Arc::new(storage::Storage::in_memory().await.expect("db"));
    let mut selection = SelectionStore::restore(storage.clone()).await.expect("restore");
    selection
        .toggle(&product("Cleanser", "cleanser"))
        .await
        .expect("add");

    let raw = storage
        .get_item(SELECTED_PRODUCTS_KEY)
        .await
        .expect("read")
        .expect("stored");
    assert!(raw.contains("\"Cleanser\""));
}

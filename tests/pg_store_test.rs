//! PostgreSQL message store tests
//!
//! Skipped unless `TEST_DATABASE_URL` points at a reachable database.

mod common;

use capsule_relay::backend::messaging::MessageStore;
use capsule_relay::shared::MessageKind;
use common::*;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_history_equals_receipts_in_order() {
    let Some(db) = TestDatabase::from_env().await else {
        return;
    };
    let store = db.store();
    let alice = unique_identity("alice");
    let bob = unique_identity("bob");

    let mut receipts = Vec::new();
    for i in 0..6 {
        let (from, to) = if i % 2 == 0 { (&alice, &bob) } else { (&bob, &alice) };
        receipts.push(
            store
                .save(from, to, &format!("msg {i}"), MessageKind::Text, None)
                .await
                .unwrap(),
        );
    }

    let history = store.messages_between(&alice, &bob).await.unwrap();
    assert_eq!(history, receipts);

    let reversed = store.messages_between(&bob, &alice).await.unwrap();
    assert_eq!(reversed, receipts);
}

#[tokio::test]
async fn test_save_maps_every_column() {
    let Some(db) = TestDatabase::from_env().await else {
        return;
    };
    let store = db.store();
    let sender = unique_identity("sender");
    let receiver = unique_identity("receiver");

    let saved = store
        .save(&sender, &receiver, "", MessageKind::Image, Some("/uploads/cat.png"))
        .await
        .unwrap();

    assert_eq!(saved.sender_id, sender);
    assert_eq!(saved.receiver_id, receiver);
    assert_eq!(saved.content, "");
    assert_eq!(saved.kind, MessageKind::Image);
    assert_eq!(saved.file_url.as_deref(), Some("/uploads/cat.png"));
    assert_eq!(saved.id.len(), 36);
    assert_eq!(saved.created_at.timestamp_subsec_nanos() % 1_000, 0);
}

#[tokio::test]
async fn test_long_identities_are_stored() {
    let Some(db) = TestDatabase::from_env().await else {
        return;
    };
    let store = db.store();
    let sender = unique_identity(&"s".repeat(200));
    let receiver = unique_identity(&"r".repeat(200));

    let saved = store
        .save(&sender, &receiver, "hi", MessageKind::Text, None)
        .await
        .unwrap();

    let history = store.messages_between(&sender, &receiver).await.unwrap();
    assert_eq!(history, vec![saved]);
}

#[tokio::test]
async fn test_other_conversations_are_excluded() {
    let Some(db) = TestDatabase::from_env().await else {
        return;
    };
    let store = db.store();
    let alice = unique_identity("alice");
    let bob = unique_identity("bob");
    let carol = unique_identity("carol");

    let kept = store.save(&alice, &bob, "for bob", MessageKind::Text, None).await.unwrap();
    store.save(&alice, &carol, "for carol", MessageKind::Text, None).await.unwrap();

    assert_eq!(store.messages_between(&alice, &bob).await.unwrap(), vec![kept]);
    assert!(store.messages_between(&bob, &carol).await.unwrap().is_empty());
}

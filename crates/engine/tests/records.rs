use std::collections::HashSet;

use api_types::record::{Record, RecordNew, RecordPatch, RecordType};
use engine::{EngineError, RecordStore, demo_seed};

fn new_record(title: &str, amount: i64, kind: RecordType) -> RecordNew {
    RecordNew {
        title: title.to_string(),
        amount,
        kind,
        created_at: Some("2026-01-05T09:30:00Z".parse().unwrap()),
        due_date: None,
        notes: Some("note".to_string()),
    }
}

fn seeded_store() -> RecordStore {
    RecordStore::builder().seed(demo_seed()).build().unwrap()
}

#[tokio::test]
async fn created_ids_never_collide_with_existing_ones() {
    let store = seeded_store();
    let mut ids: HashSet<String> = store.list().await.into_iter().map(|r| r.id).collect();

    for i in 0..50 {
        let record = store
            .create(new_record(&format!("r{i}"), i, RecordType::Expense))
            .await
            .unwrap();
        assert!(ids.insert(record.id), "duplicate id generated");
    }
}

#[tokio::test]
async fn create_appends_exactly_once() {
    let store = seeded_store();
    let before = store.list().await;

    let created = store
        .create(new_record("Bonus", 1_000, RecordType::Income))
        .await
        .unwrap();

    let after = store.list().await;
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.last(), Some(&created));
    assert_eq!(after.iter().filter(|r| r.id == created.id).count(), 1);
}

#[tokio::test]
async fn round_trip_returns_input_plus_id() {
    let store = RecordStore::default();
    let input = new_record("Salary", 60_000, RecordType::Income);

    let created = store.create(input.clone()).await.unwrap();
    let found = store
        .list()
        .await
        .into_iter()
        .find(|r| r.id == created.id)
        .unwrap();

    assert_eq!(
        found,
        Record {
            id: created.id.clone(),
            title: input.title,
            amount: input.amount,
            kind: input.kind,
            created_at: input.created_at.unwrap(),
            due_date: input.due_date,
            notes: input.notes,
        }
    );
}

#[tokio::test]
async fn update_changes_only_the_patched_field() {
    let store = seeded_store();
    let target = store.list().await[1].clone();

    let updated = store
        .update(
            &target.id,
            RecordPatch {
                amount: Some(16_000),
                ..RecordPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        updated,
        Record {
            amount: 16_000,
            ..target.clone()
        }
    );
    let listed = store.list().await;
    assert_eq!(listed[1], updated);
}

#[tokio::test]
async fn update_unknown_id_is_not_found_and_changes_nothing() {
    let store = seeded_store();
    let before = store.list().await;

    let err = store
        .update(
            "missing",
            RecordPatch {
                title: Some("x".to_string()),
                ..RecordPatch::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("missing".to_string()));
    assert_eq!(store.list().await, before);
}

#[tokio::test]
async fn delete_removes_every_match_and_is_idempotent() {
    let store = seeded_store();
    let target = store.list().await[0].id.clone();

    assert_eq!(store.delete(&target).await, 1);
    let after_first = store.list().await;
    assert!(after_first.iter().all(|r| r.id != target));

    assert_eq!(store.delete(&target).await, 0);
    assert_eq!(store.list().await, after_first);
}

#[tokio::test]
async fn concurrent_creates_are_all_kept() {
    let store = RecordStore::default();
    let created = store
        .create(new_record("Counter", 0, RecordType::Income))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create(new_record(&format!("c{i}"), i, RecordType::Expense))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let records = store.list().await;
    assert_eq!(records.len(), 21);
    assert_eq!(records[0].id, created.id);
}

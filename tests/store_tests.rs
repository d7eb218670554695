use anyhow::Result;
use serde_json::json;
use uuid::Uuid;

use nitrocup_core::mirror::Mirror;
use nitrocup_core::model::{ParticipantStatus, UNRANKED};
use nitrocup_core::store::{
    Collection, DocumentStore, MemoryStore, StoreError, WriteBatch,
};

#[tokio::test]
async fn updates_merge_top_level_keys() -> Result<()> {
    let store = MemoryStore::new();
    let id = store
        .add(
            Collection::Teams,
            json!({ "name": "Night Shift", "members": [] }),
        )
        .await?;

    store
        .update(Collection::Teams, id, json!({ "logo_url": "https://img.example/x.png" }))
        .await?;

    let docs = store.snapshot(Collection::Teams).await?;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].body["name"], "Night Shift");
    assert_eq!(docs[0].body["logo_url"], "https://img.example/x.png");
    Ok(())
}

#[tokio::test]
async fn a_stale_revision_guard_fails_the_whole_batch() -> Result<()> {
    let store = MemoryStore::new();
    let id = store
        .add(Collection::Teams, json!({ "name": "Night Shift", "members": [] }))
        .await?;
    let stale_rev = store.snapshot(Collection::Teams).await?[0].rev;

    // Someone else wins the race.
    store
        .update(Collection::Teams, id, json!({ "members": ["other"] }))
        .await?;

    let mut batch = WriteBatch::new();
    batch.guard_revision(Collection::Teams, id, stale_rev);
    batch.update(Collection::Teams, id, json!({ "members": ["mine"] }));
    let err = store.apply_batch(batch).await.unwrap_err();

    assert!(matches!(err, StoreError::RevisionMismatch { .. }));
    let docs = store.snapshot(Collection::Teams).await?;
    assert_eq!(docs[0].body["members"], json!(["other"]));
    Ok(())
}

#[tokio::test]
async fn a_failing_op_aborts_the_batch_before_any_write() -> Result<()> {
    let store = MemoryStore::new();
    let id = store
        .add(Collection::Participants, json!({ "name": "Apex" }))
        .await?;

    let mut batch = WriteBatch::new();
    batch.update(Collection::Participants, id, json!({ "name": "Renamed" }));
    batch.delete(Collection::Teams, Uuid::new_v4()); // no such document
    let err = store.apply_batch(batch).await.unwrap_err();

    assert!(matches!(err, StoreError::NotFound { .. }));
    let docs = store.snapshot(Collection::Participants).await?;
    assert_eq!(docs[0].body["name"], "Apex");
    Ok(())
}

#[tokio::test]
async fn adding_an_existing_id_is_refused() -> Result<()> {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    let mut batch = WriteBatch::new();
    batch.add(Collection::Teams, id, json!({ "name": "One" }));
    store.apply_batch(batch).await?;

    let mut batch = WriteBatch::new();
    batch.add(Collection::Teams, id, json!({ "name": "Two" }));
    let err = store.apply_batch(batch).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
    Ok(())
}

#[tokio::test]
async fn the_mirror_decodes_legacy_documents_leniently() -> Result<()> {
    let store = MemoryStore::new();
    // Written by an older organizer revision: string rating, odd status.
    store
        .add(
            Collection::Participants,
            json!({
                "name": "Apex",
                "tag": "apex",
                "owner": "a@example.com",
                "rating": "N/A",
                "status": "Свободен",
                "created_at": "2026-08-01T12:00:00Z",
            }),
        )
        .await?;

    // Attaching later still receives the initial snapshot.
    let mirror = Mirror::attach(&store);
    let participants = mirror.participants();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].rating, 0);
    assert_eq!(participants[0].rank, UNRANKED);
    assert_eq!(participants[0].status, ParticipantStatus::SeekingTeam);
    Ok(())
}

#[tokio::test]
async fn pushes_replace_the_mirrored_snapshot() -> Result<()> {
    let store = MemoryStore::new();
    let mirror = Mirror::attach(&store);
    assert!(mirror.participants().is_empty());

    let id = store
        .add(
            Collection::Participants,
            json!({
                "name": "Apex",
                "tag": "apex",
                "owner": "a@example.com",
                "created_at": "2026-08-01T12:00:00Z",
            }),
        )
        .await?;
    assert_eq!(mirror.participants().len(), 1);

    store.delete(Collection::Participants, id).await?;
    assert!(mirror.participants().is_empty());
    Ok(())
}

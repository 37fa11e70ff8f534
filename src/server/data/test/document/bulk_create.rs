use super::*;

/// Tests inserting more records than fit in one INSERT statement.
///
/// Expected: Ok with every record stored
#[tokio::test]
async fn inserts_records_across_chunks() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let records: Vec<_> = (0..250)
        .map(|i| json!({ "_id": format!("tr-{:03}", i), "tenant": "tenant-a", "text": i }))
        .collect();

    let repo = DocumentRepository::new(db);
    let inserted = repo
        .bulk_create("tenant-a", "translations", &records)
        .await?;

    assert_eq!(inserted, 250);
    let stored = repo.find_all_by_tenant("tenant-a", "translations").await?;
    assert_eq!(stored.len(), 250);
    assert_eq!(stored[0].id, "tr-000");

    Ok(())
}

/// Tests inserting an empty batch.
///
/// Expected: Ok(0) without touching the database
#[tokio::test]
async fn inserts_nothing_for_empty_batch() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = DocumentRepository::new(db);
    let inserted = repo.bulk_create("tenant-a", "nodes", &[]).await?;

    assert_eq!(inserted, 0);

    Ok(())
}

/// Tests a batch containing a record without id.
///
/// Verifies that validation happens before any row is written.
///
/// Expected: Err(DbErr::Custom) and no rows stored
#[tokio::test]
async fn rejects_batch_with_missing_id() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let records = vec![json!({ "_id": "n-1" }), json!({ "name": "orphan" })];

    let repo = DocumentRepository::new(db);
    let result = repo.bulk_create("tenant-a", "nodes", &records).await;

    assert!(matches!(result, Err(DbErr::Custom(_))));
    assert_eq!(entity::prelude::Document::find().count(db).await?, 0);

    Ok(())
}

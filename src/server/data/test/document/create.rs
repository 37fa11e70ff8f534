use super::*;

/// Tests creating a single document.
///
/// Verifies that the id is taken from `_id` and the row is owned by the given tenant.
///
/// Expected: Ok with stored document
#[tokio::test]
async fn creates_document_from_record() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = DocumentRepository::new(db);
    let document = repo
        .create(
            "tenant-a",
            "currencies",
            json!({ "_id": "eur", "tenant": "tenant-a", "symbol": "€" }),
        )
        .await?;

    assert_eq!(document.id, "eur");
    assert_eq!(document.tenant, "tenant-a");
    assert_eq!(document.collection, "currencies");
    assert_eq!(document.body["symbol"], "€");

    Ok(())
}

/// Tests creating a document without an identifier.
///
/// Expected: Err(DbErr::Custom)
#[tokio::test]
async fn fails_for_record_without_id() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = DocumentRepository::new(db);
    let result = repo
        .create("tenant-a", "currencies", json!({ "symbol": "$" }))
        .await;

    assert!(matches!(result, Err(DbErr::Custom(_))));

    Ok(())
}

/// Tests creating a document whose id already exists for the tenant.
///
/// Expected: Err from the primary key constraint
#[tokio::test]
async fn fails_for_duplicate_id() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = DocumentRepository::new(db);
    repo.create("tenant-a", "tags", json!({ "_id": "t-1" })).await?;

    let result = repo.create("tenant-a", "tags", json!({ "_id": "t-1" })).await;
    assert!(result.is_err());

    Ok(())
}

/// Tests that the same id may exist for two tenants.
///
/// Restoring one tenant's backup under another tenant relies on this.
///
/// Expected: Ok for both inserts
#[tokio::test]
async fn allows_same_id_for_different_tenants() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = DocumentRepository::new(db);
    repo.create("tenant-a", "tags", json!({ "_id": "t-1" })).await?;
    repo.create("tenant-b", "tags", json!({ "_id": "t-1" })).await?;

    assert_eq!(entity::prelude::Document::find().count(db).await?, 2);

    Ok(())
}

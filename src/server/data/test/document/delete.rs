use super::*;

/// Tests deleting a whole collection of one tenant.
///
/// Verifies that other collections and other tenants are untouched.
///
/// Expected: Ok with 2 rows deleted
#[tokio::test]
async fn deletes_all_documents_of_tenant_collection() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_document(db, "tenant-a", "ads").await?;
    factory::create_document(db, "tenant-a", "ads").await?;
    factory::create_document(db, "tenant-a", "themes").await?;
    factory::create_document(db, "tenant-b", "ads").await?;

    let repo = DocumentRepository::new(db);
    let deleted = repo.delete_all_by_tenant("tenant-a", "ads").await?;

    assert_eq!(deleted, 2);
    assert!(repo.find_all_by_tenant("tenant-a", "ads").await?.is_empty());
    assert_eq!(repo.find_all_by_tenant("tenant-a", "themes").await?.len(), 1);
    assert_eq!(repo.find_all_by_tenant("tenant-b", "ads").await?.len(), 1);

    Ok(())
}

/// Tests deleting one document by id.
///
/// Expected: Ok(true) for the owner, Ok(false) for another tenant
#[tokio::test]
async fn deletes_by_id_only_within_tenant() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::document::DocumentFactory::new(db, "tenant-a", "checks")
        .id("c-1")
        .build()
        .await?;

    let repo = DocumentRepository::new(db);

    assert!(!repo.delete_by_id("tenant-b", "checks", "c-1").await?);
    assert!(repo.delete_by_id("tenant-a", "checks", "c-1").await?);
    assert!(repo.find_by_id("tenant-a", "checks", "c-1").await?.is_none());

    Ok(())
}

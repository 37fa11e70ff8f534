use super::*;

/// Tests reading a tenant's collection.
///
/// Verifies that only documents of the requested tenant and collection are returned,
/// ordered by id.
///
/// Expected: Ok with the tenant's two products in id order
#[tokio::test]
async fn finds_all_documents_of_tenant_collection() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::document::DocumentFactory::new(db, "tenant-a", "products")
        .id("p-2")
        .build()
        .await?;
    factory::document::DocumentFactory::new(db, "tenant-a", "products")
        .id("p-1")
        .build()
        .await?;
    factory::create_document(db, "tenant-a", "tags").await?;
    factory::create_document(db, "tenant-b", "products").await?;

    let repo = DocumentRepository::new(db);
    let documents = repo.find_all_by_tenant("tenant-a", "products").await?;

    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["p-1", "p-2"]);
    assert!(documents.iter().all(|d| d.tenant == "tenant-a"));

    Ok(())
}

/// Tests reading a collection the tenant never wrote to.
///
/// Expected: Ok with empty vector
#[tokio::test]
async fn returns_empty_for_unknown_collection() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = DocumentRepository::new(db);
    let documents = repo.find_all_by_tenant("tenant-a", "currencies").await?;

    assert!(documents.is_empty());

    Ok(())
}

/// Tests finding a document by id scoped to its tenant.
///
/// Verifies that the same id under another tenant is not visible.
///
/// Expected: Ok(Some) for the owner, Ok(None) for another tenant
#[tokio::test]
async fn finds_by_id_only_within_tenant() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::document::DocumentFactory::new(db, "tenant-a", "stores")
        .id("s-1")
        .field("city", "Lyon")
        .build()
        .await?;

    let repo = DocumentRepository::new(db);

    let found = repo.find_by_id("tenant-a", "stores", "s-1").await?;
    assert_eq!(found.unwrap().body["city"], "Lyon");

    let other = repo.find_by_id("tenant-b", "stores", "s-1").await?;
    assert!(other.is_none());

    Ok(())
}

use super::*;

/// Tests reading a counter that was never bumped.
///
/// Verifies that the implicit version 0 is returned and no row is created.
///
/// Expected: Ok with version 0 and no stored rows
#[tokio::test]
async fn returns_version_zero_without_creating_row() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = EntityRefRepository::new(db);
    let entity_ref = repo.get("tenant-a", "products").await?;

    assert_eq!(entity_ref.version, 0);
    assert!(entity_ref.last_update.is_none());
    assert_eq!(entity::prelude::EntityRef::find().count(db).await?, 0);

    Ok(())
}

/// Tests reading a stored counter.
///
/// Expected: Ok with stored version
#[tokio::test]
async fn returns_stored_version() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::entity_ref::EntityRefFactory::new(db, "tenant-a", "products")
        .version(7)
        .build()
        .await?;

    let repo = EntityRefRepository::new(db);
    let entity_ref = repo.get("tenant-a", "products").await?;

    assert_eq!(entity_ref.version, 7);
    assert!(entity_ref.last_update.is_some());

    // Same name for another tenant is independent
    assert_eq!(repo.get("tenant-b", "products").await?.version, 0);

    Ok(())
}

/// Tests listing every counter of a tenant.
///
/// Expected: Ok with the tenant's refs ordered by name
#[tokio::test]
async fn lists_refs_of_tenant_by_name() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_entity_ref(db, "tenant-a", "tags").await?;
    factory::create_entity_ref(db, "tenant-a", "ads").await?;
    factory::create_entity_ref(db, "tenant-b", "nodes").await?;

    let repo = EntityRefRepository::new(db);
    let refs = repo.list("tenant-a").await?;

    let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ads", "tags"]);

    Ok(())
}

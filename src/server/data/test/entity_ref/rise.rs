use super::*;

/// Tests the first increment of an absent counter.
///
/// Expected: Ok with version 1
#[tokio::test]
async fn creates_counter_at_version_one() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = EntityRefRepository::new(db);
    let entity_ref = repo.rise("tenant-a", "themes").await?;

    assert_eq!(entity_ref.version, 1);
    assert!(entity_ref.last_update.is_some());
    assert_eq!(repo.get("tenant-a", "themes").await?.version, 1);

    Ok(())
}

/// Tests sequential increments.
///
/// Expected: Ok with version N after N increments
#[tokio::test]
async fn increments_sequentially() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = EntityRefRepository::new(db);
    for expected in 1..=5 {
        assert_eq!(repo.rise("tenant-a", "products").await?.version, expected);
    }

    assert_eq!(repo.get("tenant-a", "products").await?.version, 5);

    Ok(())
}

/// Tests concurrent increments of one counter.
///
/// Verifies that the atomic upsert never loses an increment.
///
/// Expected: Ok with final version equal to the number of calls and distinct results
#[tokio::test]
async fn concurrent_increments_are_not_lost() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = EntityRefRepository::new(db);
    let results =
        futures::future::try_join_all((0..20).map(|_| repo.rise("tenant-a", "orderTypes")))
            .await?;

    let mut versions: Vec<i64> = results.iter().map(|r| r.version).collect();
    versions.sort_unstable();
    assert_eq!(versions, (1..=20).collect::<Vec<i64>>());
    assert_eq!(repo.get("tenant-a", "orderTypes").await?.version, 20);
    assert_eq!(entity::prelude::EntityRef::find().count(db).await?, 1);

    Ok(())
}

/// Tests that increments are scoped to tenant and name.
///
/// Expected: Ok with independent counters
#[tokio::test]
async fn keeps_counters_independent() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_backup_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::entity_ref::EntityRefFactory::new(db, "tenant-b", "tags")
        .version(10)
        .build()
        .await?;

    let repo = EntityRefRepository::new(db);
    repo.rise("tenant-a", "tags").await?;
    repo.rise("tenant-a", "tags").await?;
    repo.rise("tenant-a", "nodes").await?;

    assert_eq!(repo.get("tenant-a", "tags").await?.version, 2);
    assert_eq!(repo.get("tenant-a", "nodes").await?.version, 1);
    assert_eq!(repo.get("tenant-b", "tags").await?.version, 10);

    Ok(())
}

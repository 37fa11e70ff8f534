//! Shared helper utilities for factory methods.

use sea_orm::{DatabaseConnection, DbErr};

use crate::factory::document::DocumentFactory;

/// Counter for generating unique IDs in tests.
static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Gets the next unique counter value for test data.
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Seeds a small but representative dataset for one tenant.
///
/// Creates:
/// 1. Two ads, each referencing an asset path under `assets/<tenant>/`
/// 2. One theme
/// 3. Two products
/// 4. One employee
///
/// # Arguments
/// - `db` - Database connection
/// - `tenant` - Tenant owning every created document
///
/// # Returns
/// - `Ok(Vec<entity::document::Model>)` - All created documents in creation order
/// - `Err(DbErr)` - Database error during creation
pub async fn seed_tenant(
    db: &DatabaseConnection,
    tenant: &str,
) -> Result<Vec<entity::document::Model>, DbErr> {
    let mut documents = Vec::new();

    for name in ["banner.png", "promo.jpg"] {
        documents.push(
            DocumentFactory::new(db, tenant, "ads")
                .field("image", format!("assets/{}/ads/{}", tenant, name))
                .build()
                .await?,
        );
    }

    documents.push(
        DocumentFactory::new(db, tenant, "themes")
            .field("primaryColor", "#ff6600")
            .build()
            .await?,
    );

    for price in [450, 990] {
        documents.push(
            DocumentFactory::new(db, tenant, "products")
                .field("price", price)
                .build()
                .await?,
        );
    }

    documents.push(
        DocumentFactory::new(db, tenant, "employees")
            .field("pin", "0000")
            .build()
            .await?,
    );

    Ok(documents)
}

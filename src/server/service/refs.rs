use futures::future::try_join_all;
use sea_orm::{DatabaseConnection, DbErr};

use crate::server::{
    data::entity_ref::EntityRefRepository, error::AppError, model::entity_ref::EntityRef,
    model::tenant::TenantId,
};

pub struct RefService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RefService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the version of one collection, 0 when it never changed
    pub async fn get(&self, tenant: &TenantId, name: &str) -> Result<EntityRef, AppError> {
        let repo = EntityRefRepository::new(self.db);

        Ok(repo.get(tenant.as_str(), name).await?)
    }

    /// Gets every stored version of a tenant
    pub async fn list(&self, tenant: &TenantId) -> Result<Vec<EntityRef>, AppError> {
        let repo = EntityRefRepository::new(self.db);

        Ok(repo.list(tenant.as_str()).await?)
    }

    /// Increments the versions of several collections concurrently.
    ///
    /// Returns the raw database error so callers can attach their own context. The first
    /// failing increment aborts the others.
    pub async fn rise_many(&self, tenant: &TenantId, names: &[&str]) -> Result<Vec<EntityRef>, DbErr> {
        let repo = EntityRefRepository::new(self.db);

        try_join_all(names.iter().map(|name| repo.rise(tenant.as_str(), name))).await
    }
}

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntityRef::Table)
                    .if_not_exists()
                    .col(string(EntityRef::Tenant))
                    .col(string(EntityRef::Name))
                    .col(big_integer(EntityRef::Version).default(1))
                    .col(
                        timestamp_with_time_zone(EntityRef::LastUpdate)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EntityRef::Tenant)
                            .col(EntityRef::Name),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntityRef::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum EntityRef {
    Table,
    Tenant,
    Name,
    Version,
    LastUpdate,
}

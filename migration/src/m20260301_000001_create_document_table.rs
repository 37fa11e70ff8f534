use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Document::Table)
                    .if_not_exists()
                    .col(string(Document::Tenant))
                    .col(string(Document::Collection))
                    .col(string(Document::Id))
                    .col(json(Document::Body))
                    .primary_key(
                        Index::create()
                            .col(Document::Tenant)
                            .col(Document::Collection)
                            .col(Document::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Document::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Document {
    Table,
    Tenant,
    Collection,
    Id,
    Body,
}

//! Indexes backing the per-link analytics queries.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visits_link_id")
                    .table(Visit::Table)
                    .col(Visit::LinkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visits_link_id_visited_at")
                    .table(Visit::Table)
                    .col(Visit::LinkId)
                    .col(Visit::VisitedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_visits_link_id_visited_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_visits_link_id").to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Visit {
    #[sea_orm(iden = "visits")]
    Table,
    LinkId,
    VisitedAt,
}

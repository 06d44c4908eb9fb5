use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Account::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Account::Name).string().not_null())
                    .col(ColumnDef::new(Account::Email).string().not_null())
                    .col(ColumnDef::new(Account::PasswordHash).string().null())
                    .col(ColumnDef::new(Account::ExternalId).string().null())
                    .col(ColumnDef::new(Account::Avatar).text().null())
                    .col(ColumnDef::new(Account::Provider).string().not_null())
                    .col(
                        ColumnDef::new(Account::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Account::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uidx_accounts_email")
                    .table(Account::Table)
                    .col(Account::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_accounts_external_id")
                    .table(Account::Table)
                    .col(Account::ExternalId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Link::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Link::Alias).string().not_null())
                    .col(ColumnDef::new(Link::TargetUrl).text().not_null())
                    .col(
                        ColumnDef::new(Link::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Link::OwnerId).string().null())
                    .col(ColumnDef::new(Link::QrCode).text().null())
                    .col(
                        ColumnDef::new(Link::QrGenerated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Link::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Link::ActiveFrom)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::IsExpired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Link::PasswordHash).string().null())
                    .col(
                        ColumnDef::new(Link::IsPasswordProtected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Link::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The unique index is the authoritative arbiter for alias collisions.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uidx_links_alias")
                    .table(Link::Table)
                    .col(Link::Alias)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_owner_id")
                    .table(Link::Table)
                    .col(Link::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_expires_at")
                    .table(Link::Table)
                    .col(Link::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Visit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Visit::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Visit::LinkId).string().not_null())
                    .col(ColumnDef::new(Visit::Address).string().null())
                    .col(ColumnDef::new(Visit::Device).string().not_null())
                    .col(
                        ColumnDef::new(Visit::VisitedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Visit::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_links_expires_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_links_owner_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uidx_links_alias").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_accounts_external_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uidx_accounts_email").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Account {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    ExternalId,
    Avatar,
    Provider,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Link {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    Alias,
    TargetUrl,
    ClickCount,
    OwnerId,
    QrCode,
    QrGenerated,
    ExpiresAt,
    ActiveFrom,
    IsExpired,
    PasswordHash,
    IsPasswordProtected,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Visit {
    #[sea_orm(iden = "visits")]
    Table,
    Id,
    LinkId,
    Address,
    Device,
    VisitedAt,
}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub alias: String,
    #[sea_orm(column_type = "Text")]
    pub target_url: String,
    pub click_count: i64,
    pub owner_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub qr_code: Option<String>,
    pub qr_generated: bool,
    pub expires_at: Option<DateTimeUtc>,
    pub active_from: DateTimeUtc,
    /// Cached derived fact, set lazily once the link is observed past expiry.
    pub is_expired: bool,
    pub password_hash: Option<String>,
    pub is_password_protected: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

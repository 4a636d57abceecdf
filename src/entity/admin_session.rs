//! Server-side admin sessions. Only the SHA-256 hash of the cookie token is stored.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub admin_id: i32,
    #[sea_orm(unique)]
    pub token_hash: String,
    pub csrf_token: String,
    pub ip_address: Option<String>,
    pub expires_at: DateTimeUtc,
    pub revoked_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::administrateur::Entity",
        from = "Column::AdminId",
        to = "super::administrateur::Column::Id",
        on_delete = "Cascade"
    )]
    Administrateur,
}

impl Related<super::administrateur::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Administrateur.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

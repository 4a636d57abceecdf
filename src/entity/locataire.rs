//! Tenants signing a lease, one row per signer.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "locataires")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub contrat_id: i32,
    pub ordre: i32,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: Option<Date>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub signature_data: Option<String>,
    pub signature_timestamp: Option<DateTimeUtc>,
    pub signature_ip: Option<String>,
    pub mention_lu_approuve: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contrat::Entity",
        from = "Column::ContratId",
        to = "super::contrat::Column::Id",
        on_delete = "Cascade"
    )]
    Contrat,
}

impl Related<super::contrat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contrat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

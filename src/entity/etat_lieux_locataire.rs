//! Per-tenant signature rows of an état des lieux.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "etat_lieux_locataires")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub etat_lieux_id: i32,
    pub locataire_id: Option<i32>,
    pub ordre: i32,
    pub nom: String,
    pub prenom: String,
    pub email: Option<String>,
    pub signature_data: Option<String>,
    pub signature_timestamp: Option<DateTimeUtc>,
    pub signature_ip: Option<String>,
    pub certifie_exact: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::etat_lieux::Entity",
        from = "Column::EtatLieuxId",
        to = "super::etat_lieux::Column::Id",
        on_delete = "Cascade"
    )]
    EtatLieux,
}

impl Related<super::etat_lieux::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EtatLieux.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

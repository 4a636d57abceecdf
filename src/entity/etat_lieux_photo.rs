//! Categorized photos attached to an état des lieux.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "etat_lieux_photos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub etat_lieux_id: i32,
    pub categorie: String,
    pub nom_fichier: String,
    pub chemin_fichier: String,
    pub description: Option<String>,
    pub ordre: i32,
    pub uploaded_at: DateTimeUtc,
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

//! Supporting documents attached to a candidature.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "candidature_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub candidature_id: i32,
    pub type_document: String,
    pub nom_fichier: String,
    pub nom_original: String,
    pub chemin_fichier: String,
    pub taille: i64,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::candidature::Entity",
        from = "Column::CandidatureId",
        to = "super::candidature::Column::Id",
        on_delete = "Cascade"
    )]
    Candidature,
}

impl Related<super::candidature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidature.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

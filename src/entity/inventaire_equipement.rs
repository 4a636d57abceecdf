//! Equipment items of a logement's furnished inventory (soft-deleted via `deleted_at`).

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "inventaire_equipements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub logement_id: i32,
    pub categorie_id: Option<i32>,
    pub sous_categorie_id: Option<i32>,
    pub nom: String,
    pub description: Option<String>,
    pub quantite: i32,
    pub valeur_estimee: Option<f64>,
    pub ordre: i32,
    pub deleted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::logement::Entity",
        from = "Column::LogementId",
        to = "super::logement::Column::Id"
    )]
    Logement,
    #[sea_orm(
        belongs_to = "super::inventaire_categorie::Entity",
        from = "Column::CategorieId",
        to = "super::inventaire_categorie::Column::Id"
    )]
    Categorie,
}

impl Related<super::logement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logement.def()
    }
}

impl Related<super::inventaire_categorie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categorie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

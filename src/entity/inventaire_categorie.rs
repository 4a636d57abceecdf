//! Top-level equipment categories of the furnished-inventory catalog.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "inventaire_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nom: String,
    pub icone: Option<String>,
    pub ordre: i32,
    pub actif: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventaire_sous_categorie::Entity")]
    SousCategories,
    #[sea_orm(has_many = "super::inventaire_equipement::Entity")]
    Equipements,
}

impl Related<super::inventaire_sous_categorie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SousCategories.def()
    }
}

impl Related<super::inventaire_equipement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

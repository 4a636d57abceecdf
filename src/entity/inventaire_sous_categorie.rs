//! Subcategories nested under an inventory category.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "inventaire_sous_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub categorie_id: i32,
    pub nom: String,
    pub ordre: i32,
    pub actif: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventaire_categorie::Entity",
        from = "Column::CategorieId",
        to = "super::inventaire_categorie::Column::Id",
        on_delete = "Cascade"
    )]
    Categorie,
}

impl Related<super::inventaire_categorie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categorie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

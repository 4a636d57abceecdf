//! Entry/exit inventory checklists; the checked rows are stored as JSON text.

use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::etat_lieux::{EtatLieuxStatut, EtatLieuxType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "inventaires")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub logement_id: i32,
    pub contrat_id: Option<i32>,
    #[sea_orm(column_name = "type")]
    pub type_inventaire: EtatLieuxType,
    #[sea_orm(unique)]
    pub reference_unique: String,
    pub date_inventaire: Date,
    pub equipements_data: String,
    pub observations_generales: Option<String>,
    pub statut: EtatLieuxStatut,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

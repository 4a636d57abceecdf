//! Rental units.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Occupancy status of a logement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum LogementStatut {
    #[sea_orm(string_value = "disponible")]
    Disponible,
    #[sea_orm(string_value = "en_location")]
    EnLocation,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "indisponible")]
    Indisponible,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "logements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub reference: String,
    pub adresse: String,
    pub appartement: Option<String>,
    pub type_logement: Option<String>,
    pub surface: Option<f64>,
    pub loyer: f64,
    pub charges: f64,
    pub depot_garantie: f64,
    pub parking: bool,
    pub statut: LogementStatut,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contrat::Entity")]
    Contrats,
    #[sea_orm(has_many = "super::inventaire_equipement::Entity")]
    Equipements,
}

impl Related<super::contrat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contrats.def()
    }
}

impl Related<super::inventaire_equipement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

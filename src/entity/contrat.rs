//! Lease agreements.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lease lifecycle: `en_attente → signe → en_verification → valide | annule | expire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ContratStatut {
    #[sea_orm(string_value = "en_attente")]
    EnAttente,
    #[sea_orm(string_value = "signe")]
    Signe,
    #[sea_orm(string_value = "en_verification")]
    EnVerification,
    #[sea_orm(string_value = "valide")]
    Valide,
    #[sea_orm(string_value = "annule")]
    Annule,
    #[sea_orm(string_value = "expire")]
    Expire,
}

impl ContratStatut {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnAttente => "en_attente",
            Self::Signe => "signe",
            Self::EnVerification => "en_verification",
            Self::Valide => "valide",
            Self::Annule => "annule",
            Self::Expire => "expire",
        }
    }

    /// States from which an administrator may validate or cancel.
    pub fn awaits_review(&self) -> bool {
        matches!(self, Self::Signe | Self::EnVerification)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "contrats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub reference_unique: String,
    pub logement_id: i32,
    pub candidature_id: Option<i32>,
    pub statut: ContratStatut,
    pub nb_locataires: i32,
    pub date_prise_effet: Option<Date>,
    pub date_expiration: Option<DateTimeUtc>,
    pub date_signature: Option<DateTimeUtc>,
    pub date_validation: Option<DateTimeUtc>,
    pub validated_by: Option<i32>,
    pub validation_notes: Option<String>,
    pub motif_annulation: Option<String>,
    pub date_annulation: Option<DateTimeUtc>,
    pub fichier_bail: Option<String>,
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
    #[sea_orm(has_many = "super::locataire::Entity")]
    Locataires,
}

impl Related<super::logement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logement.def()
    }
}

impl Related<super::locataire::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locataires.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

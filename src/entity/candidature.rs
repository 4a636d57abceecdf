//! Rental applications.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Processing status of a candidature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum CandidatureStatut {
    #[sea_orm(string_value = "en_cours")]
    EnCours,
    #[sea_orm(string_value = "accepte")]
    Accepte,
    #[sea_orm(string_value = "refuse")]
    Refuse,
    #[sea_orm(string_value = "visite_planifiee")]
    VisitePlanifiee,
    #[sea_orm(string_value = "contrat_envoye")]
    ContratEnvoye,
    #[sea_orm(string_value = "contrat_signe")]
    ContratSigne,
}

impl CandidatureStatut {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnCours => "en_cours",
            Self::Accepte => "accepte",
            Self::Refuse => "refuse",
            Self::VisitePlanifiee => "visite_planifiee",
            Self::ContratEnvoye => "contrat_envoye",
            Self::ContratSigne => "contrat_signe",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "candidatures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub reference_unique: String,
    pub logement_id: Option<i32>,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: Option<String>,
    pub statut_professionnel: Option<String>,
    pub revenus_mensuels: Option<f64>,
    pub nb_occupants: i32,
    pub garantie_visale: bool,
    pub statut: CandidatureStatut,
    pub notes: Option<String>,
    pub date_soumission: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::candidature_document::Entity")]
    Documents,
}

impl Related<super::candidature_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

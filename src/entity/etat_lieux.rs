//! Move-in / move-out condition reports.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EtatLieuxType {
    #[sea_orm(string_value = "entree")]
    Entree,
    #[sea_orm(string_value = "sortie")]
    Sortie,
}

impl EtatLieuxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entree => "entree",
            Self::Sortie => "sortie",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entree" => Some(Self::Entree),
            "sortie" => Some(Self::Sortie),
            _ => None,
        }
    }

    pub fn libelle(&self) -> &'static str {
        match self {
            Self::Entree => "d'entrée",
            Self::Sortie => "de sortie",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EtatLieuxStatut {
    #[sea_orm(string_value = "brouillon")]
    Brouillon,
    #[sea_orm(string_value = "finalise")]
    Finalise,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "etats_lieux")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub contrat_id: i32,
    pub logement_id: i32,
    #[sea_orm(column_name = "type")]
    pub type_etat: EtatLieuxType,
    #[sea_orm(unique)]
    pub reference_unique: String,
    pub date_etat: Date,
    pub adresse: String,
    pub bailleur_nom: Option<String>,
    pub locataire_nom_complet: Option<String>,
    pub locataire_email: Option<String>,
    pub compteur_electricite: Option<String>,
    pub compteur_eau_froide: Option<String>,
    pub cles_appartement: i32,
    pub cles_boite_lettres: i32,
    pub cles_autre: i32,
    pub cles_total: i32,
    pub piece_principale: Option<String>,
    pub coin_cuisine: Option<String>,
    pub salle_eau_wc: Option<String>,
    pub etat_general: Option<String>,
    pub observations: Option<String>,
    pub lieu_signature: Option<String>,
    pub depot_garantie_status: Option<String>,
    pub depot_garantie_montant_retenu: Option<f64>,
    pub depot_garantie_motif_retenue: Option<String>,
    pub bilan_logement_data: Option<String>,
    pub bilan_logement_commentaire: Option<String>,
    pub bilan_envoye: bool,
    pub bilan_envoye_at: Option<DateTimeUtc>,
    pub statut: EtatLieuxStatut,
    pub date_finalisation: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contrat::Entity",
        from = "Column::ContratId",
        to = "super::contrat::Column::Id"
    )]
    Contrat,
    #[sea_orm(has_many = "super::etat_lieux_locataire::Entity")]
    Locataires,
    #[sea_orm(has_many = "super::etat_lieux_photo::Entity")]
    Photos,
}

impl Related<super::contrat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contrat.def()
    }
}

impl Related<super::etat_lieux_locataire::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locataires.def()
    }
}

impl Related<super::etat_lieux_photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

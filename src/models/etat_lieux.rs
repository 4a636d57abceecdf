//! État des lieux DTOs: editor payload, typed tenant signature rows, photo
//! categories and the bilan table.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::etat_lieux::{self, EtatLieuxType};
use crate::entity::etat_lieux_photo;
use crate::error::{AppError, AppResult};

pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Maximum number of rows in a bilan table.
pub const MAX_BILAN_ROWS: usize = 50;

/// Photo categories accepted by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoCategorie {
    CompteurElectricite,
    CompteurEau,
    Cles,
    PiecePrincipale,
    Cuisine,
    SalleEau,
    Autre,
}

impl PhotoCategorie {
    pub const ALL: [PhotoCategorie; 7] = [
        Self::CompteurElectricite,
        Self::CompteurEau,
        Self::Cles,
        Self::PiecePrincipale,
        Self::Cuisine,
        Self::SalleEau,
        Self::Autre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompteurElectricite => "compteur_electricite",
            Self::CompteurEau => "compteur_eau",
            Self::Cles => "cles",
            Self::PiecePrincipale => "piece_principale",
            Self::Cuisine => "cuisine",
            Self::SalleEau => "salle_eau",
            Self::Autre => "autre",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Deposit decision recorded on a move-out report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepotGarantieStatus {
    RestitutionTotale,
    RestitutionPartielle,
    RetenueTotale,
}

impl DepotGarantieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RestitutionTotale => "restitution_totale",
            Self::RestitutionPartielle => "restitution_partielle",
            Self::RetenueTotale => "retenue_totale",
        }
    }
}

/// One tenant's signature as submitted with an update.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantSignatureInput {
    pub etat_lieux_locataire_id: i32,
    pub signature_data: Option<String>,
    #[serde(default)]
    pub certifie_exact: bool,
}

/// Editor payload. Every update replaces tenant signatures with the ones
/// supplied here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EtatLieuxUpdate {
    pub date_etat: Option<NaiveDate>,
    pub bailleur_nom: Option<String>,
    pub compteur_electricite: Option<String>,
    pub compteur_eau_froide: Option<String>,
    #[serde(default)]
    pub cles_appartement: i32,
    #[serde(default)]
    pub cles_boite_lettres: i32,
    #[serde(default)]
    pub cles_autre: i32,
    #[serde(default)]
    pub cles_total: i32,
    pub piece_principale: Option<String>,
    pub coin_cuisine: Option<String>,
    pub salle_eau_wc: Option<String>,
    pub etat_general: Option<String>,
    pub observations: Option<String>,
    pub lieu_signature: Option<String>,
    pub depot_garantie_status: Option<DepotGarantieStatus>,
    pub depot_garantie_montant_retenu: Option<f64>,
    pub depot_garantie_motif_retenue: Option<String>,
    #[serde(default)]
    pub signatures: Vec<TenantSignatureInput>,
}

/// Upper bound for each key count, total included.
pub const MAX_CLES: i32 = 99;

impl EtatLieuxUpdate {
    pub fn validate(&self, type_etat: EtatLieuxType) -> AppResult<()> {
        let counts = [
            self.cles_appartement,
            self.cles_boite_lettres,
            self.cles_autre,
            self.cles_total,
        ];
        if counts.iter().any(|c| !(0..=MAX_CLES).contains(c)) {
            return Err(AppError::InvalidInput(format!(
                "Le nombre de clés doit être compris entre 0 et {}",
                MAX_CLES
            )));
        }
        let sum = counts[..3].iter().sum::<i32>();
        if sum != self.cles_total {
            return Err(AppError::InvalidInput(format!(
                "Le total des clés ({}) ne correspond pas à la somme ({})",
                self.cles_total, sum
            )));
        }

        if type_etat == EtatLieuxType::Entree
            && (self.depot_garantie_status.is_some()
                || self.depot_garantie_montant_retenu.is_some())
        {
            return Err(AppError::InvalidInput(
                "Le dépôt de garantie se règle à l'état des lieux de sortie".into(),
            ));
        }
        if let Some(montant) = self.depot_garantie_montant_retenu
            && (!montant.is_finite() || montant < 0.0)
        {
            return Err(AppError::InvalidInput("Montant retenu invalide".into()));
        }
        if self.depot_garantie_status == Some(DepotGarantieStatus::RestitutionPartielle)
            && (self.depot_garantie_montant_retenu.is_none()
                || super::non_blank(&self.depot_garantie_motif_retenue).is_none())
        {
            return Err(AppError::InvalidInput(
                "Une restitution partielle exige un montant et un motif de retenue".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        if self
            .signatures
            .iter()
            .any(|s| !seen.insert(s.etat_lieux_locataire_id))
        {
            return Err(AppError::InvalidInput(
                "Signature fournie deux fois pour le même locataire".into(),
            ));
        }
        Ok(())
    }
}

/// One line of the bilan du logement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilanRow {
    pub poste: String,
    #[serde(default)]
    pub commentaire: String,
    #[serde(default)]
    pub valeur: f64,
    #[serde(default)]
    pub montant_du: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BilanUpdate {
    #[serde(default)]
    pub rows: Vec<BilanRow>,
    pub commentaire: Option<String>,
}

impl BilanUpdate {
    /// Validate and normalize the rows; blank rows are dropped.
    pub fn into_rows(self) -> AppResult<(Vec<BilanRow>, Option<String>)> {
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in self.rows {
            let poste = row.poste.trim().to_string();
            let commentaire = row.commentaire.trim().to_string();
            if poste.is_empty() && commentaire.is_empty() && row.valeur == 0.0 && row.montant_du == 0.0
            {
                continue;
            }
            if poste.is_empty() {
                return Err(AppError::InvalidInput(
                    "Chaque ligne du bilan doit préciser un poste".into(),
                ));
            }
            for amount in [row.valeur, row.montant_du] {
                if !amount.is_finite() || amount < 0.0 {
                    return Err(AppError::InvalidInput(format!(
                        "Montant invalide pour le poste « {} »",
                        poste
                    )));
                }
            }
            rows.push(BilanRow {
                poste,
                commentaire,
                valeur: row.valeur,
                montant_du: row.montant_du,
            });
        }
        if rows.len() > MAX_BILAN_ROWS {
            return Err(AppError::InvalidInput(format!(
                "Le bilan est limité à {} lignes",
                MAX_BILAN_ROWS
            )));
        }
        Ok((rows, super::non_blank(&self.commentaire)))
    }
}

/// Bilan as read back from the record.
#[derive(Debug, Clone, Serialize)]
pub struct Bilan {
    pub rows: Vec<BilanRow>,
    pub commentaire: Option<String>,
    pub total_valeur: f64,
    pub total_montant_du: f64,
    pub envoye: bool,
    pub envoye_at: Option<DateTime<Utc>>,
}

impl Bilan {
    pub fn from_model(m: &etat_lieux::Model) -> Self {
        let rows: Vec<BilanRow> = m
            .bilan_logement_data
            .as_deref()
            .and_then(|data| serde_json::from_str(data).ok())
            .unwrap_or_default();
        let total_valeur = rows.iter().map(|r| r.valeur).sum();
        let total_montant_du = rows.iter().map(|r| r.montant_du).sum();
        Self {
            rows,
            commentaire: m.bilan_logement_commentaire.clone(),
            total_valeur,
            total_montant_du,
            envoye: m.bilan_envoye,
            envoye_at: m.bilan_envoye_at,
        }
    }
}

/// Move-in values shown read-only next to the move-out editor.
#[derive(Debug, Serialize)]
pub struct EntreeReference {
    pub id: i32,
    pub reference_unique: String,
    pub date_etat: NaiveDate,
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
}

impl From<&etat_lieux::Model> for EntreeReference {
    fn from(m: &etat_lieux::Model) -> Self {
        Self {
            id: m.id,
            reference_unique: m.reference_unique.clone(),
            date_etat: m.date_etat,
            compteur_electricite: m.compteur_electricite.clone(),
            compteur_eau_froide: m.compteur_eau_froide.clone(),
            cles_appartement: m.cles_appartement,
            cles_boite_lettres: m.cles_boite_lettres,
            cles_autre: m.cles_autre,
            cles_total: m.cles_total,
            piece_principale: m.piece_principale.clone(),
            coin_cuisine: m.coin_cuisine.clone(),
            salle_eau_wc: m.salle_eau_wc.clone(),
            etat_general: m.etat_general.clone(),
            observations: m.observations.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EtatLieuxLocataireView {
    pub id: i32,
    pub locataire_id: Option<i32>,
    pub ordre: i32,
    pub nom: String,
    pub prenom: String,
    pub email: Option<String>,
    pub signature_url: Option<String>,
    pub signature_timestamp: Option<DateTime<Utc>>,
    pub certifie_exact: bool,
}

#[derive(Debug, Serialize)]
pub struct EtatLieuxDetail {
    pub etat_lieux: etat_lieux::Model,
    pub locataires: Vec<EtatLieuxLocataireView>,
    /// Photos keyed by category.
    pub photos: BTreeMap<String, Vec<etat_lieux_photo::Model>>,
    pub reference_entree: Option<EntreeReference>,
    pub bilan: Option<Bilan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_categorie_parse() {
        assert_eq!(
            PhotoCategorie::parse("compteur_eau"),
            Some(PhotoCategorie::CompteurEau)
        );
        assert_eq!(PhotoCategorie::parse("garage"), None);
    }

    #[test]
    fn test_key_total_must_match_sum() {
        let mut update = EtatLieuxUpdate {
            cles_appartement: 2,
            cles_boite_lettres: 1,
            cles_autre: 0,
            cles_total: 3,
            ..Default::default()
        };
        assert!(update.validate(EtatLieuxType::Entree).is_ok());

        update.cles_total = 4;
        assert!(update.validate(EtatLieuxType::Entree).is_err());
    }

    #[test]
    fn test_key_counts_are_bounded() {
        let update = EtatLieuxUpdate {
            cles_appartement: i32::MAX,
            cles_boite_lettres: 1,
            ..Default::default()
        };
        assert!(matches!(
            update.validate(EtatLieuxType::Entree),
            Err(AppError::InvalidInput(_))
        ));

        let update = EtatLieuxUpdate {
            cles_appartement: i32::MAX,
            cles_boite_lettres: i32::MAX,
            cles_autre: 2,
            cles_total: 0,
            ..Default::default()
        };
        assert!(update.validate(EtatLieuxType::Entree).is_err());

        let update = EtatLieuxUpdate {
            cles_autre: -1,
            ..Default::default()
        };
        assert!(update.validate(EtatLieuxType::Entree).is_err());

        let update = EtatLieuxUpdate {
            cles_appartement: MAX_CLES,
            cles_total: MAX_CLES,
            ..Default::default()
        };
        assert!(update.validate(EtatLieuxType::Entree).is_ok());
    }

    #[test]
    fn test_deposit_only_on_sortie() {
        let update = EtatLieuxUpdate {
            depot_garantie_status: Some(DepotGarantieStatus::RestitutionTotale),
            ..Default::default()
        };
        assert!(update.validate(EtatLieuxType::Entree).is_err());
        assert!(update.validate(EtatLieuxType::Sortie).is_ok());
    }

    #[test]
    fn test_bilan_rows_normalized() {
        let update = BilanUpdate {
            rows: vec![
                BilanRow {
                    poste: " Peinture séjour ".into(),
                    commentaire: "traces".into(),
                    valeur: 120.0,
                    montant_du: 60.0,
                },
                BilanRow {
                    poste: "".into(),
                    commentaire: "".into(),
                    valeur: 0.0,
                    montant_du: 0.0,
                },
            ],
            commentaire: Some("  ".into()),
        };
        let (rows, commentaire) = update.into_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].poste, "Peinture séjour");
        assert_eq!(commentaire, None);
    }

    #[test]
    fn test_bilan_rejects_negative_amount() {
        let update = BilanUpdate {
            rows: vec![BilanRow {
                poste: "Ménage".into(),
                commentaire: String::new(),
                valeur: 0.0,
                montant_du: -5.0,
            }],
            commentaire: None,
        };
        assert!(update.into_rows().is_err());
    }
}

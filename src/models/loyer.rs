//! Rent tracking grid DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::logement::LogementSummary;
use crate::entity::loyer_tracking::{self, StatutPaiement};
use crate::error::{AppError, AppResult};

const MOIS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// "mars 2026"
pub fn periode_libelle(mois: i32, annee: i32) -> String {
    let nom = usize::try_from(mois - 1)
        .ok()
        .and_then(|i| MOIS.get(i))
        .copied()
        .unwrap_or("?");
    format!("{} {}", nom, annee)
}

pub fn validate_periode(mois: i32, annee: i32) -> AppResult<()> {
    if !(1..=12).contains(&mois) {
        return Err(AppError::InvalidInput(format!("Mois invalide: {}", mois)));
    }
    if !(2000..=2100).contains(&annee) {
        return Err(AppError::InvalidInput(format!("Année invalide: {}", annee)));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct LoyerGridParams {
    pub annee: Option<i32>,
    pub logement_id: Option<i32>,
}

/// One month of one logement. Months without a row are `attente`.
#[derive(Debug, Clone, Serialize)]
pub struct LoyerCell {
    pub mois: i32,
    pub statut: StatutPaiement,
    pub montant_attendu: f64,
    pub date_paiement: Option<NaiveDate>,
    pub rappel_envoye: bool,
    pub nb_rappels: i32,
    pub date_rappel: Option<DateTime<Utc>>,
}

impl LoyerCell {
    pub fn empty(mois: i32, montant_attendu: f64) -> Self {
        Self {
            mois,
            statut: StatutPaiement::Attente,
            montant_attendu,
            date_paiement: None,
            rappel_envoye: false,
            nb_rappels: 0,
            date_rappel: None,
        }
    }
}

impl From<&loyer_tracking::Model> for LoyerCell {
    fn from(m: &loyer_tracking::Model) -> Self {
        Self {
            mois: m.mois,
            statut: m.statut_paiement,
            montant_attendu: m.montant_attendu,
            date_paiement: m.date_paiement,
            rappel_envoye: m.rappel_envoye,
            nb_rappels: m.nb_rappels,
            date_rappel: m.date_rappel,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoyerGridRow {
    pub logement: LogementSummary,
    pub mois: Vec<LoyerCell>,
}

#[derive(Debug, Serialize)]
pub struct LoyerGrid {
    pub annee: i32,
    pub rows: Vec<LoyerGridRow>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleLoyerRequest {
    pub logement_id: i32,
    pub mois: i32,
    pub annee: i32,
    /// Status the client displayed; a mismatch is reported as a conflict.
    pub expected_statut: Option<StatutPaiement>,
}

#[derive(Debug, Serialize)]
pub struct ToggleLoyerResponse {
    pub statut: StatutPaiement,
    pub date_paiement: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct RappelLoyerRequest {
    pub logement_id: i32,
    pub mois: i32,
    pub annee: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periode_libelle() {
        assert_eq!(periode_libelle(8, 2026), "août 2026");
        assert_eq!(periode_libelle(13, 2026), "? 2026");
    }

    #[test]
    fn test_validate_periode() {
        assert!(validate_periode(1, 2026).is_ok());
        assert!(validate_periode(0, 2026).is_err());
        assert!(validate_periode(12, 1999).is_err());
    }
}

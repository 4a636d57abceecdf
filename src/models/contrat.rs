//! Lease DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::logement::LogementSummary;
use crate::entity::contrat::{self, ContratStatut};
use crate::entity::etat_lieux::{self, EtatLieuxStatut, EtatLieuxType};
use crate::error::{AppError, AppResult};

/// Maximum number of co-signing tenants on a lease.
pub const MAX_LOCATAIRES: usize = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct LocataireInput {
    pub nom: String,
    pub prenom: String,
    pub date_naissance: Option<NaiveDate>,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContratRequest {
    pub logement_id: i32,
    pub candidature_id: Option<i32>,
    pub date_prise_effet: Option<NaiveDate>,
    pub locataires: Vec<LocataireInput>,
}

impl CreateContratRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.locataires.is_empty() || self.locataires.len() > MAX_LOCATAIRES {
            return Err(AppError::InvalidInput(format!(
                "Un contrat compte entre 1 et {} locataires",
                MAX_LOCATAIRES
            )));
        }
        if self
            .locataires
            .iter()
            .any(|l| l.nom.trim().is_empty() || l.prenom.trim().is_empty())
        {
            return Err(AppError::InvalidInput(
                "Chaque locataire doit avoir un nom et un prénom".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContratFilters {
    pub statut: Option<ContratStatut>,
    pub logement_id: Option<i32>,
}

/// Tenant signature captured on the signing page.
#[derive(Debug, Deserialize)]
pub struct SignContratRequest {
    pub locataire_id: i32,
    pub signature_data: String,
    pub mention_lu_approuve: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateContratRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelContratRequest {
    #[serde(default)]
    pub motif_annulation: String,
}

#[derive(Debug, Serialize)]
pub struct LocataireView {
    pub id: i32,
    pub ordre: i32,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: Option<NaiveDate>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    /// Only set when the stored path resolves inside the uploads directory.
    pub signature_url: Option<String>,
    pub signature_timestamp: Option<DateTime<Utc>>,
    pub mention_lu_approuve: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EtatLieuxSummary {
    pub id: i32,
    #[serde(rename = "type")]
    pub type_etat: EtatLieuxType,
    pub reference_unique: String,
    pub date_etat: NaiveDate,
    pub statut: EtatLieuxStatut,
    pub signatures_completes: bool,
}

impl EtatLieuxSummary {
    pub fn new(m: &etat_lieux::Model, signatures_completes: bool) -> Self {
        Self {
            id: m.id,
            type_etat: m.type_etat,
            reference_unique: m.reference_unique.clone(),
            date_etat: m.date_etat,
            statut: m.statut,
            signatures_completes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContratDetail {
    pub contrat: contrat::Model,
    pub logement: LogementSummary,
    pub locataires: Vec<LocataireView>,
    pub etats_lieux: Vec<EtatLieuxSummary>,
    pub fichier_bail_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locataire(nom: &str) -> LocataireInput {
        LocataireInput {
            nom: nom.into(),
            prenom: "Sam".into(),
            date_naissance: None,
            email: Some("sam@example.org".into()),
            telephone: None,
        }
    }

    #[test]
    fn test_locataire_count_bounds() {
        let mut request = CreateContratRequest {
            logement_id: 1,
            candidature_id: None,
            date_prise_effet: None,
            locataires: vec![],
        };
        assert!(request.validate().is_err());

        request.locataires = vec![locataire("Petit")];
        assert!(request.validate().is_ok());

        request.locataires = vec![locataire("A"), locataire("B"), locataire("C")];
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_cancel_request_defaults_to_empty_motif() {
        let request: CancelContratRequest = serde_json::from_str("{}").unwrap();
        assert!(request.motif_annulation.is_empty());
    }
}

//! Candidature DTOs and the fixed document type list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::logement::LogementSummary;
use crate::entity::candidature::{self, CandidatureStatut};
use crate::entity::{candidature_document, log};
use crate::error::{AppError, AppResult};

/// Accepted `type_document` keys with their labels.
pub const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("piece_identite", "Pièce d'identité"),
    ("bulletins_salaire", "Bulletins de salaire"),
    ("contrat_travail", "Contrat de travail"),
    ("avis_imposition", "Avis d'imposition"),
    ("quittances_loyer", "Quittances de loyer"),
    ("justificatif_domicile", "Justificatif de domicile"),
    ("autre", "Autre document"),
];

pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

pub fn is_document_type(value: &str) -> bool {
    DOCUMENT_TYPES.iter().any(|(key, _)| *key == value)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCandidatureRequest {
    pub logement_id: Option<i32>,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: Option<String>,
    pub statut_professionnel: Option<String>,
    pub revenus_mensuels: Option<f64>,
    pub nb_occupants: Option<i32>,
    #[serde(default)]
    pub garantie_visale: bool,
    pub notes: Option<String>,
}

impl CreateCandidatureRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.nom.trim().is_empty() || self.prenom.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Le nom et le prénom sont obligatoires".into(),
            ));
        }
        let email = self.email.trim();
        if email.len() < 3 || !email.contains('@') || email.starts_with('@') || email.ends_with('@')
        {
            return Err(AppError::InvalidInput("Adresse email invalide".into()));
        }
        if matches!(self.nb_occupants, Some(n) if n < 1) {
            return Err(AppError::InvalidInput(
                "Le nombre d'occupants doit être au moins 1".into(),
            ));
        }
        if matches!(self.revenus_mensuels, Some(r) if !r.is_finite() || r < 0.0) {
            return Err(AppError::InvalidInput("Revenus mensuels invalides".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidatureFilters {
    pub statut: Option<CandidatureStatut>,
    pub logement_id: Option<i32>,
    /// Free-text search on name, email and reference.
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCandidatureStatutRequest {
    pub statut: CandidatureStatut,
    pub commentaire: Option<String>,
}

/// A stored upload to attach to a candidature.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub type_document: String,
    pub nom_fichier: String,
    pub nom_original: String,
    pub chemin_fichier: String,
    pub taille: i64,
}

#[derive(Debug, Serialize)]
pub struct CandidatureDetail {
    pub candidature: candidature::Model,
    pub logement: Option<LogementSummary>,
    /// Documents keyed by `type_document`.
    pub documents: BTreeMap<String, Vec<candidature_document::Model>>,
    pub logs: Vec<log::Model>,
}

impl CandidatureDetail {
    pub fn group_documents(
        documents: Vec<candidature_document::Model>,
    ) -> BTreeMap<String, Vec<candidature_document::Model>> {
        let mut grouped: BTreeMap<String, Vec<candidature_document::Model>> = BTreeMap::new();
        for document in documents {
            grouped
                .entry(document.type_document.clone())
                .or_default()
                .push(document);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateCandidatureRequest {
        CreateCandidatureRequest {
            logement_id: None,
            nom: "Martin".into(),
            prenom: "Léa".into(),
            email: "lea.martin@example.org".into(),
            telephone: None,
            statut_professionnel: Some("cdi".into()),
            revenus_mensuels: Some(2100.0),
            nb_occupants: Some(1),
            garantie_visale: true,
            notes: None,
        }
    }

    #[test]
    fn test_validate() {
        assert!(request().validate().is_ok());

        let mut bad = request();
        bad.email = "lea.martin".into();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.nb_occupants = Some(0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_document_types() {
        assert!(is_document_type("avis_imposition"));
        assert!(!is_document_type("photo_profil"));
    }
}

//! Request/response models for the back-office API.
//!
//! Entity models live in `crate::entity`; the types here are the typed shapes
//! accepted from and returned to the front-end.

use serde::Serialize;

pub mod auth;
pub mod candidature;
pub mod contrat;
pub mod etat_lieux;
pub mod inventaire;
pub mod logement;
pub mod loyer;
pub mod parametre;
pub mod sauvegarde;

pub use auth::{AdminView, LoginRequest, SessionInfo};
pub use candidature::{
    CandidatureDetail, CandidatureFilters, CreateCandidatureRequest, NewDocument,
    UpdateCandidatureStatutRequest, DOCUMENT_EXTENSIONS, DOCUMENT_TYPES,
};
pub use contrat::{
    CancelContratRequest, ContratDetail, ContratFilters, CreateContratRequest, EtatLieuxSummary,
    LocataireInput, LocataireView, SignContratRequest, ValidateContratRequest,
};
pub use etat_lieux::{
    Bilan, BilanRow, BilanUpdate, DepotGarantieStatus, EntreeReference, EtatLieuxDetail,
    EtatLieuxLocataireView, EtatLieuxUpdate, PhotoCategorie, TenantSignatureInput,
    PHOTO_EXTENSIONS,
};
pub use inventaire::{
    CategorieInput, CategorieView, CreateInventaireRequest, CreateSousCategorieRequest,
    DefaultEquipement, DeleteCategorieOutcome, DeleteCategorieParams, EquipementInput,
    EtatEquipement, InventaireDetail, InventaireRow, ReorderRequest, UpdateInventaireRequest,
    UpdateSousCategorieRequest,
};
pub use logement::{LogementFilters, LogementInput, LogementSummary};
pub use loyer::{
    LoyerCell, LoyerGrid, LoyerGridParams, LoyerGridRow, RappelLoyerRequest, ToggleLoyerRequest,
    ToggleLoyerResponse, periode_libelle, validate_periode,
};
pub use parametre::{ParamType, ParametreGroup, UpdateParametreRequest, parse_bool};
pub use sauvegarde::{BackupSchedule, CreateSauvegardeRequest, Frequence};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A message queued during a request and returned with the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Envelope for successful JSON responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, notices: Vec<Notice>) -> Self {
        Self {
            success: true,
            data,
            notices,
        }
    }
}

/// Trim an optional string, mapping blank values to `None`.
pub fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(&Some("   ".to_string())), None);
        assert_eq!(non_blank(&None), None);
    }

    #[test]
    fn test_notices_omitted_when_empty() {
        let body = serde_json::to_value(ApiResponse::new(1, vec![])).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": 1}));
    }
}

//! Logement DTOs.

use serde::{Deserialize, Serialize};

use crate::entity::logement::{self, LogementStatut};
use crate::error::{AppError, AppResult};

/// Create/update payload for a logement.
#[derive(Debug, Clone, Deserialize)]
pub struct LogementInput {
    pub reference: String,
    pub adresse: String,
    pub appartement: Option<String>,
    pub type_logement: Option<String>,
    pub surface: Option<f64>,
    #[serde(default)]
    pub loyer: f64,
    #[serde(default)]
    pub charges: f64,
    #[serde(default)]
    pub depot_garantie: f64,
    #[serde(default)]
    pub parking: bool,
    pub statut: Option<LogementStatut>,
}

impl LogementInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.reference.trim().is_empty() {
            return Err(AppError::InvalidInput("La référence est obligatoire".into()));
        }
        if self.adresse.trim().is_empty() {
            return Err(AppError::InvalidInput("L'adresse est obligatoire".into()));
        }
        for (label, value) in [
            ("loyer", self.loyer),
            ("charges", self.charges),
            ("dépôt de garantie", self.depot_garantie),
            ("surface", self.surface.unwrap_or(0.0)),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "Montant invalide pour {}",
                    label
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogementFilters {
    pub statut: Option<LogementStatut>,
}

/// Compact logement view embedded in other responses.
#[derive(Debug, Clone, Serialize)]
pub struct LogementSummary {
    pub id: i32,
    pub reference: String,
    pub adresse: String,
    pub appartement: Option<String>,
    pub loyer: f64,
    pub charges: f64,
    pub statut: LogementStatut,
}

impl LogementSummary {
    pub fn loyer_charges_comprises(&self) -> f64 {
        self.loyer + self.charges
    }
}

impl From<&logement::Model> for LogementSummary {
    fn from(m: &logement::Model) -> Self {
        Self {
            id: m.id,
            reference: m.reference.clone(),
            adresse: m.adresse.clone(),
            appartement: m.appartement.clone(),
            loyer: m.loyer,
            charges: m.charges,
            statut: m.statut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> LogementInput {
        LogementInput {
            reference: "RP-01".into(),
            adresse: "12 rue des Lilas".into(),
            appartement: None,
            type_logement: Some("T1".into()),
            surface: Some(22.5),
            loyer: 540.0,
            charges: 40.0,
            depot_garantie: 540.0,
            parking: false,
            statut: None,
        }
    }

    #[test]
    fn test_validate_accepts_complete_input() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let mut bad = input();
        bad.charges = -1.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_reference() {
        let mut bad = input();
        bad.reference = "  ".into();
        assert!(bad.validate().is_err());
    }
}

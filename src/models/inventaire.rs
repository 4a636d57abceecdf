//! Inventory catalog and checklist DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::etat_lieux::{EtatLieuxStatut, EtatLieuxType};
use crate::entity::{inventaire, inventaire_categorie, inventaire_sous_categorie};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CategorieInput {
    pub nom: String,
    pub icone: Option<String>,
    pub actif: Option<bool>,
}

impl CategorieInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.nom.trim().is_empty() {
            return Err(AppError::InvalidInput("Le nom de la catégorie est obligatoire".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSousCategorieRequest {
    pub categorie_id: i32,
    pub nom: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSousCategorieRequest {
    pub nom: String,
    pub actif: Option<bool>,
}

/// New order as a list of ids; position becomes `ordre`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteCategorieParams {
    pub confirmed: Option<String>,
}

impl DeleteCategorieParams {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.confirmed.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Serialize)]
pub struct CategorieView {
    #[serde(flatten)]
    pub categorie: inventaire_categorie::Model,
    pub sous_categories: Vec<inventaire_sous_categorie::Model>,
    pub nb_equipements: u64,
}

/// Result of a category delete request.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DeleteCategorieOutcome {
    pub deleted: bool,
    pub needs_confirmation: bool,
    pub nb_sous_categories: u64,
    pub nb_equipements: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EquipementInput {
    pub categorie_id: Option<i32>,
    pub sous_categorie_id: Option<i32>,
    pub nom: String,
    pub description: Option<String>,
    pub quantite: Option<i32>,
    pub valeur_estimee: Option<f64>,
}

impl EquipementInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.nom.trim().is_empty() {
            return Err(AppError::InvalidInput("Le nom de l'équipement est obligatoire".into()));
        }
        if matches!(self.quantite, Some(q) if q < 0) {
            return Err(AppError::InvalidInput("Quantité invalide".into()));
        }
        if matches!(self.valeur_estimee, Some(v) if !v.is_finite() || v < 0.0) {
            return Err(AppError::InvalidInput("Valeur estimée invalide".into()));
        }
        Ok(())
    }
}

/// Entry of the `inventaire_equipements_defaut` parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultEquipement {
    pub categorie: String,
    pub nom: String,
    #[serde(default = "default_quantite")]
    pub quantite: i32,
}

fn default_quantite() -> i32 {
    1
}

/// Condition of an item on a checklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtatEquipement {
    Neuf,
    #[default]
    Bon,
    Usage,
    Mauvais,
    Absent,
}

/// One checklist line, snapshotted from the equipment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventaireRow {
    pub equipement_id: Option<i32>,
    pub nom: String,
    pub categorie: Option<String>,
    pub quantite_attendue: i32,
    pub quantite_presente: i32,
    #[serde(default)]
    pub etat: EtatEquipement,
    #[serde(default)]
    pub commentaire: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInventaireRequest {
    pub logement_id: i32,
    pub contrat_id: Option<i32>,
    #[serde(rename = "type")]
    pub type_inventaire: EtatLieuxType,
    pub date_inventaire: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInventaireRequest {
    pub rows: Vec<InventaireRow>,
    pub observations_generales: Option<String>,
}

impl UpdateInventaireRequest {
    pub fn validate(&self) -> AppResult<()> {
        for row in &self.rows {
            if row.nom.trim().is_empty() {
                return Err(AppError::InvalidInput("Ligne d'inventaire sans nom".into()));
            }
            if row.quantite_attendue < 0 || row.quantite_presente < 0 {
                return Err(AppError::InvalidInput(format!(
                    "Quantité invalide pour « {} »",
                    row.nom
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct InventaireDetail {
    pub id: i32,
    pub logement_id: i32,
    pub contrat_id: Option<i32>,
    #[serde(rename = "type")]
    pub type_inventaire: EtatLieuxType,
    pub reference_unique: String,
    pub date_inventaire: NaiveDate,
    pub observations_generales: Option<String>,
    pub statut: EtatLieuxStatut,
    pub rows: Vec<InventaireRow>,
    pub updated_at: DateTime<Utc>,
}

impl InventaireDetail {
    pub fn from_model(m: inventaire::Model) -> AppResult<Self> {
        let rows: Vec<InventaireRow> = serde_json::from_str(&m.equipements_data).map_err(|e| {
            AppError::Database(format!(
                "Inventaire {} contient des données illisibles: {}",
                m.id, e
            ))
        })?;
        Ok(Self {
            id: m.id,
            logement_id: m.logement_id,
            contrat_id: m.contrat_id,
            type_inventaire: m.type_inventaire,
            reference_unique: m.reference_unique,
            date_inventaire: m.date_inventaire,
            observations_generales: m.observations_generales,
            statut: m.statut,
            rows,
            updated_at: m.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_flag() {
        let params = DeleteCategorieParams {
            confirmed: Some("1".into()),
        };
        assert!(params.is_confirmed());
        assert!(!DeleteCategorieParams::default().is_confirmed());
        let params = DeleteCategorieParams {
            confirmed: Some("0".into()),
        };
        assert!(!params.is_confirmed());
    }

    #[test]
    fn test_row_defaults() {
        let row: InventaireRow = serde_json::from_str(
            r#"{"equipement_id":3,"nom":"Lit","categorie":null,"quantite_attendue":1,"quantite_presente":1}"#,
        )
        .unwrap();
        assert_eq!(row.etat, EtatEquipement::Bon);
        assert!(row.commentaire.is_empty());
    }

    #[test]
    fn test_default_equipement_quantite() {
        let item: DefaultEquipement =
            serde_json::from_str(r#"{"categorie":"Cuisine","nom":"Four"}"#).unwrap();
        assert_eq!(item.quantite, 1);
    }
}

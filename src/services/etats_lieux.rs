//! État des lieux actions: saving the editor with signatures, photo upload,
//! bilan dispatch and finalisation.

use std::path::PathBuf;

use tracing::{info, warn};

use super::documents::{format_date, format_euros};
use super::mailer::EmailService;
use super::notify::{self, Outcome};
use super::template::{self, escape_html};
use super::uploads::{self, UploadedFile};
use super::{paths, signatures};
use crate::config::Config;
use crate::db::DbPool;
use crate::db::etats_lieux::{NewPhoto, StoredSignature};
use crate::entity::etat_lieux::{self, EtatLieuxStatut, EtatLieuxType};
use crate::entity::etat_lieux_photo;
use crate::error::{AppError, AppResult};
use crate::models::{Bilan, EtatLieuxUpdate, NoticeLevel, PHOTO_EXTENSIONS, PhotoCategorie};

#[derive(Debug, Clone)]
pub struct EtatLieuxService {
    db: DbPool,
    email: EmailService,
    uploads_dir: PathBuf,
}

impl EtatLieuxService {
    pub fn new(config: &Config, db: DbPool, email: EmailService) -> Self {
        Self {
            db,
            email,
            uploads_dir: config.uploads_dir.clone(),
        }
    }

    /// Save the editor. New signature images are written first; rows without
    /// one keep no signature. Images of the replaced signatures are removed
    /// once the save is committed.
    pub async fn save(
        &self,
        id: i32,
        update: &EtatLieuxUpdate,
        ip: Option<&str>,
    ) -> AppResult<etat_lieux::Model> {
        let existing = self.db.require_etat_lieux(id).await?;
        if existing.statut == EtatLieuxStatut::Finalise {
            return Err(AppError::Conflict(
                "Cet état des lieux est finalisé et ne peut plus être modifié".into(),
            ));
        }
        update.validate(existing.type_etat)?;
        let previous: Vec<String> = self
            .db
            .list_etat_lieux_locataires(id)
            .await?
            .into_iter()
            .filter_map(|row| row.signature_data)
            .collect();

        let mut stored = Vec::with_capacity(update.signatures.len());
        for signature in &update.signatures {
            let path = match signature.signature_data.as_deref().map(str::trim) {
                Some(data) if !data.is_empty() => {
                    let prefix = format!(
                        "edl_{}_locataire_{}",
                        id, signature.etat_lieux_locataire_id
                    );
                    match signatures::store_signature(&self.uploads_dir, &prefix, data).await {
                        Ok(path) => Some(path),
                        Err(e) => {
                            self.discard_signatures(&stored).await;
                            return Err(e);
                        }
                    }
                }
                _ => None,
            };
            stored.push(StoredSignature {
                etat_lieux_locataire_id: signature.etat_lieux_locataire_id,
                path,
                certifie_exact: signature.certifie_exact,
            });
        }

        match self.db.update_etat_lieux(id, update, &stored, ip).await {
            Ok(model) => {
                for path in &previous {
                    self.discard(path).await;
                }
                Ok(model)
            }
            Err(e) => {
                self.discard_signatures(&stored).await;
                Err(e)
            }
        }
    }

    /// Store one photo. The category and extension are checked before
    /// anything is written.
    pub async fn add_photo(
        &self,
        id: i32,
        categorie: Option<&str>,
        description: Option<&str>,
        file: UploadedFile,
    ) -> AppResult<etat_lieux_photo::Model> {
        let categorie = categorie
            .and_then(PhotoCategorie::parse)
            .ok_or_else(|| AppError::InvalidInput("Catégorie de photo invalide".into()))?;
        let extension = file
            .extension()
            .filter(|ext| PHOTO_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Format de photo non accepté (formats: {})",
                    PHOTO_EXTENSIONS.join(", ")
                ))
            })?;
        let etat = self.db.require_etat_lieux(id).await?;
        if etat.statut == EtatLieuxStatut::Finalise {
            return Err(AppError::Conflict(
                "Cet état des lieux est finalisé et ne peut plus être modifié".into(),
            ));
        }

        let prefix = format!("edl_{}_{}", id, categorie.as_str());
        let chemin =
            uploads::store_file(&self.uploads_dir, "etats_lieux", &prefix, &extension, &file.bytes)
                .await?;
        let photo = NewPhoto {
            categorie: categorie.as_str().to_string(),
            nom_fichier: uploads::sanitize_filename(&file.filename),
            chemin_fichier: chemin.clone(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };
        match self.db.insert_etat_lieux_photo(id, photo).await {
            Ok(model) => Ok(model),
            Err(e) => {
                self.discard(&chemin).await;
                Err(e)
            }
        }
    }

    /// Delete the photo row, then its file.
    pub async fn delete_photo(&self, id: i32, photo_id: i32) -> AppResult<()> {
        let photo = self.db.get_etat_lieux_photo(id, photo_id).await?;
        self.db.delete_etat_lieux_photo(photo.id).await?;
        self.discard(&photo.chemin_fichier).await;
        Ok(())
    }

    /// Mark the bilan as sent and email it to the tenants.
    pub async fn send_bilan(&self, id: i32) -> AppResult<Outcome<etat_lieux::Model>> {
        let etat = self.db.require_etat_lieux(id).await?;
        if etat.type_etat != EtatLieuxType::Sortie {
            return Err(AppError::InvalidInput(
                "Le bilan ne concerne que l'état des lieux de sortie".into(),
            ));
        }
        if Bilan::from_model(&etat).rows.is_empty() {
            return Err(AppError::InvalidInput("Le bilan est vide".into()));
        }

        let etat = self.db.mark_bilan_envoye(id).await?;
        info!(etat_lieux = %etat.reference_unique, "Bilan marked as sent");
        let bilan = Bilan::from_model(&etat);

        let mut outcome = Outcome::new(etat);
        outcome.push(NoticeLevel::Success, "Bilan envoyé");
        let mut base = self.base_vars(&outcome.value).await?;
        base.insert("bilan_html".into(), bilan_html(&bilan));
        base.insert(
            "commentaire".into(),
            bilan.commentaire.clone().unwrap_or_default(),
        );
        self.notify_tenants(&mut outcome, "bilan_logement_envoye", &base)
            .await?;
        Ok(outcome)
    }

    /// `brouillon -> finalise`, then notify the tenants.
    pub async fn finalize(&self, id: i32) -> AppResult<Outcome<etat_lieux::Model>> {
        let etat = self.db.require_etat_lieux(id).await?;
        if etat.statut == EtatLieuxStatut::Finalise {
            return Err(AppError::Conflict("Cet état des lieux est déjà finalisé".into()));
        }
        if !self.db.etat_lieux_signatures_completes(id).await? {
            return Err(AppError::InvalidInput(
                "Tous les locataires doivent signer avant la finalisation".into(),
            ));
        }
        if etat.type_etat == EtatLieuxType::Entree && etat.cles_total <= 0 {
            return Err(AppError::InvalidInput(
                "Le nombre de clés remises doit être renseigné".into(),
            ));
        }

        let etat = self.db.mark_etat_lieux_finalise(id).await?;
        info!(etat_lieux = %etat.reference_unique, "État des lieux finalised");

        let mut outcome = Outcome::new(etat);
        outcome.push(NoticeLevel::Success, "État des lieux finalisé");
        let base = self.base_vars(&outcome.value).await?;
        self.notify_tenants(&mut outcome, "etat_lieux_finalise", &base)
            .await?;
        Ok(outcome)
    }

    async fn base_vars(&self, etat: &etat_lieux::Model) -> AppResult<template::TemplateVars> {
        let societe = self
            .db
            .get_parametre_string("societe_nom")
            .await?
            .unwrap_or_default();
        Ok(template::vars([
            ("type", etat.type_etat.libelle().to_string()),
            ("adresse", etat.adresse.clone()),
            ("reference", etat.reference_unique.clone()),
            ("date", format_date(Some(etat.date_etat))),
            ("societe", societe),
        ]))
    }

    async fn notify_tenants(
        &self,
        outcome: &mut Outcome<etat_lieux::Model>,
        key: &str,
        base: &template::TemplateVars,
    ) -> AppResult<()> {
        let rows = self.db.list_etat_lieux_locataires(outcome.value.id).await?;
        for row in rows {
            let Some(to) = row.email.as_deref().filter(|e| !e.trim().is_empty()) else {
                continue;
            };
            let mut vars = base.clone();
            vars.insert("prenom".into(), row.prenom.clone());
            vars.insert("nom".into(), row.nom.clone());
            notify::deliver(&self.email, outcome, key, to, &vars).await;
        }
        Ok(())
    }

    async fn discard_signatures(&self, stored: &[StoredSignature]) {
        for path in stored.iter().filter_map(|s| s.path.as_deref()) {
            self.discard(path).await;
        }
    }

    async fn discard(&self, relative: &str) {
        match paths::resolve_within(&self.uploads_dir, relative) {
            Ok(path) => {
                if let Err(e) = uploads::remove_file(&path).await {
                    warn!("Failed to remove {}: {}", relative, e);
                }
            }
            Err(e) => warn!("Refusing to remove {}: {}", relative, e),
        }
    }
}

/// HTML table of the bilan rows with totals; every cell is escaped.
pub fn bilan_html(bilan: &Bilan) -> String {
    let mut html = String::from(
        "<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\"><thead><tr>\
         <th>Poste</th><th>Commentaire</th><th>Valeur</th><th>Montant dû</th>\
         </tr></thead><tbody>",
    );
    for row in &bilan.rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.poste),
            escape_html(&row.commentaire),
            format_euros(row.valeur),
            format_euros(row.montant_du),
        ));
    }
    html.push_str(&format!(
        "</tbody><tfoot><tr><th colspan=\"2\">Total</th><th>{}</th><th>{}</th></tr></tfoot></table>",
        format_euros(bilan.total_valeur),
        format_euros(bilan.total_montant_du),
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BilanRow;

    #[test]
    fn test_bilan_html_escapes_and_totals() {
        let bilan = Bilan {
            rows: vec![
                BilanRow {
                    poste: "<script>".into(),
                    commentaire: "porte".into(),
                    valeur: 100.0,
                    montant_du: 40.0,
                },
                BilanRow {
                    poste: "Ménage".into(),
                    commentaire: String::new(),
                    valeur: 50.0,
                    montant_du: 50.0,
                },
            ],
            commentaire: None,
            total_valeur: 150.0,
            total_montant_du: 90.0,
            envoye: false,
            envoye_at: None,
        };
        let html = bilan_html(&bilan);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("150,00 €"));
        assert!(html.contains("90,00 €"));
    }
}

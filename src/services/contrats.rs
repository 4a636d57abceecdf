//! Lease lifecycle actions that span the database, documents and email.

use std::path::PathBuf;

use tracing::{info, warn};

use super::documents::{self, lease_vars};
use super::mailer::EmailService;
use super::notify::{self, Outcome, admin_label};
use super::{paths, signatures, uploads};
use crate::config::Config;
use crate::db::{DbPool, contrats::LOG_ENTITY};
use crate::entity::administrateur;
use crate::entity::contrat;
use crate::entity::etat_lieux::EtatLieuxType;
use crate::entity::logement::LogementStatut;
use crate::error::{AppError, AppResult};
use crate::models::{NoticeLevel, SignContratRequest};

#[derive(Debug, Clone)]
pub struct ContratService {
    db: DbPool,
    email: EmailService,
    uploads_dir: PathBuf,
    admin_email: String,
}

impl ContratService {
    pub fn new(config: &Config, db: DbPool, email: EmailService) -> Self {
        Self {
            db,
            email,
            uploads_dir: config.uploads_dir.clone(),
            admin_email: config.admin_email.clone(),
        }
    }

    /// Store a tenant's signature image and record it on the lease.
    pub async fn sign(
        &self,
        contrat_id: i32,
        request: &SignContratRequest,
        ip: Option<&str>,
    ) -> AppResult<contrat::Model> {
        let prefix = format!("contrat_{}_locataire_{}", contrat_id, request.locataire_id);
        let path =
            signatures::store_signature(&self.uploads_dir, &prefix, &request.signature_data).await?;

        let contrat = match self
            .db
            .record_locataire_signature(
                contrat_id,
                request.locataire_id,
                &path,
                ip,
                request.mention_lu_approuve.clone(),
            )
            .await
        {
            Ok(contrat) => contrat,
            Err(e) => {
                if let Ok(stored) = paths::resolve_within(&self.uploads_dir, &path) {
                    let _ = uploads::remove_file(&stored).await;
                }
                return Err(e);
            }
        };

        self.db
            .insert_log(
                LOG_ENTITY,
                Some(contrat_id),
                "signature_enregistree",
                Some(format!("locataire {}", request.locataire_id)),
                ip,
            )
            .await?;
        Ok(contrat)
    }

    /// `signe -> en_verification`
    pub async fn request_verification(
        &self,
        contrat_id: i32,
        ip: Option<&str>,
    ) -> AppResult<contrat::Model> {
        let contrat = self.db.mark_contrat_en_verification(contrat_id).await?;
        self.db
            .insert_log(LOG_ENTITY, Some(contrat_id), "contrat_en_verification", None, ip)
            .await?;
        Ok(contrat)
    }

    /// Validate a signed lease. The move-in report must exist and carry every
    /// tenant signature. Document generation and emails run after the status
    /// change and only produce notices when they fail.
    pub async fn validate(
        &self,
        contrat_id: i32,
        admin: &administrateur::Model,
        notes: Option<String>,
        ip: Option<&str>,
    ) -> AppResult<Outcome<contrat::Model>> {
        let current = self.db.require_contrat(contrat_id).await?;
        if !current.statut.awaits_review() {
            return Err(AppError::Conflict(format!(
                "Le contrat est au statut {} et ne peut pas être validé",
                current.statut.as_str()
            )));
        }
        let entree = self
            .db
            .find_etat_lieux(contrat_id, EtatLieuxType::Entree)
            .await?
            .ok_or_else(|| {
                AppError::InvalidInput(
                    "L'état des lieux d'entrée doit être réalisé avant la validation".into(),
                )
            })?;
        if !self.db.etat_lieux_signatures_completes(entree.id).await? {
            return Err(AppError::InvalidInput(
                "L'état des lieux d'entrée doit être signé par tous les locataires".into(),
            ));
        }

        let contrat = self
            .db
            .mark_contrat_valide(contrat_id, admin.id, notes.clone())
            .await?;
        self.db
            .insert_log(
                LOG_ENTITY,
                Some(contrat_id),
                "contrat_valide",
                Some(format!("par {}", admin.username)),
                ip,
            )
            .await?;
        info!(contrat = %contrat.reference_unique, admin = %admin.username, "Contrat validated");

        let mut outcome = Outcome::new(contrat);
        outcome.push(NoticeLevel::Success, "Contrat validé");

        if let Err(e) = documents::generate_lease(&self.db, &self.uploads_dir, contrat_id).await {
            warn!(contrat_id, "Lease regeneration failed: {}", e);
            outcome.push(
                NoticeLevel::Warning,
                "Le document du bail n'a pas pu être régénéré",
            );
        }

        self.db
            .set_logement_statut(outcome.value.logement_id, LogementStatut::EnLocation)
            .await?;

        // Re-read so the notification carries the regenerated file and validation date.
        outcome.value = self.db.require_contrat(contrat_id).await?;
        let logement = self.db.require_logement(outcome.value.logement_id).await?;
        let locataires = self.db.list_locataires(contrat_id).await?;
        let societe = self.societe().await?;
        let base = lease_vars(&outcome.value, &logement, &locataires, &societe);

        for locataire in &locataires {
            let Some(to) = locataire.email.as_deref().filter(|e| !e.trim().is_empty()) else {
                continue;
            };
            let mut vars = base.clone();
            vars.insert("prenom".into(), locataire.prenom.clone());
            vars.insert("nom".into(), locataire.nom.clone());
            notify::deliver(&self.email, &mut outcome, "contrat_valide_client", to, &vars).await;
        }

        match notify::admin_address(&self.db, &self.admin_email).await? {
            Some(to) => {
                let mut vars = base;
                vars.insert("admin".into(), admin_label(admin));
                vars.insert("notes".into(), notes.unwrap_or_default());
                notify::deliver(&self.email, &mut outcome, "contrat_valide_admin", &to, &vars)
                    .await;
            }
            None => outcome.push(
                NoticeLevel::Info,
                "Aucune adresse administrateur configurée pour la notification",
            ),
        }

        Ok(outcome)
    }

    /// Cancel a lease under review. The motif is mandatory.
    pub async fn cancel(
        &self,
        contrat_id: i32,
        admin: &administrateur::Model,
        motif: &str,
        ip: Option<&str>,
    ) -> AppResult<Outcome<contrat::Model>> {
        let motif = motif.trim();
        if motif.is_empty() {
            return Err(AppError::InvalidInput(
                "Le motif d'annulation est obligatoire".into(),
            ));
        }

        let contrat = self.db.mark_contrat_annule(contrat_id, motif).await?;
        self.db
            .insert_log(
                LOG_ENTITY,
                Some(contrat_id),
                "contrat_annule",
                Some(motif.to_string()),
                ip,
            )
            .await?;
        info!(contrat = %contrat.reference_unique, admin = %admin.username, "Contrat cancelled");

        let mut outcome = Outcome::new(contrat);
        outcome.push(NoticeLevel::Success, "Contrat annulé");

        let logement = self.db.require_logement(outcome.value.logement_id).await?;
        let locataires = self.db.list_locataires(contrat_id).await?;
        let societe = self.societe().await?;
        let mut base = lease_vars(&outcome.value, &logement, &locataires, &societe);
        base.insert("motif".into(), motif.to_string());

        for locataire in &locataires {
            let Some(to) = locataire.email.as_deref().filter(|e| !e.trim().is_empty()) else {
                continue;
            };
            let mut vars = base.clone();
            vars.insert("prenom".into(), locataire.prenom.clone());
            vars.insert("nom".into(), locataire.nom.clone());
            notify::deliver(&self.email, &mut outcome, "contrat_annule_client", to, &vars).await;
        }

        if let Some(to) = notify::admin_address(&self.db, &self.admin_email).await? {
            base.insert("admin".into(), admin_label(admin));
            notify::deliver(&self.email, &mut outcome, "contrat_annule_admin", &to, &base).await;
        }

        Ok(outcome)
    }

    /// Regenerate the lease document on demand.
    pub async fn regenerate_document(&self, contrat_id: i32) -> AppResult<String> {
        documents::generate_lease(&self.db, &self.uploads_dir, contrat_id).await
    }

    async fn societe(&self) -> AppResult<String> {
        Ok(self
            .db
            .get_parametre_string("societe_nom")
            .await?
            .unwrap_or_default())
    }
}

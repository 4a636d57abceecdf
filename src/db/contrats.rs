//! Database operations for leases and their tenants.
//!
//! Status transitions are written as conditional updates so two admins acting
//! on the same lease cannot both succeed.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entity::candidature::{self, CandidatureStatut};
use crate::entity::contrat::{self, ActiveModel, ContratStatut, Entity as Contrat};
use crate::entity::locataire::{self, Entity as Locataire};
use crate::error::{AppError, AppResult};
use crate::models::{ContratFilters, CreateContratRequest, non_blank};

use super::{DbPool, generate_reference};

/// `type_entite` of lease log rows.
pub const LOG_ENTITY: &str = "contrat";

const REVIEWABLE: [ContratStatut; 2] = [ContratStatut::Signe, ContratStatut::EnVerification];

impl DbPool {
    /// Create a lease and its tenants in one transaction.
    pub async fn insert_contrat(
        &self,
        request: &CreateContratRequest,
        validite_heures: i64,
    ) -> AppResult<(contrat::Model, Vec<locataire::Model>)> {
        request.validate()?;
        self.require_logement(request.logement_id).await?;
        if let Some(candidature_id) = request.candidature_id {
            self.require_candidature(candidature_id).await?;
        }

        let now = Utc::now();
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let contrat = ActiveModel {
            reference_unique: Set(generate_reference("BAIL")),
            logement_id: Set(request.logement_id),
            candidature_id: Set(request.candidature_id),
            statut: Set(ContratStatut::EnAttente),
            nb_locataires: Set(request.locataires.len() as i32),
            date_prise_effet: Set(request.date_prise_effet),
            date_expiration: Set(Some(now + chrono::Duration::hours(validite_heures.max(1)))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert contrat: {}", e)))?;

        let mut locataires = Vec::with_capacity(request.locataires.len());
        for (index, input) in request.locataires.iter().enumerate() {
            let inserted = locataire::ActiveModel {
                contrat_id: Set(contrat.id),
                ordre: Set(index as i32 + 1),
                nom: Set(input.nom.trim().to_string()),
                prenom: Set(input.prenom.trim().to_string()),
                date_naissance: Set(input.date_naissance),
                email: Set(non_blank(&input.email).map(|e| e.to_lowercase())),
                telephone: Set(non_blank(&input.telephone)),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert locataire: {}", e)))?;
            locataires.push(inserted);
        }

        if let Some(candidature_id) = request.candidature_id {
            candidature::Entity::update_many()
                .filter(candidature::Column::Id.eq(candidature_id))
                .col_expr(
                    candidature::Column::Statut,
                    Expr::value(CandidatureStatut::ContratEnvoye.as_str()),
                )
                .col_expr(candidature::Column::UpdatedAt, Expr::value(now))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to update candidature: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit contrat: {}", e)))?;

        Ok((contrat, locataires))
    }

    pub async fn list_contrats(&self, filters: &ContratFilters) -> AppResult<Vec<contrat::Model>> {
        let mut query = Contrat::find();
        if let Some(statut) = filters.statut {
            query = query.filter(contrat::Column::Statut.eq(statut));
        }
        if let Some(logement_id) = filters.logement_id {
            query = query.filter(contrat::Column::LogementId.eq(logement_id));
        }
        query
            .order_by_desc(contrat::Column::CreatedAt)
            .order_by_desc(contrat::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list contrats: {}", e)))
    }

    pub async fn get_contrat(&self, id: i32) -> AppResult<Option<contrat::Model>> {
        Contrat::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get contrat: {}", e)))
    }

    pub async fn require_contrat(&self, id: i32) -> AppResult<contrat::Model> {
        self.get_contrat(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contrat {}", id)))
    }

    /// The lease currently binding a logement (validated first, then signed).
    pub async fn active_contrat_for_logement(
        &self,
        logement_id: i32,
    ) -> AppResult<Option<contrat::Model>> {
        let contrats = Contrat::find()
            .filter(contrat::Column::LogementId.eq(logement_id))
            .filter(contrat::Column::Statut.is_in([
                ContratStatut::Valide,
                ContratStatut::EnVerification,
                ContratStatut::Signe,
            ]))
            .order_by_desc(contrat::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get active contrat: {}", e)))?;

        let valide = contrats
            .iter()
            .position(|c| c.statut == ContratStatut::Valide);
        Ok(match valide {
            Some(index) => contrats.into_iter().nth(index),
            None => contrats.into_iter().next(),
        })
    }

    pub async fn list_locataires(&self, contrat_id: i32) -> AppResult<Vec<locataire::Model>> {
        Locataire::find()
            .filter(locataire::Column::ContratId.eq(contrat_id))
            .order_by_asc(locataire::Column::Ordre)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list locataires: {}", e)))
    }

    /// Store a tenant's lease signature. When every tenant has signed, the
    /// lease moves to `signe`. Returns the lease after the update.
    pub async fn record_locataire_signature(
        &self,
        contrat_id: i32,
        locataire_id: i32,
        signature_path: &str,
        ip_address: Option<&str>,
        mention_lu_approuve: Option<String>,
    ) -> AppResult<contrat::Model> {
        let contrat = self.require_contrat(contrat_id).await?;
        if contrat.statut != ContratStatut::EnAttente {
            return Err(AppError::Conflict(format!(
                "Le contrat est au statut {} et ne peut plus être signé",
                contrat.statut.as_str()
            )));
        }
        if matches!(contrat.date_expiration, Some(expiration) if expiration < Utc::now()) {
            return Err(AppError::Conflict("Le lien de signature a expiré".into()));
        }

        let locataire = Locataire::find_by_id(locataire_id)
            .filter(locataire::Column::ContratId.eq(contrat_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get locataire: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Locataire {}", locataire_id)))?;

        let mut active: locataire::ActiveModel = locataire.into();
        active.signature_data = Set(Some(signature_path.to_string()));
        active.signature_timestamp = Set(Some(Utc::now()));
        active.signature_ip = Set(ip_address.map(str::to_string));
        active.mention_lu_approuve = Set(non_blank(&mention_lu_approuve));
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to store signature: {}", e)))?;

        let locataires = self.list_locataires(contrat_id).await?;
        if locataires.iter().all(|l| l.signature_data.is_some()) {
            let now = Utc::now();
            Contrat::update_many()
                .filter(contrat::Column::Id.eq(contrat_id))
                .filter(contrat::Column::Statut.eq(ContratStatut::EnAttente))
                .col_expr(contrat::Column::Statut, Expr::value(ContratStatut::Signe.as_str()))
                .col_expr(contrat::Column::DateSignature, Expr::value(Some(now)))
                .col_expr(contrat::Column::UpdatedAt, Expr::value(now))
                .exec(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to update contrat: {}", e)))?;
        }

        self.require_contrat(contrat_id).await
    }

    /// `signe -> en_verification`
    pub async fn mark_contrat_en_verification(&self, id: i32) -> AppResult<contrat::Model> {
        let now = Utc::now();
        let result = Contrat::update_many()
            .filter(contrat::Column::Id.eq(id))
            .filter(contrat::Column::Statut.eq(ContratStatut::Signe))
            .col_expr(
                contrat::Column::Statut,
                Expr::value(ContratStatut::EnVerification.as_str()),
            )
            .col_expr(contrat::Column::UpdatedAt, Expr::value(now))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update contrat: {}", e)))?;
        self.transition_result(id, result.rows_affected, "mis en vérification")
            .await
    }

    /// `signe | en_verification -> valide`
    pub async fn mark_contrat_valide(
        &self,
        id: i32,
        admin_id: i32,
        notes: Option<String>,
    ) -> AppResult<contrat::Model> {
        let now = Utc::now();
        let result = Contrat::update_many()
            .filter(contrat::Column::Id.eq(id))
            .filter(contrat::Column::Statut.is_in(REVIEWABLE))
            .col_expr(contrat::Column::Statut, Expr::value(ContratStatut::Valide.as_str()))
            .col_expr(contrat::Column::DateValidation, Expr::value(Some(now)))
            .col_expr(contrat::Column::ValidatedBy, Expr::value(Some(admin_id)))
            .col_expr(contrat::Column::ValidationNotes, Expr::value(non_blank(&notes)))
            .col_expr(contrat::Column::UpdatedAt, Expr::value(now))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to validate contrat: {}", e)))?;
        self.transition_result(id, result.rows_affected, "validé").await
    }

    /// `signe | en_verification -> annule`
    pub async fn mark_contrat_annule(&self, id: i32, motif: &str) -> AppResult<contrat::Model> {
        let now = Utc::now();
        let result = Contrat::update_many()
            .filter(contrat::Column::Id.eq(id))
            .filter(contrat::Column::Statut.is_in(REVIEWABLE))
            .col_expr(contrat::Column::Statut, Expr::value(ContratStatut::Annule.as_str()))
            .col_expr(contrat::Column::MotifAnnulation, Expr::value(Some(motif.to_string())))
            .col_expr(contrat::Column::DateAnnulation, Expr::value(Some(now)))
            .col_expr(contrat::Column::UpdatedAt, Expr::value(now))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to cancel contrat: {}", e)))?;
        self.transition_result(id, result.rows_affected, "annulé").await
    }

    async fn transition_result(
        &self,
        id: i32,
        rows_affected: u64,
        action: &str,
    ) -> AppResult<contrat::Model> {
        let contrat = self.require_contrat(id).await?;
        if rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "Le contrat {} (statut {}) ne peut pas être {}",
                contrat.reference_unique,
                contrat.statut.as_str(),
                action
            )));
        }
        Ok(contrat)
    }

    pub async fn set_fichier_bail(&self, id: i32, path: &str) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(id),
            fichier_bail: Set(Some(path.to_string())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        model
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update contrat: {}", e)))?;
        Ok(())
    }

    /// Move unsigned leases whose signing window has passed to `expire`.
    pub async fn expire_contrats(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = Contrat::update_many()
            .filter(contrat::Column::Statut.eq(ContratStatut::EnAttente))
            .filter(contrat::Column::DateExpiration.lt(now))
            .col_expr(contrat::Column::Statut, Expr::value(ContratStatut::Expire.as_str()))
            .col_expr(contrat::Column::UpdatedAt, Expr::value(now))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to expire contrats: {}", e)))?;
        Ok(result.rows_affected)
    }
}

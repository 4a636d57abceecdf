//! Database operations for candidatures and their documents.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::candidature::{self, ActiveModel, CandidatureStatut, Entity as Candidature};
use crate::entity::candidature_document::{self, Entity as CandidatureDocument};
use crate::error::{AppError, AppResult};
use crate::models::{
    CandidatureDetail, CandidatureFilters, CreateCandidatureRequest, LogementSummary, NewDocument,
    non_blank,
};

use super::{DbPool, generate_reference};

/// `type_entite` of candidature log rows.
pub const LOG_ENTITY: &str = "candidature";

impl DbPool {
    /// Create a candidature with a fresh `CAND-…` reference.
    pub async fn insert_candidature(
        &self,
        request: &CreateCandidatureRequest,
        ip_address: Option<&str>,
    ) -> AppResult<candidature::Model> {
        request.validate()?;
        if let Some(logement_id) = request.logement_id {
            self.require_logement(logement_id).await?;
        }

        let now = Utc::now();
        let model = ActiveModel {
            reference_unique: Set(generate_reference("CAND")),
            logement_id: Set(request.logement_id),
            nom: Set(request.nom.trim().to_string()),
            prenom: Set(request.prenom.trim().to_string()),
            email: Set(request.email.trim().to_lowercase()),
            telephone: Set(non_blank(&request.telephone)),
            statut_professionnel: Set(non_blank(&request.statut_professionnel)),
            revenus_mensuels: Set(request.revenus_mensuels),
            nb_occupants: Set(request.nb_occupants.unwrap_or(1)),
            garantie_visale: Set(request.garantie_visale),
            statut: Set(CandidatureStatut::EnCours),
            notes: Set(non_blank(&request.notes)),
            date_soumission: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert candidature: {}", e)))?;

        self.insert_log(
            LOG_ENTITY,
            Some(inserted.id),
            "candidature_creee",
            Some(format!("Référence {}", inserted.reference_unique)),
            ip_address,
        )
        .await?;

        Ok(inserted)
    }

    pub async fn list_candidatures(
        &self,
        filters: &CandidatureFilters,
    ) -> AppResult<Vec<candidature::Model>> {
        let mut query = Candidature::find();
        if let Some(statut) = filters.statut {
            query = query.filter(candidature::Column::Statut.eq(statut));
        }
        if let Some(logement_id) = filters.logement_id {
            query = query.filter(candidature::Column::LogementId.eq(logement_id));
        }
        if let Some(q) = non_blank(&filters.q) {
            query = query.filter(
                Condition::any()
                    .add(candidature::Column::Nom.contains(&q))
                    .add(candidature::Column::Prenom.contains(&q))
                    .add(candidature::Column::Email.contains(&q))
                    .add(candidature::Column::ReferenceUnique.contains(&q)),
            );
        }

        query
            .order_by_desc(candidature::Column::DateSoumission)
            .order_by_desc(candidature::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list candidatures: {}", e)))
    }

    pub async fn get_candidature(&self, id: i32) -> AppResult<Option<candidature::Model>> {
        Candidature::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get candidature: {}", e)))
    }

    pub async fn require_candidature(&self, id: i32) -> AppResult<candidature::Model> {
        self.get_candidature(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Candidature {}", id)))
    }

    /// Candidature with its logement, grouped documents and activity.
    pub async fn get_candidature_detail(&self, id: i32) -> AppResult<CandidatureDetail> {
        let candidature = self.require_candidature(id).await?;

        let logement = match candidature.logement_id {
            Some(logement_id) => self
                .get_logement(logement_id)
                .await?
                .map(|l| LogementSummary::from(&l)),
            None => None,
        };

        let documents = self.list_candidature_documents(id).await?;
        let logs = self.logs_for(LOG_ENTITY, id, 50).await?;

        Ok(CandidatureDetail {
            candidature,
            logement,
            documents: CandidatureDetail::group_documents(documents),
            logs,
        })
    }

    pub async fn update_candidature_statut(
        &self,
        id: i32,
        statut: CandidatureStatut,
        commentaire: Option<String>,
        ip_address: Option<&str>,
    ) -> AppResult<candidature::Model> {
        let existing = self.require_candidature(id).await?;
        let previous = existing.statut;

        let mut active: ActiveModel = existing.into();
        active.statut = Set(statut);
        active.updated_at = Set(Utc::now());
        let updated = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update candidature: {}", e)))?;

        let mut details = format!("{} -> {}", previous.as_str(), statut.as_str());
        if let Some(commentaire) = non_blank(&commentaire) {
            details.push_str(" : ");
            details.push_str(&commentaire);
        }
        self.insert_log(LOG_ENTITY, Some(id), "statut_modifie", Some(details), ip_address)
            .await?;

        Ok(updated)
    }

    pub async fn list_candidature_documents(
        &self,
        candidature_id: i32,
    ) -> AppResult<Vec<candidature_document::Model>> {
        CandidatureDocument::find()
            .filter(candidature_document::Column::CandidatureId.eq(candidature_id))
            .order_by_asc(candidature_document::Column::TypeDocument)
            .order_by_asc(candidature_document::Column::UploadedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list documents: {}", e)))
    }

    pub async fn insert_candidature_document(
        &self,
        candidature_id: i32,
        document: NewDocument,
        ip_address: Option<&str>,
    ) -> AppResult<candidature_document::Model> {
        let model = candidature_document::ActiveModel {
            candidature_id: Set(candidature_id),
            type_document: Set(document.type_document),
            nom_fichier: Set(document.nom_fichier),
            nom_original: Set(document.nom_original),
            chemin_fichier: Set(document.chemin_fichier),
            taille: Set(document.taille),
            uploaded_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert document: {}", e)))?;

        self.insert_log(
            LOG_ENTITY,
            Some(candidature_id),
            "document_ajoute",
            Some(format!("{} ({})", inserted.nom_original, inserted.type_document)),
            ip_address,
        )
        .await?;

        Ok(inserted)
    }
}

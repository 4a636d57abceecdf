//! Database operations for états des lieux, their tenant rows and photos.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entity::etat_lieux::{
    self, ActiveModel, Entity as EtatLieux, EtatLieuxStatut, EtatLieuxType,
};
use crate::entity::etat_lieux_locataire::{self, Entity as EtatLieuxLocataire};
use crate::entity::etat_lieux_photo::{self, Entity as EtatLieuxPhoto};
use crate::error::{AppError, AppResult};
use crate::models::{BilanRow, EtatLieuxUpdate, non_blank};

use super::{DbPool, generate_reference};

/// A tenant signature ready to persist: the row id, the stored image path
/// and the "certifié exact" checkbox.
#[derive(Debug, Clone)]
pub struct StoredSignature {
    pub etat_lieux_locataire_id: i32,
    pub path: Option<String>,
    pub certifie_exact: bool,
}

/// A photo file already written under the uploads directory.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub categorie: String,
    pub nom_fichier: String,
    pub chemin_fichier: String,
    pub description: Option<String>,
}

impl DbPool {
    pub async fn find_etat_lieux(
        &self,
        contrat_id: i32,
        type_etat: EtatLieuxType,
    ) -> AppResult<Option<etat_lieux::Model>> {
        EtatLieux::find()
            .filter(etat_lieux::Column::ContratId.eq(contrat_id))
            .filter(etat_lieux::Column::TypeEtat.eq(type_etat))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get état des lieux: {}", e)))
    }

    pub async fn require_etat_lieux(&self, id: i32) -> AppResult<etat_lieux::Model> {
        EtatLieux::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get état des lieux: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("État des lieux {}", id)))
    }

    pub async fn list_etats_lieux_for_contrat(
        &self,
        contrat_id: i32,
    ) -> AppResult<Vec<etat_lieux::Model>> {
        EtatLieux::find()
            .filter(etat_lieux::Column::ContratId.eq(contrat_id))
            .order_by_asc(etat_lieux::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list états des lieux: {}", e)))
    }

    /// Load the report for `(contrat, type)`, creating it from the lease on
    /// first access with one signature row per tenant.
    pub async fn load_or_create_etat_lieux(
        &self,
        contrat_id: i32,
        type_etat: EtatLieuxType,
    ) -> AppResult<(etat_lieux::Model, bool)> {
        if let Some(existing) = self.find_etat_lieux(contrat_id, type_etat).await? {
            return Ok((existing, false));
        }

        let contrat = self.require_contrat(contrat_id).await?;
        let logement = self.require_logement(contrat.logement_id).await?;
        let locataires = self.list_locataires(contrat_id).await?;
        let bailleur = self
            .get_parametre_string("societe_nom")
            .await?
            .filter(|s| !s.trim().is_empty());

        let adresse = match &logement.appartement {
            Some(appartement) => format!("{}, {}", logement.adresse, appartement),
            None => logement.adresse.clone(),
        };
        let noms = locataires
            .iter()
            .map(|l| format!("{} {}", l.prenom, l.nom))
            .collect::<Vec<_>>()
            .join(", ");
        let premier_email = locataires.iter().find_map(|l| l.email.clone());

        let now = Utc::now();
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let created = ActiveModel {
            contrat_id: Set(contrat_id),
            logement_id: Set(logement.id),
            type_etat: Set(type_etat),
            reference_unique: Set(generate_reference(match type_etat {
                EtatLieuxType::Entree => "EDLE",
                EtatLieuxType::Sortie => "EDLS",
            })),
            date_etat: Set(now.date_naive()),
            adresse: Set(adresse),
            bailleur_nom: Set(bailleur),
            locataire_nom_complet: Set(Some(noms)),
            locataire_email: Set(premier_email),
            cles_appartement: Set(0),
            cles_boite_lettres: Set(0),
            cles_autre: Set(0),
            cles_total: Set(0),
            bilan_envoye: Set(false),
            statut: Set(EtatLieuxStatut::Brouillon),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert état des lieux: {}", e)))?;

        for locataire in &locataires {
            etat_lieux_locataire::ActiveModel {
                etat_lieux_id: Set(created.id),
                locataire_id: Set(Some(locataire.id)),
                ordre: Set(locataire.ordre),
                nom: Set(locataire.nom.clone()),
                prenom: Set(locataire.prenom.clone()),
                email: Set(locataire.email.clone()),
                certifie_exact: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert tenant row: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit état des lieux: {}", e)))?;

        Ok((created, true))
    }

    pub async fn list_etat_lieux_locataires(
        &self,
        etat_lieux_id: i32,
    ) -> AppResult<Vec<etat_lieux_locataire::Model>> {
        EtatLieuxLocataire::find()
            .filter(etat_lieux_locataire::Column::EtatLieuxId.eq(etat_lieux_id))
            .order_by_asc(etat_lieux_locataire::Column::Ordre)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list tenant rows: {}", e)))
    }

    /// True when the report has tenant rows and every one of them is signed.
    pub async fn etat_lieux_signatures_completes(&self, etat_lieux_id: i32) -> AppResult<bool> {
        let rows = self.list_etat_lieux_locataires(etat_lieux_id).await?;
        Ok(!rows.is_empty() && rows.iter().all(|r| r.signature_data.is_some()))
    }

    /// Write the editor fields and replace every tenant signature with the
    /// supplied ones. Rows not listed in `signatures` end up unsigned.
    pub async fn update_etat_lieux(
        &self,
        id: i32,
        update: &EtatLieuxUpdate,
        signatures: &[StoredSignature],
        ip_address: Option<&str>,
    ) -> AppResult<etat_lieux::Model> {
        let existing = self.require_etat_lieux(id).await?;
        if existing.statut == EtatLieuxStatut::Finalise {
            return Err(AppError::Conflict(
                "Cet état des lieux est finalisé et ne peut plus être modifié".into(),
            ));
        }
        update.validate(existing.type_etat)?;

        let rows = self.list_etat_lieux_locataires(id).await?;
        for signature in signatures {
            if !rows.iter().any(|r| r.id == signature.etat_lieux_locataire_id) {
                return Err(AppError::InvalidInput(format!(
                    "Locataire {} inconnu pour cet état des lieux",
                    signature.etat_lieux_locataire_id
                )));
            }
        }

        let is_sortie = existing.type_etat == EtatLieuxType::Sortie;
        let date_etat: NaiveDate = update.date_etat.unwrap_or(existing.date_etat);
        let now = Utc::now();

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut active: ActiveModel = existing.into();
        active.date_etat = Set(date_etat);
        active.bailleur_nom = Set(non_blank(&update.bailleur_nom));
        active.compteur_electricite = Set(non_blank(&update.compteur_electricite));
        active.compteur_eau_froide = Set(non_blank(&update.compteur_eau_froide));
        active.cles_appartement = Set(update.cles_appartement);
        active.cles_boite_lettres = Set(update.cles_boite_lettres);
        active.cles_autre = Set(update.cles_autre);
        active.cles_total = Set(update.cles_total);
        active.piece_principale = Set(non_blank(&update.piece_principale));
        active.coin_cuisine = Set(non_blank(&update.coin_cuisine));
        active.salle_eau_wc = Set(non_blank(&update.salle_eau_wc));
        active.etat_general = Set(non_blank(&update.etat_general));
        active.observations = Set(non_blank(&update.observations));
        active.lieu_signature = Set(non_blank(&update.lieu_signature));
        if is_sortie {
            active.depot_garantie_status =
                Set(update.depot_garantie_status.map(|s| s.as_str().to_string()));
            active.depot_garantie_montant_retenu = Set(update.depot_garantie_montant_retenu);
            active.depot_garantie_motif_retenue =
                Set(non_blank(&update.depot_garantie_motif_retenue));
        }
        active.updated_at = Set(now);
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update état des lieux: {}", e)))?;

        EtatLieuxLocataire::update_many()
            .filter(etat_lieux_locataire::Column::EtatLieuxId.eq(id))
            .col_expr(
                etat_lieux_locataire::Column::SignatureData,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                etat_lieux_locataire::Column::SignatureTimestamp,
                Expr::value(Option::<chrono::DateTime<Utc>>::None),
            )
            .col_expr(
                etat_lieux_locataire::Column::SignatureIp,
                Expr::value(Option::<String>::None),
            )
            .col_expr(etat_lieux_locataire::Column::CertifieExact, Expr::value(false))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear signatures: {}", e)))?;

        for signature in signatures {
            let signed = signature.path.is_some();
            etat_lieux_locataire::ActiveModel {
                id: Set(signature.etat_lieux_locataire_id),
                signature_data: Set(signature.path.clone()),
                signature_timestamp: Set(signed.then_some(now)),
                signature_ip: Set(if signed {
                    ip_address.map(str::to_string)
                } else {
                    None
                }),
                certifie_exact: Set(signature.certifie_exact),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to store signature: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit état des lieux: {}", e)))?;

        Ok(updated)
    }

    /// Replace the bilan rows. Refused once the bilan has been sent.
    pub async fn update_bilan(
        &self,
        id: i32,
        rows: &[BilanRow],
        commentaire: Option<String>,
    ) -> AppResult<etat_lieux::Model> {
        let existing = self.require_etat_lieux(id).await?;
        if existing.type_etat != EtatLieuxType::Sortie {
            return Err(AppError::InvalidInput(
                "Le bilan ne concerne que l'état des lieux de sortie".into(),
            ));
        }
        if existing.bilan_envoye {
            return Err(AppError::Conflict(
                "Le bilan a déjà été envoyé et n'est plus modifiable".into(),
            ));
        }

        let data = serde_json::to_string(rows)
            .map_err(|e| AppError::Database(format!("Failed to encode bilan: {}", e)))?;
        let result = EtatLieux::update_many()
            .filter(etat_lieux::Column::Id.eq(id))
            .filter(etat_lieux::Column::BilanEnvoye.eq(false))
            .col_expr(etat_lieux::Column::BilanLogementData, Expr::value(Some(data)))
            .col_expr(etat_lieux::Column::BilanLogementCommentaire, Expr::value(commentaire))
            .col_expr(etat_lieux::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update bilan: {}", e)))?;
        if result.rows_affected == 0 {
            return Err(AppError::Conflict(
                "Le bilan a déjà été envoyé et n'est plus modifiable".into(),
            ));
        }

        self.require_etat_lieux(id).await
    }

    /// Flag the bilan as sent; only the first call succeeds.
    pub async fn mark_bilan_envoye(&self, id: i32) -> AppResult<etat_lieux::Model> {
        let now = Utc::now();
        let result = EtatLieux::update_many()
            .filter(etat_lieux::Column::Id.eq(id))
            .filter(etat_lieux::Column::TypeEtat.eq(EtatLieuxType::Sortie))
            .filter(etat_lieux::Column::BilanEnvoye.eq(false))
            .col_expr(etat_lieux::Column::BilanEnvoye, Expr::value(true))
            .col_expr(etat_lieux::Column::BilanEnvoyeAt, Expr::value(Some(now)))
            .col_expr(etat_lieux::Column::UpdatedAt, Expr::value(now))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to mark bilan sent: {}", e)))?;
        if result.rows_affected == 0 {
            return Err(AppError::Conflict("Le bilan a déjà été envoyé".into()));
        }
        self.require_etat_lieux(id).await
    }

    /// `brouillon -> finalise`
    pub async fn mark_etat_lieux_finalise(&self, id: i32) -> AppResult<etat_lieux::Model> {
        let now = Utc::now();
        let result = EtatLieux::update_many()
            .filter(etat_lieux::Column::Id.eq(id))
            .filter(etat_lieux::Column::Statut.eq(EtatLieuxStatut::Brouillon))
            .col_expr(etat_lieux::Column::Statut, Expr::value("finalise"))
            .col_expr(etat_lieux::Column::DateFinalisation, Expr::value(Some(now)))
            .col_expr(etat_lieux::Column::UpdatedAt, Expr::value(now))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to finalize: {}", e)))?;
        if result.rows_affected == 0 {
            return Err(AppError::Conflict("Cet état des lieux est déjà finalisé".into()));
        }
        self.require_etat_lieux(id).await
    }

    pub async fn list_etat_lieux_photos(
        &self,
        etat_lieux_id: i32,
    ) -> AppResult<Vec<etat_lieux_photo::Model>> {
        EtatLieuxPhoto::find()
            .filter(etat_lieux_photo::Column::EtatLieuxId.eq(etat_lieux_id))
            .order_by_asc(etat_lieux_photo::Column::Categorie)
            .order_by_asc(etat_lieux_photo::Column::Ordre)
            .order_by_asc(etat_lieux_photo::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list photos: {}", e)))
    }

    pub async fn count_etat_lieux_photos(&self, etat_lieux_id: i32) -> AppResult<u64> {
        EtatLieuxPhoto::find()
            .filter(etat_lieux_photo::Column::EtatLieuxId.eq(etat_lieux_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count photos: {}", e)))
    }

    pub async fn insert_etat_lieux_photo(
        &self,
        etat_lieux_id: i32,
        photo: NewPhoto,
    ) -> AppResult<etat_lieux_photo::Model> {
        let ordre = EtatLieuxPhoto::find()
            .filter(etat_lieux_photo::Column::EtatLieuxId.eq(etat_lieux_id))
            .filter(etat_lieux_photo::Column::Categorie.eq(photo.categorie.as_str()))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count photos: {}", e)))?;

        etat_lieux_photo::ActiveModel {
            etat_lieux_id: Set(etat_lieux_id),
            categorie: Set(photo.categorie),
            nom_fichier: Set(photo.nom_fichier),
            chemin_fichier: Set(photo.chemin_fichier),
            description: Set(photo.description),
            ordre: Set(ordre as i32),
            uploaded_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert photo: {}", e)))
    }

    pub async fn get_etat_lieux_photo(
        &self,
        etat_lieux_id: i32,
        photo_id: i32,
    ) -> AppResult<etat_lieux_photo::Model> {
        EtatLieuxPhoto::find_by_id(photo_id)
            .filter(etat_lieux_photo::Column::EtatLieuxId.eq(etat_lieux_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get photo: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Photo {}", photo_id)))
    }

    pub async fn delete_etat_lieux_photo(&self, photo_id: i32) -> AppResult<()> {
        EtatLieuxPhoto::delete_by_id(photo_id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete photo: {}", e)))?;
        Ok(())
    }
}

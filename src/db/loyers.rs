//! Database operations for the monthly rent grid.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::entity::logement::{self, LogementStatut};
use crate::entity::loyer_tracking::{self, Entity as LoyerTracking, StatutPaiement};
use crate::error::{AppError, AppResult};
use crate::models::{
    LogementFilters, LogementSummary, LoyerCell, LoyerGrid, LoyerGridRow, ToggleLoyerRequest,
    validate_periode,
};

use super::DbPool;

impl DbPool {
    pub async fn get_loyer(
        &self,
        logement_id: i32,
        mois: i32,
        annee: i32,
    ) -> AppResult<Option<loyer_tracking::Model>> {
        LoyerTracking::find()
            .filter(loyer_tracking::Column::LogementId.eq(logement_id))
            .filter(loyer_tracking::Column::Mois.eq(mois))
            .filter(loyer_tracking::Column::Annee.eq(annee))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get loyer: {}", e)))
    }

    /// Twelve cells per logement for `annee`; months without a row read as
    /// `attente`.
    pub async fn loyer_grid(&self, annee: i32, logement_id: Option<i32>) -> AppResult<LoyerGrid> {
        validate_periode(1, annee)?;
        let logements = match logement_id {
            Some(id) => vec![self.require_logement(id).await?],
            None => self.list_logements(&LogementFilters::default()).await?,
        };

        let mut query = LoyerTracking::find().filter(loyer_tracking::Column::Annee.eq(annee));
        if let Some(id) = logement_id {
            query = query.filter(loyer_tracking::Column::LogementId.eq(id));
        }
        let stored: HashMap<(i32, i32), loyer_tracking::Model> = query
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list loyers: {}", e)))?
            .into_iter()
            .map(|m| ((m.logement_id, m.mois), m))
            .collect();

        let rows = logements
            .iter()
            .map(|l| {
                let summary = LogementSummary::from(l);
                let montant = summary.loyer_charges_comprises();
                let mois = (1..=12)
                    .map(|m| match stored.get(&(l.id, m)) {
                        Some(row) => LoyerCell::from(row),
                        None => LoyerCell::empty(m, montant),
                    })
                    .collect();
                LoyerGridRow {
                    logement: summary,
                    mois,
                }
            })
            .collect();

        Ok(LoyerGrid { annee, rows })
    }

    /// Advance a month to its next status, creating the row on first use.
    ///
    /// With `expected_statut` the write only succeeds when the stored status
    /// still matches; otherwise the last click wins.
    pub async fn toggle_loyer(
        &self,
        request: &ToggleLoyerRequest,
    ) -> AppResult<loyer_tracking::Model> {
        validate_periode(request.mois, request.annee)?;
        let logement = self.require_logement(request.logement_id).await?;

        let current = self
            .get_loyer(request.logement_id, request.mois, request.annee)
            .await?;
        let current_statut = current
            .as_ref()
            .map(|m| m.statut_paiement)
            .unwrap_or(StatutPaiement::Attente);
        if let Some(expected) = request.expected_statut
            && expected != current_statut
        {
            return Err(stale_status(current_statut));
        }

        let next = current_statut.next();
        let now = Utc::now();
        let date_paiement = (next == StatutPaiement::Paye).then(|| now.date_naive());

        let Some(row) = current else {
            let contrat_id = self
                .active_contrat_for_logement(logement.id)
                .await?
                .map(|c| c.id);
            return loyer_tracking::ActiveModel {
                logement_id: Set(logement.id),
                contrat_id: Set(contrat_id),
                mois: Set(request.mois),
                annee: Set(request.annee),
                montant_attendu: Set(logement.loyer + logement.charges),
                statut_paiement: Set(next),
                date_paiement: Set(date_paiement),
                rappel_envoye: Set(false),
                date_rappel: Set(None),
                nb_rappels: Set(0),
                notes: Set(None),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(self.connection())
            .await
            // The unique (logement, annee, mois) index rejects a concurrent
            // first click.
            .map_err(|e| {
                tracing::warn!("Concurrent creation of loyer row: {}", e);
                AppError::Conflict("Ce loyer vient d'être modifié, rechargez la grille".into())
            });
        };

        let mut update = LoyerTracking::update_many()
            .filter(loyer_tracking::Column::Id.eq(row.id))
            .col_expr(loyer_tracking::Column::StatutPaiement, Expr::value(next.as_str()))
            .col_expr(loyer_tracking::Column::DatePaiement, Expr::value(date_paiement))
            .col_expr(loyer_tracking::Column::UpdatedAt, Expr::value(now));
        if request.expected_statut.is_some() {
            update = update.filter(loyer_tracking::Column::StatutPaiement.eq(current_statut));
        }
        let result = update
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update loyer: {}", e)))?;
        if result.rows_affected == 0 {
            return Err(AppError::Conflict(
                "Ce loyer vient d'être modifié, rechargez la grille".into(),
            ));
        }

        self.get_loyer(request.logement_id, request.mois, request.annee)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loyer {}/{}", request.mois, request.annee)))
    }

    /// Count a reminder on an unpaid month.
    pub async fn record_loyer_rappel(
        &self,
        logement_id: i32,
        mois: i32,
        annee: i32,
    ) -> AppResult<loyer_tracking::Model> {
        let row = self
            .get_loyer(logement_id, mois, annee)
            .await?
            .filter(|m| m.statut_paiement == StatutPaiement::Impaye)
            .ok_or_else(|| {
                AppError::InvalidInput("Un rappel ne concerne qu'un loyer impayé".into())
            })?;

        let now = Utc::now();
        let nb_rappels = row.nb_rappels + 1;
        let mut active: loyer_tracking::ActiveModel = row.into();
        active.rappel_envoye = Set(true);
        active.date_rappel = Set(Some(now));
        active.nb_rappels = Set(nb_rappels);
        active.updated_at = Set(now);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to record rappel: {}", e)))
    }

    /// Status of every rented logement for one month.
    pub async fn loyer_statuts_for_period(
        &self,
        mois: i32,
        annee: i32,
    ) -> AppResult<Vec<(logement::Model, StatutPaiement)>> {
        validate_periode(mois, annee)?;
        let logements = self
            .list_logements(&LogementFilters {
                statut: Some(LogementStatut::EnLocation),
            })
            .await?;
        let stored: HashMap<i32, StatutPaiement> = LoyerTracking::find()
            .filter(loyer_tracking::Column::Mois.eq(mois))
            .filter(loyer_tracking::Column::Annee.eq(annee))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list loyers: {}", e)))?
            .into_iter()
            .map(|m| (m.logement_id, m.statut_paiement))
            .collect();

        Ok(logements
            .into_iter()
            .map(|l| {
                let statut = stored
                    .get(&l.id)
                    .copied()
                    .unwrap_or(StatutPaiement::Attente);
                (l, statut)
            })
            .collect())
    }
}

fn stale_status(current: StatutPaiement) -> AppError {
    AppError::Conflict(format!(
        "Le statut a été modifié entre-temps (statut actuel : {})",
        current.as_str()
    ))
}

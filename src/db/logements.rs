//! Database operations for logements.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::logement::{self, ActiveModel, Entity as Logement, LogementStatut};
use crate::error::{AppError, AppResult};
use crate::models::{LogementFilters, LogementInput, non_blank};

use super::DbPool;

impl DbPool {
    pub async fn list_logements(&self, filters: &LogementFilters) -> AppResult<Vec<logement::Model>> {
        let mut query = Logement::find();
        if let Some(statut) = filters.statut {
            query = query.filter(logement::Column::Statut.eq(statut));
        }
        query
            .order_by_asc(logement::Column::Reference)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list logements: {}", e)))
    }

    pub async fn get_logement(&self, id: i32) -> AppResult<Option<logement::Model>> {
        Logement::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get logement: {}", e)))
    }

    /// Get a logement or fail with `NotFound`.
    pub async fn require_logement(&self, id: i32) -> AppResult<logement::Model> {
        self.get_logement(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Logement {}", id)))
    }

    async fn reference_taken(&self, reference: &str, except: Option<i32>) -> AppResult<bool> {
        let mut query = Logement::find().filter(logement::Column::Reference.eq(reference));
        if let Some(id) = except {
            query = query.filter(logement::Column::Id.ne(id));
        }
        let existing = query
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check reference: {}", e)))?;
        Ok(existing.is_some())
    }

    pub async fn insert_logement(&self, input: &LogementInput) -> AppResult<logement::Model> {
        input.validate()?;
        let reference = input.reference.trim();
        if self.reference_taken(reference, None).await? {
            return Err(AppError::Conflict(format!(
                "La référence {} existe déjà",
                reference
            )));
        }

        let now = Utc::now();
        let model = ActiveModel {
            reference: Set(reference.to_string()),
            adresse: Set(input.adresse.trim().to_string()),
            appartement: Set(non_blank(&input.appartement)),
            type_logement: Set(non_blank(&input.type_logement)),
            surface: Set(input.surface),
            loyer: Set(input.loyer),
            charges: Set(input.charges),
            depot_garantie: Set(input.depot_garantie),
            parking: Set(input.parking),
            statut: Set(input.statut.unwrap_or(LogementStatut::Disponible)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert logement: {}", e)))
    }

    pub async fn update_logement(&self, id: i32, input: &LogementInput) -> AppResult<logement::Model> {
        input.validate()?;
        let existing = self.require_logement(id).await?;
        let reference = input.reference.trim();
        if self.reference_taken(reference, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "La référence {} existe déjà",
                reference
            )));
        }

        let statut = input.statut.unwrap_or(existing.statut);
        let mut active: ActiveModel = existing.into();
        active.reference = Set(reference.to_string());
        active.adresse = Set(input.adresse.trim().to_string());
        active.appartement = Set(non_blank(&input.appartement));
        active.type_logement = Set(non_blank(&input.type_logement));
        active.surface = Set(input.surface);
        active.loyer = Set(input.loyer);
        active.charges = Set(input.charges);
        active.depot_garantie = Set(input.depot_garantie);
        active.parking = Set(input.parking);
        active.statut = Set(statut);
        active.updated_at = Set(Utc::now());

        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update logement: {}", e)))
    }

    pub async fn set_logement_statut(&self, id: i32, statut: LogementStatut) -> AppResult<()> {
        let model = ActiveModel {
            id: Set(id),
            statut: Set(statut),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        model
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update logement status: {}", e)))?;
        Ok(())
    }
}

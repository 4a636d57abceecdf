//! Backup metadata rows.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::sauvegarde::{self, Entity as Sauvegarde, SauvegardeType};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// `type_entite` of backup log rows.
pub const LOG_ENTITY: &str = "sauvegarde";

impl DbPool {
    pub async fn insert_sauvegarde(
        &self,
        type_sauvegarde: SauvegardeType,
        fichier: &str,
        fichier_fichiers: Option<&str>,
        taille: i64,
        created_by: Option<i32>,
    ) -> AppResult<sauvegarde::Model> {
        sauvegarde::ActiveModel {
            type_sauvegarde: Set(type_sauvegarde),
            fichier: Set(fichier.to_string()),
            fichier_fichiers: Set(fichier_fichiers.map(str::to_string)),
            taille: Set(taille),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert sauvegarde: {}", e)))
    }

    pub async fn list_sauvegardes(&self) -> AppResult<Vec<sauvegarde::Model>> {
        Sauvegarde::find()
            .order_by_desc(sauvegarde::Column::CreatedAt)
            .order_by_desc(sauvegarde::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list sauvegardes: {}", e)))
    }

    pub async fn require_sauvegarde(&self, id: i32) -> AppResult<sauvegarde::Model> {
        Sauvegarde::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get sauvegarde: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Sauvegarde {}", id)))
    }

    pub async fn delete_sauvegarde_row(&self, id: i32) -> AppResult<()> {
        Sauvegarde::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete sauvegarde: {}", e)))?;
        Ok(())
    }

    /// Backups created strictly before `cutoff`.
    pub async fn sauvegardes_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<sauvegarde::Model>> {
        Sauvegarde::find()
            .filter(sauvegarde::Column::CreatedAt.lt(cutoff))
            .order_by_asc(sauvegarde::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list old sauvegardes: {}", e)))
    }
}

//! Polymorphic activity log.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::entity::log::{self, ActiveModel, Entity as Log};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Append an activity log row.
    pub async fn insert_log(
        &self,
        type_entite: &str,
        entite_id: Option<i32>,
        action: &str,
        details: Option<String>,
        ip_address: Option<&str>,
    ) -> AppResult<()> {
        let model = ActiveModel {
            type_entite: Set(type_entite.to_string()),
            entite_id: Set(entite_id),
            action: Set(action.to_string()),
            details: Set(details),
            ip_address: Set(ip_address.map(str::to_string)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert log: {}", e)))?;
        Ok(())
    }

    /// Most recent log rows for one entity.
    pub async fn logs_for(
        &self,
        type_entite: &str,
        entite_id: i32,
        limit: u64,
    ) -> AppResult<Vec<log::Model>> {
        Log::find()
            .filter(log::Column::TypeEntite.eq(type_entite))
            .filter(log::Column::EntiteId.eq(entite_id))
            .order_by_desc(log::Column::CreatedAt)
            .order_by_desc(log::Column::Id)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list logs: {}", e)))
    }
}

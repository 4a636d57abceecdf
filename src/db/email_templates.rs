//! Stored email templates.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::email_template::{self, Entity as EmailTemplate};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Active template for `identifiant`, if any.
    pub async fn get_active_email_template(
        &self,
        identifiant: &str,
    ) -> AppResult<Option<email_template::Model>> {
        EmailTemplate::find()
            .filter(email_template::Column::Identifiant.eq(identifiant))
            .filter(email_template::Column::Actif.eq(true))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get email template: {}", e)))
    }

    pub async fn list_email_templates(&self) -> AppResult<Vec<email_template::Model>> {
        EmailTemplate::find()
            .order_by_asc(email_template::Column::Identifiant)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list email templates: {}", e)))
    }
}
